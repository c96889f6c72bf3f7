use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "barprep", version, about = "Barprep onboarding shell")]
struct Cli {
    /// Signed-in account; omit for an anonymous visitor
    #[arg(long, global = true, env = "BARPREP_USER")]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Current view and welcome-screen choices
    View {
        #[command(subcommand)]
        action: commands::view::ViewAction,
    },
    /// Guided onboarding tour
    Tour {
        #[command(subcommand)]
        action: commands::tour::TourAction,
    },
    /// First-time tooltips overlay
    Tooltips {
        #[command(subcommand)]
        action: commands::tooltips::TooltipsAction,
    },
    /// Switch main-app tab (unknown names land on home)
    Tab {
        /// Tab or section name (home, simulado, areas, performance, profile, questions, study)
        name: String,
    },
    /// First-question demo
    Demo {
        #[command(subcommand)]
        action: commands::demo::DemoAction,
    },
    /// Free exploration trial
    Trial {
        #[command(subcommand)]
        action: commands::trial::TrialAction,
    },
    /// Study session records
    Study {
        #[command(subcommand)]
        action: commands::study::StudyAction,
    },
    /// Achievements and journey progress
    Progress,
    /// Persistent onboarding flags
    Flags {
        #[command(subcommand)]
        action: commands::flags::FlagsAction,
    },
    /// Local question bank
    Questions {
        #[command(subcommand)]
        action: commands::questions::QuestionsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let user = cli.user.as_deref();
    let result = match cli.command {
        Commands::View { action } => commands::view::run(action, user),
        Commands::Tour { action } => commands::tour::run(action),
        Commands::Tooltips { action } => commands::tooltips::run(action),
        Commands::Tab { name } => commands::tab::run(&name),
        Commands::Demo { action } => commands::demo::run(action),
        Commands::Trial { action } => commands::trial::run(action),
        Commands::Study { action } => commands::study::run(action, user),
        Commands::Progress => commands::progress::run(user),
        Commands::Flags { action } => commands::flags::run(action),
        Commands::Questions { action } => commands::questions::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
