//! # Barprep Core Library
//!
//! This library provides the onboarding and engagement logic of the barprep
//! study app. Everything a shell needs is exposed here; the `barprep` CLI is
//! one such shell, driving the same state machine a GUI would.
//!
//! ## Architecture
//!
//! - **Orchestrator**: A single tagged view state that decides which onboarding
//!   screen is showing. No internal threads; shells call transitions and
//!   `tick()` and poll events
//! - **Engines**: Pure achievement and journey evaluation over counter snapshots
//! - **Trial gate**: Sampled, rationed free questions with a hard lock
//! - **Storage**: SQLite for flags, study sessions and the question bank;
//!   TOML for configuration
//!
//! ## Key Components
//!
//! - [`ViewOrchestrator`]: Onboarding state machine
//! - [`AchievementEngine`] / [`JourneyEngine`]: Milestone evaluation
//! - [`TrialGate`]: Free-exploration sessions
//! - [`FlagStore`]: Durable onboarding flags
//! - [`Database`]: Persistence
//! - [`Config`]: Application configuration management

pub mod achievements;
pub mod counters;
pub mod engagement;
pub mod error;
pub mod events;
pub mod flags;
pub mod journey;
pub mod milestone;
pub mod orchestrator;
pub mod question;
pub mod social_proof;
pub mod storage;
pub mod trial;
pub mod walkthrough;

pub use achievements::{Achievement, AchievementEngine, Celebration};
pub use counters::{CounterSource, Counters, Metric, RefreshTicket, StaticCounters};
pub use engagement::{Engagement, HomePanels};
pub use error::{ConfigError, CoreError, DatabaseError, TransitionError, TrialError};
pub use events::{EngagementListener, Event};
pub use flags::{FlagBackend, FlagKey, FlagStore, MemoryFlags};
pub use journey::{JourneyEngine, JourneyProgress, JourneyStep};
pub use milestone::MilestoneLedger;
pub use orchestrator::{
    DemoState, MainTab, Navigator, ViewKind, ViewOrchestrator, ViewState, WelcomeChoice,
};
pub use question::{
    FixedChoice, Question, QuestionBank, QuestionFilter, QuestionRenderer, QuestionSource,
    UserAnswer,
};
pub use social_proof::SocialProofStats;
pub use storage::{Config, Database};
pub use trial::{TrialGate, TrialProgress, TrialSession};
pub use walkthrough::TooltipFocus;
