mod engine;
mod view;

pub use engine::{Navigator, ViewOrchestrator};
pub use view::{DemoState, MainTab, ViewKind, ViewState, WelcomeChoice};
