pub mod app;
pub mod authorizer;
pub mod config;
pub mod input;
pub mod keybinds;
pub mod loader;
pub mod page;
pub mod params;
pub mod ui;

#[cfg(test)]
mod testing;

pub use authorizer::{AuthState, Authorizer};
pub use config::Config;
pub use loader::{Collaborators, LoadError, LoadOutcome, LoadPhase, Loader, LoaderOptions};
pub use params::{HistoryEntry, SessionParams};
