pub mod api;
pub mod auth;
pub mod databinding;
pub mod error;
pub mod realtime;
pub mod types;

pub use error::{DriveError, DriveResult};
pub use types::*;
