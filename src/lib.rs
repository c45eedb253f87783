//! Client for the Washington State Ferries schedule API.

pub mod api;
pub mod cache;
pub mod config;
pub mod session;

pub use api::schedule::{SailingTime, Schedule, TerminalCombo};
pub use api::terminals::Terminal;
pub use api::{ApiClient, ApiError, ScheduleApi};
pub use session::{Session, SessionError};
