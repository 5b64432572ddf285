//! Shared utilities for the dagview workspace.

pub mod logging;
pub mod spans;
pub mod time;

pub use logging::{init_logging, LogFormat};
pub use time::{format_duration, format_signed_duration};
