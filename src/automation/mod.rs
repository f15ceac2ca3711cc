//! Account creation through the external browser-automation script.

pub mod error;
pub mod runner;

pub use error::AutomationError;
pub use runner::{Automation, Registered};
