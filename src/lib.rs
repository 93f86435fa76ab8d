//! Resume-grounded job application assistant

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod llm;
pub mod output;
pub mod processing;
pub mod session;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::Config;
pub use error::{ApplyCopilotError, ErrorKind, Result};
pub use session::{CoverLetterRequest, Session};
