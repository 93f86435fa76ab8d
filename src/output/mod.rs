//! Output: saved cover letters and console formatting

pub mod formatter;
pub mod pdf;
pub mod writer;

pub use writer::{CoverLetterWriter, GeneratedArtifact, OutputFormat};
