//! Error handling for the application assistant

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApplyCopilotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document load error: {0}")]
    DocumentLoad(String),

    #[error("Embedding service error: {0}")]
    EmbeddingService(String),

    #[error("No resume indexed yet. Please index a resume first.")]
    IndexNotReady,

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    /// Generation succeeded but writing the file failed; the text is kept.
    #[error("Cover letter generated but not saved: {source}")]
    Unsaved {
        text: String,
        source: Box<ApplyCopilotError>,
    },
}

/// Coarse failure category, stable for programmatic matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DocumentLoad,
    EmbeddingService,
    IndexNotReady,
    Generation,
    Serialization,
    Configuration,
    InvalidInput,
}

impl ApplyCopilotError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApplyCopilotError::DocumentLoad(_) | ApplyCopilotError::UnsupportedFormat(_) => {
                ErrorKind::DocumentLoad
            }
            ApplyCopilotError::EmbeddingService(_) => ErrorKind::EmbeddingService,
            ApplyCopilotError::IndexNotReady => ErrorKind::IndexNotReady,
            ApplyCopilotError::Generation(_) => ErrorKind::Generation,
            ApplyCopilotError::Io(_) | ApplyCopilotError::Serialization(_) => ErrorKind::Serialization,
            ApplyCopilotError::Configuration(_) => ErrorKind::Configuration,
            ApplyCopilotError::InvalidInput(_) => ErrorKind::InvalidInput,
            ApplyCopilotError::Unsaved { source, .. } => source.kind(),
        }
    }

    /// Generated text that could not be written to disk.
    pub fn unsaved_text(&self) -> Option<&str> {
        match self {
            ApplyCopilotError::Unsaved { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Message shown to the user at the command boundary.
    pub fn user_message(&self) -> String {
        format!("❌ {}", self)
    }
}

pub type Result<T> = std::result::Result<T, ApplyCopilotError>;

impl From<serde_json::Error> for ApplyCopilotError {
    fn from(err: serde_json::Error) -> Self {
        ApplyCopilotError::Serialization(err.to_string())
    }
}

/// Model2Vec reports failures through anyhow
impl From<anyhow::Error> for ApplyCopilotError {
    fn from(err: anyhow::Error) -> Self {
        ApplyCopilotError::EmbeddingService(err.to_string())
    }
}
