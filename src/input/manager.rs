//! Input manager for handling different file types

use crate::error::{ApplyCopilotError, Result};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor};
use log::info;
use std::path::Path;

/// Dispatches a path to the extractor for its file type. Files are read
/// fresh on every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputManager;

impl InputManager {
    pub fn new() -> Self {
        Self
    }

    /// Extracts the text of every page of `path`.
    pub async fn extract_pages(&self, path: &Path) -> Result<Vec<String>> {
        if !path.exists() {
            return Err(ApplyCopilotError::DocumentLoad(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let pages = match FileType::from_path(path) {
            FileType::Pdf => {
                info!("Extracting text from PDF: {}", path.display());
                PdfExtractor.extract(path).await?
            }
            FileType::Text => {
                info!("Reading plain text file: {}", path.display());
                PlainTextExtractor.extract(path).await?
            }
            FileType::Markdown => {
                info!("Processing markdown file: {}", path.display());
                MarkdownExtractor.extract(path).await?
            }
            FileType::Unknown => {
                return Err(ApplyCopilotError::UnsupportedFormat(format!(
                    "Unsupported file type for: {}",
                    path.display()
                )));
            }
        };

        Ok(pages)
    }

    /// Extracts the whole document as one string, pages separated by blank lines.
    pub async fn extract_text(&self, path: &Path) -> Result<String> {
        Ok(self.extract_pages(path).await?.join("\n\n"))
    }
}
