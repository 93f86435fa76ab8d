//! Cover letter examples used as a style reference

use crate::error::Result;
use crate::input::file_detector::FileType;
use crate::input::InputManager;
use log::{info, warn};
use std::path::Path;

const EXAMPLE_SEPARATOR: &str = "\n\n=== EXAMPLE SEPARATOR ===\n\n";

#[derive(Debug, Clone, PartialEq)]
pub struct StyleExample {
    pub file_name: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleExamples {
    examples: Vec<StyleExample>,
}

impl StyleExamples {
    pub fn new(examples: Vec<StyleExample>) -> Self {
        Self { examples }
    }

    /// Loads the first page of every supported file in `dir`, sorted by file
    /// name. A missing directory yields no examples.
    pub async fn load(dir: &Path, input: &InputManager) -> Result<Self> {
        if !dir.is_dir() {
            warn!("Cover letter examples directory not found: {}", dir.display());
            return Ok(Self::default());
        }

        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && FileType::from_path(path).is_supported())
            .collect();
        paths.sort();

        let mut examples = Vec::with_capacity(paths.len());
        for path in paths {
            let pages = input.extract_pages(&path).await?;
            let content = pages.into_iter().next().unwrap_or_default();
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            info!("Loaded example: {}", file_name);
            examples.push(StyleExample { file_name, content });
        }

        if examples.is_empty() {
            warn!("No cover letter examples found in {}", dir.display());
        }
        Ok(Self { examples })
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// All examples as one reference text; empty when none are loaded.
    pub fn combined(&self) -> String {
        self.examples
            .iter()
            .map(|ex| format!("Example from {}:\n{}", ex.file_name, ex.content))
            .collect::<Vec<_>>()
            .join(EXAMPLE_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::write_pdf_pages;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_sorted_first_pages() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b_letter.txt"), "Second letter").unwrap();
        std::fs::write(dir.path().join("a_letter.txt"), "First page\u{000C}Second page").unwrap();
        std::fs::write(dir.path().join("notes.docx"), "ignored").unwrap();

        let examples = StyleExamples::load(dir.path(), &InputManager::new()).await.unwrap();

        assert_eq!(examples.len(), 2);
        let combined = examples.combined();
        assert!(combined.starts_with("Example from a_letter.txt:\nFirst page"));
        assert!(!combined.contains("Second page"));
        assert!(combined.contains("=== EXAMPLE SEPARATOR ===\n\nExample from b_letter.txt:\nSecond letter"));
    }

    #[tokio::test]
    async fn test_pdf_example_uses_first_page() {
        let dir = TempDir::new().unwrap();
        write_pdf_pages(
            &dir.path().join("letter.pdf"),
            &["Dear Hiring Manager", "Attachment list"],
        );

        let examples = StyleExamples::load(dir.path(), &InputManager::new()).await.unwrap();

        let combined = examples.combined();
        assert!(combined.starts_with("Example from letter.pdf:"));
        assert!(combined.contains("Dear Hiring Manager"));
        assert!(!combined.contains("Attachment list"));
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let examples = StyleExamples::load(&dir.path().join("missing"), &InputManager::new())
            .await
            .unwrap();
        assert!(examples.is_empty());
        assert_eq!(examples.combined(), "");
    }
}
