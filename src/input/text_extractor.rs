//! Per-page text extraction from PDF, plain text and Markdown files

use crate::error::{ApplyCopilotError, Result};
use pulldown_cmark::{html, Parser};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tokio::fs;

/// Explicit page break in plain text and Markdown files.
pub const PAGE_BREAK: char = '\u{000C}';

pub trait TextExtractor {
    /// Returns the text of each page, in page order.
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
}

fn read_error(path: &Path, e: std::io::Error) -> ApplyCopilotError {
    ApplyCopilotError::DocumentLoad(format!("Failed to read '{}': {}", path.display(), e))
}

/// Splits on page breaks, keeping empty pages so page numbers stay aligned.
pub fn split_pages(text: &str) -> Vec<String> {
    text.split(PAGE_BREAK).map(str::to_string).collect()
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<Vec<String>> {
        let bytes = fs::read(path).await.map_err(|e| read_error(path, e))?;

        pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|e| {
            ApplyCopilotError::DocumentLoad(format!(
                "Failed to extract text from PDF '{}': {}",
                path.display(),
                e
            ))
        })
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<Vec<String>> {
        let content = fs::read_to_string(path).await.map_err(|e| read_error(path, e))?;
        Ok(split_pages(&content))
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> Result<Vec<String>> {
        let markdown_content = fs::read_to_string(path).await.map_err(|e| read_error(path, e))?;

        Ok(split_pages(&markdown_content)
            .iter()
            .map(|page| self.markdown_to_text(page))
            .collect())
    }
}

impl MarkdownExtractor {
    fn markdown_to_text(&self, markdown: &str) -> String {
        let parser = Parser::new(markdown);
        let mut html_output = String::new();
        html::push_html(&mut html_output, parser);
        self.html_to_text(&html_output)
    }

    fn html_to_text(&self, html: &str) -> String {
        static TAG_RE: OnceLock<Regex> = OnceLock::new();
        let tag_re = TAG_RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("Invalid tag regex"));

        let text = html
            .replace("<br>", "\n")
            .replace("<br />", "\n")
            .replace("</p>", "\n\n")
            .replace("</li>", "\n");
        let clean_text = tag_re.replace_all(&text, "");

        let lines: Vec<String> = clean_text
            .lines()
            .map(|line| decode_entities(line.trim()))
            .filter(|line| !line.is_empty())
            .collect();

        lines.join("\n")
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::write_pdf_pages;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_pdf_pages_stay_separate() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("resume.pdf");
        write_pdf_pages(&path, &["First page text", "Second page text"]);

        let pages = PdfExtractor.extract(&path).await.unwrap();

        assert_eq!(pages.len(), 2);
        assert!(pages[0].contains("First page text"));
        assert!(!pages[0].contains("Second"));
        assert!(pages[1].contains("Second page text"));
    }

    #[test]
    fn test_split_pages_keeps_order() {
        let pages = split_pages("first page\u{000C}second page");
        assert_eq!(pages, vec!["first page".to_string(), "second page".to_string()]);
    }

    #[test]
    fn test_markdown_strips_formatting() {
        let text = MarkdownExtractor.markdown_to_text("## Skills\n\n- **Rust** &amp; Python\n- SQL");
        assert!(text.contains("Skills"));
        assert!(text.contains("Rust & Python"));
        assert!(!text.contains("**"));
        assert!(!text.contains("##"));
        assert!(!text.contains('<'));
    }
}
