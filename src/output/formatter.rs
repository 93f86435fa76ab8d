//! Console presentation for statuses, retrieved context and conversations

use crate::error::ApplyCopilotError;
use crate::llm::client::{ChatMessage, Role};
use crate::llm::prompts::JobContext;
use crate::output::writer::GeneratedArtifact;
use crate::processing::document::ResumeVariant;
use crate::processing::index::ScoredChunk;
use crate::processing::indexer::IndexStatus;
use colored::{Color, Colorize};
use std::path::Path;

const PREVIEW_CHARS: usize = 200;

pub struct ConsoleFormatter {
    use_colors: bool,
}

impl Default for ConsoleFormatter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn header(&self, title: &str) -> String {
        if self.use_colors {
            format!("\n{} {}\n", "█".blue().bold(), title.blue().bold())
        } else {
            format!("\n█ {}\n", title)
        }
    }

    pub fn success(&self, message: &str) -> String {
        format!("✅ {}", self.colorize(message, Color::Green))
    }

    pub fn error(&self, error: &ApplyCopilotError) -> String {
        self.colorize(&error.user_message(), Color::Red)
    }

    pub fn index_status(&self, status: &IndexStatus) -> String {
        self.success(&status.message())
    }

    pub fn job_context(&self, job: Option<&JobContext>) -> String {
        match job {
            Some(job) => format!(
                "💼 Job context: {}",
                self.colorize(&job.position(), Color::Cyan)
            ),
            None => format!("💼 {}", self.colorize("No job context set", Color::BrightBlack)),
        }
    }

    pub fn saved(&self, artifact: &GeneratedArtifact) -> String {
        self.success(&format!("Cover letter saved to: {}", artifact.path.display()))
    }

    /// Ranked retrieval results with a short preview of each chunk.
    pub fn chunks(&self, results: &[ScoredChunk]) -> String {
        if results.is_empty() {
            return self.colorize("No matching chunks.\n", Color::Yellow);
        }

        let mut output = String::new();
        for (rank, scored) in results.iter().enumerate() {
            output.push_str(&format!(
                "{}. {} {}\n",
                rank + 1,
                self.colorize(&format!("[{:.3}]", scored.score), Color::Cyan),
                self.colorize(
                    &format!("(page {}, chars {}-{})", scored.chunk.page, scored.chunk.start, scored.chunk.end),
                    Color::BrightBlack
                )
            ));
            output.push_str(&format!("   {}\n", preview(&scored.chunk.content, PREVIEW_CHARS)));
        }
        output
    }

    pub fn history(&self, history: &[ChatMessage]) -> String {
        if history.is_empty() {
            return self.colorize("Conversation is empty.\n", Color::BrightBlack);
        }

        let mut output = String::new();
        for message in history {
            let label = match message.role {
                Role::User => self.colorize("Employer:", Color::Yellow),
                Role::Assistant => self.colorize("You:", Color::Green),
                Role::System => self.colorize("System:", Color::BrightBlack),
            };
            output.push_str(&format!("{} {}\n\n", label, message.content));
        }
        output
    }

    pub fn variants(&self, entries: &[(ResumeVariant, &Path, bool)]) -> String {
        let mut output = String::new();
        for (variant, source, indexed) in entries {
            let state = if *indexed {
                self.colorize("indexed", Color::Green)
            } else {
                self.colorize("not indexed", Color::Yellow)
            };
            output.push_str(&format!(
                "  • {} [{}] {}\n",
                self.colorize(variant.display_name(), Color::White),
                state,
                self.colorize(&source.display().to_string(), Color::BrightBlack)
            ));
        }
        output
    }
}

/// First `max_chars` characters of `text`, cut at a word boundary.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    let cut = truncated.rfind(' ').unwrap_or(truncated.len());
    format!("{}...", &truncated[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::document::ResumeChunk;

    #[test]
    fn test_preview_cuts_at_word() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("alpha beta gamma", 12), "alpha beta...");
    }

    #[test]
    fn test_chunks_without_colors() {
        let formatter = ConsoleFormatter::new(false);
        let results = vec![ScoredChunk {
            chunk: ResumeChunk {
                id: 0,
                page: 2,
                start: 300,
                end: 650,
                content: "Led the search team".to_string(),
            },
            score: 0.8123,
            position: 0,
        }];

        let output = formatter.chunks(&results);
        assert_eq!(output, "1. [0.812] (page 2, chars 300-650)\n   Led the search team\n");
    }

    #[test]
    fn test_history_labels() {
        let formatter = ConsoleFormatter::new(false);
        let output = formatter.history(&[
            ChatMessage::user("Why us?"),
            ChatMessage::assistant("Because."),
        ]);
        assert_eq!(output, "Employer: Why us?\n\nYou: Because.\n\n");
    }

    #[test]
    fn test_error_uses_user_message() {
        let formatter = ConsoleFormatter::new(false);
        assert_eq!(
            formatter.error(&ApplyCopilotError::IndexNotReady),
            "❌ No resume indexed yet. Please index a resume first."
        );
    }
}
