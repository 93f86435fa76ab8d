//! Resume documents, variants and sliding-window chunking

use crate::error::{ApplyCopilotError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// The two resume flavours the candidate maintains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum ResumeVariant {
    AiEngineer,
    DataRelated,
}

impl ResumeVariant {
    pub const ALL: [ResumeVariant; 2] = [ResumeVariant::AiEngineer, ResumeVariant::DataRelated];

    pub fn display_name(&self) -> &'static str {
        match self {
            ResumeVariant::AiEngineer => "AI Engineer",
            ResumeVariant::DataRelated => "Data Related",
        }
    }

    /// Directory name of the persisted index for this variant
    pub fn storage_name(&self) -> &'static str {
        match self {
            ResumeVariant::AiEngineer => "ai_engineer",
            ResumeVariant::DataRelated => "data_related",
        }
    }
}

impl std::fmt::Display for ResumeVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A window of resume text. `start`/`end` are char offsets into the
/// normalized page text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeChunk {
    pub id: usize,
    pub page: usize,
    pub start: usize,
    pub end: usize,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResumeDocument {
    pub source: String,
    pub pages: Vec<String>,
}

impl ResumeDocument {
    pub fn new(source: impl Into<String>, pages: Vec<String>) -> Self {
        Self {
            source: source.into(),
            pages: pages.iter().map(|p| normalize_whitespace(p)).collect(),
        }
    }

    pub fn character_count(&self) -> usize {
        self.pages.iter().map(|p| p.chars().count()).sum()
    }

    /// Splits every page into overlapping windows. Chunk ids are global and
    /// follow page order.
    pub fn create_chunks(&self, chunk_size: usize, overlap: usize) -> Result<Vec<ResumeChunk>> {
        let mut chunks = Vec::new();
        for (page, text) in self.pages.iter().enumerate() {
            for (start, end, content) in sliding_windows(text, chunk_size, overlap)? {
                chunks.push(ResumeChunk {
                    id: chunks.len(),
                    page: page + 1,
                    start,
                    end,
                    content,
                });
            }
        }
        Ok(chunks)
    }
}

/// Collapses whitespace runs to a single space and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    static WS_RE: OnceLock<Regex> = OnceLock::new();
    let ws_re = WS_RE.get_or_init(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));
    ws_re.replace_all(text, " ").trim().to_string()
}

/// Fixed-size character windows advancing by `chunk_size - overlap`.
/// Every window is at most `chunk_size` chars and consecutive windows share
/// exactly `overlap` chars. The walk stops at the first window reaching the
/// end of the text.
pub fn sliding_windows(
    text: &str,
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<(usize, usize, String)>> {
    if chunk_size <= overlap {
        return Err(ApplyCopilotError::InvalidInput(
            "Chunk size must be greater than overlap".to_string(),
        ));
    }

    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();
    let step = chunk_size - overlap;
    let mut windows = Vec::new();
    let mut start = 0;

    while start < total {
        let end = (start + chunk_size).min(total);
        windows.push((start, end, chars[start..end].iter().collect()));
        if end == total {
            break;
        }
        start += step;
    }

    Ok(windows)
}
