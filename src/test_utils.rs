//! In-process stand-ins for the hosted embedding and chat services

use crate::error::{ApplyCopilotError, Result};
use crate::llm::client::{ChatClient, ChatMessage};
use crate::processing::document::{ResumeChunk, ResumeVariant};
use crate::processing::embeddings::Embedder;
use crate::processing::index::{EmbeddingIndex, IndexManifest};
use async_trait::async_trait;
use chrono::Utc;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const VOCABULARY: &[&str] = &[
    "rust", "python", "sql", "statistics", "pipelines", "ranking", "search", "models",
    "education", "hiking", "leadership", "cloud",
];

/// Bag-of-words embedder over a fixed vocabulary. The last dimension is a
/// small constant so no text embeds to the zero vector.
pub struct KeywordEmbedder;

impl KeywordEmbedder {
    pub fn vector(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; VOCABULARY.len() + 1];
        for word in text.split(|c: char| !c.is_alphanumeric()) {
            let word = word.to_lowercase();
            if let Some(pos) = VOCABULARY.iter().position(|v| *v == word) {
                vector[pos] += 1.0;
            }
        }
        vector[VOCABULARY.len()] = 0.01;
        vector
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn model_name(&self) -> &str {
        "keyword-test"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }
}

/// Builds an index with one chunk per text, in order.
pub async fn keyword_index(embedder: &KeywordEmbedder, texts: &[&str]) -> EmbeddingIndex {
    let chunks: Vec<ResumeChunk> = texts
        .iter()
        .enumerate()
        .map(|(id, text)| ResumeChunk {
            id,
            page: 1,
            start: 0,
            end: text.chars().count(),
            content: text.to_string(),
        })
        .collect();
    let contents: Vec<String> = texts.iter().map(|t| t.to_string()).collect();

    let mut index = EmbeddingIndex::new(IndexManifest {
        variant: ResumeVariant::AiEngineer,
        source_path: PathBuf::from("resume.txt"),
        embedding_model: embedder.model_name().to_string(),
        dimension: None,
        chunk_size: 350,
        chunk_overlap: 50,
        created_at: Utc::now(),
    });
    index
        .append(chunks, embedder.embed(&contents).await.unwrap())
        .unwrap();
    index
}

pub type RecordedCalls = Arc<Mutex<Vec<Vec<ChatMessage>>>>;

/// Records every message list it receives and answers with a fixed reply.
pub struct RecordingChatClient {
    reply: Option<String>,
    calls: RecordedCalls,
}

impl RecordingChatClient {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> RecordedCalls {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl ChatClient for RecordingChatClient {
    fn model_name(&self) -> &str {
        "recording-test"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.calls.lock().unwrap().push(messages.to_vec());
        self.reply
            .clone()
            .ok_or_else(|| ApplyCopilotError::Generation("service unavailable".to_string()))
    }
}

/// Writes a PDF with one line of text on each page.
pub fn write_pdf_pages(path: &Path, pages: &[&str]) {
    let (doc, first_page, first_layer) = PdfDocument::new("fixture", Mm(210.0), Mm(297.0), "Layer 1");
    let font = doc.add_builtin_font(BuiltinFont::Helvetica).unwrap();

    for (n, text) in pages.iter().enumerate() {
        let (page, layer) = if n == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(210.0), Mm(297.0), "Layer 1")
        };
        doc.get_page(page)
            .get_layer(layer)
            .use_text(*text, 12.0, Mm(20.0), Mm(270.0), &font);
    }

    doc.save(&mut BufWriter::new(File::create(path).unwrap())).unwrap();
}
