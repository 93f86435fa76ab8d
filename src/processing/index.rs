//! Flat cosine-similarity index over resume chunk embeddings

use crate::error::{ApplyCopilotError, Result};
use crate::processing::document::{ResumeChunk, ResumeVariant};
use crate::processing::embeddings::cosine_similarity;
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const INDEX_FILE_NAME: &str = "index.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    pub variant: ResumeVariant,
    pub source_path: PathBuf,
    pub embedding_model: String,
    pub dimension: Option<usize>,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedChunk {
    pub chunk: ResumeChunk,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk: ResumeChunk,
    pub score: f32,
    /// Insertion position in the index
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingIndex {
    manifest: IndexManifest,
    entries: Vec<IndexedChunk>,
}

impl EmbeddingIndex {
    pub fn new(manifest: IndexManifest) -> Self {
        Self {
            manifest,
            entries: Vec::new(),
        }
    }

    pub fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn chunks(&self) -> impl Iterator<Item = &ResumeChunk> {
        self.entries.iter().map(|e| &e.chunk)
    }

    /// Appends chunks with their embeddings. All vectors must share the
    /// index dimension, which is fixed by the first append.
    pub fn append(&mut self, chunks: Vec<ResumeChunk>, embeddings: Vec<Vec<f32>>) -> Result<()> {
        if chunks.len() != embeddings.len() {
            return Err(ApplyCopilotError::EmbeddingService(format!(
                "Got {} embeddings for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let mut dimension = self.manifest.dimension;
        for embedding in &embeddings {
            let expected = *dimension.get_or_insert(embedding.len());
            if embedding.is_empty() || embedding.len() != expected {
                return Err(ApplyCopilotError::EmbeddingService(format!(
                    "Embedding has dimension {}, index expects {}",
                    embedding.len(),
                    expected
                )));
            }
        }

        self.manifest.dimension = dimension;
        self.entries.extend(
            chunks
                .into_iter()
                .zip(embeddings)
                .map(|(chunk, embedding)| IndexedChunk { chunk, embedding }),
        );
        Ok(())
    }

    /// The `k` entries most similar to `query`, best first. Equal scores keep
    /// insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        let mut scored = Vec::with_capacity(self.entries.len());
        for (position, entry) in self.entries.iter().enumerate() {
            scored.push(ScoredChunk {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(query, &entry.embedding)?,
                position,
            });
        }

        // Stable sort, so ties stay in insertion order
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        Ok(scored)
    }

    pub fn exists_at(dir: &Path) -> bool {
        dir.join(INDEX_FILE_NAME).is_file()
    }

    /// Writes `index.json` under `dir`, replacing any previous copy atomically.
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let target = dir.join(INDEX_FILE_NAME);
        let staging = dir.join(format!("{}.tmp", INDEX_FILE_NAME));

        let content = serde_json::to_vec(self)?;
        std::fs::write(&staging, content)?;
        std::fs::rename(&staging, &target)?;

        info!("Saved {} indexed chunks to: {}", self.len(), target.display());
        Ok(())
    }

    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(INDEX_FILE_NAME);
        let content = std::fs::read(&path)?;
        let index: Self = serde_json::from_slice(&content).map_err(|e| {
            ApplyCopilotError::Serialization(format!(
                "Failed to read index '{}': {}",
                path.display(),
                e
            ))
        })?;

        info!("Loaded {} indexed chunks from: {}", index.len(), path.display());
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manifest() -> IndexManifest {
        IndexManifest {
            variant: ResumeVariant::AiEngineer,
            source_path: PathBuf::from("resume.pdf"),
            embedding_model: "test-model".to_string(),
            dimension: None,
            chunk_size: 350,
            chunk_overlap: 50,
            created_at: Utc::now(),
        }
    }

    fn chunk(id: usize, content: &str) -> ResumeChunk {
        ResumeChunk {
            id,
            page: 1,
            start: 0,
            end: content.chars().count(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_search_orders_by_similarity() {
        let mut index = EmbeddingIndex::new(manifest());
        index
            .append(
                vec![chunk(0, "python"), chunk(1, "rust"), chunk(2, "sql")],
                vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.7, 0.7]],
            )
            .unwrap();

        let results = index.search(&[0.0, 1.0], 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.content, "rust");
        assert_eq!(results[1].chunk.content, "sql");
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut index = EmbeddingIndex::new(manifest());
        index
            .append(
                vec![chunk(0, "first"), chunk(1, "second"), chunk(2, "third")],
                vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![1.0, 0.0]],
            )
            .unwrap();

        let results = index.search(&[1.0, 0.0], 3).unwrap();
        let positions: Vec<usize> = results.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_append_rejects_mixed_dimensions() {
        let mut index = EmbeddingIndex::new(manifest());
        let result = index.append(
            vec![chunk(0, "a"), chunk(1, "b")],
            vec![vec![1.0, 0.0], vec![1.0]],
        );
        assert!(result.is_err());

        let mismatched = index.append(vec![chunk(0, "a")], vec![]);
        assert!(mismatched.is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = dir.path().join("ai_engineer");
        let mut index = EmbeddingIndex::new(manifest());
        index
            .append(vec![chunk(0, "rust")], vec![vec![0.5, 0.5]])
            .unwrap();

        assert!(!EmbeddingIndex::exists_at(&store));
        index.save(&store).unwrap();
        assert!(EmbeddingIndex::exists_at(&store));

        let loaded = EmbeddingIndex::load(&store).unwrap();
        assert_eq!(loaded, index);
        assert_eq!(loaded.manifest().dimension, Some(2));
    }

    #[test]
    fn test_load_corrupt_index_fails() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(INDEX_FILE_NAME), b"not json").unwrap();
        assert!(EmbeddingIndex::load(dir.path()).is_err());
    }
}
