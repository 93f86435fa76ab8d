//! Builds or reloads the embedding index for a resume variant

use crate::config::Config;
use crate::error::{ApplyCopilotError, Result};
use crate::input::InputManager;
use crate::processing::document::{ResumeDocument, ResumeVariant};
use crate::processing::embeddings::Embedder;
use crate::processing::index::{EmbeddingIndex, IndexManifest};
use chrono::Utc;
use log::{info, warn};
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOrigin {
    /// Deserialized from the variant's vector store
    Loaded,
    /// Extracted, chunked and embedded from the source document
    Built,
}

#[derive(Debug)]
pub struct IndexOutcome {
    pub variant: ResumeVariant,
    pub index: EmbeddingIndex,
    pub origin: IndexOrigin,
}

impl IndexOutcome {
    pub fn chunk_count(&self) -> usize {
        self.index.len()
    }

    pub fn status(&self) -> IndexStatus {
        IndexStatus {
            variant: self.variant,
            origin: self.origin,
            chunk_count: self.chunk_count(),
        }
    }
}

/// What an `index` call did, without the index itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStatus {
    pub variant: ResumeVariant,
    pub origin: IndexOrigin,
    pub chunk_count: usize,
}

impl IndexStatus {
    pub fn message(&self) -> String {
        match self.origin {
            IndexOrigin::Loaded => format!(
                "Loaded existing vector store for {} ({} chunks)",
                self.variant, self.chunk_count
            ),
            IndexOrigin::Built => format!(
                "Created and saved vector store for {} ({} chunks)",
                self.variant, self.chunk_count
            ),
        }
    }
}

pub struct ResumeIndexer<'a> {
    config: &'a Config,
    embedder: &'a dyn Embedder,
    input: InputManager,
}

impl<'a> ResumeIndexer<'a> {
    pub fn new(config: &'a Config, embedder: &'a dyn Embedder) -> Self {
        Self {
            config,
            embedder,
            input: InputManager::new(),
        }
    }

    /// Loads the persisted index for `variant`, or builds and persists one.
    /// Nothing is returned unless the whole build succeeded.
    pub async fn index(&self, variant: ResumeVariant) -> Result<IndexOutcome> {
        let store_dir = self.config.vector_store_path(variant);

        if EmbeddingIndex::exists_at(&store_dir) {
            info!("Loading existing vector store for {}", variant);
            let index = EmbeddingIndex::load(&store_dir)?;
            if self.is_compatible(variant, &index) {
                return Ok(IndexOutcome {
                    variant,
                    index,
                    origin: IndexOrigin::Loaded,
                });
            }
            warn!(
                "Vector store at {} was built from a different source or settings, rebuilding",
                store_dir.display()
            );
        }

        info!("Creating new vector store for {}", variant);
        let index = self.build(variant).await?;
        index.save(&store_dir)?;

        Ok(IndexOutcome {
            variant,
            index,
            origin: IndexOrigin::Built,
        })
    }

    /// Drops the persisted copy so the next `index` call rebuilds it.
    pub fn invalidate(&self, variant: ResumeVariant) -> Result<()> {
        let store_dir = self.config.vector_store_path(variant);
        if store_dir.exists() {
            std::fs::remove_dir_all(&store_dir)?;
            info!("Removed vector store: {}", store_dir.display());
        }
        Ok(())
    }

    fn is_compatible(&self, variant: ResumeVariant, index: &EmbeddingIndex) -> bool {
        let manifest = index.manifest();
        manifest.source_path == self.config.resume_path(variant)
            && manifest.embedding_model == self.embedder.model_name()
            && manifest.chunk_size == self.config.processing.chunk_size
            && manifest.chunk_overlap == self.config.processing.chunk_overlap
    }

    async fn build(&self, variant: ResumeVariant) -> Result<EmbeddingIndex> {
        let start_time = Instant::now();
        let source_path = self.config.resume_path(variant);
        let document = self.load_document(&source_path).await?;
        info!(
            "Loaded {} pages ({} characters) from resume",
            document.pages.len(),
            document.character_count()
        );

        let processing = &self.config.processing;
        let chunks = document.create_chunks(processing.chunk_size, processing.chunk_overlap)?;
        if chunks.is_empty() {
            return Err(ApplyCopilotError::DocumentLoad(format!(
                "No extractable text in {}",
                source_path.display()
            )));
        }
        info!("Split resume into {} chunks", chunks.len());

        let mut index = EmbeddingIndex::new(IndexManifest {
            variant,
            source_path,
            embedding_model: self.embedder.model_name().to_string(),
            dimension: None,
            chunk_size: processing.chunk_size,
            chunk_overlap: processing.chunk_overlap,
            created_at: Utc::now(),
        });

        for batch in chunks.chunks(self.config.embedding.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let embeddings = self.embedder.embed(&texts).await?;
            index.append(batch.to_vec(), embeddings)?;
        }

        info!("Indexed {} chunks in {:.2?}", index.len(), start_time.elapsed());
        Ok(index)
    }

    async fn load_document(&self, path: &Path) -> Result<ResumeDocument> {
        let pages = self.input.extract_pages(path).await?;
        Ok(ResumeDocument::new(path.to_string_lossy(), pages))
    }
}
