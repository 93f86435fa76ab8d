//! Resume chunking, embedding and indexing

pub mod document;
pub mod embeddings;
pub mod index;
pub mod indexer;
