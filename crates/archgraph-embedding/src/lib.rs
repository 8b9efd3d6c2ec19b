//! # Archgraph Embedding
//!
//! Record store client for the architecture graph: vector embeddings via
//! Ollama, persistence and semantic search via Qdrant.
//!
//! Also provides an in-memory store implementing the same contract.

pub mod memory;
pub mod ollama;
pub mod qdrant;
pub mod record;

pub use memory::MemoryStore;
pub use ollama::OllamaClient;
pub use qdrant::QdrantStore;
pub use record::{Metadata, MetadataValue, Record, RecordStore, StoreError, StoreResult};
