//! Record store contract.
//!
//! A record store is a keyed document store: every record has a unique key,
//! a text body (what gets embedded) and a flat map of scalar metadata used
//! for exact-match filtering.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Record store error types.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Qdrant error: {0}")]
    Qdrant(#[from] qdrant_client::QdrantError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for record store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A scalar metadata value. Anything richer must be encoded to a string first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl MetadataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for MetadataValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for MetadataValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for MetadataValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Flat scalar metadata attached to a record.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub key: String,
    pub text: String,
    pub metadata: Metadata,
}

impl Record {
    /// String metadata field, if present and a string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.metadata.get(field).and_then(MetadataValue::as_str)
    }

    /// Whether every filter entry matches this record's metadata exactly.
    pub fn matches(&self, filter: &Metadata) -> bool {
        filter
            .iter()
            .all(|(k, v)| self.metadata.get(k).is_some_and(|mine| mine == v))
    }
}

/// Persistent keyed document store with metadata filtering and semantic search.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Upsert a record, returning its key.
    async fn put(&self, key: &str, text: &str, metadata: Metadata) -> StoreResult<String>;

    /// Exact-match metadata query. No ordering guarantee.
    async fn get_by_filter(&self, filter: &Metadata, limit: usize) -> StoreResult<Vec<Record>>;

    /// Delete a record. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Records most similar in meaning to `query`, with a relevance score.
    async fn semantic_search(
        &self,
        query: &str,
        filter: &Metadata,
        top_k: usize,
    ) -> StoreResult<Vec<(Record, f32)>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_matches_filter() {
        let mut metadata = Metadata::new();
        metadata.insert("category".into(), "graph_node".into());
        metadata.insert("node_type".into(), "api".into());
        let record = Record {
            key: "node:api-login".into(),
            text: "# API: Login".into(),
            metadata,
        };

        let mut filter = Metadata::new();
        filter.insert("category".into(), "graph_node".into());
        assert!(record.matches(&filter));

        filter.insert("node_type".into(), "screen".into());
        assert!(!record.matches(&filter));

        assert!(record.matches(&Metadata::new()));
        assert_eq!(record.get_str("node_type"), Some("api"));
    }

    #[test]
    fn test_metadata_value_kinds_are_distinct() {
        assert_ne!(MetadataValue::from("1"), MetadataValue::from(1i64));
        assert_ne!(MetadataValue::from(true), MetadataValue::from("true"));
    }
}
