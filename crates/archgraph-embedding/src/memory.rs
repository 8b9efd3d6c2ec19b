//! In-process record store.
//!
//! Keeps records in a map behind an async lock. Semantic search is a lexical
//! stand-in (share of query terms present in the record text), which is
//! enough for tests and for embedding the graph engine without Qdrant.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::record::{Metadata, Record, RecordStore, StoreResult};

/// Record store held entirely in memory.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<String, Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Fetch one record by key.
    pub async fn get(&self, key: &str) -> Option<Record> {
        self.records.read().await.get(key).cloned()
    }

    /// All record keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        self.records.read().await.keys().cloned().collect()
    }

    /// Insert a record verbatim, bypassing any caller-side encoding.
    pub async fn insert_raw(&self, record: Record) {
        self.records.write().await.insert(record.key.clone(), record);
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn put(&self, key: &str, text: &str, metadata: Metadata) -> StoreResult<String> {
        let record = Record {
            key: key.to_string(),
            text: text.to_string(),
            metadata,
        };
        self.records.write().await.insert(key.to_string(), record);
        debug!(key, "Stored record in memory");
        Ok(key.to_string())
    }

    async fn get_by_filter(&self, filter: &Metadata, limit: usize) -> StoreResult<Vec<Record>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.matches(filter))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.records.write().await.remove(key);
        Ok(())
    }

    async fn semantic_search(
        &self,
        query: &str,
        filter: &Metadata,
        top_k: usize,
    ) -> StoreResult<Vec<(Record, f32)>> {
        let query_terms = terms(query);
        if query_terms.is_empty() {
            return Ok(Vec::new());
        }

        let records = self.records.read().await;
        let mut scored: Vec<(Record, f32)> = records
            .values()
            .filter(|r| r.matches(filter))
            .filter_map(|r| {
                let record_terms = terms(&r.text);
                let hits = query_terms.intersection(&record_terms).count();
                (hits > 0).then(|| (r.clone(), hits as f32 / query_terms.len() as f32))
            })
            .collect();

        // Stable sort keeps key order among equal scores.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }
}

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MetadataValue;

    fn meta(pairs: &[(&str, &str)]) -> Metadata {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), MetadataValue::from(*v)))
            .collect()
    }

    #[tokio::test]
    async fn test_put_is_upsert() {
        let store = MemoryStore::new();
        store.put("node:a", "first", meta(&[("category", "graph_node")])).await.unwrap();
        store.put("node:a", "second", meta(&[("category", "graph_node")])).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("node:a").await.unwrap().text, "second");
    }

    #[tokio::test]
    async fn test_get_by_filter_and_limit() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store
                .put(&format!("node:{}", i), "n", meta(&[("category", "graph_node")]))
                .await
                .unwrap();
        }
        store.put("edge:x", "e", meta(&[("category", "graph_edge")])).await.unwrap();

        let nodes = store.get_by_filter(&meta(&[("category", "graph_node")]), 100).await.unwrap();
        assert_eq!(nodes.len(), 5);

        let limited = store.get_by_filter(&meta(&[("category", "graph_node")]), 2).await.unwrap();
        assert_eq!(limited.len(), 2);

        let edges = store.get_by_filter(&meta(&[("category", "graph_edge")]), 100).await.unwrap();
        assert_eq!(edges.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        store.put("node:a", "a", Metadata::new()).await.unwrap();

        store.delete("node:a").await.unwrap();
        store.delete("node:a").await.unwrap();
        store.delete("never-existed").await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_semantic_search_ranks_by_overlap() {
        let store = MemoryStore::new();
        let node = meta(&[("category", "graph_node")]);
        store.put("node:login", "# API: Login endpoint for user auth", node.clone()).await.unwrap();
        store.put("node:invoice", "# API: Create invoice", node.clone()).await.unwrap();
        store
            .put("edge:x", "user login auth relationship", meta(&[("category", "graph_edge")]))
            .await
            .unwrap();

        let hits = store.semantic_search("user login", &node, 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0.key, "node:login");
        assert!((hits[0].1 - 1.0).abs() < f32::EPSILON);

        assert!(store.semantic_search("   ", &node, 10).await.unwrap().is_empty());
    }
}
