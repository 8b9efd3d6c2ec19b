//! Semantic node search over the record store.

use serde::Serialize;
use tracing::debug;

use archgraph_core::{GraphError, GraphResult, NodeType};
use archgraph_embedding::RecordStore;

use crate::sync::records::{category_filter, NODE_CATEGORY};

/// A node returned by semantic search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSearchHit {
    pub node_id: String,
    pub node_type: Option<NodeType>,
    pub name: String,
    pub relevance: f32,
}

/// Find the `limit` node records most similar in meaning to `query`.
///
/// Hits come straight from the record store, so a node added by another
/// process shows up here before this process reloads its graph.
pub async fn search_nodes(
    records: &dyn RecordStore,
    project_id: &str,
    query: &str,
    limit: usize,
) -> GraphResult<Vec<NodeSearchHit>> {
    let filter = category_filter(NODE_CATEGORY, project_id);
    let results = records
        .semantic_search(query, &filter, limit)
        .await
        .map_err(GraphError::persistence)?;

    debug!(query, hits = results.len(), "Semantic node search");

    Ok(results
        .into_iter()
        .filter_map(|(record, relevance)| {
            let node_id = record.get_str("node_id")?.to_string();
            Some(NodeSearchHit {
                node_type: record.get_str("node_type").and_then(|t| t.parse().ok()),
                name: record.get_str("name").unwrap_or(&node_id).to_string(),
                node_id,
                relevance,
            })
        })
        .collect())
}
