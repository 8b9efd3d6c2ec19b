//! Graph to record store synchronization.
//!
//! `ArchitectureGraph` owns the in-memory graph and mirrors every mutation
//! into a `RecordStore`. At startup it rebuilds the graph from the stored
//! records.
//!
//! Mutations are serialized by a writer gate held for the whole mutation:
//! validate and apply under the write lock, release it, then persist. Readers
//! never see a half-applied change, and record writes land in mutation order.

pub mod records;

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock, RwLockReadGuard};
use tracing::{debug, info, warn};

use archgraph_core::architecture::validate_node_id;
use archgraph_core::{Edge, GraphError, GraphResult, Node, NodeType, Properties, Relationship};
use archgraph_embedding::{Record, RecordStore};

use crate::queries::search::{search_nodes, NodeSearchHit};
use crate::store::GraphStore;
use records::{EDGE_CATEGORY, NODE_CATEGORY};

/// Summary of a startup reconstruction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub nodes_loaded: usize,
    pub edges_loaded: usize,
    /// Records dropped or degraded because a field could not be read.
    pub malformed_records: usize,
    /// Edge records whose endpoints were not in the rebuilt graph.
    pub dangling_edges: usize,
}

/// Outcome of a mutation: the in-memory result, plus the persistence error
/// if the record store write failed afterwards.
#[derive(Debug)]
pub struct Synced<T> {
    pub value: T,
    pub persistence_error: Option<GraphError>,
}

impl<T> Synced<T> {
    fn new(value: T, persistence: GraphResult<()>) -> Self {
        Self {
            value,
            persistence_error: persistence.err(),
        }
    }

    /// Whether the change reached the record store.
    pub fn is_persisted(&self) -> bool {
        self.persistence_error.is_none()
    }
}

/// Result of deleting a node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeDeletion {
    pub node_id: String,
    pub edges_removed: usize,
}

/// The architecture graph of one project, kept in sync with a record store.
pub struct ArchitectureGraph {
    graph: RwLock<GraphStore>,
    writer: Mutex<()>,
    records: Arc<dyn RecordStore>,
    project_id: String,
}

impl ArchitectureGraph {
    /// Start from an empty graph without reading the record store.
    pub fn empty(records: Arc<dyn RecordStore>, project_id: &str) -> Self {
        Self {
            graph: RwLock::new(GraphStore::new()),
            writer: Mutex::new(()),
            records,
            project_id: project_id.to_string(),
        }
    }

    /// Rebuild the graph from every node and edge record of `project_id`.
    ///
    /// Only a failing record store query aborts the load. Bad records are
    /// logged, counted in the report and skipped.
    pub async fn load(
        records: Arc<dyn RecordStore>,
        project_id: &str,
        limit: usize,
    ) -> GraphResult<(Self, LoadReport)> {
        let mut store = GraphStore::new();
        let mut report = LoadReport::default();

        let mut node_records = records
            .get_by_filter(&records::category_filter(NODE_CATEGORY, project_id), limit)
            .await
            .map_err(GraphError::persistence)?;
        sort_records(&mut node_records);

        for record in &node_records {
            let decoded = match records::decode_node(record) {
                Ok(decoded) => decoded,
                Err(e) => {
                    warn!(key = %record.key, error = %e, "Dropping unreadable node record");
                    report.malformed_records += 1;
                    continue;
                }
            };
            if !decoded.warnings.is_empty() {
                report.malformed_records += 1;
                for w in &decoded.warnings {
                    warn!(key = %record.key, error = %w, "Loaded node record with defaults");
                }
            }
            match store.insert_node(decoded.value) {
                Ok(()) => report.nodes_loaded += 1,
                Err(e) => {
                    warn!(key = %record.key, error = %e, "Skipping node record");
                    report.malformed_records += 1;
                }
            }
        }

        let mut edge_records = records
            .get_by_filter(&records::category_filter(EDGE_CATEGORY, project_id), limit)
            .await
            .map_err(GraphError::persistence)?;
        sort_records(&mut edge_records);

        for record in &edge_records {
            let decoded = match records::decode_edge(record) {
                Ok(decoded) => decoded,
                Err(e) => {
                    warn!(key = %record.key, error = %e, "Dropping unreadable edge record");
                    report.malformed_records += 1;
                    continue;
                }
            };
            let edge = decoded.value;
            if !store.contains_node(&edge.from_id) || !store.contains_node(&edge.to_id) {
                warn!(key = %record.key, edge = %edge.key(), "Dropping edge with missing endpoint");
                report.dangling_edges += 1;
                continue;
            }
            if !decoded.warnings.is_empty() {
                report.malformed_records += 1;
                for w in &decoded.warnings {
                    warn!(key = %record.key, error = %w, "Loaded edge record with defaults");
                }
            }
            store.insert_edge(edge)?;
            report.edges_loaded += 1;
        }

        info!(
            project_id,
            nodes = store.node_count(),
            edges = store.edge_count(),
            malformed = report.malformed_records,
            dangling = report.dangling_edges,
            "Loaded graph"
        );

        let graph = Self::empty(records, project_id);
        *graph.graph.write().await = store;
        Ok((graph, report))
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Shared read access to the in-memory graph.
    pub async fn read(&self) -> RwLockReadGuard<'_, GraphStore> {
        self.graph.read().await
    }

    /// Look up a node. The id is trimmed the same way mutations trim it.
    pub async fn get_node(&self, id: &str) -> Option<Node> {
        self.graph.read().await.get_node(id.trim()).cloned()
    }

    pub async fn add_node(
        &self,
        id: &str,
        node_type: NodeType,
        name: &str,
        properties: Properties,
    ) -> GraphResult<Synced<Node>> {
        let _gate = self.writer.lock().await;

        let node = self
            .graph
            .write()
            .await
            .add_node(id, node_type, name, properties)?;
        info!(node_id = %node.id, node_type = %node.node_type, "Added node");

        let persisted = self.persist_node(&node).await;
        Ok(Synced::new(node, persisted))
    }

    pub async fn add_edge(
        &self,
        from: &str,
        to: &str,
        relationship: Relationship,
        properties: Properties,
    ) -> GraphResult<Synced<Edge>> {
        let _gate = self.writer.lock().await;

        let (edge, from_node, to_node) = {
            let mut graph = self.graph.write().await;
            let edge = graph.add_edge(from.trim(), to.trim(), relationship, properties)?;
            let endpoint = |id: &str| {
                graph
                    .get_node(id)
                    .cloned()
                    .ok_or_else(|| GraphError::UnknownNode(id.to_string()))
            };
            let from_node = endpoint(&edge.from_id)?;
            let to_node = endpoint(&edge.to_id)?;
            (edge, from_node, to_node)
        };
        info!(edge = %edge.key(), "Added edge");

        let persisted = self.persist_edge(&edge, &from_node, &to_node).await;
        Ok(Synced::new(edge, persisted))
    }

    /// Delete a node and every incident edge.
    pub async fn delete_node(&self, id: &str) -> GraphResult<Synced<NodeDeletion>> {
        let _gate = self.writer.lock().await;
        let id = validate_node_id(id)?;

        let removed = self.graph.write().await.remove_node(id)?;
        info!(node_id = id, edges_removed = removed.edges_removed(), "Deleted node");

        // Every relationship type is cleared for each observed neighbor pair,
        // so stale records from earlier overwrites go too.
        let pairs: BTreeSet<(&str, &str)> = removed
            .edges
            .iter()
            .map(|e| (e.from_id.as_str(), e.to_id.as_str()))
            .collect();
        let mut keys = vec![records::node_key(id)];
        for (from, to) in pairs {
            keys.extend(Relationship::ALL.iter().map(|r| records::edge_key(from, to, *r)));
        }

        let persisted = self.delete_records(&keys).await;
        Ok(Synced::new(
            NodeDeletion {
                node_id: id.to_string(),
                edges_removed: removed.edges_removed(),
            },
            persisted,
        ))
    }

    pub async fn delete_edge(
        &self,
        from: &str,
        to: &str,
        relationship: Relationship,
    ) -> GraphResult<Synced<Edge>> {
        let _gate = self.writer.lock().await;

        let edge = self
            .graph
            .write()
            .await
            .remove_edge(from.trim(), to.trim(), relationship)?;
        info!(edge = %edge.key(), "Deleted edge");

        let key = records::edge_key(&edge.from_id, &edge.to_id, edge.relationship);
        let persisted = self.delete_records(&[key]).await;
        Ok(Synced::new(edge, persisted))
    }

    /// Semantic search over this project's node records.
    pub async fn search_nodes(&self, query: &str, limit: usize) -> GraphResult<Vec<NodeSearchHit>> {
        search_nodes(self.records.as_ref(), &self.project_id, query, limit).await
    }

    async fn persist_node(&self, node: &Node) -> GraphResult<()> {
        let key = records::node_key(&node.id);
        let result = self
            .records
            .put(
                &key,
                &records::node_document(node),
                records::node_metadata(node, &self.project_id),
            )
            .await;
        self.report_write(&key, result.map(|_| ()))
    }

    async fn persist_edge(&self, edge: &Edge, from: &Node, to: &Node) -> GraphResult<()> {
        let key = records::edge_key(&edge.from_id, &edge.to_id, edge.relationship);
        let result = self
            .records
            .put(
                &key,
                &records::edge_document(edge, from, to),
                records::edge_metadata(edge, &self.project_id),
            )
            .await;
        self.report_write(&key, result.map(|_| ()))
    }

    /// Delete every key, continuing past failures. Returns the first failure.
    async fn delete_records(&self, keys: &[String]) -> GraphResult<()> {
        let mut failed = 0usize;
        let mut first_error = None;

        for key in keys {
            if let Err(e) = self.records.delete(key).await {
                failed += 1;
                warn!(key = %key, error = %e, "Failed to delete record");
                first_error.get_or_insert_with(|| e.to_string());
            } else {
                debug!(key = %key, "Deleted record");
            }
        }

        match first_error {
            None => Ok(()),
            Some(e) => Err(GraphError::PersistenceFailure(format!(
                "{} of {} record deletes failed, first: {}",
                failed,
                keys.len(),
                e
            ))),
        }
    }

    fn report_write<E: std::fmt::Display>(&self, key: &str, result: Result<(), E>) -> GraphResult<()> {
        match result {
            Ok(()) => {
                debug!(key, "Persisted record");
                Ok(())
            }
            Err(e) => {
                warn!(key, error = %e, "Record store write failed; in-memory change kept");
                Err(GraphError::persistence(e))
            }
        }
    }
}

/// Oldest first, then by key, so reconstruction order follows creation order.
fn sort_records(records: &mut [Record]) {
    records.sort_by_cached_key(|r| {
        let created = r
            .get_str("created_at")
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|ts| ts.with_timezone(&Utc));
        (created, r.key.clone())
    });
}
