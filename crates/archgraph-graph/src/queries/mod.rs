//! Read-only queries over the architecture graph.

pub mod explore;
pub mod impact;
pub mod search;
pub mod stats;
pub mod traversal;

pub use explore::{list_nodes, query_relationships, NodeSummary, RelationshipView};
pub use impact::{analyze_impact, ImpactReport, RiskLevel};
pub use search::{search_nodes, NodeSearchHit};
pub use stats::{find_orphans, graph_stats, most_connected, GraphStats};
pub use traversal::{ancestors, descendants, find_path, PathResult, PathStep};
