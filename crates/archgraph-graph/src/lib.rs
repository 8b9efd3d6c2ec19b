//! # Archgraph Graph
//!
//! In-memory architecture graph, its synchronization to a record store, and
//! the traversal queries run over it.

pub mod queries;
pub mod store;
pub mod sync;

pub use store::{GraphStore, RemovedNode};
pub use sync::{ArchitectureGraph, LoadReport, NodeDeletion, Synced};
