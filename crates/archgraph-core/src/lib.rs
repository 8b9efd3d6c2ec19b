//! Archgraph Core Library
//!
//! Model types, errors and configuration shared by the architecture graph crates.

pub mod architecture;
pub mod config;
pub mod error;
pub mod project;

pub use architecture::model::{
    Direction, Edge, EdgeKey, Node, NodeType, Properties, PropertyValue, Relationship,
};
pub use config::ArchgraphConfig;
pub use error::{GraphError, GraphResult};
