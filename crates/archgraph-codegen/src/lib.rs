//! # Archgraph Codegen
//!
//! Renders the architecture graph as documentation: Mermaid diagrams and
//! an ARCHITECTURE.md overview.

pub mod architecture;
pub mod mermaid;

pub use architecture::{GeneratedArchitecture, export_architecture, write_architecture_md};
pub use mermaid::generate_mermaid;
