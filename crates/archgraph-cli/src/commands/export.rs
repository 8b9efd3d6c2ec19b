//! Diagram and document export commands.

use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use std::path::Path;

use archgraph_codegen::{export_architecture, generate_mermaid, write_architecture_md};
use archgraph_graph::ArchitectureGraph;

use crate::output;

/// Print a Mermaid diagram, optionally limited to `nodes`.
pub async fn cmd_visualize(graph: &ArchitectureGraph, nodes: Vec<String>) -> Result<()> {
    let nodes: Vec<String> = nodes.iter().map(|n| n.trim().to_string()).collect();
    let subset = (!nodes.is_empty()).then_some(nodes.as_slice());
    print!("{}", generate_mermaid(&*graph.read().await, subset));
    Ok(())
}

/// Write ARCHITECTURE.md to `path`.
pub async fn cmd_export(graph: &ArchitectureGraph, path: &Path, json: bool) -> Result<()> {
    let generated = export_architecture(&*graph.read().await, Utc::now());
    let written = write_architecture_md(&generated, path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    if json {
        return output::print_json(&serde_json::json!({
            "status": "exported",
            "path": written,
            "bytes": generated.content.len(),
        }));
    }

    println!("{} {}", "Exported architecture to".green().bold(), written.cyan());
    Ok(())
}
