//! Read-only graph queries.

use anyhow::Result;
use clap::Args;

use archgraph_core::{Direction, Relationship};
use archgraph_graph::queries::{analyze_impact, find_orphans, find_path, graph_stats, query_relationships};
use archgraph_graph::ArchitectureGraph;

use crate::output;

#[derive(Args)]
pub struct RelsArgs {
    /// Node ID
    pub node_id: String,
    /// incoming, outgoing or both
    #[arg(short, long, default_value = "both")]
    pub direction: String,
    /// Only this relationship type
    #[arg(short, long)]
    pub relationship: Option<String>,
}

pub async fn cmd_rels(graph: &ArchitectureGraph, args: RelsArgs, json: bool) -> Result<()> {
    let direction: Direction = args.direction.parse()?;
    let relationship = args
        .relationship
        .map(|r| r.parse::<Relationship>())
        .transpose()?;

    let view = query_relationships(&*graph.read().await, args.node_id.trim(), direction, relationship)?;
    if json {
        return output::print_json(&view);
    }
    output::print_relationships(&view);
    Ok(())
}

pub async fn cmd_impact(graph: &ArchitectureGraph, node_id: &str, json: bool) -> Result<()> {
    let report = analyze_impact(&*graph.read().await, node_id.trim())?;
    if json {
        return output::print_json(&report);
    }
    output::print_impact(&report);
    Ok(())
}

pub async fn cmd_path(graph: &ArchitectureGraph, from: &str, to: &str, json: bool) -> Result<()> {
    let result = find_path(&*graph.read().await, from.trim(), to.trim())?;
    if json {
        return output::print_json(&result);
    }
    output::print_path(&result);
    Ok(())
}

pub async fn cmd_orphans(graph: &ArchitectureGraph, json: bool) -> Result<()> {
    let orphans = find_orphans(&*graph.read().await);
    if json {
        return output::print_json(&orphans);
    }
    output::print_orphans(&orphans);
    Ok(())
}

pub async fn cmd_stats(graph: &ArchitectureGraph, json: bool) -> Result<()> {
    let stats = graph_stats(&*graph.read().await);
    if json {
        return output::print_json(&stats);
    }
    output::print_stats(&stats);
    Ok(())
}

pub async fn cmd_search(graph: &ArchitectureGraph, query: &str, limit: usize, json: bool) -> Result<()> {
    let hits = graph.search_nodes(query, limit).await?;
    if json {
        return output::print_json(&hits);
    }
    output::print_search_hits(query, &hits);
    Ok(())
}
