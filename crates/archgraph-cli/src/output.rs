//! Terminal output formatting.

use anyhow::Result;
use colored::{ColoredString, Colorize};
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use archgraph_core::{Edge, GraphError, Node, NodeType};
use archgraph_graph::queries::explore::NodeSummary;
use archgraph_graph::queries::search::NodeSearchHit;
use archgraph_graph::queries::stats::OrphanNode;
use archgraph_graph::queries::{GraphStats, ImpactReport, PathResult, RelationshipView, RiskLevel};

/// Print any serializable value as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a mutation result as JSON, with the persistence warning if any.
pub fn print_synced_json<T: Serialize>(value: &T, warning: Option<&GraphError>) -> Result<()> {
    print_json(&serde_json::json!({
        "result": value,
        "persisted": warning.is_none(),
        "warning": warning.map(|w| w.to_string()),
    }))
}

/// Warn that a change was applied in memory but not stored.
pub fn print_persistence_warning(warning: Option<&GraphError>) {
    if let Some(w) = warning {
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            format!("{} (change applied in memory only)", w).yellow()
        );
    }
}

pub fn edge_label(edge: &Edge) -> String {
    format!(
        "{} {} {}",
        edge.from_id.cyan(),
        format!("--{}-->", edge.relationship).yellow(),
        edge.to_id.cyan()
    )
}

/// Colored node type label.
fn type_label(node_type: NodeType) -> ColoredString {
    let s = node_type.as_str();
    match node_type {
        NodeType::Api => s.blue(),
        NodeType::Screen => s.magenta(),
        NodeType::Service => s.yellow(),
        NodeType::Database => s.green(),
        NodeType::Queue => s.red(),
        NodeType::Event => s.cyan(),
        _ => s.normal(),
    }
}

pub fn print_node(node: &Node) {
    println!("{} {}", node.name.cyan().bold(), format!("({})", node.id).dimmed());
    println!();
    println!("{}: {}", "Type".bold(), type_label(node.node_type));
    println!("{}: {}", "Created".bold(), node.created_at.format("%Y-%m-%d %H:%M:%S UTC"));

    if !node.properties.is_empty() {
        println!();
        println!("{}", "Properties".bold());
        for (key, value) in &node.properties {
            println!("  {}: {}", key.dimmed(), value);
        }
    }
}

pub fn print_nodes_table(nodes: &[NodeSummary]) {
    if nodes.is_empty() {
        println!("{}", "No nodes found.".dimmed());
        return;
    }

    println!("{} {} {} {}", pad_right("ID", 30), pad_right("Name", 30), pad_right("Type", 10), "Links");
    println!("{}", "─".repeat(80));

    for node in nodes {
        println!(
            "{} {} {} {}",
            pad_right(&truncate_visual(&node.node_id, 30), 30),
            pad_right(&truncate_visual(&node.name, 30), 30),
            format!("{}{}", type_label(node.node_type), " ".repeat(10usize.saturating_sub(node.node_type.as_str().len()))),
            node.connections
        );
    }

    println!();
    println!("{} node(s)", nodes.len());
}

pub fn print_relationships(view: &RelationshipView) {
    println!(
        "{} {} {}",
        "Relationships of".bold(),
        view.node_name.cyan(),
        format!("({}, {})", view.node_id, view.node_type).dimmed()
    );
    println!("{}", "─".repeat(50));

    if view.total_connections == 0 {
        println!("{}", "No relationships.".dimmed());
        return;
    }

    if !view.outgoing.is_empty() {
        println!("{} ({}):", "Outgoing".bold(), view.outgoing.len());
        for rel in &view.outgoing {
            println!(
                "  {} {} [{}] {}",
                "→".dimmed(),
                rel.relationship.to_string().yellow(),
                type_label(rel.to_type),
                rel.to_name
            );
        }
    }

    if !view.incoming.is_empty() {
        println!("{} ({}):", "Incoming".bold(), view.incoming.len());
        for rel in &view.incoming {
            println!(
                "  {} [{}] {} {}",
                "←".dimmed(),
                type_label(rel.from_type),
                rel.from_name,
                rel.relationship.to_string().yellow()
            );
        }
    }
}

pub fn print_impact(report: &ImpactReport) {
    println!(
        "{} {} {}",
        "Impact analysis for".bold(),
        report.node_name.cyan(),
        format!("({})", report.node_id).dimmed()
    );
    println!("{}", "─".repeat(50));

    let risk = match report.risk_level {
        RiskLevel::High => report.risk_level.as_str().red().bold(),
        RiskLevel::Medium => report.risk_level.as_str().yellow().bold(),
        RiskLevel::Low => report.risk_level.as_str().green().bold(),
    };

    println!("  Direct dependents: {}", report.direct_dependents.to_string().cyan());
    println!("  Total impacted:    {}", report.total_impacted.to_string().cyan());
    println!("  Dependencies:      {}", report.dependencies.to_string().cyan());
    println!("  Risk:              {}", risk);

    for (node_type, nodes) in &report.impacted_by_type {
        println!("\n  [{}]", type_label(*node_type));
        for node in nodes {
            println!("    {} {} {}", "•".dimmed(), node.name, format!("({})", node.id).dimmed());
        }
    }

    println!("\n{}", report.recommendation);
}

pub fn print_path(result: &PathResult) {
    match result {
        PathResult::NotFound { message } => println!("{}", message.dimmed()),
        PathResult::Found { path_length, path } => {
            println!("{} ({} hop(s))", "Path found".green().bold(), path_length);
            for step in path {
                println!("  [{}] {}", type_label(step.node_type), step.node_name);
                if let Some(rel) = step.relationship {
                    println!("     {} {}", "↓".dimmed(), rel.to_string().yellow());
                }
            }
        }
    }
}

pub fn print_orphans(orphans: &[OrphanNode]) {
    if orphans.is_empty() {
        println!("{}", "No orphaned nodes.".green());
        return;
    }

    println!("{} ({}):", "Orphaned nodes".bold(), orphans.len());
    for orphan in orphans {
        println!(
            "  {} [{}] {} {}",
            "•".dimmed(),
            type_label(orphan.node_type),
            orphan.node_name,
            format!("({})", orphan.node_id).dimmed()
        );
    }
}

pub fn print_stats(stats: &GraphStats) {
    println!("{}", "Architecture Graph".bold());
    println!("{}", "─".repeat(40));
    println!("  Nodes:         {}", stats.total_nodes.to_string().cyan());
    println!("  Relationships: {}", stats.total_edges.to_string().cyan());
    println!("  Orphaned:      {}", stats.orphaned_nodes.to_string().yellow());

    println!("\n{}", "By type".bold());
    for (node_type, count) in stats.nodes_by_type.iter().filter(|(_, c)| **c > 0) {
        println!("  {} {}", pad_right(node_type.as_str(), 12), count);
    }

    println!("\n{}", "By relationship".bold());
    for (rel, count) in stats.edges_by_relationship.iter().filter(|(_, c)| **c > 0) {
        println!("  {} {}", pad_right(rel.as_str(), 12), count);
    }

    if !stats.most_connected.is_empty() {
        println!("\n{}", "Most connected".bold());
        for node in &stats.most_connected {
            println!("  {} {}", pad_right(&truncate_visual(&node.node_name, 30), 30), node.connections);
        }
    }
    println!("{}", "─".repeat(40));
}

pub fn print_search_hits(query: &str, hits: &[NodeSearchHit]) {
    if hits.is_empty() {
        println!("{} '{}'", "No nodes match".dimmed(), query);
        return;
    }

    for (i, hit) in hits.iter().enumerate() {
        let kind = hit
            .node_type
            .map(type_label)
            .unwrap_or_else(|| "?".normal());
        println!(
            "{}. [{}] {} {} {}",
            i + 1,
            kind,
            hit.name.bold(),
            format!("({})", hit.node_id).dimmed(),
            format!("{:.2}", hit.relevance).dimmed()
        );
    }
}

/// Pad a plain string to a given visual width (right-padded).
fn pad_right(s: &str, width: usize) -> String {
    let visual = UnicodeWidthStr::width(s);
    if visual >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - visual))
    }
}

/// Truncate a string respecting visual width.
fn truncate_visual(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let mut result = String::new();
    let mut current_width = 0;
    for ch in s.chars() {
        let ch_width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if current_width + ch_width > max_width - 2 {
            break;
        }
        result.push(ch);
        current_width += ch_width;
    }
    result.push_str("..");
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_right_uses_visual_width() {
        assert_eq!(pad_right("ab", 4), "ab  ");
        assert_eq!(pad_right("日本", 6), "日本  ");
        assert_eq!(pad_right("long", 2), "long");
    }

    #[test]
    fn test_truncate_visual() {
        assert_eq!(truncate_visual("short", 10), "short");
        assert_eq!(truncate_visual("svc-authentication", 8), "svc-au..");
        assert_eq!(truncate_visual("abcdef", 3), "...");
    }
}
