//! CLI command definitions and handlers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use archgraph_core::ArchgraphConfig;
use archgraph_embedding::{OllamaClient, QdrantStore};
use archgraph_graph::ArchitectureGraph;

pub mod edge;
pub mod export;
pub mod node;
pub mod query;

/// Archgraph - Architecture graph of APIs, screens, services and their relationships
#[derive(Parser)]
#[command(name = "archgraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to project directory (defaults to current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Also write logs to ~/.archgraph/logs/<project>.log
    #[arg(long, global = true)]
    pub log: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage nodes (APIs, screens, services, ...)
    #[command(subcommand)]
    Node(node::NodeCommands),

    /// Manage relationships between nodes
    #[command(subcommand)]
    Edge(edge::EdgeCommands),

    /// Show relationships of a node
    Rels(query::RelsArgs),

    /// Analyze the impact of changing a node
    Impact {
        /// Node ID
        node_id: String,
    },

    /// Find the shortest path between two nodes
    Path {
        /// Source node ID
        from: String,
        /// Target node ID
        to: String,
    },

    /// List nodes without any relationship
    Orphans,

    /// Show graph statistics
    Stats,

    /// Print a Mermaid diagram of the graph
    Visualize {
        /// Restrict the diagram to these node IDs
        #[arg(long, num_args = 1.., value_delimiter = ',')]
        nodes: Vec<String>,
    },

    /// Export the graph as ARCHITECTURE.md
    Export {
        /// Output file (defaults to ARCHITECTURE.md in the project directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Semantic search over nodes
    Search {
        /// Free text query
        query: String,
        /// Maximum number of results
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
}

impl Cli {
    pub async fn execute(self, config: ArchgraphConfig) -> Result<()> {
        let project_dir = match self.project {
            Some(dir) => dir,
            None => std::env::current_dir().context("Failed to read current directory")?,
        };
        let graph = open_graph(&config).await?;
        let json = self.json;

        match self.command {
            Commands::Node(cmd) => node::execute(cmd, &graph, json).await,
            Commands::Edge(cmd) => edge::execute(cmd, &graph, json).await,
            Commands::Rels(args) => query::cmd_rels(&graph, args, json).await,
            Commands::Impact { node_id } => query::cmd_impact(&graph, &node_id, json).await,
            Commands::Path { from, to } => query::cmd_path(&graph, &from, &to, json).await,
            Commands::Orphans => query::cmd_orphans(&graph, json).await,
            Commands::Stats => query::cmd_stats(&graph, json).await,
            Commands::Search { query, limit } => query::cmd_search(&graph, &query, limit, json).await,
            Commands::Visualize { nodes } => export::cmd_visualize(&graph, nodes).await,
            Commands::Export { output } => {
                let path = output.unwrap_or_else(|| {
                    project_dir.join(archgraph_codegen::architecture::ARCHITECTURE_FILE)
                });
                export::cmd_export(&graph, &path, json).await
            }
        }
    }
}

/// Connect to the record store and rebuild the graph from it.
async fn open_graph(config: &ArchgraphConfig) -> Result<ArchitectureGraph> {
    let ollama = OllamaClient::new(&config.ollama_url, &config.embedding_model);
    if !ollama.health_check().await {
        warn!(
            url = %config.ollama_url,
            model = %config.embedding_model,
            "Ollama not reachable or model missing; writes and search will fail"
        );
    }

    let store = QdrantStore::new(&config.qdrant_url, &config.collection, ollama)
        .with_context(|| format!("Failed to create Qdrant client for {}", config.qdrant_url))?;
    store
        .ensure_collection()
        .await
        .with_context(|| format!("Failed to prepare collection '{}'", config.collection))?;

    let (graph, report) = ArchitectureGraph::load(Arc::new(store), &config.project_id, config.load_limit)
        .await
        .context("Failed to load architecture graph")?;

    info!(
        project_id = %config.project_id,
        collection = %config.collection,
        nodes = report.nodes_loaded,
        edges = report.edges_loaded,
        "Graph ready"
    );

    Ok(graph)
}
