//! Archgraph CLI - architecture graph of APIs, screens, services and their
//! relationships, persisted to a vector store.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use archgraph_core::ArchgraphConfig;

mod commands;
mod output;

use commands::Cli;

/// Initialize tracing on stderr, plus a log file when `log_file` is set.
///
/// Stdout is left to command output so `--json` stays machine readable.
/// The returned guard flushes the file writer on drop.
fn init_tracing(log_file: Option<&std::path::Path>) -> Option<WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "archgraph=info,archgraph_graph=info,archgraph_embedding=info".into());

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let file_target = log_file.and_then(|path| {
        let dir = path.parent()?;
        let name = path.file_name()?;
        std::fs::create_dir_all(dir).ok()?;
        Some((dir.to_path_buf(), name.to_os_string()))
    });

    match file_target {
        Some((dir, name)) => {
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false),
                )
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let project_dir = match &cli.project {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };
    let config = ArchgraphConfig::load(&project_dir).context("Failed to load configuration")?;

    let log_file = if cli.log {
        config.default_log_file(dirs::home_dir())
    } else {
        None
    };
    let _guard = init_tracing(log_file.as_deref());

    cli.execute(config).await
}
