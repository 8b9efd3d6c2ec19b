//! Runtime configuration.
//!
//! Values come from `.archgraph/config.toml` in the project directory, then
//! environment variables override individual fields.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{GraphError, GraphResult};
use crate::project;

/// Default Qdrant gRPC URL.
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

/// Default Ollama API URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";

/// Maximum records fetched per category when rebuilding the graph.
pub const DEFAULT_LOAD_LIMIT: usize = 10_000;

/// Config file location relative to the project directory.
pub const CONFIG_FILE: &str = ".archgraph/config.toml";

/// On-disk shape of the config file. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    project_id: Option<String>,
    qdrant_url: Option<String>,
    ollama_url: Option<String>,
    embedding_model: Option<String>,
    collection: Option<String>,
    load_limit: Option<usize>,
}

/// Resolved configuration.
#[derive(Debug, Clone)]
pub struct ArchgraphConfig {
    pub project_id: String,
    pub qdrant_url: String,
    pub ollama_url: String,
    pub embedding_model: String,
    pub collection: String,
    pub load_limit: usize,
}

impl ArchgraphConfig {
    /// Load configuration for a project directory.
    pub fn load(project_dir: &Path) -> GraphResult<Self> {
        let path = project_dir.join(CONFIG_FILE);
        let file = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            parse_config_file(&raw)
                .map_err(|e| GraphError::Config(format!("{}: {}", path.display(), e)))?
        } else {
            ConfigFile::default()
        };

        Ok(Self::resolve(project_dir, file, |key| std::env::var(key).ok()))
    }

    fn resolve(
        project_dir: &Path,
        file: ConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let env_nonempty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let project_id = env_nonempty(project::PROJECT_ID_ENV)
            .or(file.project_id)
            .map(|id| project::sanitize_project_id(&id))
            .unwrap_or_else(|| project::detect_project_id_from_dir(project_dir));

        let collection = file
            .collection
            .unwrap_or_else(|| format!("{}_unified", project_id));

        Self {
            qdrant_url: env_nonempty("QDRANT_URL")
                .or(file.qdrant_url)
                .unwrap_or_else(|| DEFAULT_QDRANT_URL.to_string()),
            ollama_url: env_nonempty("OLLAMA_URL")
                .or(file.ollama_url)
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            embedding_model: env_nonempty("OLLAMA_MODEL")
                .or(file.embedding_model)
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            load_limit: file.load_limit.unwrap_or(DEFAULT_LOAD_LIMIT),
            collection,
            project_id,
        }
    }

    /// Default log file: `~/.archgraph/logs/<project_id>.log`.
    pub fn default_log_file(&self, home: Option<PathBuf>) -> Option<PathBuf> {
        home.map(|h| {
            h.join(".archgraph")
                .join("logs")
                .join(format!("{}.log", self.project_id))
        })
    }
}

fn parse_config_file(raw: &str) -> Result<ConfigFile, toml::de::Error> {
    toml::from_str(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let file = ConfigFile {
            project_id: Some("Shop API".into()),
            ..Default::default()
        };
        let config = ArchgraphConfig::resolve(Path::new("/tmp/ignored"), file, env_from(&[]));

        assert_eq!(config.project_id, "shop-api");
        assert_eq!(config.collection, "shop-api_unified");
        assert_eq!(config.qdrant_url, DEFAULT_QDRANT_URL);
        assert_eq!(config.ollama_url, DEFAULT_OLLAMA_URL);
        assert_eq!(config.embedding_model, DEFAULT_EMBEDDING_MODEL);
        assert_eq!(config.load_limit, DEFAULT_LOAD_LIMIT);
    }

    #[test]
    fn test_env_overrides_file() {
        let file = parse_config_file(
            r#"
            project_id = "from-file"
            qdrant_url = "http://qdrant:6334"
            load_limit = 500
            "#,
        )
        .unwrap();
        let env = env_from(&[
            ("ARCHGRAPH_PROJECT_ID", "from-env"),
            ("QDRANT_URL", "http://other:6334"),
            ("OLLAMA_MODEL", "mxbai-embed-large"),
        ]);
        let config = ArchgraphConfig::resolve(Path::new("/tmp/ignored"), file, env);

        assert_eq!(config.project_id, "from-env");
        assert_eq!(config.qdrant_url, "http://other:6334");
        assert_eq!(config.embedding_model, "mxbai-embed-large");
        assert_eq!(config.load_limit, 500);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(parse_config_file("qdrant = 1").is_err());
    }

    #[test]
    fn test_default_log_file() {
        let config = ArchgraphConfig::resolve(
            Path::new("/tmp/ignored"),
            ConfigFile {
                project_id: Some("billing".into()),
                ..Default::default()
            },
            env_from(&[]),
        );
        let path = config.default_log_file(Some(PathBuf::from("/home/dev"))).unwrap();
        assert_eq!(path, PathBuf::from("/home/dev/.archgraph/logs/billing.log"));
        assert!(config.default_log_file(None).is_none());
    }
}
