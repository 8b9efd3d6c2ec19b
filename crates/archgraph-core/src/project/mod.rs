//! Project identification.
//!
//! Every record written to the store is scoped to a project id, so the same
//! Qdrant instance can hold the graphs of many repositories.

use std::path::Path;

use tracing::debug;

/// File in the project directory that pins the project id.
pub const PROJECT_FILE: &str = ".archgraph-project";

/// Environment variable that overrides project detection.
pub const PROJECT_ID_ENV: &str = "ARCHGRAPH_PROJECT_ID";

/// Fallback id when nothing usable can be derived.
pub const DEFAULT_PROJECT_ID: &str = "default-project";

/// Detect the project id for a directory.
///
/// Priority: the `.archgraph-project` file, then the enclosing git
/// repository name, then the directory name. `ARCHGRAPH_PROJECT_ID` is
/// resolved earlier by the config layer.
pub fn detect_project_id_from_dir(project_dir: &Path) -> String {
    let pinned = project_dir.join(PROJECT_FILE);
    if let Ok(content) = std::fs::read_to_string(&pinned) {
        let content = content.trim();
        if !content.is_empty() {
            debug!(path = %pinned.display(), "Project id from project file");
            return sanitize_project_id(content);
        }
    }

    if let Some(repo) = git_repo_name(project_dir) {
        return sanitize_project_id(&repo);
    }

    let dir_name = project_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    sanitize_project_id(&dir_name)
}

/// Name of the nearest ancestor directory containing `.git`.
fn git_repo_name(start: &Path) -> Option<String> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .and_then(|dir| dir.file_name())
        .map(|n| n.to_string_lossy().to_string())
}

/// Make a project id safe for collection names and record metadata.
pub fn sanitize_project_id(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            out.push(c);
        } else if matches!(c, ' ' | '.' | '/' | '\\') {
            out.push('-');
        }
    }

    let mut collapsed = String::with_capacity(out.len());
    for c in out.chars() {
        if c == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(c);
    }

    let trimmed = collapsed.trim_matches('-');
    if trimmed.is_empty() {
        DEFAULT_PROJECT_ID.to_string()
    } else {
        trimmed.to_string()
    }
}
