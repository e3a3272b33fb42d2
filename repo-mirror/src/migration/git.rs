//! Local git operations on mirror clones.
//!
//! Every command runs with an explicit working directory taken from a
//! [`MirrorWorkspace`] or [`LocalMirror`] handle; the process working
//! directory is never changed.

use super::MigrationError;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Directory under which mirror clones are created.
#[derive(Debug, Clone)]
pub struct MirrorWorkspace {
    root: PathBuf,
}

impl MirrorWorkspace {
    /// Opens a workspace rooted at `root`, creating the directory if needed.
    pub fn create(root: &Path) -> Result<Self, MigrationError> {
        std::fs::create_dir_all(root).map_err(|e| MigrationError::WorkDirError {
            path: root.display().to_string(),
            source: e,
        })?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Mirror-clones `clone_url` into `dir_name` under the workspace root.
    pub async fn mirror_clone(
        &self,
        clone_url: &str,
        dir_name: &str,
    ) -> Result<LocalMirror, MigrationError> {
        debug!(url = %clone_url, dir = %dir_name, "Mirror cloning");
        run_git(&self.root, &["clone", "--mirror", clone_url, dir_name]).await?;

        Ok(LocalMirror {
            path: self.root.join(dir_name),
        })
    }
}

/// A bare mirror clone on local disk.
///
/// The clone is left in place after migration.
#[derive(Debug, Clone)]
pub struct LocalMirror {
    path: PathBuf,
}

impl LocalMirror {
    /// Returns the clone directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Points `origin` at the destination repository.
    pub async fn set_origin(&self, url: &str) -> Result<(), MigrationError> {
        run_git(&self.path, &["remote", "set-url", "origin", url]).await
    }

    /// Adds the original source as an extra remote that is never pushed to.
    pub async fn add_remote(&self, name: &str, url: &str) -> Result<(), MigrationError> {
        run_git(&self.path, &["remote", "add", name, url]).await
    }

    /// Pushes every ref and tag to `target`, which is a remote name or URL.
    pub async fn push_mirror(&self, target: &str) -> Result<(), MigrationError> {
        run_git(&self.path, &["push", "--mirror", target])
            .await
            // The target may carry credentials; keep them out of the error.
            .map_err(|e| match e {
                MigrationError::GitFailed { message, .. } => MigrationError::GitFailed {
                    command: "push --mirror".to_string(),
                    message,
                },
                other => other,
            })
    }
}

/// Returns the last path segment of a clone URL.
///
/// Handles both URL (`https://host/ns/repo.git`) and scp-like
/// (`git@host:ns/repo.git`) forms.
pub fn mirror_dir_name(clone_url: &str) -> Result<String, MigrationError> {
    clone_url
        .trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .map(str::to_string)
        .ok_or_else(|| MigrationError::InvalidCloneUrl {
            url: clone_url.to_string(),
        })
}

/// Strips a trailing `.git` from a mirror directory name.
pub fn destination_name(dir_name: &str) -> Option<String> {
    let name = dir_name.strip_suffix(".git").unwrap_or(dir_name);
    (!name.is_empty()).then(|| name.to_string())
}

/// Runs a git command in `dir`.
async fn run_git(dir: &Path, args: &[&str]) -> Result<(), MigrationError> {
    let command = args.first().copied().unwrap_or_default().to_string();

    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| MigrationError::GitFailed {
            command: command.clone(),
            message: format!("failed to execute git: {e}"),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MigrationError::GitFailed {
            command: args.join(" "),
            message: stderr.trim().to_string(),
        });
    }

    Ok(())
}
