//! Publishing by committing the output directory and pushing it.

use super::{PublishError, PublishResult};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Commits and pushes rendered files from a git working tree
#[derive(Debug, Clone)]
pub struct GitPublisher {
    repo_dir: PathBuf,
}

impl GitPublisher {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
        }
    }

    async fn git(&self, args: &[&str]) -> PublishResult<std::process::ExitStatus> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_dir)
            .output()
            .await?;

        if !output.stderr.is_empty() {
            tracing::debug!(
                args = ?args,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "git output"
            );
        }
        Ok(output.status)
    }

    async fn git_checked(&self, args: &[&str]) -> PublishResult<()> {
        let status = self.git(args).await?;
        if status.success() {
            Ok(())
        } else {
            Err(PublishError::Git(format!(
                "git {} exited with {}",
                args.join(" "),
                status
            )))
        }
    }

    /// Stage `paths`, then commit and push if anything changed.
    ///
    /// Paths are relative to the directory given to [`GitPublisher::new`].
    ///
    /// Returns whether a commit was made.
    pub async fn sync(&self, paths: &[&Path], message: &str) -> PublishResult<bool> {
        let path_args: Vec<String> = paths
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();

        let mut add: Vec<&str> = vec!["add", "--all", "--"];
        add.extend(path_args.iter().map(String::as_str));
        self.git_checked(&add).await?;

        // Exit status 0 means nothing is staged
        if self.git(&["diff", "--cached", "--quiet"]).await?.success() {
            tracing::debug!("Nothing to publish");
            return Ok(false);
        }

        self.git_checked(&["commit", "-m", message]).await?;
        self.git_checked(&["push"]).await?;
        tracing::info!(message, "Published to git remote");
        Ok(true)
    }
}
