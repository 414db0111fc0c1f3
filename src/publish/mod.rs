pub mod archive;
mod git;
pub mod render;

use crate::types::*;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

pub use archive::{ArchiveStore, FsArchiveStore, MemoryArchiveStore};
pub use git::GitPublisher;
pub use render::PageOptions;

/// Result type for render/publish operations
pub type PublishResult<T> = Result<T, PublishError>;

/// Errors from writing or publishing rendered output
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Git publish failed: {0}")]
    Git(String),
}

/// Write a file by renaming a sibling temp file over it
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, contents).await?;
    tokio::fs::rename(&tmp, path).await
}

/// Name of the published tally data file
pub const VOTES_JSON: &str = "votes.json";
/// Name of the published tally page
pub const VOTE_PAGE: &str = "index.html";
/// Archive subdirectory of the output directory
pub const ARCHIVE_DIR: &str = "archives";

/// Renders the tally into the output directory and pushes it when it changed
pub struct Publisher {
    output_dir: PathBuf,
    page: PageOptions,
    git: Option<GitPublisher>,
    last_digest: Option<String>,
}

impl Publisher {
    pub fn new(output_dir: impl Into<PathBuf>, page: PageOptions, git: Option<GitPublisher>) -> Self {
        Self {
            output_dir: output_dir.into(),
            page,
            git,
            last_digest: None,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.output_dir.join(ARCHIVE_DIR)
    }

    /// Write `votes.json` and `index.html` for the ranked `items`.
    ///
    /// Returns `false` without touching git when the rendered content is the
    /// same as last time.
    pub async fn publish_tally(&mut self, items: &[Item]) -> PublishResult<bool> {
        let json = render::render_votes_json(items)?;
        let html = render::render_tally_page(items, &self.page);

        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        hasher.update(html.as_bytes());
        let digest = hex::encode(hasher.finalize());

        if self.last_digest.as_deref() == Some(digest.as_str()) {
            tracing::debug!("Tally unchanged, skipping publish");
            return Ok(false);
        }

        tokio::fs::create_dir_all(&self.output_dir).await?;
        write_atomic(&self.output_dir.join(VOTES_JSON), json.as_bytes()).await?;
        write_atomic(&self.output_dir.join(VOTE_PAGE), html.as_bytes()).await?;
        // Remember the digest once the files are on disk, even if the push fails
        self.last_digest = Some(digest);

        if let Some(git) = &self.git {
            git.sync(&[Path::new(VOTES_JSON), Path::new(VOTE_PAGE)], "Auto update vote page")
                .await?;
        }
        Ok(true)
    }

    /// Push the archive directory after archives were added or deleted
    pub async fn publish_archives(&self) -> PublishResult<()> {
        if let Some(git) = &self.git {
            if tokio::fs::try_exists(self.archive_dir()).await? {
                git.sync(&[Path::new(ARCHIVE_DIR)], "Update vote archives")
                    .await?;
            }
        }
        Ok(())
    }
}
