//! Archived voting weeks.
//!
//! Each archive is a frozen copy of a week's final tally. The filesystem
//! store keeps one HTML page and one JSON snapshot per week, an
//! `archives.json` metadata list and a generated `index.html`.

use super::render::{render_archive_index, render_tally_page, render_votes_json, PageOptions};
use super::{write_atomic, PublishResult};
use crate::clock::WeekId;
use crate::types::*;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// File holding the archive metadata list
pub const METADATA_FILE: &str = "archives.json";

/// Storage for archived weeks
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Freeze `items` as the final tally of `week`, replacing an earlier
    /// archive of the same week
    async fn archive_snapshot(&self, items: &[Item], week: WeekId) -> PublishResult<ArchiveEntry>;

    /// All archives, newest week first
    async fn list_archives(&self) -> PublishResult<Vec<ArchiveEntry>>;

    /// Delete one archive by file name or week id. Returns `false` if unknown.
    async fn delete_archive(&self, name: &str) -> PublishResult<bool>;

    /// Delete every archive, returning how many were removed
    async fn delete_all_archives(&self) -> PublishResult<usize>;
}

fn page_file(week: WeekId) -> String {
    format!("archive_{}.html", week)
}

fn build_entry(items: &[Item], week: WeekId) -> ArchiveEntry {
    ArchiveEntry {
        week_id: week.to_string(),
        start: week.start_label(),
        end: week.end_label(),
        total_votes: items.iter().map(|i| i.votes).sum(),
        file: page_file(week),
    }
}

fn matches_name(entry: &ArchiveEntry, name: &str) -> bool {
    entry.file.eq_ignore_ascii_case(name) || entry.week_id == name
}

fn sort_newest_first(entries: &mut [ArchiveEntry]) {
    entries.sort_by(|a, b| b.week_id.cmp(&a.week_id));
}

/// Archives kept as files under one directory
pub struct FsArchiveStore {
    dir: PathBuf,
    stream_url: Option<String>,
    /// Serializes metadata read-modify-write cycles
    lock: Mutex<()>,
}

impl FsArchiveStore {
    pub fn new(dir: impl Into<PathBuf>, stream_url: Option<String>) -> Self {
        Self {
            dir: dir.into(),
            stream_url,
            lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read_metadata(&self) -> PublishResult<Vec<ArchiveEntry>> {
        match tokio::fs::read_to_string(self.dir.join(METADATA_FILE)).await {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist metadata and regenerate the listing page
    async fn write_metadata(&self, entries: &[ArchiveEntry]) -> PublishResult<()> {
        let json = serde_json::to_string_pretty(entries)?;
        write_atomic(&self.dir.join(METADATA_FILE), json.as_bytes()).await?;

        let index = render_archive_index(entries, self.stream_url.as_deref());
        write_atomic(&self.dir.join("index.html"), index.as_bytes()).await?;
        Ok(())
    }

    async fn remove_files(&self, entry: &ArchiveEntry) -> PublishResult<()> {
        let page = self.dir.join(&entry.file);
        let snapshot = page.with_extension("json");
        for path in [page, snapshot] {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ArchiveStore for FsArchiveStore {
    async fn archive_snapshot(&self, items: &[Item], week: WeekId) -> PublishResult<ArchiveEntry> {
        let _guard = self.lock.lock().await;
        tokio::fs::create_dir_all(&self.dir).await?;

        let entry = build_entry(items, week);
        let options = PageOptions {
            stream_url: self.stream_url.clone(),
            title: format!("Game Suggestions, week of {}", entry.start),
            archive_link: Some("index.html".to_string()),
        };

        let page_path = self.dir.join(&entry.file);
        write_atomic(&page_path, render_tally_page(items, &options).as_bytes()).await?;
        write_atomic(
            &page_path.with_extension("json"),
            render_votes_json(items)?.as_bytes(),
        )
        .await?;

        let mut entries = self.read_metadata().await?;
        entries.retain(|e| e.week_id != entry.week_id);
        entries.push(entry.clone());
        sort_newest_first(&mut entries);
        self.write_metadata(&entries).await?;

        tracing::info!(
            week = %week,
            total_votes = entry.total_votes,
            file = %entry.file,
            "Archived voting week"
        );
        Ok(entry)
    }

    async fn list_archives(&self) -> PublishResult<Vec<ArchiveEntry>> {
        let mut entries = self.read_metadata().await?;
        sort_newest_first(&mut entries);
        Ok(entries)
    }

    async fn delete_archive(&self, name: &str) -> PublishResult<bool> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_metadata().await?;

        let Some(pos) = entries.iter().position(|e| matches_name(e, name)) else {
            return Ok(false);
        };
        let entry = entries.remove(pos);
        self.remove_files(&entry).await?;
        self.write_metadata(&entries).await?;

        tracing::info!(file = %entry.file, "Deleted archive");
        Ok(true)
    }

    async fn delete_all_archives(&self) -> PublishResult<usize> {
        let _guard = self.lock.lock().await;
        let entries = self.read_metadata().await?;
        for entry in &entries {
            self.remove_files(entry).await?;
        }

        if tokio::fs::try_exists(&self.dir).await? {
            self.write_metadata(&[]).await?;
        }

        tracing::info!(count = entries.len(), "Deleted all archives");
        Ok(entries.len())
    }
}

/// In-process archive store, for tests and dry runs
#[derive(Default)]
pub struct MemoryArchiveStore {
    archives: Mutex<Vec<(ArchiveEntry, Vec<Item>)>>,
}

impl MemoryArchiveStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items frozen in the archive of `week_id`
    pub async fn items(&self, week_id: &str) -> Option<Vec<Item>> {
        self.archives
            .lock()
            .await
            .iter()
            .find(|(e, _)| e.week_id == week_id)
            .map(|(_, items)| items.clone())
    }
}

#[async_trait]
impl ArchiveStore for MemoryArchiveStore {
    async fn archive_snapshot(&self, items: &[Item], week: WeekId) -> PublishResult<ArchiveEntry> {
        let entry = build_entry(items, week);
        let mut archives = self.archives.lock().await;
        archives.retain(|(e, _)| e.week_id != entry.week_id);
        archives.push((entry.clone(), items.to_vec()));
        Ok(entry)
    }

    async fn list_archives(&self) -> PublishResult<Vec<ArchiveEntry>> {
        let mut entries: Vec<ArchiveEntry> = self
            .archives
            .lock()
            .await
            .iter()
            .map(|(e, _)| e.clone())
            .collect();
        sort_newest_first(&mut entries);
        Ok(entries)
    }

    async fn delete_archive(&self, name: &str) -> PublishResult<bool> {
        let mut archives = self.archives.lock().await;
        let before = archives.len();
        archives.retain(|(e, _)| !matches_name(e, name));
        Ok(archives.len() != before)
    }

    async fn delete_all_archives(&self) -> PublishResult<usize> {
        let mut archives = self.archives.lock().await;
        let count = archives.len();
        archives.clear();
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn week(s: &str) -> WeekId {
        WeekId::containing(NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap())
    }

    fn items() -> Vec<Item> {
        vec![
            Item {
                name: "Hades".to_string(),
                votes: 3,
                url: None,
                user: "alice".to_string(),
                time: "08:15 PM, Oct 19".to_string(),
            },
            Item {
                name: "Celeste".to_string(),
                votes: 1,
                url: None,
                user: "bob".to_string(),
                time: "08:20 PM, Oct 19".to_string(),
            },
        ]
    }

    #[tokio::test]
    async fn test_fs_archive_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArchiveStore::new(dir.path().join("archives"), None);

        let entry = store.archive_snapshot(&items(), week("2026-10-12")).await.unwrap();
        assert_eq!(entry.week_id, "2026-10-10");
        assert_eq!(entry.file, "archive_2026-10-10.html");
        assert_eq!(entry.total_votes, 4);
        assert_eq!(entry.start, "October 10, 2026");
        assert_eq!(entry.end, "October 16, 2026");

        let archive_dir = dir.path().join("archives");
        assert!(archive_dir.join("archive_2026-10-10.html").exists());
        assert!(archive_dir.join("archive_2026-10-10.json").exists());
        assert!(archive_dir.join("index.html").exists());

        store.archive_snapshot(&items(), week("2026-10-19")).await.unwrap();
        let listed = store.list_archives().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].week_id, "2026-10-17");

        assert!(store.delete_archive("archive_2026-10-10.html").await.unwrap());
        assert!(!archive_dir.join("archive_2026-10-10.html").exists());
        assert!(!store.delete_archive("archive_2026-10-10.html").await.unwrap());
        assert_eq!(store.list_archives().await.unwrap().len(), 1);

        assert_eq!(store.delete_all_archives().await.unwrap(), 1);
        assert!(store.list_archives().await.unwrap().is_empty());
        assert!(!archive_dir.join("archive_2026-10-17.html").exists());
    }

    #[tokio::test]
    async fn test_fs_rearchive_same_week_replaces_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArchiveStore::new(dir.path(), None);

        store.archive_snapshot(&items()[..1], week("2026-10-19")).await.unwrap();
        store.archive_snapshot(&items(), week("2026-10-20")).await.unwrap();

        let listed = store.list_archives().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].total_votes, 4);
    }

    #[tokio::test]
    async fn test_fs_delete_by_week_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArchiveStore::new(dir.path(), None);
        store.archive_snapshot(&items(), week("2026-10-19")).await.unwrap();

        assert!(store.delete_archive("2026-10-17").await.unwrap());
        assert!(store.list_archives().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fs_delete_all_without_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArchiveStore::new(dir.path().join("missing"), None);
        assert_eq!(store.delete_all_archives().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryArchiveStore::new();
        store.archive_snapshot(&items(), week("2026-10-19")).await.unwrap();

        assert_eq!(store.items("2026-10-17").await.unwrap().len(), 2);
        assert!(store.delete_archive("archive_2026-10-17.html").await.unwrap());
        assert!(store.list_archives().await.unwrap().is_empty());
    }
}
