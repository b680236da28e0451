//! Document store: the single entry point for document data.
//!
//! Orchestrates the remote client and the frontmatter parser behind a
//! two-tier cache: an in-memory collection with a 5-minute freshness
//! window and a durable 24-hour snapshot loaded at construction. All
//! mutable state lives behind one async mutex, which doubles as the
//! single-flight guard — at most one bulk refresh is ever in flight per
//! store, and a second caller arriving mid-refresh waits and is served the
//! just-refreshed cache instead of issuing its own listing.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures_util::future::join_all;
use tokio::sync::Mutex;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::github::client::{GitHubClient, RemoteContent};
use crate::github::types::RemoteFile;

use super::frontmatter::{self, DateSource};
use super::{paths, snapshot, Document, DocumentKind};

/// In-memory freshness window. Within it, `list()` answers from cache
/// without touching the network.
const FRESH_TTL: Duration = Duration::from_secs(300); // 5 min

struct CacheState {
    /// Sorted by `published_at` descending.
    documents: Vec<Document>,
    /// `None` until the first successful refresh this process — snapshot
    /// seeding deliberately does not count as fresh.
    refreshed_at: Option<Instant>,
}

impl CacheState {
    fn is_fresh(&self) -> bool {
        self.refreshed_at
            .map(|at| at.elapsed() < FRESH_TTL)
            .unwrap_or(false)
    }
}

pub struct DocumentStore<C: RemoteContent = GitHubClient> {
    client: C,
    kind: DocumentKind,
    snapshot_path: PathBuf,
    state: Mutex<CacheState>,
}

impl DocumentStore<GitHubClient> {
    /// Store backed by the real contents API, snapshot path taken from the
    /// configuration.
    pub fn from_config(config: StoreConfig, kind: DocumentKind) -> Self {
        let snapshot_path = config.snapshot_path.clone();
        Self::new(GitHubClient::new(config), kind, snapshot_path)
    }
}

impl<C: RemoteContent> DocumentStore<C> {
    pub fn new(client: C, kind: DocumentKind, snapshot_path: PathBuf) -> Self {
        // Pre-seed from the durable snapshot so process start does not
        // begin with an empty timeline. Never fresh: the first list()
        // still refreshes.
        let seeded = snapshot::load(&snapshot_path, Utc::now()).unwrap_or_default();
        Self {
            client,
            kind,
            snapshot_path,
            state: Mutex::new(CacheState {
                documents: seeded,
                refreshed_at: None,
            }),
        }
    }

    /// List all documents, newest first.
    ///
    /// Serves the in-memory cache when it is fresh and non-empty (unless
    /// `force_refresh`). On refresh failure with a non-empty cache, the
    /// stale cache is returned and the failure is logged; with no cache at
    /// all, the error propagates.
    pub async fn list(&self, force_refresh: bool) -> Result<Vec<Document>, StoreError> {
        let mut state = self.state.lock().await;
        if !force_refresh && state.is_fresh() && !state.documents.is_empty() {
            return Ok(state.documents.clone());
        }

        match self.refresh().await {
            Ok(documents) => {
                state.documents = documents.clone();
                state.refreshed_at = Some(Instant::now());
                if let Err(e) = snapshot::save(&self.snapshot_path, &documents, Utc::now()) {
                    log::warn!("[STORE] Failed to persist snapshot: {}", e);
                }
                Ok(documents)
            }
            Err(e) if e.is_degradable() && !state.documents.is_empty() => {
                log::warn!(
                    "[STORE] Refresh failed, serving {} cached documents: {}",
                    state.documents.len(),
                    e
                );
                Ok(state.documents.clone())
            }
            Err(e) => Err(e),
        }
    }

    /// Full refresh: list the directory, fetch matching files concurrently,
    /// parse, sort newest-first. A single file that fails to fetch or
    /// decode is logged and skipped; it never aborts the batch. The cache
    /// is not touched here — the caller replaces it only on overall
    /// success, so a cancelled refresh leaves the previous entry intact.
    async fn refresh(&self) -> Result<Vec<Document>, StoreError> {
        let dir = self.kind.directory();
        let files = self.client.list_dir(dir).await?;
        let markdown: Vec<RemoteFile> = files.into_iter().filter(RemoteFile::is_markdown).collect();
        log::info!("[STORE] Refreshing {} documents from {}/", markdown.len(), dir);

        let results = join_all(markdown.iter().map(|file| self.fetch_one(file))).await;
        let mut documents: Vec<Document> = results.into_iter().flatten().collect();
        documents.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(documents)
    }

    async fn fetch_one(&self, file: &RemoteFile) -> Option<Document> {
        match self.client.read_file(&file.path).await {
            Ok(Some(fetched)) => {
                let (mut document, source) =
                    frontmatter::parse_dated(&fetched.text, &file.name, Utc::now().naive_utc());
                if source == DateSource::CurrentTime {
                    // Data-quality signal: this document will sort by parse
                    // time, not by any real publish date.
                    log::warn!("[STORE] No recoverable publish date in {}", file.path);
                }
                document.sha = Some(fetched.sha);
                Some(document)
            }
            Ok(None) => {
                log::warn!("[STORE] {} vanished between listing and read", file.path);
                None
            }
            Err(e) => {
                log::warn!("[STORE] Skipping {}: {}", file.path, e);
                None
            }
        }
    }

    /// Fetch and parse one document on demand. Bypasses the bulk cache in
    /// both directions: used by the edit/save round trip where the caller
    /// needs the current concurrency token. `Ok(None)` means the file is
    /// absent remotely.
    pub async fn get(&self, id: &str) -> Result<Option<Document>, StoreError> {
        let path = format!("{}/{}", self.kind.directory(), id);
        match self.client.read_file(&path).await? {
            Some(fetched) => {
                let mut document = frontmatter::parse(&fetched.text, id);
                document.sha = Some(fetched.sha);
                Ok(Some(document))
            }
            None => Ok(None),
        }
    }

    /// Persist `new_body` for a document.
    ///
    /// An existing header block is preserved byte-for-byte; only the body
    /// after it is replaced. Documents without an id yet (drafts) get a
    /// generated storage path. The write carries the document's concurrency
    /// token: a stale token surfaces as `StoreError::Conflict` and leaves
    /// the cache untouched — the caller must reload before retrying.
    pub async fn save(&self, document: &Document, new_body: &str) -> Result<Document, StoreError> {
        let (header, _) = frontmatter::split_header(&document.raw_content);
        let new_raw = match header {
            Some(header) => format!("{}{}", header, new_body),
            None => new_body.to_string(),
        };

        let now = Utc::now().naive_utc();
        let (id, message) = if document.id.is_empty() {
            let path = paths::generate_path(
                self.kind,
                document.title.as_deref().unwrap_or(""),
                &new_raw,
                now,
            );
            let name = path.rsplit('/').next().unwrap_or(&path).to_string();
            (name, format!("Create {}", path))
        } else {
            (
                document.id.clone(),
                format!("Update {}/{}", self.kind.directory(), document.id),
            )
        };
        let path = format!("{}/{}", self.kind.directory(), id);

        let outcome = self
            .client
            .create_or_update(&path, &new_raw, &message, document.sha.as_ref())
            .await?;

        let mut saved = frontmatter::parse_with_now(&new_raw, &id, now);
        saved.sha = Some(outcome.sha);

        // Replace (or insert) the entry so the next fresh list() reflects
        // the write without a refetch.
        let mut state = self.state.lock().await;
        state.documents.retain(|d| d.id != saved.id);
        state.documents.push(saved.clone());
        state
            .documents
            .sort_by(|a, b| b.published_at.cmp(&a.published_at));

        Ok(saved)
    }

    /// Upload raw bytes (an image, typically) to a generated asset path.
    /// Returns the canonical URL the remote reports for the new file.
    pub async fn upload_asset(&self, bytes: &[u8], extension: &str) -> Result<String, StoreError> {
        let path = paths::generate_asset_path(extension, Utc::now().naive_utc());
        let message = format!("Upload {}", path);
        let outcome = self.client.upload_asset(bytes, &path, &message).await?;
        log::info!("[STORE] Uploaded {} bytes to {}", bytes.len(), path);
        Ok(outcome.canonical_url.unwrap_or(path))
    }

    /// Empty the in-memory cache and delete the durable snapshot.
    /// Idempotent; the next `list()` performs a full fetch.
    pub async fn clear_cache(&self) -> std::io::Result<()> {
        let mut state = self.state.lock().await;
        state.documents.clear();
        state.refreshed_at = None;
        snapshot::delete(&self.snapshot_path)
    }
}
