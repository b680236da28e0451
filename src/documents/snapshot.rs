//! Durable on-disk cache snapshot.
//!
//! A single JSON file rewritten wholesale after each successful bulk
//! refresh and read back at store construction. It only pre-seeds the
//! in-memory cache to avoid an empty-state network wait on process start;
//! it never counts as fresh (the 5-minute in-memory window has necessarily
//! expired by then). Blob shas are not persisted, so seeded documents must
//! be re-fetched before they can be saved.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::Document;

/// How long a snapshot stays loadable.
pub const MAX_AGE_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    documents: Vec<Document>,
    #[serde(rename = "fetchedAt")]
    fetched_at: DateTime<Utc>,
}

/// Load the snapshot if it exists, parses, and is younger than 24 hours.
/// Anything else (missing, corrupt, expired) yields `None` — the store just
/// starts empty.
pub fn load(path: &Path, now: DateTime<Utc>) -> Option<Vec<Document>> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
        Err(e) => {
            log::warn!("[SNAPSHOT] Failed to read {}: {}", path.display(), e);
            return None;
        }
    };

    let snapshot: Snapshot = match serde_json::from_str(&data) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            log::warn!("[SNAPSHOT] Discarding corrupt snapshot {}: {}", path.display(), e);
            return None;
        }
    };

    if now - snapshot.fetched_at > Duration::hours(MAX_AGE_HOURS) {
        log::info!(
            "[SNAPSHOT] Ignoring snapshot from {} (older than {}h)",
            snapshot.fetched_at,
            MAX_AGE_HOURS
        );
        return None;
    }

    log::info!(
        "[SNAPSHOT] Seeded {} documents from {}",
        snapshot.documents.len(),
        path.display()
    );
    Some(snapshot.documents)
}

/// Replace the snapshot wholesale. Writes to a sibling temp file first and
/// renames it into place, so a crash never leaves a half-written snapshot
/// visible.
pub fn save(path: &Path, documents: &[Document], fetched_at: DateTime<Utc>) -> io::Result<()> {
    let snapshot = Snapshot {
        documents: documents.to_vec(),
        fetched_at,
    };
    let json = serde_json::to_string(&snapshot)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)
}

/// Delete the snapshot. Idempotent: a missing file is not an error.
pub fn delete(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        result => result,
    }
}
