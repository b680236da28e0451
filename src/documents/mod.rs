//! Document model and document-level operations.

pub mod frontmatter;
pub mod paths;
pub mod snapshot;
pub mod store;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub use crate::github::types::FileSha;

/// What kind of document a path is generated for. Each kind lives under its
/// own fixed directory in the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Short-form note; file name derived from the body text.
    Essay,
    /// Long-form article; file name derived from the title.
    Post,
    /// Photo gallery manifest; file name derived from the timestamp alone.
    Gallery,
}

impl DocumentKind {
    pub fn directory(&self) -> &'static str {
        match self {
            DocumentKind::Essay => "essays",
            DocumentKind::Post => "posts",
            DocumentKind::Gallery => "photos",
        }
    }
}

/// One logical essay/post, backed by one remote Markdown file.
///
/// Documents are immutable value objects: updates replace the entry in the
/// store's collection, they never mutate one in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier: the storage file name.
    pub id: String,
    /// Remote blob sha; `None` for a document not yet persisted. Not part
    /// of the durable snapshot, so snapshot-seeded documents must be
    /// re-fetched before saving.
    #[serde(skip)]
    pub sha: Option<FileSha>,
    pub title: Option<String>,
    /// Always present; the parser falls back to the current time when the
    /// header and file name both fail to yield one.
    #[serde(rename = "publishedAt")]
    pub published_at: NaiveDateTime,
    /// Markdown text excluding the header block.
    pub body: String,
    /// Full original text including the header block, preserved verbatim so
    /// unrecognized header fields round-trip untouched.
    #[serde(rename = "rawContent")]
    pub raw_content: String,
}

impl Document {
    /// A document that has not been persisted yet: empty id, no sha. The
    /// store generates its path on first save.
    pub fn draft(body: impl Into<String>, now: NaiveDateTime) -> Self {
        let body = body.into();
        let parsed = frontmatter::parse_with_now(&body, "", now);
        Document {
            id: String::new(),
            sha: None,
            ..parsed
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.sha.is_some()
    }
}
