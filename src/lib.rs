//! GitHub-backed Markdown document store.
//!
//! Persists short documents ("essays") as individual Markdown files in a
//! GitHub repository via the contents API, each carrying an optional
//! frontmatter header. The store layers a two-tier cache (in-memory TTL +
//! durable JSON snapshot) over the remote API and uses blob shas for
//! optimistic concurrency on writes.

pub mod config;
pub mod documents;
pub mod error;
pub mod github;
pub mod http;

pub use config::StoreConfig;
pub use documents::store::DocumentStore;
pub use documents::{Document, DocumentKind, FileSha};
pub use error::StoreError;
pub use github::client::{FetchedFile, GitHubClient, RemoteContent};
