use std::env;
use std::path::PathBuf;

/// Repository target and credentials for the contents API.
///
/// All fields are plain strings read from the environment; credential
/// storage beyond that is the caller's problem. An empty token or repo
/// target surfaces as `StoreError::NotConfigured` at request time rather
/// than panicking here, so the parser and cache stay usable offline.
#[derive(Clone)]
pub struct StoreConfig {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    /// Where the durable cache snapshot lives.
    pub snapshot_path: PathBuf,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self {
            token: env::var("GITHUB_TOKEN").unwrap_or_default(),
            owner: env::var("GITHUB_OWNER").unwrap_or_default(),
            repo: env::var("GITHUB_REPO").unwrap_or_default(),
            branch: env::var("GITHUB_BRANCH").unwrap_or_else(|_| "master".to_string()),
            snapshot_path: env::var("INKSTORE_SNAPSHOT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./.inkstore/snapshot.json")),
        }
    }

    /// True when every field needed to reach the remote is present.
    pub fn is_configured(&self) -> bool {
        !self.token.is_empty() && !self.owner.is_empty() && !self.repo.is_empty()
    }
}
