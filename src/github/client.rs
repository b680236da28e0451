//! Authenticated client for the GitHub contents API.
//!
//! Translates document-store intents into the API's HTTP contract. Every
//! operation is a single attempt: no retry, no backoff. Resilience (cache
//! fallback) lives one layer up in the document store.

use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::http::shared_client;

use super::types::{
    decode_content, encode_content, ContentFile, FileSha, PutContentRequest, PutContentResponse,
    RemoteFile, WriteOutcome,
};

const API_BASE: &str = "https://api.github.com";
const ACCEPT_JSON: &str = "application/vnd.github+json";

/// Content of a single remote file plus its concurrency token.
#[derive(Debug, Clone)]
pub struct FetchedFile {
    pub text: String,
    pub sha: FileSha,
}

/// The seam between the document store and the remote file store.
///
/// `GitHubClient` is the production implementation; tests substitute an
/// in-memory fake.
#[async_trait]
pub trait RemoteContent: Send + Sync {
    /// List a directory. Fails with `NotConfigured` before any request is
    /// made if no credential/repository target is set.
    async fn list_dir(&self, dir: &str) -> Result<Vec<RemoteFile>, StoreError>;

    /// Read one file. A 404 is not an error: it maps to `Ok(None)` so
    /// callers can distinguish "absent" from "failed".
    async fn read_file(&self, path: &str) -> Result<Option<FetchedFile>, StoreError>;

    /// Create (sha = None) or update (sha = Some) a file. A sha mismatch
    /// surfaces as `StoreError::Conflict`.
    async fn create_or_update(
        &self,
        path: &str,
        content: &str,
        message: &str,
        sha: Option<&FileSha>,
    ) -> Result<WriteOutcome, StoreError>;

    /// Upload raw bytes to a generated path. No sha: asset paths are
    /// derived from high-resolution timestamps and assumed not to pre-exist.
    async fn upload_asset(
        &self,
        bytes: &[u8],
        path: &str,
        message: &str,
    ) -> Result<WriteOutcome, StoreError>;
}

pub struct GitHubClient {
    client: Client,
    config: StoreConfig,
}

impl GitHubClient {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            client: shared_client().clone(),
            config,
        }
    }

    /// Compose `/repos/{owner}/{repo}/contents/{path}`, percent-encoding
    /// each path segment (file names may contain CJK characters).
    fn contents_url(&self, path: &str) -> Result<String, StoreError> {
        let encoded: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| urlencoding::encode(s).into_owned())
            .collect();
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            API_BASE,
            self.config.owner,
            self.config.repo,
            encoded.join("/")
        );
        reqwest::Url::parse(&url).map_err(|_| StoreError::InvalidUrl(url.clone()))?;
        Ok(url)
    }

    fn ensure_configured(&self) -> Result<(), StoreError> {
        if self.config.is_configured() {
            Ok(())
        } else {
            Err(StoreError::NotConfigured)
        }
    }

    fn authed_get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.config.token))
            .header(header::ACCEPT, ACCEPT_JSON)
            .header(header::USER_AGENT, "inkstore")
            .query(&[("ref", self.config.branch.as_str())])
    }

    async fn put_content(
        &self,
        path: &str,
        body: PutContentRequest,
    ) -> Result<WriteOutcome, StoreError> {
        self.ensure_configured()?;
        let url = self.contents_url(path)?;
        log::debug!("[GITHUB] PUT {}", url);

        let response = self
            .client
            .put(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.config.token))
            .header(header::ACCEPT, ACCEPT_JSON)
            .header(header::USER_AGENT, "inkstore")
            .json(&body)
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            log::warn!("[GITHUB] Write conflict on {}", path);
            return Err(StoreError::Conflict {
                path: path.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let envelope: PutContentResponse = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(format!("put response: {}", e)))?;

        log::info!(
            "[GITHUB] Wrote {} (sha {})",
            envelope.content.path,
            envelope.content.sha
        );
        Ok(WriteOutcome {
            sha: FileSha::new(envelope.content.sha),
            canonical_url: envelope.content.html_url,
        })
    }
}

#[async_trait]
impl RemoteContent for GitHubClient {
    async fn list_dir(&self, dir: &str) -> Result<Vec<RemoteFile>, StoreError> {
        self.ensure_configured()?;
        let url = self.contents_url(dir)?;
        log::debug!("[GITHUB] GET {}", url);

        let response = self.authed_get(&url).send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        response
            .json::<Vec<RemoteFile>>()
            .await
            .map_err(|e| StoreError::InvalidResponse(format!("directory listing: {}", e)))
    }

    async fn read_file(&self, path: &str) -> Result<Option<FetchedFile>, StoreError> {
        self.ensure_configured()?;
        let url = self.contents_url(path)?;
        log::debug!("[GITHUB] GET {}", url);

        let response = self.authed_get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let file: ContentFile = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(format!("file metadata: {}", e)))?;
        if file.encoding != "base64" {
            return Err(StoreError::InvalidResponse(format!(
                "unexpected encoding `{}` for {}",
                file.encoding, file.path
            )));
        }

        let text = decode_content(&file.content)?;
        Ok(Some(FetchedFile {
            text,
            sha: FileSha::new(file.sha),
        }))
    }

    async fn create_or_update(
        &self,
        path: &str,
        content: &str,
        message: &str,
        sha: Option<&FileSha>,
    ) -> Result<WriteOutcome, StoreError> {
        let body = PutContentRequest {
            message: message.to_string(),
            content: encode_content(content.as_bytes()),
            branch: self.config.branch.clone(),
            sha: sha.map(|s| s.as_str().to_string()),
        };
        self.put_content(path, body).await
    }

    async fn upload_asset(
        &self,
        bytes: &[u8],
        path: &str,
        message: &str,
    ) -> Result<WriteOutcome, StoreError> {
        let body = PutContentRequest {
            message: message.to_string(),
            content: encode_content(bytes),
            branch: self.config.branch.clone(),
            sha: None,
        };
        self.put_content(path, body).await
    }
}

/// Turn a non-2xx response into `StoreError::Api`, pulling the `message`
/// field out of the JSON error body when there is one.
async fn api_error(response: Response) -> StoreError {
    let status = response.status().as_u16();
    let message = match response.text().await {
        Ok(body) => serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or(body),
        Err(e) => format!("failed to read error body: {}", e),
    };
    StoreError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_client() -> GitHubClient {
        GitHubClient::new(StoreConfig {
            token: "ghp_test".to_string(),
            owner: "someone".to_string(),
            repo: "blog".to_string(),
            branch: "master".to_string(),
            snapshot_path: PathBuf::from("/tmp/snapshot.json"),
        })
    }

    #[test]
    fn test_contents_url_encodes_segments() {
        let client = test_client();
        assert_eq!(
            client.contents_url("essays/2025-01-01-随笔-120000.md").unwrap(),
            "https://api.github.com/repos/someone/blog/contents/essays/\
             2025-01-01-%E9%9A%8F%E7%AC%94-120000.md"
        );
    }

    #[test]
    fn test_contents_url_skips_empty_segments() {
        let client = test_client();
        assert_eq!(
            client.contents_url("/essays/").unwrap(),
            "https://api.github.com/repos/someone/blog/contents/essays"
        );
    }

    #[tokio::test]
    async fn test_unconfigured_client_fails_before_any_request() {
        let client = GitHubClient::new(StoreConfig {
            token: String::new(),
            owner: String::new(),
            repo: String::new(),
            branch: "master".to_string(),
            snapshot_path: PathBuf::from("/tmp/snapshot.json"),
        });
        let err = client.list_dir("essays").await.unwrap_err();
        assert!(matches!(err, StoreError::NotConfigured));
    }
}
