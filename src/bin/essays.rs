//! List the configured repository's essays, newest first.
//!
//! Configuration comes from the environment (or a `.env` file):
//! `GITHUB_TOKEN`, `GITHUB_OWNER`, `GITHUB_REPO`, `GITHUB_BRANCH`.

use dotenv::dotenv;

use inkstore::{DocumentKind, DocumentStore, StoreConfig};

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    let config = StoreConfig::from_env();
    let store = DocumentStore::from_config(config, DocumentKind::Essay);

    match store.list(false).await {
        Ok(documents) => {
            log::info!("Listed {} essays", documents.len());
            for document in &documents {
                println!(
                    "{}  {}  {}",
                    document.published_at.format("%Y-%m-%d %H:%M"),
                    document.id,
                    document.title.as_deref().unwrap_or("-")
                );
            }
        }
        Err(e) => {
            log::error!("Listing failed: {}", e);
            std::process::exit(1);
        }
    }
}
