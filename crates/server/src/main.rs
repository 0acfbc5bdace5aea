//! idxwatch server entry point.
//!
//! Boots the MCP server on stdio transport. Logging goes to stderr to avoid
//! interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

use idxwatch_client::{FetchClient, FetchConfig, SearchQuery, StatusClassifier};
use idxwatch_core::{AppConfig, CacheDb, ResultCache};

mod controller;
mod handler;
mod indicator;
mod tools;

use controller::{Exclusions, StatusController};
use indicator::IconBoard;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        db_path = %config.db_path.display(),
        cache_mode = ?config.cache_mode,
        "Starting idxwatch server on stdio transport"
    );

    let db = CacheDb::open(&config.db_path).await?;
    if !config.target_domains.is_empty() {
        db.replace_domains(&config.target_domains).await?;
    }

    let fetcher = FetchClient::new(FetchConfig::from(&config))?;
    let cache = ResultCache::new(Arc::new(db.clone()), config.cache_mode).with_ttl(config.cache_ttl());
    let classifier = StatusClassifier::new(Arc::new(fetcher), SearchQuery::from(&config), cache);

    let board = Arc::new(IconBoard::new());
    let controller =
        StatusController::new(classifier, Arc::new(db.clone()), board.clone(), Exclusions::from(&config));
    let (navigation, subscription) = controller.clone().subscribe();

    let handler = handler::IdxWatchServer::new(controller, navigation, board, db);
    let server = serve_server(handler, stdio()).await?;

    server.waiting().await?;
    subscription.stop().await;
    tracing::info!("idxwatch server stopped");

    Ok(())
}
