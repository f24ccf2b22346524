// crates/server/src/main.rs
//! Wikidex server binary.
//!
//! Opens (or creates) the index database, then serves the indexing and
//! search API on localhost. Configuration comes from the environment; the
//! service owns its database file exclusively and never touches the owning
//! application's relational store.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use wikidex_index::Store;
use wikidex_server::create_app;

/// Default port for the server.
const DEFAULT_PORT: u16 = 7700;

/// Get the server port from environment or use default.
fn get_port() -> u16 {
    std::env::var("WIKIDEX_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Get the index database path from environment or use `search.db` in the
/// working directory.
fn get_db_path() -> PathBuf {
    std::env::var("WIKIDEX_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("search.db"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let db_path = get_db_path();
    let store = Store::open(&db_path).await?;

    let app = create_app(store);

    let port = get_port();
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    eprintln!("\nwikidex v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("  index: {}", db_path.display());
    eprintln!("  \u{2192} http://localhost:{}\n", port);

    axum::serve(listener, app).await?;

    Ok(())
}
