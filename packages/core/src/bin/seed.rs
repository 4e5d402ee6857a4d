//! Seed the content database with the stock entries
//!
//! Opens the configured libsql database (creating it and its schema if
//! needed) and upserts the default `home` and `sobre` entries.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin contentspace-seed
//!
//! # Against a specific database file
//! CONTENTSPACE_DB_PATH=./data/content.db cargo run --bin contentspace-seed
//! ```

use contentspace_core::{
    db::{DatabaseService, LibsqlStore},
    services::{seed_defaults, ContentService},
    ContentConfig,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ContentConfig::from_env();
    config.validate().map_err(anyhow::Error::msg)?;

    println!(
        "📂 Opening content database at {}",
        config.database_path.display()
    );
    let db = match DatabaseService::with_busy_timeout(
        config.database_path.clone(),
        config.busy_timeout_ms,
    )
    .await
    {
        Ok(db) => Arc::new(db),
        Err(e) => {
            eprintln!("❌ Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    let service = ContentService::with_config(Arc::new(LibsqlStore::new(db)), &config);
    service.ping().await?;

    let seeded = seed_defaults(&service).await?;
    for node in &seeded {
        println!("✅ {} = {:?}", node.key, node.value);
    }
    println!("🌱 Seeded {} content entr(ies)", seeded.len());

    Ok(())
}
