//! CLI entry point: run one mailbox sync for a user and print the outcome
//! as JSON.
//!
//! Configuration comes from `JOBTRAIL_*` environment variables; the Gmail
//! access token from `JOBTRAIL_ACCESS_TOKEN`.

use std::sync::Arc;

use jobtrail::gmail::GmailSource;
use jobtrail::{build_classifier, SqliteStore, StaticToken, SyncConfig, SyncEngine};

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run().await {
        eprintln!("jobtrail: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let user_id = std::env::args()
        .nth(1)
        .ok_or("usage: jobtrail <user-id>")?;
    let token = std::env::var("JOBTRAIL_ACCESS_TOKEN")
        .map_err(|_| "JOBTRAIL_ACCESS_TOKEN is not set")?;

    let config = SyncConfig::from_env();
    let source = GmailSource::new(Arc::new(StaticToken(token)), config.fetch_timeout_secs)?;
    let store = SqliteStore::open_at(&config.db_path)?;
    let classifier = build_classifier(&config);

    let engine = SyncEngine::new(Arc::new(source), classifier, Arc::new(store), config);
    let outcome = engine.sync_user(&user_id).await?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
