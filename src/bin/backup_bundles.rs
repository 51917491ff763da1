use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::info;

use humblesync::backup::Backup;
use humblesync::config::Config;
use humblesync::model::Bundle;
use humblesync::notion::{collect_database_pages, NotionClient};

#[derive(Debug, Parser)]
#[command(author, version, about = "Write a timestamped JSON + CSV snapshot of the Bundles database")]
struct Args {
    /// Bundles database id (defaults to NOTION_BUNDLES_DB)
    database: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = Config::from_env()?;
    let database_id = args
        .database
        .or_else(|| cfg.bundles_db.clone())
        .context("no bundles database id: pass one as argument or set NOTION_BUNDLES_DB")?;

    let client = NotionClient::new(cfg.notion.token.clone(), cfg.notion.version.clone());
    info!("fetching all bundles");
    let pages = collect_database_pages(&client, &database_id).await?;
    let bundles: Vec<Bundle> = pages.iter().map(Bundle::from_page).collect();
    info!(count = bundles.len(), "bundles fetched");

    let backup = Backup::new(&database_id, bundles, Utc::now());
    let (json_path, csv_path) = backup.write_to(&cfg.backup_dir).await?;

    let size_kb = |path: &std::path::Path| {
        std::fs::metadata(path)
            .map(|m| m.len() as f64 / 1024.0)
            .unwrap_or(0.0)
    };
    println!("Backup complete");
    println!("  bundles backed up: {}", backup.total_bundles);
    println!("  {} ({:.2} KB)", json_path.display(), size_kb(&json_path));
    println!("  {} ({:.2} KB)", csv_path.display(), size_kb(&csv_path));
    Ok(())
}
