use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use humblesync::config::Config;
use humblesync::model::{fields, UNTITLED};
use humblesync::notion::{collect_database_pages, NotionClient};

#[derive(Debug, Parser)]
#[command(author, version, about = "Soft-delete every page in the Bundles database")]
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
    let pages = collect_database_pages(&client, &database_id).await?;
    info!(count = pages.len(), "bundles fetched");

    let mut archived = 0usize;
    let mut failed = 0usize;
    for page in &pages {
        let title = page
            .title_text(fields::NAME)
            .unwrap_or_else(|| UNTITLED.to_string());
        match client.archive_page(&page.id).await {
            Ok(()) => {
                archived += 1;
                println!("  archived: {}", title);
            }
            Err(err) => {
                warn!(?err, "failed to archive: {}", title);
                failed += 1;
            }
        }
    }

    println!();
    println!("Archived {} bundles ({} failed)", archived, failed);
    Ok(())
}
