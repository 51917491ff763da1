use anyhow::{Context, Result};
use clap::Parser;
use serde_json::{Map, Value};
use tracing::{info, warn};

use humblesync::config::Config;
use humblesync::model::fields;
use humblesync::notion::{collect_database_pages, props, NotionClient};

/// One-off field migration: the Author column was holding publisher names.
#[derive(Debug, Parser)]
#[command(author, version, about = "Move Author contents into Publisher on every book, clearing Author")]
struct Args {
    /// Books database id (defaults to NOTION_BOOKS_DB)
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
        .or_else(|| cfg.books_db.clone())
        .context("no books database id: pass one as argument or set NOTION_BOOKS_DB")?;

    let client = NotionClient::new(cfg.notion.token.clone(), cfg.notion.version.clone());
    let pages = collect_database_pages(&client, &database_id).await?;
    info!(count = pages.len(), "books fetched");

    let mut updated = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;
    for page in &pages {
        let Some(author) = page.rich_text(fields::AUTHOR) else {
            skipped += 1;
            continue;
        };

        let mut properties = Map::new();
        properties.insert(fields::PUBLISHER.to_string(), props::rich_text(&author));
        properties.insert(fields::AUTHOR.to_string(), props::empty_rich_text());
        match client.update_page(&page.id, Value::Object(properties)).await {
            Ok(()) => {
                updated += 1;
                if updated % 50 == 0 {
                    info!(updated, "migration progress");
                }
            }
            Err(err) => {
                warn!(?err, page_id = %page.id, "failed to update book");
                failed += 1;
            }
        }
    }

    println!("Migration complete");
    println!("  total books: {}", pages.len());
    println!("  updated:     {}", updated);
    println!("  skipped (no author data): {}", skipped);
    println!("  failed:      {}", failed);
    Ok(())
}
