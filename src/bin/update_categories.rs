use anyhow::{Context, Result};
use clap::Parser;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{info, warn};

use humblesync::categorize::categorize;
use humblesync::config::Config;
use humblesync::model::{fields, Category, UNTITLED};
use humblesync::notion::{collect_database_pages, props, NotionClient};

#[derive(Debug, Parser)]
#[command(author, version, about = "Recategorize every bundle and update its Bundle Type tags")]
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

    let mut per_category: HashMap<&'static str, usize> = HashMap::new();
    let mut updated = 0usize;
    let mut failed = 0usize;

    for page in &pages {
        let title = page
            .title_text(fields::NAME)
            .unwrap_or_else(|| UNTITLED.to_string());
        let categories = categorize(&title);
        let names: Vec<&str> = categories.iter().map(Category::as_str).collect();

        let mut properties = Map::new();
        properties.insert(
            fields::BUNDLE_TYPE.to_string(),
            props::multi_select(&names),
        );
        match client.update_page(&page.id, Value::Object(properties)).await {
            Ok(()) => {
                for name in &names {
                    *per_category.entry(*name).or_insert(0) += 1;
                }
                updated += 1;
                println!("  {:<30} - {}", names.join(", "), title);
            }
            Err(err) => {
                warn!(?err, "failed to update: {}", title);
                failed += 1;
            }
        }
    }

    println!();
    println!("Update complete");
    println!("  updated: {}", updated);
    println!("  failed:  {}", failed);
    println!();
    println!("Category breakdown (bundles can carry several tags):");
    for category in Category::ALL {
        let count = per_category.get(category.as_str()).copied().unwrap_or(0);
        println!("  {:<14} {}", category.as_str(), count);
    }
    Ok(())
}
