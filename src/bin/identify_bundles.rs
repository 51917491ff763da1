use anyhow::{Context, Result};
use clap::Parser;
use std::collections::BTreeMap;

use humblesync::categorize::primary_category;
use humblesync::config::Config;
use humblesync::model::{Bundle, Category};
use humblesync::notion::{collect_database_pages, NotionClient};

#[derive(Debug, Parser)]
#[command(author, version, about = "Read-only classification listing of bundle titles")]
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
    let bundles: Vec<Bundle> = pages.iter().map(Bundle::from_page).collect();

    let mut buckets: BTreeMap<&'static str, Vec<&str>> = BTreeMap::new();
    for bundle in &bundles {
        buckets
            .entry(primary_category(&bundle.name).as_str())
            .or_default()
            .push(bundle.name.as_str());
    }

    // Fixed display order, not alphabetical.
    for category in Category::ALL {
        let Some(titles) = buckets.get_mut(category.as_str()) else {
            continue;
        };
        titles.sort();
        println!("{} ({}):", category, titles.len());
        for title in titles.iter() {
            println!("  - {}", title);
        }
        println!();
    }

    println!("Summary:");
    for category in Category::ALL {
        let count = buckets.get(category.as_str()).map_or(0, Vec::len);
        println!("  {:<14} {}", category.as_str(), count);
    }
    println!("  {:<14} {}", "Total", bundles.len());
    Ok(())
}
