use anyhow::{Context, Result};
use clap::Parser;

use humblesync::config::Config;
use humblesync::model::Bundle;
use humblesync::notion::{collect_database_pages, NotionClient};
use humblesync::stats;

#[derive(Debug, Parser)]
#[command(author, version, about = "Sum all prices in the Bundles database")]
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

    for bundle in &bundles {
        match bundle.price {
            Some(price) => println!("  {}: ${:.2}", bundle.name, price),
            None => println!("  {}: (no price)", bundle.name),
        }
    }

    let summary = stats::total_spent(&bundles);
    println!();
    println!("Total spent: ${:.2}", summary.total);
    println!("  bundles:        {}", bundles.len());
    println!("  with price:     {}", summary.with_price);
    println!("  without price:  {}", summary.without_price);
    Ok(())
}
