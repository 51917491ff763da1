use anyhow::{Context, Result};
use clap::Parser;

use humblesync::config::Config;
use humblesync::model::Bundle;
use humblesync::notion::{collect_database_pages, NotionClient};
use humblesync::stats;

#[derive(Debug, Parser)]
#[command(author, version, about = "First and last purchase dates and the span between them")]
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

    match stats::date_range(&bundles) {
        Some(range) => {
            println!("Purchase date range");
            println!();
            println!("  first purchase: {}", range.earliest);
            println!("  bundle:         {}", range.earliest_bundle);
            println!();
            println!("  last purchase:  {}", range.latest);
            println!("  bundle:         {}", range.latest_bundle);
            println!();
            println!(
                "  time span: {} days ({:.1} years)",
                range.days(),
                range.years()
            );
            println!();
            println!("  total bundles:     {}", bundles.len());
            println!("  bundles with date: {}", range.with_date);
        }
        None => println!("No purchase dates found in the database."),
    }
    Ok(())
}
