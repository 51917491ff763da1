use anyhow::{Context, Result};
use clap::Parser;

use humblesync::config::Config;
use humblesync::model::Bundle;
use humblesync::notion::{collect_database_pages, NotionClient};
use humblesync::stats;

#[derive(Debug, Parser)]
#[command(author, version, about = "Group bundle spending by category tag")]
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

    let summary = stats::total_spent(&bundles);
    let buckets = stats::spending_by_category(&bundles);

    println!("SPENDING BY CATEGORY");
    println!("(a bundle's price counts toward every tag it carries)");
    println!();
    for bucket in &buckets {
        if bucket.count == 0 {
            continue;
        }
        let share = if summary.total > 0.0 {
            bucket.total / summary.total * 100.0
        } else {
            0.0
        };
        println!(
            "{:<14} ${:>10.2}  ({} bundles, {:.1}%)",
            bucket.name, bucket.total, bucket.count, share
        );
    }
    println!();
    println!("TOTAL SPENT: ${:.2}", summary.total);
    Ok(())
}
