use anyhow::{Context, Result};
use clap::Parser;

use humblesync::config::Config;
use humblesync::model::Bundle;
use humblesync::notion::{collect_database_pages, NotionClient};
use humblesync::stats;

#[derive(Debug, Parser)]
#[command(author, version, about = "Report bundles that were purchased more than once")]
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

    let report = stats::find_duplicates(&bundles);
    if report.groups.is_empty() {
        println!("No duplicate purchases found. Every bundle was purchased only once.");
        return Ok(());
    }

    println!(
        "Duplicate purchases ({} bundles bought more than once):",
        report.groups.len()
    );
    println!();
    for group in &report.groups {
        println!("{}", group.name);
        println!("  purchased {} times:", group.count());
        for (idx, (date, price)) in group.purchases.iter().enumerate() {
            let date = date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "unknown date".to_string());
            println!("    {}. {} - ${:.2}", idx + 1, date, price);
        }
        println!();
    }

    println!("Summary:");
    println!("  total entries in database:  {}", report.total_entries);
    println!("  unique bundles:             {}", report.unique_names);
    println!("  bundles bought repeatedly:  {}", report.groups.len());
    println!("  over-purchases:             {}", report.over_purchases());
    println!("  money wasted on duplicates: ${:.2}", report.total_wasted());
    Ok(())
}
