use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use humblesync::config::Config;
use humblesync::import::{parse_price, parse_purchase_date};
use humblesync::model::new_bundle_properties;
use humblesync::notion::NotionClient;
use humblesync::storefront::humble::HumbleStorefront;
use humblesync::storefront::webdriver::WebDriver;
use humblesync::storefront::{RawPurchase, Storefront};

#[derive(Debug, Parser)]
#[command(author, version, about = "Scrape the Humble purchase history into Notion")]
struct Args {
    /// Target database id; falls back to NOTION_BUNDLES_DB
    database: Option<String>,
    /// List what would be created without writing anything
    #[arg(long)]
    dry_run: bool,
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
        .context("pass a database id or set NOTION_BUNDLES_DB")?;
    let creds = cfg.require_humble()?;

    let driver = WebDriver::connect(&cfg.webdriver_url)
        .await
        .with_context(|| format!("cannot reach webdriver at {}", cfg.webdriver_url))?;
    let mut store = HumbleStorefront::new(driver);

    // Always tear the browser session down, even when scraping fails.
    let scraped = async {
        store.login(creds).await?;
        store.list_purchases().await
    }
    .await;
    store.quit().await?;
    let purchases = scraped?;
    info!(count = purchases.len(), "scraped purchase rows");

    if args.dry_run {
        for p in &purchases {
            println!("{}  |  {}  |  {}", p.name, p.date_text, p.price_text);
        }
        println!("\n{} purchases (dry run, nothing written)", purchases.len());
        return Ok(());
    }

    let client = NotionClient::new(cfg.notion.token.clone(), cfg.notion.version.clone());
    let mut created = 0usize;
    let mut failed = 0usize;
    for RawPurchase {
        name,
        date_text,
        price_text,
    } in purchases
    {
        let date = parse_purchase_date(&date_text);
        if date.is_none() {
            warn!(name = %name, raw = %date_text, "unparseable purchase date");
        }
        let price = parse_price(&price_text);
        let properties = new_bundle_properties(&name, date, price);
        match client.create_page(&database_id, properties).await {
            Ok(_) => created += 1,
            Err(err) => {
                failed += 1;
                warn!(name = %name, error = %err, "failed to create page");
            }
        }
    }

    println!("Created {} bundle pages ({} failed)", created, failed);
    Ok(())
}
