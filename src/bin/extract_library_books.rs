use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use humblesync::config::Config;
use humblesync::model::{new_book_properties, Bundle};
use humblesync::notion::{collect_database_pages, NotionClient};
use humblesync::storefront::humble::HumbleStorefront;
use humblesync::storefront::webdriver::WebDriver;
use humblesync::storefront::{dedupe_products, names_overlap, Storefront};

#[derive(Debug, Parser)]
#[command(author, version, about = "Extract library books into the Books database")]
struct Args {
    /// Books database id; falls back to NOTION_BOOKS_DB
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
    let books_db = args
        .database
        .or_else(|| cfg.books_db.clone())
        .context("pass a database id or set NOTION_BOOKS_DB")?;
    let creds = cfg.require_humble()?;

    let driver = WebDriver::connect(&cfg.webdriver_url)
        .await
        .with_context(|| format!("cannot reach webdriver at {}", cfg.webdriver_url))?;
    let mut store = HumbleStorefront::new(driver);
    let scraped = async {
        store.login(creds).await?;
        store.list_library().await
    }
    .await;
    store.quit().await?;
    let products = dedupe_products(scraped?);
    info!(count = products.len(), "unique library products");

    let client = NotionClient::new(cfg.notion.token.clone(), cfg.notion.version.clone());

    // Stored bundles, for linking each book back to the bundle it came in.
    let bundles: Vec<Bundle> = match &cfg.bundles_db {
        Some(db) => collect_database_pages(&client, db)
            .await?
            .iter()
            .map(Bundle::from_page)
            .collect(),
        None => {
            warn!("NOTION_BUNDLES_DB not set; books will be created without relations");
            Vec::new()
        }
    };

    if args.dry_run {
        for p in &products {
            let linked = find_bundle(&bundles, &p.bundle_name)
                .map(|b| b.name.as_str())
                .unwrap_or("-");
            println!("{} by {}  [{}]", p.title, p.author, linked);
        }
        println!("\n{} books (dry run, nothing written)", products.len());
        return Ok(());
    }

    let mut created = 0usize;
    let mut linked = 0usize;
    let mut failed = 0usize;
    for product in &products {
        let bundle = find_bundle(&bundles, &product.bundle_name);
        if bundle.is_some() {
            linked += 1;
        }
        let properties = new_book_properties(
            &product.title,
            &product.author,
            bundle.map(|b| b.page_id.as_str()),
        );
        match client.create_page(&books_db, properties).await {
            Ok(_) => created += 1,
            Err(err) => {
                failed += 1;
                warn!(title = %product.title, error = %err, "failed to create book page");
            }
        }
    }

    println!(
        "Created {} book pages, {} linked to a bundle ({} failed)",
        created, linked, failed
    );
    Ok(())
}

fn find_bundle<'a>(bundles: &'a [Bundle], scraped_name: &str) -> Option<&'a Bundle> {
    bundles
        .iter()
        .find(|b| names_overlap(&b.name, scraped_name))
}
