use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde_json::json;
use tracing::info;

use humblesync::config::Config;
use humblesync::notion::NotionClient;

#[derive(Debug, Parser)]
#[command(author, version, about = "One-time setup: create the Bundles and Books databases")]
struct Args {
    /// Parent page id; when absent the first page found in the workspace is used
    parent_page: Option<String>,
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
    let client = NotionClient::new(cfg.notion.token.clone(), cfg.notion.version.clone());

    let parent_page_id = match args.parent_page {
        Some(id) => id,
        None => {
            let search = client.search_pages(None, 1).await?;
            search
                .results
                .first()
                .map(|p| p.id.clone())
                .ok_or_else(|| {
                    anyhow!("no pages visible to the integration; share a page with it first")
                })?
        }
    };
    info!(parent = %parent_page_id, "using parent page");

    // The full schema every other script expects, including the category tags.
    let bundle_properties = json!({
        "Name": { "title": {} },
        "Bundle Name": { "rich_text": {} },
        "Purchase Date": { "date": {} },
        "Price": { "number": { "format": "dollar" } },
        "Bundle Type": { "multi_select": {} },
    });
    let bundles_db = client
        .create_database(&parent_page_id, "Humble Bundles", bundle_properties)
        .await
        .context("failed to create Bundles database")?;
    println!("Bundles database created: {}", bundles_db.id);

    let book_properties = json!({
        "Name": { "title": {} },
        "Title": { "rich_text": {} },
        "Author": { "rich_text": {} },
        "Publisher": { "rich_text": {} },
        "Bundles": {
            "relation": {
                "database_id": bundles_db.id,
                "type": "dual_property",
                "dual_property": { "synced_property_name": "Books" }
            }
        },
    });
    let books_db = client
        .create_database(&parent_page_id, "Humble Bundle Books", book_properties)
        .await
        .context("failed to create Books database")?;
    println!("Books database created: {}", books_db.id);

    println!();
    if let Some(url) = &bundles_db.url {
        println!("Bundles: {}", url);
    }
    if let Some(url) = &books_db.url {
        println!("Books:   {}", url);
    }
    println!();
    println!("Save these ids for the other scripts:");
    println!("  NOTION_BUNDLES_DB=\"{}\"", bundles_db.id);
    println!("  NOTION_BOOKS_DB=\"{}\"", books_db.id);
    Ok(())
}
