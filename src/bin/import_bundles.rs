use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use humblesync::config::Config;
use humblesync::import;
use humblesync::model::new_bundle_properties;
use humblesync::notion::NotionClient;

#[derive(Debug, Parser)]
#[command(author, version, about = "Create one bundle page per line of a flat-text purchase list")]
struct Args {
    /// Purchase list, one `<name> <Month D, YYYY> <$amount|--|Gift>` per line
    #[arg(default_value = "bundles.txt")]
    file: PathBuf,
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
    let database_id = cfg
        .bundles_db
        .clone()
        .context("no bundles database id: set NOTION_BUNDLES_DB")?;

    let content = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let client = NotionClient::new(cfg.notion.token.clone(), cfg.notion.version.clone());

    let mut imported = 0usize;
    let mut failed = 0usize;
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let Some(purchase) = import::parse_line(line) else {
            warn!("could not parse line: {}", truncate(line, 80));
            failed += 1;
            continue;
        };

        let properties =
            new_bundle_properties(&purchase.name, purchase.purchase_date, purchase.price);
        match client.create_page(&database_id, properties).await {
            Ok(_) => {
                imported += 1;
                info!("imported: {} (${:.2})", purchase.name, purchase.price);
            }
            Err(err) => {
                warn!(?err, "failed to import: {}", purchase.name);
                failed += 1;
            }
        }
    }

    println!("Import complete");
    println!("  imported: {}", imported);
    println!("  failed:   {}", failed);
    Ok(())
}

fn truncate(line: &str, max: usize) -> &str {
    match line.char_indices().nth(max) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}
