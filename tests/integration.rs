//! End-to-end pipeline over an in-memory page source: paginate a mixed
//! workspace, keep one database's pages, run the analyses, snapshot to disk.
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::json;

use humblesync::backup::{Backup, CSV_HEADER};
use humblesync::categorize::categorize;
use humblesync::model::Bundle;
use humblesync::notion::model::{Page, SearchResponse};
use humblesync::notion::{collect_database_pages, NotionError, SearchSource, SEARCH_PAGE_SIZE};
use humblesync::stats;

const BUNDLES_DB: &str = "db-bundles";

fn page(id: &str, database_id: &str, name: &str, date: Option<&str>, price: Option<f64>) -> Page {
    serde_json::from_value(json!({
        "id": id,
        "parent": { "database_id": database_id },
        "properties": {
            "Name": { "title": [ { "plain_text": name } ] },
            "Purchase Date": { "date": date.map(|d| json!({ "start": d })) },
            "Price": { "number": price },
        }
    }))
    .unwrap()
}

/// Serves a fixed sequence of search pages and records the cursors it saw.
struct ScriptedWorkspace {
    batches: Vec<Vec<Page>>,
    cursors_seen: Mutex<Vec<Option<String>>>,
}

impl ScriptedWorkspace {
    fn new(batches: Vec<Vec<Page>>) -> Self {
        ScriptedWorkspace {
            batches,
            cursors_seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SearchSource for ScriptedWorkspace {
    async fn search_pages(
        &self,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<SearchResponse, NotionError> {
        assert_eq!(page_size, SEARCH_PAGE_SIZE);
        let index = match cursor {
            None => 0,
            Some(c) => c
                .strip_prefix("cursor-")
                .and_then(|n| n.parse::<usize>().ok())
                .unwrap_or_else(|| panic!("unexpected cursor {c}")),
        };
        self.cursors_seen
            .lock()
            .unwrap()
            .push(cursor.map(String::from));
        let has_more = index + 1 < self.batches.len();
        Ok(SearchResponse {
            results: self.batches[index].to_vec(),
            has_more,
            next_cursor: has_more.then(|| format!("cursor-{}", index + 1)),
        })
    }
}

#[tokio::test]
async fn paginated_fetch_feeds_analyses_and_backup() -> Result<()> {
    // Three search pages; foreign-database pages are interleaved throughout.
    let workspace = ScriptedWorkspace::new(vec![
        vec![
            page("b-1", BUNDLES_DB, "Humble Book Bundle: Rust", Some("2020-01-01"), Some(18.0)),
            page("x-1", "db-other", "unrelated note", None, None),
            page("b-2", BUNDLES_DB, "Humble RPG Bundle: Pathfinder", Some("2021-06-15"), Some(25.0)),
        ],
        vec![
            page("b-3", BUNDLES_DB, "Humble Book Bundle: Rust", Some("2023-01-01"), Some(10.0)),
            page("x-2", "db-other", "another workspace page", None, None),
        ],
        vec![page("b-4", BUNDLES_DB, "Mystery Bundle", None, None)],
    ]);

    let pages = collect_database_pages(&workspace, BUNDLES_DB).await?;
    let ids: Vec<&str> = pages.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["b-1", "b-2", "b-3", "b-4"]);

    let cursors = workspace.cursors_seen.lock().unwrap().clone();
    assert_eq!(
        cursors,
        vec![
            None,
            Some("cursor-1".to_string()),
            Some("cursor-2".to_string())
        ]
    );

    let mut bundles: Vec<Bundle> = pages.iter().map(Bundle::from_page).collect();
    for bundle in &mut bundles {
        bundle.categories = categorize(&bundle.name)
            .iter()
            .map(|c| c.as_str().to_string())
            .collect();
    }

    let spent = stats::total_spent(&bundles);
    assert_eq!(spent.total, 53.0);
    assert_eq!(spent.with_price, 3);
    assert_eq!(spent.without_price, 1);

    let by_year = stats::spending_by_year(&bundles);
    let years: Vec<Option<i32>> = by_year.iter().map(|b| b.year).collect();
    assert_eq!(years, vec![Some(2020), Some(2021), Some(2023)]);

    let dupes = stats::find_duplicates(&bundles);
    assert_eq!(dupes.groups.len(), 1);
    assert_eq!(dupes.groups[0].name, "Humble Book Bundle: Rust");
    assert_eq!(dupes.total_wasted(), 10.0);

    let range = stats::date_range(&bundles).unwrap();
    assert_eq!(range.earliest_bundle, "Humble Book Bundle: Rust");
    assert_eq!(range.latest.to_string(), "2023-01-01");
    assert_eq!(range.days(), 1096);
    assert_eq!(range.with_date, 3);

    // Snapshot the same set to disk and check both files come back intact.
    let taken_at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
    let backup = Backup::new(BUNDLES_DB, bundles, taken_at);
    let tmp = tempfile::tempdir()?;
    let (json_path, csv_path) = backup.write_to(tmp.path()).await?;

    let parsed: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json_path)?)?;
    assert_eq!(parsed["database_id"], BUNDLES_DB);
    assert_eq!(parsed["total_bundles"], 4);
    // Sorted ascending, dateless last.
    assert_eq!(parsed["bundles"][0]["page_id"], "b-1");
    assert_eq!(parsed["bundles"][3]["name"], "Mystery Bundle");

    let csv = std::fs::read_to_string(&csv_path)?;
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some(CSV_HEADER));
    assert_eq!(lines.clone().count(), 4);
    assert!(lines.any(|l| l.contains("Humble RPG Bundle: Pathfinder")
        && l.contains("RPG/Tabletop; Books")));
    Ok(())
}
