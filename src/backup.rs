//! Timestamped JSON + CSV snapshots of the Bundles database.
//!
//! Write-once: nothing in this repository ever reads a backup back.
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::model::Bundle;

pub const CSV_HEADER: &str = "Name,Purchase Date,Price,Bundle Types,ID";
const CATEGORY_JOIN: &str = "; ";

#[derive(Debug, Serialize)]
pub struct Backup {
    pub backup_date: DateTime<Utc>,
    pub database_id: String,
    pub total_bundles: usize,
    pub bundles: Vec<Bundle>,
}

impl Backup {
    /// Snapshot of a full bundle dump, sorted by purchase date ascending with
    /// dateless entries last.
    pub fn new(database_id: &str, mut bundles: Vec<Bundle>, taken_at: DateTime<Utc>) -> Self {
        bundles.sort_by_key(|b| match b.purchase_date {
            Some(date) => (0, date),
            None => (1, chrono::NaiveDate::MAX),
        });
        Backup {
            backup_date: taken_at,
            database_id: database_id.to_string(),
            total_bundles: bundles.len(),
            bundles,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize backup")
    }

    pub fn to_csv(&self) -> String {
        let mut out = String::from(CSV_HEADER);
        out.push('\n');
        for bundle in &self.bundles {
            let date = bundle
                .purchase_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            let types = bundle.categories.join(CATEGORY_JOIN);
            let row = [
                csv_field(&bundle.name),
                csv_field(&date),
                format!("{:.2}", bundle.price.unwrap_or(0.0)),
                csv_field(&types),
                csv_field(&bundle.page_id),
            ];
            out.push_str(&row.join(","));
            out.push('\n');
        }
        out
    }

    /// Write both snapshot files into `dir` (created on demand); returns the
    /// JSON and CSV paths.
    pub async fn write_to(&self, dir: &Path) -> Result<(PathBuf, PathBuf)> {
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create backup dir {}", dir.display()))?;
        let slug = timestamp_slug(self.backup_date);
        let json_path = dir.join(format!("humble-bundles-backup-{slug}.json"));
        let csv_path = dir.join(format!("humble-bundles-backup-{slug}.csv"));
        fs::write(&json_path, self.to_json()?)
            .await
            .with_context(|| format!("failed to write {}", json_path.display()))?;
        fs::write(&csv_path, self.to_csv())
            .await
            .with_context(|| format!("failed to write {}", csv_path.display()))?;
        Ok((json_path, csv_path))
    }
}

/// Filesystem-safe timestamp shared by both files of one backup run.
pub fn timestamp_slug(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H-%M-%S").to_string()
}

/// RFC-4180 quoting: fields with commas, quotes, or newlines are wrapped in
/// double quotes and embedded quotes doubled.
fn csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bundle(name: &str, date: Option<&str>, price: Option<f64>, tags: &[&str]) -> Bundle {
        Bundle {
            page_id: format!("id-{}", name.len()),
            name: name.to_string(),
            purchase_date: date.map(|d| d.parse().unwrap()),
            price,
            categories: tags.iter().map(|t| t.to_string()).collect(),
            created_time: None,
            last_edited_time: None,
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 45).unwrap()
    }

    /// Minimal CSV reader for round-trip checks (quotes + doubled quotes).
    fn parse_csv(text: &str) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        let mut row = Vec::new();
        let mut field = String::new();
        let mut in_quotes = false;
        let mut chars = text.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '"' if in_quotes => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                '"' => in_quotes = true,
                ',' if !in_quotes => row.push(std::mem::take(&mut field)),
                '\n' if !in_quotes => {
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                }
                _ => field.push(ch),
            }
        }
        if !field.is_empty() || !row.is_empty() {
            row.push(field);
            rows.push(row);
        }
        rows
    }

    #[test]
    fn backup_sorts_by_date_dateless_last() {
        let backup = Backup::new(
            "db-1",
            vec![
                bundle("late", Some("2024-01-01"), None, &[]),
                bundle("none", None, None, &[]),
                bundle("early", Some("2020-01-01"), None, &[]),
            ],
            noon(),
        );
        let names: Vec<&str> = backup.bundles.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["early", "late", "none"]);
        assert_eq!(backup.total_bundles, 3);
    }

    #[test]
    fn csv_round_trips_quotes_and_delimiters() {
        let backup = Backup::new(
            "db-1",
            vec![bundle(
                "Bundle \"Deluxe\", Director's Cut",
                Some("2023-05-06"),
                Some(12.5),
                &["RPG/Tabletop", "Books"],
            )],
            noon(),
        );
        let csv = backup.to_csv();
        let rows = parse_csv(&csv);
        assert_eq!(rows[0].join(","), CSV_HEADER);
        let row = &rows[1];
        assert_eq!(row[0], "Bundle \"Deluxe\", Director's Cut");
        assert_eq!(row[1], "2023-05-06");
        assert_eq!(row[2], "12.50");
        assert_eq!(row[3], "RPG/Tabletop; Books");
    }

    #[test]
    fn csv_missing_values_render_empty_date_and_zero_price() {
        let backup = Backup::new("db-1", vec![bundle("plain", None, None, &[])], noon());
        let rows = parse_csv(&backup.to_csv());
        assert_eq!(rows[1][1], "");
        assert_eq!(rows[1][2], "0.00");
        assert_eq!(rows[1][3], "");
    }

    #[test]
    fn timestamp_slug_is_filesystem_safe() {
        let slug = timestamp_slug(noon());
        assert_eq!(slug, "2026-03-01T12-30-45");
        assert!(!slug.contains(':'));
    }

    #[tokio::test]
    async fn write_to_creates_dir_and_both_files() {
        let td = tempfile::tempdir().unwrap();
        let dir = td.path().join("backups");
        let backup = Backup::new(
            "db-1",
            vec![bundle("a", Some("2022-02-02"), Some(3.0), &["Books"])],
            noon(),
        );
        let (json_path, csv_path) = backup.write_to(&dir).await.unwrap();
        assert!(json_path.exists());
        assert!(csv_path.exists());

        let raw = std::fs::read_to_string(&json_path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["database_id"], "db-1");
        assert_eq!(parsed["total_bundles"], 1);
        assert_eq!(parsed["bundles"][0]["name"], "a");
    }
}
