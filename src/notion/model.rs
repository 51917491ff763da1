use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Deserialize, Debug)]
pub struct DatabaseProperty {
    pub id: String,
    #[serde(rename = "type")]
    pub typ: String,
}

#[derive(Deserialize, Debug)]
pub struct RetrieveDatabaseResp {
    pub id: String,
    #[serde(default)]
    pub title: Vec<Value>,
    pub properties: HashMap<String, DatabaseProperty>,
}

#[derive(Deserialize, Debug)]
pub struct CreatedDatabase {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// One result of the global search endpoint. Properties stay as raw JSON;
/// the typed accessors below decode per field shape.
#[derive(Deserialize, Debug, Clone)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub parent: Parent,
    #[serde(default)]
    pub properties: serde_json::Map<String, Value>,
    #[serde(default)]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_edited_time: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Parent {
    #[serde(default)]
    pub database_id: Option<String>,
    #[serde(default)]
    pub page_id: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct SearchResponse {
    pub results: Vec<Page>,
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

impl Page {
    pub fn in_database(&self, database_id: &str) -> bool {
        self.parent.database_id.as_deref() == Some(database_id)
    }

    fn prop(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// First fragment of a title property, as plain text.
    pub fn title_text(&self, name: &str) -> Option<String> {
        fragment_text(self.prop(name)?.get("title")?)
    }

    /// First fragment of a rich_text property, as plain text.
    pub fn rich_text(&self, name: &str) -> Option<String> {
        fragment_text(self.prop(name)?.get("rich_text")?)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.prop(name)?.get("number")?.as_f64()
    }

    /// Start of a date property. Datetime values are truncated to the day.
    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        let start = self.prop(name)?.get("date")?.get("start")?.as_str()?;
        let day = start.get(..10)?;
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }

    pub fn multi_select(&self, name: &str) -> Vec<String> {
        self.prop(name)
            .and_then(|v| v.get("multi_select"))
            .and_then(Value::as_array)
            .map(|opts| {
                opts.iter()
                    .filter_map(|o| o.get("name").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn relation_ids(&self, name: &str) -> Vec<String> {
        self.prop(name)
            .and_then(|v| v.get("relation"))
            .and_then(Value::as_array)
            .map(|rels| {
                rels.iter()
                    .filter_map(|r| r.get("id").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Text of the first fragment in a title/rich_text array. Falls back from
/// `plain_text` to `text.content` (create responses omit the former).
fn fragment_text(fragments: &Value) -> Option<String> {
    let first = fragments.as_array()?.first()?;
    let text = first
        .get("plain_text")
        .and_then(Value::as_str)
        .or_else(|| {
            first
                .get("text")
                .and_then(|t| t.get("content"))
                .and_then(Value::as_str)
        })?;
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
