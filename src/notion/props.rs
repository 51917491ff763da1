//! Builders for Notion property values, one per field shape the scripts write.
use chrono::NaiveDate;
use serde_json::{json, Value};

pub fn title(content: &str) -> Value {
    json!({ "title": [ { "text": { "content": content } } ] })
}

pub fn rich_text(content: &str) -> Value {
    json!({ "rich_text": [ { "type": "text", "text": { "content": content } } ] })
}

/// An empty rich_text value, used to clear a property.
pub fn empty_rich_text() -> Value {
    json!({ "rich_text": [] })
}

pub fn number(value: f64) -> Value {
    json!({ "number": value })
}

/// A date property; `None` writes an explicit null date.
pub fn date(value: Option<NaiveDate>) -> Value {
    match value {
        Some(d) => json!({ "date": { "start": d.format("%Y-%m-%d").to_string() } }),
        None => json!({ "date": null }),
    }
}

pub fn multi_select<S: AsRef<str>>(names: &[S]) -> Value {
    let options: Vec<Value> = names
        .iter()
        .map(|n| json!({ "name": n.as_ref() }))
        .collect();
    json!({ "multi_select": options })
}

pub fn relation<S: AsRef<str>>(page_ids: &[S]) -> Value {
    let refs: Vec<Value> = page_ids
        .iter()
        .map(|id| json!({ "id": id.as_ref() }))
        .collect();
    json!({ "relation": refs })
}
