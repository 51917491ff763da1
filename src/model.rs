use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::notion::model::Page;
use crate::notion::props;

/// Property display names shared by every script that touches the two databases.
pub mod fields {
    pub const NAME: &str = "Name";
    pub const BUNDLE_NAME: &str = "Bundle Name";
    pub const PURCHASE_DATE: &str = "Purchase Date";
    pub const PRICE: &str = "Price";
    pub const BUNDLE_TYPE: &str = "Bundle Type";

    pub const BOOK_TITLE: &str = "Title";
    pub const AUTHOR: &str = "Author";
    pub const PUBLISHER: &str = "Publisher";
    pub const BUNDLES_RELATION: &str = "Bundles";
}

pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    VideoGames,
    Books,
    ComicsManga,
    RpgTabletop,
    Software,
    Music,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::VideoGames,
        Category::Books,
        Category::ComicsManga,
        Category::RpgTabletop,
        Category::Software,
        Category::Music,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::VideoGames => "Video Games",
            Category::Books => "Books",
            Category::ComicsManga => "Comics/Manga",
            Category::RpgTabletop => "RPG/Tabletop",
            Category::Software => "Software",
            Category::Music => "Music",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One purchase event, mirrored from a page in the Bundles database.
#[derive(Debug, Clone, Serialize)]
pub struct Bundle {
    pub page_id: String,
    pub name: String,
    pub purchase_date: Option<NaiveDate>,
    pub price: Option<f64>,
    pub categories: Vec<String>,
    pub created_time: Option<DateTime<Utc>>,
    pub last_edited_time: Option<DateTime<Utc>>,
}

impl Bundle {
    pub fn from_page(page: &Page) -> Self {
        Bundle {
            page_id: page.id.clone(),
            name: page
                .title_text(fields::NAME)
                .unwrap_or_else(|| UNTITLED.to_string()),
            purchase_date: page.date(fields::PURCHASE_DATE),
            price: page.number(fields::PRICE),
            categories: page.multi_select(fields::BUNDLE_TYPE),
            created_time: page.created_time,
            last_edited_time: page.last_edited_time,
        }
    }
}

/// One catalog item in the Books database; the bundle relation lives on the
/// book side as a list of bundle page ids.
#[derive(Debug, Clone, Serialize)]
pub struct Book {
    pub page_id: String,
    pub title: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub bundle_ids: Vec<String>,
}

impl Book {
    pub fn from_page(page: &Page) -> Self {
        Book {
            page_id: page.id.clone(),
            title: page
                .rich_text(fields::BOOK_TITLE)
                .or_else(|| page.title_text(fields::NAME))
                .unwrap_or_else(|| UNTITLED.to_string()),
            author: page.rich_text(fields::AUTHOR),
            publisher: page.rich_text(fields::PUBLISHER),
            bundle_ids: page.relation_ids(fields::BUNDLES_RELATION),
        }
    }
}

/// Properties for a brand-new bundle page, shared by the file import and the
/// purchase scraper.
pub fn new_bundle_properties(name: &str, date: Option<NaiveDate>, price: f64) -> Value {
    let mut properties = Map::new();
    properties.insert(fields::NAME.to_string(), props::title(name));
    properties.insert(fields::BUNDLE_NAME.to_string(), props::rich_text(name));
    properties.insert(fields::PURCHASE_DATE.to_string(), props::date(date));
    properties.insert(fields::PRICE.to_string(), props::number(price));
    Value::Object(properties)
}

/// Properties for a new book page; the relation is omitted when no bundle
/// matched.
pub fn new_book_properties(
    title: &str,
    author: &str,
    bundle_page_id: Option<&str>,
) -> Value {
    let display_name = if author.is_empty() {
        title.to_string()
    } else {
        format!("{} by {}", title, author)
    };
    let mut properties = Map::new();
    properties.insert(fields::NAME.to_string(), props::title(&display_name));
    properties.insert(fields::BOOK_TITLE.to_string(), props::rich_text(title));
    properties.insert(fields::AUTHOR.to_string(), props::rich_text(author));
    if let Some(id) = bundle_page_id {
        properties.insert(fields::BUNDLES_RELATION.to_string(), props::relation(&[id]));
    }
    Value::Object(properties)
}
