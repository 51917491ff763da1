//! Browser-driven access to the storefront. All selector knowledge lives
//! behind [`Storefront`] so markup changes touch one implementation.
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use crate::config::HumbleCredentials;

pub mod humble;
pub mod webdriver;

/// One row of the purchase-history table, exactly as rendered: date and price
/// still need parsing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawPurchase {
    pub name: String,
    #[serde(rename = "date")]
    pub date_text: String,
    #[serde(rename = "price")]
    pub price_text: String,
}

/// One product tile from the library listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawProduct {
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, rename = "bundleName")]
    pub bundle_name: String,
}

#[async_trait]
pub trait Storefront {
    async fn login(&mut self, creds: &HumbleCredentials) -> Result<()>;

    /// Every row of the paginated purchase-history table, in page order.
    async fn list_purchases(&mut self) -> Result<Vec<RawPurchase>>;

    /// Every product tile of the scroll-loaded library listing.
    async fn list_library(&mut self) -> Result<Vec<RawProduct>>;
}

/// Drop repeated (title, author) pairs, keeping first occurrences in order.
pub fn dedupe_products(products: Vec<RawProduct>) -> Vec<RawProduct> {
    let mut seen = std::collections::HashSet::new();
    products
        .into_iter()
        .filter(|p| seen.insert((p.title.clone(), p.author.clone())))
        .collect()
}

/// Fuzzy bundle-name match used to link a scraped book to a stored bundle:
/// either name containing the other (case-insensitive) counts.
pub fn names_overlap(stored: &str, scraped: &str) -> bool {
    if stored.is_empty() || scraped.is_empty() {
        return false;
    }
    let stored = stored.to_lowercase();
    let scraped = scraped.to_lowercase();
    stored.contains(&scraped) || scraped.contains(&stored)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(title: &str, author: &str) -> RawProduct {
        RawProduct {
            title: title.to_string(),
            author: author.to_string(),
            bundle_name: String::new(),
        }
    }

    #[test]
    fn dedupe_keeps_first_occurrence_in_order() {
        let products = vec![
            product("Book A", "X"),
            product("Book B", "Y"),
            product("Book A", "X"),
            product("Book A", "Z"),
        ];
        let unique = dedupe_products(products);
        let titles: Vec<(&str, &str)> = unique
            .iter()
            .map(|p| (p.title.as_str(), p.author.as_str()))
            .collect();
        assert_eq!(
            titles,
            vec![("Book A", "X"), ("Book B", "Y"), ("Book A", "Z")]
        );
    }

    #[test]
    fn names_overlap_is_case_insensitive_both_ways() {
        assert!(names_overlap("Humble Book Bundle: Rust", "rust"));
        assert!(names_overlap("Rust", "humble book bundle: RUST"));
        assert!(!names_overlap("Humble Book Bundle: Rust", "cooking"));
        assert!(!names_overlap("", "anything"));
    }

    #[test]
    fn raw_purchase_decodes_from_extraction_json() {
        let raw: Vec<RawPurchase> = serde_json::from_str(
            r#"[{"name":"Bundle X","date":"Dec 9, 2025","price":"$18.00"}]"#,
        )
        .unwrap();
        assert_eq!(raw[0].name, "Bundle X");
        assert_eq!(raw[0].date_text, "Dec 9, 2025");
        assert_eq!(raw[0].price_text, "$18.00");
    }

    #[test]
    fn raw_product_defaults_optional_fields() {
        let raw: Vec<RawProduct> =
            serde_json::from_str(r#"[{"title":"Book A"}]"#).unwrap();
        assert_eq!(raw[0].title, "Book A");
        assert!(raw[0].author.is_empty());
        assert!(raw[0].bundle_name.is_empty());
    }
}
