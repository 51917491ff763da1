//! Single-pass aggregates over in-memory bundle lists.
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

use crate::model::{Bundle, Category};

pub struct SpentSummary {
    pub total: f64,
    pub with_price: usize,
    pub without_price: usize,
}

/// Sum of all recorded prices; zero-priced bundles still count as priced.
pub fn total_spent(bundles: &[Bundle]) -> SpentSummary {
    let mut summary = SpentSummary {
        total: 0.0,
        with_price: 0,
        without_price: 0,
    };
    for bundle in bundles {
        match bundle.price {
            Some(price) => {
                summary.total += price;
                summary.with_price += 1;
            }
            None => summary.without_price += 1,
        }
    }
    summary
}

pub struct YearBucket {
    /// `None` collects priced bundles without a purchase date.
    pub year: Option<i32>,
    pub total: f64,
    pub count: usize,
}

/// Spending grouped by purchase year, earliest first, the dateless bucket
/// last. Only bundles with a positive price participate.
pub fn spending_by_year(bundles: &[Bundle]) -> Vec<YearBucket> {
    let mut by_year: HashMap<Option<i32>, (f64, usize)> = HashMap::new();
    for bundle in bundles {
        let price = match bundle.price {
            Some(p) if p > 0.0 => p,
            _ => continue,
        };
        let year = bundle.purchase_date.map(|d| d.year());
        let entry = by_year.entry(year).or_insert((0.0, 0));
        entry.0 += price;
        entry.1 += 1;
    }

    let mut buckets: Vec<YearBucket> = by_year
        .into_iter()
        .map(|(year, (total, count))| YearBucket { year, total, count })
        .collect();
    buckets.sort_by_key(|b| match b.year {
        Some(year) => (0, year),
        None => (1, 0),
    });
    buckets
}

pub struct CategoryBucket {
    pub name: &'static str,
    pub total: f64,
    pub count: usize,
}

pub const UNCATEGORIZED: &str = "Uncategorized";

/// Spending grouped by category tag. A bundle's price is added to every tag
/// it carries, so bucket totals can exceed the grand total. Only positive
/// prices participate; tags outside the known vocabulary are ignored.
pub fn spending_by_category(bundles: &[Bundle]) -> Vec<CategoryBucket> {
    let mut buckets: Vec<CategoryBucket> = Category::ALL
        .iter()
        .map(|c| CategoryBucket {
            name: c.as_str(),
            total: 0.0,
            count: 0,
        })
        .collect();
    buckets.push(CategoryBucket {
        name: UNCATEGORIZED,
        total: 0.0,
        count: 0,
    });

    for bundle in bundles {
        let price = match bundle.price {
            Some(p) if p > 0.0 => p,
            _ => continue,
        };
        if bundle.categories.is_empty() {
            let last = buckets.last_mut().expect("uncategorized bucket");
            last.total += price;
            last.count += 1;
            continue;
        }
        for tag in &bundle.categories {
            if let Some(bucket) = buckets.iter_mut().find(|b| b.name == tag) {
                bucket.total += price;
                bucket.count += 1;
            }
        }
    }
    buckets
}

pub struct DuplicateGroup {
    pub name: String,
    /// Purchases sorted by date, dateless last, insertion order preserved on ties.
    pub purchases: Vec<(Option<NaiveDate>, f64)>,
}

impl DuplicateGroup {
    pub fn count(&self) -> usize {
        self.purchases.len()
    }

    /// Money spent on every purchase after the first; the first occurrence is
    /// not waste.
    pub fn wasted(&self) -> f64 {
        self.purchases.iter().skip(1).map(|(_, price)| price).sum()
    }
}

pub struct DuplicateReport {
    /// Groups with more than one purchase, most duplicated first.
    pub groups: Vec<DuplicateGroup>,
    pub total_entries: usize,
    pub unique_names: usize,
}

impl DuplicateReport {
    pub fn total_wasted(&self) -> f64 {
        self.groups.iter().map(DuplicateGroup::wasted).sum()
    }

    pub fn over_purchases(&self) -> usize {
        self.groups.iter().map(|g| g.count() - 1).sum()
    }
}

/// Deduplication is by display name, not by id: the same bundle bought twice
/// is two pages with one name.
pub fn find_duplicates(bundles: &[Bundle]) -> DuplicateReport {
    let mut order: Vec<String> = Vec::new();
    let mut by_name: HashMap<String, Vec<(Option<NaiveDate>, f64)>> = HashMap::new();
    for bundle in bundles {
        let entry = by_name.entry(bundle.name.clone()).or_insert_with(|| {
            order.push(bundle.name.clone());
            Vec::new()
        });
        entry.push((bundle.purchase_date, bundle.price.unwrap_or(0.0)));
    }

    let unique_names = order.len();
    let mut groups: Vec<DuplicateGroup> = order
        .into_iter()
        .filter_map(|name| {
            let mut purchases = by_name.remove(&name)?;
            if purchases.len() < 2 {
                return None;
            }
            purchases.sort_by_key(|(date, _)| match date {
                Some(d) => (0, *d),
                None => (1, NaiveDate::MIN),
            });
            Some(DuplicateGroup { name, purchases })
        })
        .collect();
    groups.sort_by(|a, b| b.count().cmp(&a.count()));

    DuplicateReport {
        groups,
        total_entries: bundles.len(),
        unique_names,
    }
}

pub struct DateRange {
    pub earliest: NaiveDate,
    pub earliest_bundle: String,
    pub latest: NaiveDate,
    pub latest_bundle: String,
    pub with_date: usize,
}

impl DateRange {
    /// Gregorian day subtraction between first and last purchase.
    pub fn days(&self) -> i64 {
        (self.latest - self.earliest).num_days()
    }

    pub fn years(&self) -> f64 {
        self.days() as f64 / 365.25
    }
}

/// Earliest and latest purchase, or `None` when no bundle carries a date.
pub fn date_range(bundles: &[Bundle]) -> Option<DateRange> {
    let mut range: Option<DateRange> = None;
    let mut with_date = 0;
    for bundle in bundles {
        let Some(date) = bundle.purchase_date else {
            continue;
        };
        with_date += 1;
        match &mut range {
            None => {
                range = Some(DateRange {
                    earliest: date,
                    earliest_bundle: bundle.name.clone(),
                    latest: date,
                    latest_bundle: bundle.name.clone(),
                    with_date: 0,
                });
            }
            Some(r) => {
                if date < r.earliest {
                    r.earliest = date;
                    r.earliest_bundle = bundle.name.clone();
                }
                if date > r.latest {
                    r.latest = date;
                    r.latest_bundle = bundle.name.clone();
                }
            }
        }
    }
    if let Some(r) = &mut range {
        r.with_date = with_date;
    }
    range
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(name: &str, date: Option<&str>, price: Option<f64>) -> Bundle {
        Bundle {
            page_id: format!("id-{name}"),
            name: name.to_string(),
            purchase_date: date.map(|d| d.parse().unwrap()),
            price,
            categories: Vec::new(),
            created_time: None,
            last_edited_time: None,
        }
    }

    fn tagged(name: &str, price: f64, tags: &[&str]) -> Bundle {
        let mut b = bundle(name, None, Some(price));
        b.categories = tags.iter().map(|t| t.to_string()).collect();
        b
    }

    #[test]
    fn total_spent_counts_priceless_separately() {
        let bundles = vec![
            bundle("a", None, Some(10.0)),
            bundle("b", None, Some(0.0)),
            bundle("c", None, None),
        ];
        let summary = total_spent(&bundles);
        assert_eq!(summary.total, 10.0);
        assert_eq!(summary.with_price, 2);
        assert_eq!(summary.without_price, 1);
    }

    #[test]
    fn spending_by_year_sorts_and_buckets_unknown_last() {
        let bundles = vec![
            bundle("a", Some("2023-06-01"), Some(5.0)),
            bundle("b", Some("2020-01-15"), Some(10.0)),
            bundle("c", None, Some(3.0)),
            bundle("d", Some("2020-12-31"), Some(2.0)),
            bundle("free", Some("2020-01-01"), Some(0.0)),
        ];
        let buckets = spending_by_year(&bundles);
        let years: Vec<Option<i32>> = buckets.iter().map(|b| b.year).collect();
        assert_eq!(years, vec![Some(2020), Some(2023), None]);
        assert_eq!(buckets[0].total, 12.0);
        assert_eq!(buckets[0].count, 2);
        assert_eq!(buckets[2].total, 3.0);
    }

    #[test]
    fn spending_by_category_counts_every_tag() {
        let bundles = vec![
            tagged("a", 10.0, &["Books", "Comics/Manga"]),
            tagged("b", 4.0, &[]),
            tagged("c", 6.0, &["Books"]),
            tagged("weird", 1.0, &["Posters"]),
        ];
        let buckets = spending_by_category(&bundles);
        let find = |name: &str| buckets.iter().find(|b| b.name == name).unwrap();
        assert_eq!(find("Books").total, 16.0);
        assert_eq!(find("Books").count, 2);
        assert_eq!(find("Comics/Manga").total, 10.0);
        assert_eq!(find(UNCATEGORIZED).total, 4.0);
        // Unknown tags have nowhere to go.
        assert_eq!(find("Video Games").count, 0);
    }

    #[test]
    fn duplicates_flag_repeated_names_and_sum_waste_after_first() {
        let bundles = vec![
            bundle("A", Some("2021-01-01"), Some(10.0)),
            bundle("A", Some("2022-01-01"), Some(5.0)),
            bundle("B", Some("2021-06-01"), Some(7.0)),
        ];
        let report = find_duplicates(&bundles);
        assert_eq!(report.total_entries, 3);
        assert_eq!(report.unique_names, 2);
        assert_eq!(report.groups.len(), 1);
        let group = &report.groups[0];
        assert_eq!(group.name, "A");
        assert_eq!(group.count(), 2);
        assert_eq!(group.wasted(), 5.0);
        assert_eq!(report.total_wasted(), 5.0);
        assert_eq!(report.over_purchases(), 1);
    }

    #[test]
    fn duplicate_purchases_sorted_by_date() {
        let bundles = vec![
            bundle("A", Some("2022-01-01"), Some(5.0)),
            bundle("A", Some("2021-01-01"), Some(10.0)),
        ];
        let report = find_duplicates(&bundles);
        let group = &report.groups[0];
        assert_eq!(group.purchases[0].1, 10.0);
        // The earlier purchase is the "real" one; the later 5.0 is the waste.
        assert_eq!(group.wasted(), 5.0);
    }

    #[test]
    fn date_range_day_subtraction() {
        let bundles = vec![
            bundle("first", Some("2020-01-01"), None),
            bundle("middle", Some("2021-07-01"), None),
            bundle("last", Some("2023-01-01"), None),
            bundle("dateless", None, None),
        ];
        let range = date_range(&bundles).unwrap();
        assert_eq!(range.earliest_bundle, "first");
        assert_eq!(range.latest_bundle, "last");
        // 2020 is a leap year: 366 + 365 + 365.
        assert_eq!(range.days(), 1096);
        assert_eq!(range.with_date, 3);
    }

    #[test]
    fn date_range_empty_without_dates() {
        assert!(date_range(&[bundle("a", None, Some(1.0))]).is_none());
    }
}
