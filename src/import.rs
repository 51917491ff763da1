//! Parser for the flat-text purchase list, one purchase per line:
//! `<name> <Month D, YYYY> <$amount|--|Gift>`.
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+?)\s+([A-Z][a-z]{2}\s+\d{1,2},\s+\d{4})\s+([\$\d.]+|--|Gift)$")
        .expect("valid import line regex")
});

static PRICE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\d.]+").expect("valid price regex"));

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPurchase {
    pub name: String,
    pub purchase_date: Option<NaiveDate>,
    pub price: f64,
}

/// Parse one import line; `None` means the line does not match the grammar
/// (callers log and continue).
pub fn parse_line(line: &str) -> Option<ParsedPurchase> {
    let caps = LINE_RE.captures(line.trim())?;
    Some(ParsedPurchase {
        name: caps[1].trim().to_string(),
        purchase_date: parse_purchase_date(&caps[2]),
        price: parse_price(&caps[3]),
    })
}

/// `"Dec 9, 2025"` style dates, as scraped or as written in the import file.
pub fn parse_purchase_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%b %d, %Y").ok()
}

/// Price text to a number: `--` and `Gift` are zero, otherwise the first
/// numeric run wins ("$24.99" → 24.99). Unparseable text is zero.
pub fn parse_price(text: &str) -> f64 {
    let text = text.trim();
    if text == "--" || text == "Gift" {
        return 0.0;
    }
    PRICE_RE
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_priced_line() {
        let parsed = parse_line(
            "Humble Book Bundle: The Growth Bundle by HarperCollins Dec 9, 2025 $18.00",
        )
        .unwrap();
        assert_eq!(
            parsed.name,
            "Humble Book Bundle: The Growth Bundle by HarperCollins"
        );
        assert_eq!(parsed.purchase_date, NaiveDate::from_ymd_opt(2025, 12, 9));
        assert_eq!(parsed.price, 18.0);
    }

    #[test]
    fn parses_gift_and_dashes_as_zero() {
        let gift = parse_line("Humble Bundle: Generic Game Jan 1, 2021 Gift").unwrap();
        assert_eq!(gift.price, 0.0);
        let dashes = parse_line("Some Bundle Feb 28, 2022 --").unwrap();
        assert_eq!(dashes.price, 0.0);
        assert_eq!(dashes.name, "Some Bundle");
    }

    #[test]
    fn rejects_lines_outside_the_grammar() {
        assert!(parse_line("").is_none());
        assert!(parse_line("no date or price here").is_none());
        assert!(parse_line("Bundle 2025-12-09 $18.00").is_none());
    }

    #[test]
    fn date_is_none_when_month_is_bogus() {
        // Matches the textual grammar but not a real month.
        let parsed = parse_line("Bundle Xyz 9, 2025 $1.00").unwrap();
        assert!(parsed.purchase_date.is_none());
    }

    #[test]
    fn price_helper_extracts_from_scraped_text() {
        assert_eq!(parse_price("$24.99"), 24.99);
        assert_eq!(parse_price("--"), 0.0);
        assert_eq!(parse_price("Gift"), 0.0);
        assert_eq!(parse_price("total garbage"), 0.0);
    }

    #[test]
    fn date_helper_parses_scraped_text() {
        assert_eq!(
            parse_purchase_date("Dec 9, 2025"),
            NaiveDate::from_ymd_opt(2025, 12, 9)
        );
        assert_eq!(
            parse_purchase_date("Jan 31, 2020"),
            NaiveDate::from_ymd_opt(2020, 1, 31)
        );
        assert!(parse_purchase_date("next tuesday").is_none());
    }
}
