//! The one per-site-version implementation of [`Storefront`]. Every selector
//! string and extraction script for humblebundle.com lives here; nothing else
//! in the crate knows about markup.
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::HumbleCredentials;
use crate::storefront::webdriver::WebDriver;
use crate::storefront::{RawProduct, RawPurchase, Storefront};

const LOGIN_URL: &str = "https://www.humblebundle.com/login";
const PURCHASES_URL: &str = "https://www.humblebundle.com/home/purchases";
const LIBRARY_URL: &str = "https://www.humblebundle.com/home/library";

const SEL_USERNAME: &str = r#"input[name="username"]"#;
const SEL_PASSWORD: &str = r#"input[name="password"]"#;
const SEL_SUBMIT: &str = r#"button[type="submit"]"#;

/// Fixed pause for dynamic page content to settle between steps.
const SETTLE: Duration = Duration::from_secs(2);
/// Pause after a next-page click, which reloads the table in place.
const PAGE_SETTLE: Duration = Duration::from_secs(4);
/// How long the operator gets to finish an email verification by hand.
const VERIFY_POLL: Duration = Duration::from_secs(5);
const VERIFY_ATTEMPTS: u32 = 60;

const SCRIPT_DISMISS_CONSENT: &str = r#"
    const button = [...document.querySelectorAll('button')]
        .find(b => (b.textContent || '').includes('I Consent'));
    if (button) { button.click(); return true; }
    return false;
"#;

const SCRIPT_CLEAR_LOGIN_FIELDS: &str = r#"
    const email = document.querySelector('input[name="username"]');
    if (email) email.value = '';
    const pass = document.querySelector('input[name="password"]');
    if (pass) pass.value = '';
"#;

const SCRIPT_EXTRACT_PURCHASES: &str = r#"
    const rows = [];
    document.querySelectorAll('.row.js-row, div.row').forEach(row => {
        const name = row.querySelector('.product-name')?.textContent?.trim();
        const date = row.querySelector('.order-placed')?.textContent?.trim();
        const price = row.querySelector('.total')?.textContent?.trim();
        if (name && date) {
            rows.push({ name, date, price: price || '$0.00' });
        }
    });
    return rows;
"#;

const SCRIPT_CLICK_NEXT_PAGE: &str = r#"
    let next = null;
    for (const btn of document.querySelectorAll('button')) {
        const label = (btn.getAttribute('aria-label') || '').toLowerCase();
        const html = btn.innerHTML || '';
        if (label.includes('next') || label.includes('forward') ||
            html.includes('>') || html.includes('chevron') || html.includes('arrow')) {
            next = btn;
        }
    }
    if (next && !next.disabled && !next.classList.contains('disabled')) {
        next.click();
        return true;
    }
    return false;
"#;

const SCRIPT_SCROLL_TO_BOTTOM: &str = r#"
    window.scrollTo(0, document.body.scrollHeight);
    return document.body.scrollHeight;
"#;

/// Selector cascade for library product tiles; the first selector with hits
/// wins. Title and author are the first two text lines of a tile, the owning
/// bundle comes from the closest data-human-name ancestor.
const SCRIPT_EXTRACT_LIBRARY: &str = r#"
    const selectors = [
        '.subproduct-selector',
        '[class*="subproduct"]',
        '.js-subproduct',
        '[data-product-name]'
    ];
    const products = [];
    for (const selector of selectors) {
        for (const el of document.querySelectorAll(selector)) {
            const lines = (el.textContent || '').split('\n')
                .map(l => l.trim())
                .filter(l => l.length > 0 && l.length < 500);
            if (lines.length < 2) continue;
            const holder = el.closest('[data-human-name]');
            products.push({
                title: lines[0],
                author: lines[1] || '',
                bundleName: holder ? holder.getAttribute('data-human-name') : ''
            });
        }
        if (products.length > 0) break;
    }
    return products;
"#;

pub struct HumbleStorefront {
    driver: WebDriver,
}

impl HumbleStorefront {
    pub fn new(driver: WebDriver) -> Self {
        Self { driver }
    }

    pub async fn quit(self) -> Result<()> {
        self.driver.quit().await
    }

    async fn dismiss_consent(&self) -> Result<()> {
        for _ in 0..3 {
            let clicked = self
                .driver
                .execute(SCRIPT_DISMISS_CONSENT)
                .await?
                .as_bool()
                .unwrap_or(false);
            if !clicked {
                return Ok(());
            }
            info!("dismissed consent dialog");
            sleep(SETTLE).await;
        }
        warn!("consent dialog still present after 3 attempts; continuing");
        Ok(())
    }

    /// Wait out a manual email verification: poll until the browser lands on
    /// a logged-in page.
    async fn await_verification(&self) -> Result<()> {
        info!("verification required; complete it in the browser window");
        for _ in 0..VERIFY_ATTEMPTS {
            sleep(VERIFY_POLL).await;
            let url = self.driver.current_url().await?;
            if url.contains("/home") || url.contains("/purchases") {
                info!("verification complete");
                return Ok(());
            }
        }
        Err(anyhow!(
            "verification not completed in time; run the script again after verifying"
        ))
    }

    async fn extract_purchase_rows(&self) -> Result<Vec<RawPurchase>> {
        let value = self.driver.execute(SCRIPT_EXTRACT_PURCHASES).await?;
        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl Storefront for HumbleStorefront {
    async fn login(&mut self, creds: &HumbleCredentials) -> Result<()> {
        info!("navigating to login page");
        self.driver.goto(LOGIN_URL).await?;
        sleep(SETTLE).await;
        self.dismiss_consent().await?;

        let email = self
            .driver
            .find(SEL_USERNAME)
            .await?
            .ok_or_else(|| anyhow!("login form not found (markup changed?)"))?;
        let password = self
            .driver
            .find(SEL_PASSWORD)
            .await?
            .ok_or_else(|| anyhow!("password field not found"))?;
        let submit = self
            .driver
            .find(SEL_SUBMIT)
            .await?
            .ok_or_else(|| anyhow!("submit button not found"))?;

        self.driver.execute(SCRIPT_CLEAR_LOGIN_FIELDS).await?;
        self.driver.type_text(&email, &creds.email).await?;
        self.driver.type_text(&password, &creds.password).await?;
        self.driver.click(&submit).await?;
        info!("submitted login form");
        sleep(PAGE_SETTLE).await;

        let url = self.driver.current_url().await?;
        if url.contains("/login") {
            // Could be a failed login or an email-verification interstitial.
            self.await_verification().await?;
        }
        info!("logged in");
        Ok(())
    }

    async fn list_purchases(&mut self) -> Result<Vec<RawPurchase>> {
        info!("navigating to purchase history");
        self.driver.goto(PURCHASES_URL).await?;
        sleep(SETTLE).await;
        self.dismiss_consent().await?;
        // Nudge lazy loading.
        self.driver.execute("window.scrollTo(0, 500);").await?;
        sleep(SETTLE).await;

        let mut all: Vec<RawPurchase> = Vec::new();
        let mut previous_names: Vec<String> = Vec::new();
        let mut page_no = 1u32;
        loop {
            let rows = self.extract_purchase_rows().await?;
            info!(page = page_no, rows = rows.len(), "scraped purchase page");

            // The next button can keep "working" on the last page; an
            // unchanged name set means we are looking at the same page again.
            let mut names: Vec<String> = rows.iter().map(|r| r.name.clone()).collect();
            names.sort();
            if page_no > 1 && !names.is_empty() && names == previous_names {
                break;
            }
            previous_names = names;
            all.extend(rows);

            let advanced = self
                .driver
                .execute(SCRIPT_CLICK_NEXT_PAGE)
                .await?
                .as_bool()
                .unwrap_or(false);
            if !advanced {
                break;
            }
            page_no += 1;
            sleep(PAGE_SETTLE).await;
        }
        Ok(all)
    }

    async fn list_library(&mut self) -> Result<Vec<RawProduct>> {
        info!("navigating to library");
        self.driver.goto(LIBRARY_URL).await?;
        sleep(PAGE_SETTLE).await;
        self.dismiss_consent().await?;

        // Scroll until the document stops growing (three stable reads).
        let mut previous_height = 0i64;
        let mut stable = 0;
        for _ in 0..15 {
            let height = self
                .driver
                .execute(SCRIPT_SCROLL_TO_BOTTOM)
                .await?
                .as_i64()
                .unwrap_or(0);
            sleep(SETTLE).await;
            if height == previous_height {
                stable += 1;
                if stable >= 3 {
                    break;
                }
            } else {
                stable = 0;
            }
            previous_height = height;
        }

        let value = self.driver.execute(SCRIPT_EXTRACT_LIBRARY).await?;
        let products: Vec<RawProduct> = serde_json::from_value(value)?;
        Ok(products
            .into_iter()
            .filter(|p| looks_like_title(&p.title))
            .collect())
    }
}

/// Weed out navigation chrome that the tile selectors sometimes catch.
fn looks_like_title(title: &str) -> bool {
    title.len() > 3
        && title.len() < 200
        && !title.contains("Menu")
        && !title.contains("Search")
}
