//! Minimal W3C WebDriver client over HTTP, enough to drive a login form and
//! run extraction scripts. Talks to a locally running chromedriver/geckodriver.
use anyhow::{anyhow, Context, Result};
use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Value};

/// W3C element identifier key in find-element responses.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element(String);

pub struct WebDriver {
    http: Client,
    base_url: String,
    session_id: String,
}

impl WebDriver {
    /// Start a new browser session against a WebDriver endpoint.
    pub async fn connect(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent("humblesync/0.1")
            .build()
            .expect("reqwest client");
        let base_url = base_url.trim_end_matches('/').to_string();
        let caps = json!({
            "capabilities": {
                "alwaysMatch": {
                    "goog:chromeOptions": {
                        "args": [
                            "--no-sandbox",
                            "--disable-dev-shm-usage",
                            "--disable-gpu",
                            "--window-size=1280,800"
                        ]
                    }
                }
            }
        });
        let res = http
            .post(format!("{base_url}/session"))
            .json(&caps)
            .send()
            .await
            .with_context(|| format!("failed to reach WebDriver at {base_url}"))?;
        let value = decode(res).await?;
        let session_id = value["value"]["sessionId"]
            .as_str()
            .ok_or_else(|| anyhow!("WebDriver returned no session id"))?
            .to_string();
        Ok(WebDriver {
            http,
            base_url,
            session_id,
        })
    }

    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let url = format!(
            "{}/session/{}/{}",
            self.base_url, self.session_id, path
        );
        let mut req = self.http.request(method, &url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let res = req
            .send()
            .await
            .with_context(|| format!("WebDriver request {url} failed"))?;
        decode(res).await
    }

    pub async fn goto(&self, url: &str) -> Result<()> {
        self.command(Method::POST, "url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    pub async fn current_url(&self) -> Result<String> {
        let value = self.command(Method::GET, "url", None).await?;
        value["value"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("WebDriver returned no current URL"))
    }

    /// First element matching a CSS selector, or `None` when absent.
    pub async fn find(&self, css: &str) -> Result<Option<Element>> {
        let url = format!("{}/session/{}/element", self.base_url, self.session_id);
        let res = self
            .http
            .post(&url)
            .json(&json!({ "using": "css selector", "value": css }))
            .send()
            .await
            .context("WebDriver find-element request failed")?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let value = decode(res).await?;
        Ok(value["value"][ELEMENT_KEY]
            .as_str()
            .map(|id| Element(id.to_string())))
    }

    pub async fn click(&self, element: &Element) -> Result<()> {
        self.command(
            Method::POST,
            &format!("element/{}/click", element.0),
            Some(json!({})),
        )
        .await?;
        Ok(())
    }

    pub async fn type_text(&self, element: &Element, text: &str) -> Result<()> {
        self.command(
            Method::POST,
            &format!("element/{}/value", element.0),
            Some(json!({ "text": text })),
        )
        .await?;
        Ok(())
    }

    /// Run a script in the page and return its JSON result.
    pub async fn execute(&self, script: &str) -> Result<Value> {
        let value = self
            .command(
                Method::POST,
                "execute/sync",
                Some(json!({ "script": script, "args": [] })),
            )
            .await?;
        Ok(value["value"].clone())
    }

    /// End the browser session.
    pub async fn quit(self) -> Result<()> {
        let url = format!("{}/session/{}", self.base_url, self.session_id);
        self.http
            .delete(&url)
            .send()
            .await
            .context("WebDriver delete-session request failed")?;
        Ok(())
    }
}

async fn decode(res: reqwest::Response) -> Result<Value> {
    let status = res.status();
    let body = res
        .text()
        .await
        .context("failed to read WebDriver response")?;
    let value: Value =
        serde_json::from_str(&body).context("WebDriver response is not JSON")?;
    if !status.is_success() {
        let error = value["value"]["error"].as_str().unwrap_or("unknown");
        let message = value["value"]["message"].as_str().unwrap_or(&body);
        return Err(anyhow!("WebDriver error {status} ({error}): {message}"));
    }
    Ok(value)
}
