use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::{json, Map, Value};
use std::fmt;
use thiserror::Error;
use tracing::warn;

use crate::notion::model::{
    CreatedDatabase, Page, RetrieveDatabaseResp, SearchResponse,
};

pub mod model;
pub mod props;

const NOTION_API_BASE: &str = "https://api.notion.com/";

/// The maximum result count the search endpoint accepts per request; every
/// call site uses it.
pub const SEARCH_PAGE_SIZE: u32 = 100;

#[derive(Debug, Error)]
pub enum NotionError {
    #[error("request to Notion failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("notion error {status}: {message}")]
    Api { status: StatusCode, message: String },
    #[error("notion object not found: {0}")]
    NotFound(String),
    #[error("invalid Notion response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid Notion URL: {0}")]
    Url(String),
}

#[derive(Clone)]
pub struct NotionClient {
    http: Client,
    base_url: Url,
    token: String,
    version: String,
}

impl fmt::Debug for NotionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotionClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl NotionClient {
    pub fn new(token: String, version: String) -> Self {
        let base_url = Url::parse(NOTION_API_BASE).expect("valid default Notion URL");
        Self::with_base_url(token, version, base_url)
    }

    pub fn with_base_url(token: String, version: String, base_url: Url) -> Self {
        let http = Client::builder()
            .user_agent("humblesync/0.1")
            .build()
            .expect("reqwest client");
        Self {
            http,
            base_url,
            token,
            version,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> Result<reqwest::RequestBuilder, NotionError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| NotionError::Url(e.to_string()))?;
        Ok(self
            .http
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Notion-Version", &self.version)
            .header("Content-Type", "application/json"))
    }

    async fn execute(&self, req: reqwest::RequestBuilder) -> Result<Value, NotionError> {
        let res = req.send().await?;
        let status = res.status();
        if !status.is_success() {
            let message = res.text().await.unwrap_or_default();
            if status == StatusCode::NOT_FOUND || message.contains("object_not_found") {
                return Err(NotionError::NotFound(message));
            }
            warn!(%status, "notion API error: {}", message);
            return Err(NotionError::Api { status, message });
        }
        let body = res.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// One page of the workspace-global search. The endpoint has no
    /// container-scoped variant for pages, hence the client-side filter in
    /// [`collect_database_pages`].
    pub async fn search_pages(
        &self,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<SearchResponse, NotionError> {
        let body = build_search_request(cursor, page_size);
        let req = self.request(reqwest::Method::POST, "v1/search")?.json(&body);
        let value = self.execute(req).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn retrieve_database(
        &self,
        database_id: &str,
    ) -> Result<RetrieveDatabaseResp, NotionError> {
        let req = self.request(
            reqwest::Method::GET,
            &format!("v1/databases/{}", database_id),
        )?;
        let value = self
            .execute(req)
            .await
            .map_err(|err| match err {
                NotionError::NotFound(_) => NotionError::NotFound(database_id.to_string()),
                other => other,
            })?;
        Ok(serde_json::from_value(value)?)
    }

    /// Create a page in a database and return its id.
    pub async fn create_page(
        &self,
        database_id: &str,
        properties: Value,
    ) -> Result<String, NotionError> {
        let body = build_create_page_request(database_id, properties);
        let req = self.request(reqwest::Method::POST, "v1/pages")?.json(&body);
        let value = self.execute(req).await?;
        page_id(&value)
    }

    /// Update properties on an existing page.
    pub async fn update_page(
        &self,
        page_id: &str,
        properties: Value,
    ) -> Result<(), NotionError> {
        let body = json!({ "properties": properties });
        let req = self
            .request(reqwest::Method::PATCH, &format!("v1/pages/{}", page_id))?
            .json(&body);
        self.execute(req).await?;
        Ok(())
    }

    /// Soft delete: flag the page archived without removing it.
    pub async fn archive_page(&self, page_id: &str) -> Result<(), NotionError> {
        let body = json!({ "archived": true });
        let req = self
            .request(reqwest::Method::PATCH, &format!("v1/pages/{}", page_id))?
            .json(&body);
        self.execute(req).await?;
        Ok(())
    }

    pub async fn create_database(
        &self,
        parent_page_id: &str,
        title: &str,
        properties: Value,
    ) -> Result<CreatedDatabase, NotionError> {
        let body = build_create_database_request(parent_page_id, title, properties);
        let req = self
            .request(reqwest::Method::POST, "v1/databases")?
            .json(&body);
        let value = self.execute(req).await?;
        Ok(serde_json::from_value(value)?)
    }
}

fn page_id(value: &Value) -> Result<String, NotionError> {
    value
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| NotionError::Api {
            status: StatusCode::OK,
            message: "response without page id".to_string(),
        })
}

pub fn build_search_request(cursor: Option<&str>, page_size: u32) -> Value {
    let mut body = Map::new();
    body.insert(
        "filter".to_string(),
        json!({ "value": "page", "property": "object" }),
    );
    body.insert("page_size".to_string(), json!(page_size));
    if let Some(cursor) = cursor {
        body.insert("start_cursor".to_string(), json!(cursor));
    }
    Value::Object(body)
}

pub fn build_create_page_request(database_id: &str, properties: Value) -> Value {
    json!({
        "parent": { "database_id": database_id },
        "properties": properties,
    })
}

pub fn build_create_database_request(
    parent_page_id: &str,
    title: &str,
    properties: Value,
) -> Value {
    json!({
        "parent": { "type": "page_id", "page_id": parent_page_id },
        "title": [ { "type": "text", "text": { "content": title } } ],
        "properties": properties,
    })
}

/// Anything that can serve pages of the global search; the seam that lets the
/// pagination routine run against an in-memory fake.
#[async_trait]
pub trait SearchSource: Send + Sync {
    async fn search_pages(
        &self,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<SearchResponse, NotionError>;
}

#[async_trait]
impl SearchSource for NotionClient {
    async fn search_pages(
        &self,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<SearchResponse, NotionError> {
        NotionClient::search_pages(self, cursor, page_size).await
    }
}

/// Retrieve every page belonging to one database, in the order the remote
/// returned them.
///
/// The search endpoint is workspace-global, so each page of results is
/// over-fetched and filtered by parent database id; entries from other
/// containers are discarded silently. The first failed request aborts the
/// whole retrieval; there is no partial result and no retry.
pub async fn collect_database_pages<S>(
    source: &S,
    database_id: &str,
) -> Result<Vec<Page>, NotionError>
where
    S: SearchSource + ?Sized,
{
    let mut pages = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let resp = source
            .search_pages(cursor.as_deref(), SEARCH_PAGE_SIZE)
            .await?;
        pages.extend(
            resp.results
                .into_iter()
                .filter(|p| p.in_database(database_id)),
        );
        if !resp.has_more {
            break;
        }
        cursor = resp.next_cursor;
        if cursor.is_none() {
            // has_more without a cursor: nothing left to ask for
            break;
        }
    }
    Ok(pages)
}
