//! Notion database sink
//!
//! Each use case becomes one page in a database with these properties:
//!
//! | Property    | Type         |
//! |-------------|--------------|
//! | Title       | title        |
//! | Problem     | rich_text    |
//! | AI Solution | rich_text    |
//! | Category    | multi_select |
//! | Industry    | multi_select |
//! | Source      | url          |
//! | Date        | date         |

use crate::{truncate_chars, StoreError, RICH_TEXT_MAX_CHARS, TITLE_MAX_CHARS};
use async_trait::async_trait;
use foundry_domain::{SeenIndex, UseCaseResult, UseCaseSink};
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

/// Notion REST API base URL
pub const NOTION_API_BASE: &str = "https://api.notion.com/v1";

/// Notion API version sent with every request
pub const NOTION_VERSION: &str = "2022-06-28";

/// Notion rejects multi-select option names longer than this
const OPTION_MAX_CHARS: usize = 100;

/// Characters of an error body kept in `StoreError::Remote`
const BODY_SNIPPET_CHARS: usize = 200;

/// Publishes use cases as pages of a Notion database
pub struct NotionSink {
    client: reqwest::Client,
    token: String,
    database_id: String,
    base_url: String,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<Value>,
}

impl NotionSink {
    /// Create a sink for one database
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` when the token or database id is empty.
    pub fn new(
        token: impl Into<String>,
        database_id: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let token = token.into();
        let database_id = database_id.into();
        if token.trim().is_empty() {
            return Err(StoreError::Config("Notion token is empty".to_string()));
        }
        if database_id.trim().is_empty() {
            return Err(StoreError::Config("Notion database id is empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            token,
            database_id,
            base_url: NOTION_API_BASE.to_string(),
        })
    }

    /// Send requests to another API base (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Page creation body for a use case
    pub fn page_body(&self, result: &UseCaseResult) -> Value {
        let use_case = &result.use_case;
        let title = match use_case.title.trim() {
            "" => "Untitled Use Case",
            title => truncate_chars(title, TITLE_MAX_CHARS),
        };
        let problem = truncate_chars(&use_case.problem, RICH_TEXT_MAX_CHARS);
        let ai_solution = truncate_chars(&use_case.ai_solution, RICH_TEXT_MAX_CHARS);
        json!({
            "parent": { "database_id": self.database_id },
            "properties": {
                "Title": { "title": [text(title)] },
                "Problem": { "rich_text": [text(problem)] },
                "AI Solution": { "rich_text": [text(ai_solution)] },
                "Category": { "multi_select": options(&use_case.category_or_default()) },
                "Industry": { "multi_select": options(&use_case.industry_or_default()) },
                "Source": { "url": result.source },
                "Date": { "date": { "start": result.date.to_string() } },
            }
        })
    }

    /// Database query matching an exact source URL or exact title
    pub fn duplicate_query(url: &str, title: &str) -> Value {
        let mut filters = vec![json!({ "property": "Source", "url": { "equals": url } })];
        let title = title.trim();
        if !title.is_empty() {
            filters.push(json!({
                "property": "Title",
                "title": { "equals": truncate_chars(title, TITLE_MAX_CHARS) }
            }));
        }
        json!({ "filter": { "or": filters }, "page_size": 1 })
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, StoreError> {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, path))
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(StoreError::Remote {
                status: status.as_u16(),
                body: truncate_chars(&text, BODY_SNIPPET_CHARS).to_string(),
            });
        }
        serde_json::from_str(&text).map_err(|e| StoreError::InvalidData(e.to_string()))
    }
}

fn text(content: &str) -> Value {
    json!({ "text": { "content": content } })
}

fn options(tags: &[String]) -> Vec<Value> {
    tags.iter()
        .map(|tag| {
            let name = tag.replace(',', " ");
            json!({ "name": truncate_chars(&name, OPTION_MAX_CHARS).trim() })
        })
        .collect()
}

#[async_trait]
impl UseCaseSink for NotionSink {
    type Error = StoreError;

    async fn publish(&mut self, result: &UseCaseResult) -> Result<(), StoreError> {
        let body = self.page_body(result);
        self.post("pages", &body).await?;
        info!(title = %result.use_case.title, "Added page to Notion");
        Ok(())
    }
}

#[async_trait]
impl SeenIndex for NotionSink {
    type Error = StoreError;

    async fn is_seen(&mut self, url: &str, title: &str) -> Result<bool, StoreError> {
        let path = format!("databases/{}/query", self.database_id);
        let response = self.post(&path, &Self::duplicate_query(url, title)).await?;
        let parsed: QueryResponse = serde_json::from_value(response)
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;
        debug!(url, matches = parsed.results.len(), "Queried Notion for duplicates");
        Ok(!parsed.results.is_empty())
    }
}

impl fmt::Debug for NotionSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotionSink")
            .field("database_id", &self.database_id)
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}
