use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::NotionTarget;
use crate::error::SyncError;
use crate::reconcile::DayStore;

pub mod properties;

use properties::PropertyMap;

const BASE_URL: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryResults {
    pub results: Vec<Page>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RichTextFragment {
    pub plain_text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub property_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub title: Vec<RichTextFragment>,
    pub properties: BTreeMap<String, PropertySchema>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyCheck {
    pub name: &'static str,
    pub expected_type: &'static str,
    pub found_type: Option<String>,
}

impl PropertyCheck {
    pub fn is_ok(&self) -> bool {
        self.found_type.as_deref() == Some(self.expected_type)
    }
}

impl Database {
    pub fn display_title(&self) -> &str {
        self.title
            .first()
            .map(|fragment| fragment.plain_text.as_str())
            .unwrap_or("Untitled")
    }

    pub fn check_properties(&self) -> Vec<PropertyCheck> {
        properties::WRITTEN_PROPERTIES
            .iter()
            .map(|&(name, expected_type)| PropertyCheck {
                name,
                expected_type,
                found_type: self
                    .properties
                    .get(name)
                    .map(|schema| schema.property_type.clone()),
            })
            .collect()
    }
}

#[derive(Clone)]
pub struct NotionClient {
    http: reqwest::Client,
    database_id: String,
}

impl NotionClient {
    pub fn new(target: &NotionTarget) -> anyhow::Result<Self> {
        if target.token.trim().is_empty() {
            anyhow::bail!("notion token is required");
        }
        if target.database_id.trim().is_empty() {
            anyhow::bail!("notion database id is required");
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("Notion-Version", HeaderValue::from_static(NOTION_VERSION));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", target.token))?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent("daily-notion-sync")
            .build()?;
        Ok(Self {
            http,
            database_id: target.database_id.clone(),
        })
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    pub async fn retrieve_database(&self) -> anyhow::Result<Database> {
        self.send_json(Method::GET, &format!("/databases/{}", self.database_id), None)
            .await
    }

    pub async fn query_by_date(&self, date: NaiveDate) -> anyhow::Result<Vec<Page>> {
        let results: QueryResults = self
            .send_json(
                Method::POST,
                &format!("/databases/{}/query", self.database_id),
                Some(date_filter(date)),
            )
            .await?;
        if results.has_more {
            tracing::warn!("more than one page of entries matched {date}");
        }
        Ok(results.results)
    }

    pub async fn create_page(&self, properties: &PropertyMap) -> anyhow::Result<Page> {
        let body = json!({
            "parent": { "database_id": self.database_id },
            "properties": properties::to_json_map(properties),
        });
        self.send_json(Method::POST, "/pages", Some(body)).await
    }

    pub async fn update_page(
        &self,
        page_id: &str,
        properties: &PropertyMap,
    ) -> anyhow::Result<Page> {
        let body = json!({ "properties": properties::to_json_map(properties) });
        self.send_json(Method::PATCH, &format!("/pages/{page_id}"), Some(body))
            .await
    }

    async fn send_json<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> anyhow::Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{BASE_URL}{path}");
        tracing::debug!(target: "notion", "{method} {url}");

        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "notion API request failed: status={} body={}",
                status.as_u16(),
                body.trim()
            );
        }

        let body = response.text().await?;
        serde_json::from_str::<T>(&body)
            .map_err(|err| anyhow::anyhow!("error decoding response body for {url}: {err}"))
    }
}

fn date_filter(date: NaiveDate) -> Value {
    json!({
        "filter": {
            "property": properties::DATE,
            "date": { "equals": date.format("%Y-%m-%d").to_string() }
        }
    })
}

#[async_trait]
impl DayStore for NotionClient {
    async fn find_entry(&self, date: NaiveDate) -> Result<Option<String>, SyncError> {
        let pages = self
            .query_by_date(date)
            .await
            .map_err(|err| SyncError::StoreLookupFailed(format!("{err:#}")))?;

        if pages.len() > 1 {
            tracing::warn!(
                "found {} entries for {date}, updating the first",
                pages.len()
            );
        }
        Ok(pages.into_iter().next().map(|page| page.id))
    }

    async fn create_entry(&self, properties: &PropertyMap) -> Result<String, SyncError> {
        self.create_page(properties)
            .await
            .map(|page| page.id)
            .map_err(|err| SyncError::StoreWriteFailed(format!("{err:#}")))
    }

    async fn update_entry(
        &self,
        entry_id: &str,
        properties: &PropertyMap,
    ) -> Result<(), SyncError> {
        self.update_page(entry_id, properties)
            .await
            .map(|_| ())
            .map_err(|err| SyncError::StoreWriteFailed(format!("{err:#}")))
    }
}
