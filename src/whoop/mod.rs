use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::aggregate::HealthApi;
use crate::window::DayWindow;

pub mod auth;
pub mod schema;

const API_BASE_URL: &str = "https://api.prod.whoop.com/developer";
const PAGE_LIMIT: u32 = 25;

#[derive(Clone)]
pub struct WhoopClient {
    http: reqwest::Client,
    base_url: String,
}

impl WhoopClient {
    pub fn new() -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("daily-notion-sync")
            .build()?;
        Ok(Self {
            http,
            base_url: API_BASE_URL.to_string(),
        })
    }

    async fn get_collection<T>(
        &self,
        path: &str,
        access_token: &str,
        window: &DayWindow,
    ) -> anyhow::Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        let query = window_query(window);
        tracing::debug!(target: "whoop", "GET {url} {query:?}");

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&query)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "whoop API request failed: status={} body={}",
                status.as_u16(),
                body.trim()
            );
        }

        let body = response.text().await?;
        let page = serde_json::from_str::<schema::Collection<T>>(&body)
            .map_err(|err| anyhow::anyhow!("error decoding response body for {url}: {err}"))?;
        Ok(page.records)
    }
}

fn window_query(window: &DayWindow) -> [(&'static str, String); 3] {
    [
        ("start", window.start_iso()),
        ("end", window.end_iso()),
        ("limit", PAGE_LIMIT.to_string()),
    ]
}

#[async_trait]
impl HealthApi for WhoopClient {
    async fn sleep(
        &self,
        access_token: &str,
        window: &DayWindow,
    ) -> anyhow::Result<Vec<schema::SleepRecord>> {
        self.get_collection("/v2/activity/sleep", access_token, window)
            .await
    }

    async fn recovery(
        &self,
        access_token: &str,
        window: &DayWindow,
    ) -> anyhow::Result<Vec<schema::RecoveryRecord>> {
        self.get_collection("/v2/recovery", access_token, window)
            .await
    }

    async fn cycles(
        &self,
        access_token: &str,
        window: &DayWindow,
    ) -> anyhow::Result<Vec<schema::CycleRecord>> {
        self.get_collection("/v2/cycle", access_token, window).await
    }
}
