use std::fmt::Display;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;

use crate::aggregate::RepositoryHost;
use crate::models::RemoteRepository;
use crate::window::DayWindow;

pub mod schema;

const BASE_URL: &str = "https://api.github.com";
const REPOSITORY_AFFILIATION: &str = "owner,collaborator,organization_member";

#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
}

impl GitHubClient {
    pub fn new(auth_token: impl Into<String>) -> anyhow::Result<Self> {
        let auth_token = auth_token.into();
        ensure_not_blank("auth token", &auth_token)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("daily-notion-sync"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {auth_token}"))?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(Self {
            http,
            base_url: BASE_URL.to_string(),
        })
    }

    pub async fn fetch_authenticated_user(&self) -> anyhow::Result<schema::User> {
        self.get_json("/user", &[]).await
    }

    async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> anyhow::Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(target: "github", "GET {url} {query:?}");
        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "github API request failed: status={} body={}",
                status.as_u16(),
                body.trim()
            );
        }

        let body = response.text().await?;
        serde_json::from_str::<T>(&body)
            .map_err(|err| anyhow::anyhow!("error decoding response body for {url}: {err}"))
    }
}

#[async_trait]
impl RepositoryHost for GitHubClient {
    async fn list_repositories_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> anyhow::Result<Vec<RemoteRepository>> {
        let repos: Vec<schema::Repository> = self
            .get_json(
                "/user/repos",
                &[
                    ("visibility", "all".to_string()),
                    ("affiliation", REPOSITORY_AFFILIATION.to_string()),
                    ("sort", "updated".to_string()),
                    ("per_page", per_page.to_string()),
                    ("page", page.to_string()),
                ],
            )
            .await?;

        Ok(repos.into_iter().map(RemoteRepository::from).collect())
    }

    async fn list_commits_page(
        &self,
        repo: &RemoteRepository,
        author: &str,
        window: &DayWindow,
        page: u32,
        per_page: u32,
    ) -> anyhow::Result<Vec<schema::Commit>> {
        ensure_not_blank("author", author)?;

        self.get_json(
            &format!("/repos/{}/{}/commits", repo.owner, repo.name),
            &[
                ("author", author.to_string()),
                ("since", window.start_iso()),
                ("until", window.end_iso()),
                ("per_page", per_page.to_string()),
                ("page", page.to_string()),
            ],
        )
        .await
    }

    async fn search_issues(&self, query: &str) -> anyhow::Result<schema::SearchResults> {
        ensure_not_blank("search query", query)?;

        self.get_json(
            "/search/issues",
            &[
                ("q", query.to_string()),
                ("sort", "created".to_string()),
                ("per_page", "100".to_string()),
            ],
        )
        .await
    }

    async fn list_user_events_page(
        &self,
        username: &str,
        page: u32,
        per_page: u32,
    ) -> anyhow::Result<Vec<schema::Event>> {
        ensure_not_blank("username", username)?;

        self.get_json(
            &format!("/users/{username}/events"),
            &[
                ("per_page", per_page.to_string()),
                ("page", page.to_string()),
            ],
        )
        .await
    }
}

fn ensure_not_blank(label: impl Display, value: &str) -> anyhow::Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{} is required", label);
    }
    Ok(())
}
