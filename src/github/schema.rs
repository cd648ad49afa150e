use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::RemoteRepository;

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: String,
    pub owner: RepositoryOwner,
    #[serde(default)]
    pub private: bool,
}

impl From<Repository> for RemoteRepository {
    fn from(repo: Repository) -> Self {
        Self {
            owner: repo.owner.login,
            name: repo.name,
            private: repo.private,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Commit {
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchItem {
    pub title: String,
    pub repository_url: String,
}

impl SearchItem {
    pub fn repository_name(&self) -> String {
        let mut parts = self.repository_url.rsplit('/');
        match (parts.next(), parts.next()) {
            (Some(name), Some(owner)) => format!("{owner}/{name}"),
            _ => self.repository_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResults {
    pub total_count: u64,
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventRepo {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: String,
    pub created_at: DateTime<Utc>,
    pub repo: Option<EventRepo>,
}
