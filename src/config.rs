use anyhow::Context;
use serde::Deserialize;

use crate::error::SyncError;

pub const DEFAULT_WHOOP_CLIENT_ID: &str = "2d48bb21-defd-49b6-89dd-a049c7cde3a5";
pub const DEFAULT_WHOOP_REDIRECT_URI: &str = "http://localhost:3000/callback";

#[derive(Clone, Default, Deserialize)]
pub struct AppConfig {
    pub github_token: Option<String>,
    pub github_username: Option<String>,

    pub notion_token: Option<String>,
    pub notion_database_id: Option<String>,

    pub whoop_notion_token: Option<String>,
    pub whoop_notion_database_id: Option<String>,

    #[serde(default = "default_whoop_client_id")]
    pub whoop_client_id: String,
    pub whoop_client_secret: Option<String>,
    pub whoop_access_token: Option<String>,
    pub whoop_refresh_token: Option<String>,
    #[serde(default = "default_whoop_redirect_uri")]
    pub whoop_redirect_uri: String,
}

fn default_whoop_client_id() -> String {
    DEFAULT_WHOOP_CLIENT_ID.to_string()
}

fn default_whoop_redirect_uri() -> String {
    DEFAULT_WHOOP_REDIRECT_URI.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotionTarget {
    pub token: String,
    pub database_id: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    pub fn load() -> anyhow::Result<Self> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                tracing::warn!("ignoring unreadable .env file: {err}");
            }
        }
        Self::from_env().context("reading configuration from the environment")
    }

    pub fn require_github_token(&self) -> Result<&str, SyncError> {
        require(&self.github_token, "GITHUB_TOKEN")
    }

    pub fn require_github_username(&self) -> Result<&str, SyncError> {
        require(&self.github_username, "GITHUB_USERNAME")
    }

    pub fn require_whoop_client_secret(&self) -> Result<&str, SyncError> {
        require(&self.whoop_client_secret, "WHOOP_CLIENT_SECRET")
    }

    pub fn notion_target(&self) -> Result<NotionTarget, SyncError> {
        Ok(NotionTarget {
            token: require(&self.notion_token, "NOTION_TOKEN")?.to_string(),
            database_id: require(&self.notion_database_id, "NOTION_DATABASE_ID")?.to_string(),
        })
    }

    pub fn health_notion_target(&self) -> Result<NotionTarget, SyncError> {
        let token = present(&self.whoop_notion_token)
            .map(Ok)
            .unwrap_or_else(|| require(&self.notion_token, "NOTION_TOKEN"))?;
        let database_id = present(&self.whoop_notion_database_id)
            .map(Ok)
            .unwrap_or_else(|| require(&self.notion_database_id, "NOTION_DATABASE_ID"))?;

        Ok(NotionTarget {
            token: token.to_string(),
            database_id: database_id.to_string(),
        })
    }

    pub fn whoop_access_token(&self) -> Option<&str> {
        present(&self.whoop_access_token)
    }

    pub fn whoop_refresh_token(&self) -> Option<&str> {
        present(&self.whoop_refresh_token)
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn require<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, SyncError> {
    present(value).ok_or(SyncError::Configuration(name))
}
