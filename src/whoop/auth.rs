use async_trait::async_trait;
use reqwest::Url;

use crate::error::SyncError;
use crate::whoop::schema::TokenGrant;

const AUTH_URL: &str = "https://api.prod.whoop.com/oauth/oauth2/auth";
const TOKEN_URL: &str = "https://api.prod.whoop.com/oauth/oauth2/token";

pub const SCOPES: &str = "offline read:profile read:recovery read:cycles read:sleep read:workout";

#[async_trait]
pub trait TokenExchange: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> anyhow::Result<TokenGrant>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenState {
    HaveAccessToken(String),
    NeedsRefresh(String),
}

/// A refreshed token lives only as long as this value; it is never written back to configuration.
pub struct TokenProvider<E> {
    state: TokenState,
    exchange: E,
}

impl<E: TokenExchange> TokenProvider<E> {
    pub fn new(
        access_token: Option<&str>,
        refresh_token: Option<&str>,
        exchange: E,
    ) -> Result<Self, SyncError> {
        let state = match (non_blank(access_token), non_blank(refresh_token)) {
            (Some(access), _) => TokenState::HaveAccessToken(access.to_string()),
            (None, Some(refresh)) => TokenState::NeedsRefresh(refresh.to_string()),
            (None, None) => return Err(SyncError::NoCredential),
        };
        Ok(Self { state, exchange })
    }

    pub async fn access_token(&mut self) -> anyhow::Result<String> {
        let refresh_token = match &self.state {
            TokenState::HaveAccessToken(token) => return Ok(token.clone()),
            TokenState::NeedsRefresh(refresh_token) => refresh_token.clone(),
        };

        tracing::info!("no whoop access token configured, refreshing");
        let grant = self.exchange.refresh(&refresh_token).await?;
        if grant.refresh_token.as_deref().is_some_and(|t| t != refresh_token) {
            tracing::warn!("whoop rotated the refresh token; the new one is not persisted");
        }

        self.state = TokenState::HaveAccessToken(grant.access_token.clone());
        Ok(grant.access_token)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[derive(Clone)]
pub struct WhoopOAuth {
    http: reqwest::Client,
    client_id: String,
    client_secret: Option<String>,
    redirect_uri: String,
}

impl WhoopOAuth {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: Option<String>,
        redirect_uri: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("daily-notion-sync")
            .build()?;
        Ok(Self {
            http,
            client_id: client_id.into(),
            client_secret,
            redirect_uri: redirect_uri.into(),
        })
    }

    pub fn authorize_url(&self, state: &str) -> anyhow::Result<Url> {
        if state.len() < 8 {
            anyhow::bail!("oauth state must be at least 8 characters");
        }

        Ok(Url::parse_with_params(
            AUTH_URL,
            &[
                ("response_type", "code"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", SCOPES),
                ("state", state),
            ],
        )?)
    }

    pub async fn exchange_code(&self, code: &str) -> anyhow::Result<TokenGrant> {
        let secret = self.client_secret()?;
        self.request_token(&[
            ("grant_type", "authorization_code"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", secret),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
        ])
        .await
    }

    fn client_secret(&self) -> Result<&str, SyncError> {
        non_blank(self.client_secret.as_deref())
            .ok_or(SyncError::Configuration("WHOOP_CLIENT_SECRET"))
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> anyhow::Result<TokenGrant> {
        tracing::debug!(target: "whoop", "POST {TOKEN_URL}");
        let response = self.http.post(TOKEN_URL).form(form).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::RefreshFailed {
                status: status.as_u16(),
                body: body.trim().to_string(),
            }
            .into());
        }

        Ok(response.json::<TokenGrant>().await?)
    }
}

#[async_trait]
impl TokenExchange for WhoopOAuth {
    async fn refresh(&self, refresh_token: &str) -> anyhow::Result<TokenGrant> {
        let secret = self.client_secret()?;
        self.request_token(&[
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", secret),
            ("refresh_token", refresh_token),
            ("scope", "offline"),
        ])
        .await
    }
}
