use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("missing required configuration: {0}")]
    Configuration(&'static str),

    #[error("no whoop credential configured, set WHOOP_ACCESS_TOKEN or WHOOP_REFRESH_TOKEN")]
    NoCredential,

    #[error("whoop token refresh failed: status={status} body={body}")]
    RefreshFailed { status: u16, body: String },

    #[error("destination write failed: {0}")]
    StoreWriteFailed(String),

    #[error("destination lookup failed: {0}")]
    StoreLookupFailed(String),

    #[error("source {unit} failed: {message}")]
    Source { unit: String, message: String },
}

impl SyncError {
    pub fn is_credential(&self) -> bool {
        matches!(self, Self::NoCredential | Self::RefreshFailed { .. })
    }
}
