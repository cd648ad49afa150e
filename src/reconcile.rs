use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::SyncError;
use crate::models::DayRecord;
use crate::notion::properties::{self, PropertyMap, PropertyValue};
use crate::window::DayWindow;

const TITLE_PREFIX: &str = "Daily Activity";

#[async_trait]
pub trait DayStore: Send + Sync {
    /// Exact match on the day, not a range.
    async fn find_entry(&self, date: NaiveDate) -> Result<Option<String>, SyncError>;

    async fn create_entry(&self, properties: &PropertyMap) -> Result<String, SyncError>;

    /// Partial update; properties not in the map are left as they are.
    async fn update_entry(
        &self,
        entry_id: &str,
        properties: &PropertyMap,
    ) -> Result<(), SyncError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Created(String),
    Updated(String),
    NothingToSync,
}

impl ReconcileOutcome {
    pub fn entry_id(&self) -> Option<&str> {
        match self {
            Self::Created(id) | Self::Updated(id) => Some(id),
            Self::NothingToSync => None,
        }
    }
}

pub fn update_payload(record: &DayRecord) -> PropertyMap {
    properties::record_properties(record)
}

pub fn creation_payload(record: &DayRecord) -> PropertyMap {
    let mut payload = properties::record_properties(record);
    let label = DayWindow::for_date(record.date).label();
    payload.insert(
        properties::TITLE.to_string(),
        PropertyValue::Title(format!("{TITLE_PREFIX} - {label}")),
    );
    payload.insert(
        properties::DATE.to_string(),
        PropertyValue::Date(record.date),
    );
    payload
}

pub async fn reconcile(
    store: &dyn DayStore,
    record: &DayRecord,
) -> Result<ReconcileOutcome, SyncError> {
    if !record.has_activity() {
        tracing::info!("no activity recorded for {}, nothing to sync", record.date);
        return Ok(ReconcileOutcome::NothingToSync);
    }

    let Some(entry_id) = store.find_entry(record.date).await? else {
        let entry_id = store.create_entry(&creation_payload(record)).await?;
        tracing::info!("created entry {entry_id} for {}", record.date);
        return Ok(ReconcileOutcome::Created(entry_id));
    };

    let payload = update_payload(record);
    store.update_entry(&entry_id, &payload).await?;
    tracing::info!(
        "updated entry {entry_id} for {} ({} properties)",
        record.date,
        payload.len()
    );
    Ok(ReconcileOutcome::Updated(entry_id))
}
