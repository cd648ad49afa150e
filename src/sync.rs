use chrono::NaiveDate;

use crate::aggregate::{
    collect_day, CommitSource, DaySource, ErrorPolicy, HealthApi, HealthSource, RepositoryHost,
    ReviewEventSource, SearchKind, SearchSource, SourceKind,
};
use crate::models::DayRecord;
use crate::reconcile::{reconcile, DayStore, ReconcileOutcome};
use crate::whoop::auth::{TokenExchange, TokenProvider};
use crate::window::DayWindow;

#[derive(Debug, Clone, PartialEq)]
pub struct SyncRunSummary {
    pub date: NaiveDate,
    pub record: DayRecord,
    pub completed: Vec<SourceKind>,
    pub skipped: Vec<SourceKind>,
    pub outcome: ReconcileOutcome,
}

pub fn github_sources<'a>(
    host: &'a dyn RepositoryHost,
    username: &str,
    policy: ErrorPolicy,
) -> Vec<Box<dyn DaySource + 'a>> {
    vec![
        Box::new(CommitSource::new(host, username, policy)),
        Box::new(SearchSource::new(host, username, SearchKind::Issue)),
        Box::new(SearchSource::new(host, username, SearchKind::PullRequest)),
        Box::new(ReviewEventSource::new(host, username)),
    ]
}

pub async fn health_sources<'a, E: TokenExchange>(
    api: &'a dyn HealthApi,
    tokens: &mut TokenProvider<E>,
) -> anyhow::Result<Vec<Box<dyn DaySource + 'a>>> {
    let access_token = tokens.access_token().await?;

    let mut sources: Vec<Box<dyn DaySource + 'a>> = Vec::new();
    for kind in SourceKind::HEALTH {
        sources.push(Box::new(HealthSource::new(api, access_token.clone(), kind)?));
    }
    Ok(sources)
}

pub async fn sync_day(
    sources: &[Box<dyn DaySource + '_>],
    store: &dyn DayStore,
    window: &DayWindow,
    policy: ErrorPolicy,
) -> anyhow::Result<SyncRunSummary> {
    tracing::info!(
        "syncing {} ({} to {})",
        window.date_key(),
        window.start_iso(),
        window.end_iso()
    );

    let collected = collect_day(sources, window, policy).await?;
    let outcome = reconcile(store, &collected.record).await?;

    Ok(SyncRunSummary {
        date: window.date,
        record: collected.record,
        completed: collected.completed,
        skipped: collected.skipped,
        outcome,
    })
}
