use std::fmt;

use async_trait::async_trait;

use crate::error::SyncError;
use crate::github::schema::{Commit, Event, SearchResults};
use crate::models::{DayRecord, HealthMetrics, RemoteRepository};
use crate::paginate::fetch_all;
use crate::whoop::schema::{CycleRecord, RecoveryRecord, SleepRecord};
use crate::window::DayWindow;

const PER_PAGE: u32 = 100;
const MAX_EVENT_PAGES: u32 = 3;
const REVIEW_EVENT: &str = "PullRequestReviewEvent";

#[async_trait]
pub trait RepositoryHost: Send + Sync {
    async fn list_repositories_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> anyhow::Result<Vec<RemoteRepository>>;

    async fn list_commits_page(
        &self,
        repo: &RemoteRepository,
        author: &str,
        window: &DayWindow,
        page: u32,
        per_page: u32,
    ) -> anyhow::Result<Vec<Commit>>;

    async fn search_issues(&self, query: &str) -> anyhow::Result<SearchResults>;

    async fn list_user_events_page(
        &self,
        username: &str,
        page: u32,
        per_page: u32,
    ) -> anyhow::Result<Vec<Event>>;
}

#[async_trait]
pub trait HealthApi: Send + Sync {
    async fn sleep(
        &self,
        access_token: &str,
        window: &DayWindow,
    ) -> anyhow::Result<Vec<SleepRecord>>;

    async fn recovery(
        &self,
        access_token: &str,
        window: &DayWindow,
    ) -> anyhow::Result<Vec<RecoveryRecord>>;

    async fn cycles(
        &self,
        access_token: &str,
        window: &DayWindow,
    ) -> anyhow::Result<Vec<CycleRecord>>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    #[default]
    ContinueOnError,
    Abort,
}

impl ErrorPolicy {
    fn handle(self, unit: &str, err: anyhow::Error) -> Result<(), SyncError> {
        match self {
            Self::ContinueOnError => {
                tracing::warn!("skipping {unit}: {err:#}");
                Ok(())
            }
            Self::Abort => Err(SyncError::Source {
                unit: unit.to_string(),
                message: format!("{err:#}"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Commits,
    Issues,
    PullRequests,
    Events,
    Sleep,
    Recovery,
    Cycle,
}

impl SourceKind {
    pub const GITHUB: [SourceKind; 4] = [
        SourceKind::Commits,
        SourceKind::Issues,
        SourceKind::PullRequests,
        SourceKind::Events,
    ];
    pub const HEALTH: [SourceKind; 3] =
        [SourceKind::Sleep, SourceKind::Recovery, SourceKind::Cycle];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Commits => "commits",
            Self::Issues => "issues",
            Self::PullRequests => "pull-requests",
            Self::Events => "events",
            Self::Sleep => "sleep",
            Self::Recovery => "recovery",
            Self::Cycle => "cycle",
        }
    }

    pub fn is_health(self) -> bool {
        Self::HEALTH.contains(&self)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait DaySource: Send + Sync {
    fn kind(&self) -> SourceKind;

    async fn fetch_window(&self, window: &DayWindow) -> anyhow::Result<DayRecord>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectedDay {
    pub record: DayRecord,
    pub completed: Vec<SourceKind>,
    pub skipped: Vec<SourceKind>,
}

pub async fn collect_day(
    sources: &[Box<dyn DaySource + '_>],
    window: &DayWindow,
    policy: ErrorPolicy,
) -> Result<CollectedDay, SyncError> {
    let mut collected = CollectedDay {
        record: DayRecord::empty(window.date),
        completed: Vec::new(),
        skipped: Vec::new(),
    };

    for source in sources {
        let kind = source.kind();
        tracing::info!("collecting {kind} for {}", window.date_key());
        match source.fetch_window(window).await {
            Ok(partial) => {
                collected.record = collected.record.merge(partial);
                collected.completed.push(kind);
            }
            Err(err) => {
                policy.handle(kind.as_str(), err)?;
                collected.skipped.push(kind);
            }
        }
    }

    Ok(collected)
}

pub struct CommitSource<'a> {
    host: &'a dyn RepositoryHost,
    author: String,
    policy: ErrorPolicy,
}

impl<'a> CommitSource<'a> {
    pub fn new(
        host: &'a dyn RepositoryHost,
        author: impl Into<String>,
        policy: ErrorPolicy,
    ) -> Self {
        Self {
            host,
            author: author.into(),
            policy,
        }
    }

    pub async fn repositories(&self) -> anyhow::Result<Vec<RemoteRepository>> {
        fetch_all(PER_PAGE, |page| self.host.list_repositories_page(page, PER_PAGE)).await
    }

    pub async fn counts_by_repository(
        &self,
        window: &DayWindow,
    ) -> anyhow::Result<Vec<(RemoteRepository, u64)>> {
        let repositories = self.repositories().await?;
        tracing::info!("found {} repositories", repositories.len());

        let mut counts = Vec::new();
        for repo in repositories {
            let result = fetch_all(PER_PAGE, |page| {
                self.host
                    .list_commits_page(&repo, &self.author, window, page, PER_PAGE)
            })
            .await;

            match result {
                Ok(commits) if commits.is_empty() => {}
                Ok(commits) => {
                    tracing::debug!("{}: {} commits", repo.full_name(), commits.len());
                    counts.push((repo, commits.len() as u64));
                }
                Err(err) => self.policy.handle(&format!("repo {}", repo.full_name()), err)?,
            }
        }

        Ok(counts)
    }
}

#[async_trait]
impl DaySource for CommitSource<'_> {
    fn kind(&self) -> SourceKind {
        SourceKind::Commits
    }

    async fn fetch_window(&self, window: &DayWindow) -> anyhow::Result<DayRecord> {
        let total: u64 = self
            .counts_by_repository(window)
            .await?
            .iter()
            .map(|(_, count)| count)
            .sum();

        Ok(DayRecord {
            commit_count: Some(total),
            ..DayRecord::empty(window.date)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Issue,
    PullRequest,
}

impl SearchKind {
    fn qualifier(self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::PullRequest => "pr",
        }
    }
}

pub struct SearchSource<'a> {
    host: &'a dyn RepositoryHost,
    author: String,
    kind: SearchKind,
}

impl<'a> SearchSource<'a> {
    pub fn new(
        host: &'a dyn RepositoryHost,
        author: impl Into<String>,
        kind: SearchKind,
    ) -> Self {
        Self {
            host,
            author: author.into(),
            kind,
        }
    }

    pub fn query(&self, window: &DayWindow) -> String {
        format!(
            "author:{} type:{} created:{}",
            self.author,
            self.kind.qualifier(),
            window.date_key()
        )
    }

    pub async fn search(&self, window: &DayWindow) -> anyhow::Result<SearchResults> {
        self.host.search_issues(&self.query(window)).await
    }
}

#[async_trait]
impl DaySource for SearchSource<'_> {
    fn kind(&self) -> SourceKind {
        match self.kind {
            SearchKind::Issue => SourceKind::Issues,
            SearchKind::PullRequest => SourceKind::PullRequests,
        }
    }

    async fn fetch_window(&self, window: &DayWindow) -> anyhow::Result<DayRecord> {
        let total = self.search(window).await?.total_count;
        let mut record = DayRecord::empty(window.date);
        match self.kind {
            SearchKind::Issue => record.issue_count = Some(total),
            SearchKind::PullRequest => record.pull_request_count = Some(total),
        }
        Ok(record)
    }
}

pub struct ReviewEventSource<'a> {
    host: &'a dyn RepositoryHost,
    username: String,
}

impl<'a> ReviewEventSource<'a> {
    pub fn new(host: &'a dyn RepositoryHost, username: impl Into<String>) -> Self {
        Self {
            host,
            username: username.into(),
        }
    }

    pub async fn events_in(&self, window: &DayWindow) -> anyhow::Result<WindowEvents> {
        let events = fetch_all(PER_PAGE, |page| async move {
            if page > MAX_EVENT_PAGES {
                Ok(Vec::new())
            } else {
                self.host
                    .list_user_events_page(&self.username, page, PER_PAGE)
                    .await
            }
        })
        .await?;

        let covers_window = events
            .iter()
            .map(|event| event.created_at)
            .min()
            .is_some_and(|oldest| oldest <= window.start);

        Ok(WindowEvents {
            events: events
                .into_iter()
                .filter(|event| window.contains(event.created_at))
                .collect(),
            covers_window,
        })
    }
}

#[derive(Debug, Clone)]
pub struct WindowEvents {
    pub events: Vec<Event>,
    /// False when the event stream ends before reaching the start of the window, so the
    /// window's events cannot be counted.
    pub covers_window: bool,
}

impl WindowEvents {
    pub fn review_count(&self) -> Option<u64> {
        self.covers_window.then(|| count_reviews(&self.events))
    }
}

#[async_trait]
impl DaySource for ReviewEventSource<'_> {
    fn kind(&self) -> SourceKind {
        SourceKind::Events
    }

    async fn fetch_window(&self, window: &DayWindow) -> anyhow::Result<DayRecord> {
        let scanned = self.events_in(window).await?;
        if !scanned.covers_window {
            tracing::warn!(
                "event stream does not reach back to {}, leaving reviews unset",
                window.date_key()
            );
        }

        Ok(DayRecord {
            review_count: scanned.review_count(),
            ..DayRecord::empty(window.date)
        })
    }
}

fn count_reviews(events: &[Event]) -> u64 {
    events
        .iter()
        .filter(|event| event.event_type == REVIEW_EVENT)
        .count() as u64
}

pub struct HealthSource<'a> {
    api: &'a dyn HealthApi,
    access_token: String,
    kind: SourceKind,
}

impl<'a> HealthSource<'a> {
    pub fn new(
        api: &'a dyn HealthApi,
        access_token: impl Into<String>,
        kind: SourceKind,
    ) -> anyhow::Result<Self> {
        if !kind.is_health() {
            anyhow::bail!("{kind} is not a health source");
        }
        Ok(Self {
            api,
            access_token: access_token.into(),
            kind,
        })
    }
}

#[async_trait]
impl DaySource for HealthSource<'_> {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn fetch_window(&self, window: &DayWindow) -> anyhow::Result<DayRecord> {
        let token = self.access_token.as_str();
        let health = match self.kind {
            SourceKind::Sleep => sleep_metrics(&self.api.sleep(token, window).await?),
            SourceKind::Recovery => recovery_metrics(&self.api.recovery(token, window).await?),
            SourceKind::Cycle => cycle_metrics(&self.api.cycles(token, window).await?),
            other => anyhow::bail!("{other} is not a health source"),
        };

        Ok(DayRecord {
            health,
            ..DayRecord::empty(window.date)
        })
    }
}

pub fn sleep_metrics(records: &[SleepRecord]) -> HealthMetrics {
    let Some(score) = records.first().and_then(|sleep| sleep.score.as_ref()) else {
        return HealthMetrics::default();
    };
    let stages = score.stage_summary.clone().unwrap_or_default();

    HealthMetrics {
        sleep_score: score.sleep_performance_percentage,
        sleep_efficiency: score.sleep_efficiency_percentage,
        sleep_duration_millis: nonzero(stages.total_in_bed_time_milli),
        deep_sleep_millis: nonzero(stages.total_slow_wave_sleep_time_milli),
        rem_sleep_millis: nonzero(stages.total_rem_sleep_time_milli),
        ..HealthMetrics::default()
    }
}

fn nonzero(millis: Option<u64>) -> Option<u64> {
    millis.filter(|&millis| millis > 0)
}

pub fn recovery_metrics(records: &[RecoveryRecord]) -> HealthMetrics {
    let Some(score) = records.first().and_then(|recovery| recovery.score.as_ref()) else {
        return HealthMetrics::default();
    };

    HealthMetrics {
        recovery_score: score.recovery_score,
        hrv_rmssd: score.hrv_rmssd_milli,
        resting_heart_rate: score.resting_heart_rate,
        ..HealthMetrics::default()
    }
}

pub fn cycle_metrics(records: &[CycleRecord]) -> HealthMetrics {
    HealthMetrics {
        strain_score: records
            .first()
            .and_then(|cycle| cycle.score.as_ref())
            .and_then(|score| score.strain),
        ..HealthMetrics::default()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::github::schema::SearchItem;
    use crate::whoop::schema::{CycleScore, RecoveryScore, SleepScore, SleepStageSummary};

    fn window() -> DayWindow {
        DayWindow::for_date(NaiveDate::from_ymd_opt(2025, 8, 6).expect("valid date"))
    }

    fn repo(owner: &str, name: &str) -> RemoteRepository {
        RemoteRepository {
            owner: owner.to_string(),
            name: name.to_string(),
            private: false,
        }
    }

    fn commits(n: usize) -> Vec<Commit> {
        (0..n)
            .map(|i| Commit {
                sha: format!("sha-{i}"),
            })
            .collect()
    }

    fn event(event_type: &str, hour: u32, day: u32) -> Event {
        Event {
            event_type: event_type.to_string(),
            created_at: Utc
                .with_ymd_and_hms(2025, 8, day, hour, 0, 0)
                .single()
                .expect("valid datetime"),
            repo: None,
        }
    }

    #[derive(Default)]
    struct FakeHost {
        repositories: Vec<RemoteRepository>,
        commits_by_repo: HashMap<String, usize>,
        failing_repos: Vec<String>,
        search_totals: HashMap<String, u64>,
        events: Vec<Event>,
        queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl RepositoryHost for FakeHost {
        async fn list_repositories_page(
            &self,
            page: u32,
            per_page: u32,
        ) -> anyhow::Result<Vec<RemoteRepository>> {
            Ok(page_of(&self.repositories, page, per_page))
        }

        async fn list_commits_page(
            &self,
            repo: &RemoteRepository,
            _author: &str,
            _window: &DayWindow,
            page: u32,
            per_page: u32,
        ) -> anyhow::Result<Vec<Commit>> {
            let name = repo.full_name();
            if self.failing_repos.contains(&name) {
                anyhow::bail!("github API request failed: status=403 body=forbidden");
            }
            let all = commits(self.commits_by_repo.get(&name).copied().unwrap_or(0));
            Ok(page_of(&all, page, per_page))
        }

        async fn search_issues(&self, query: &str) -> anyhow::Result<SearchResults> {
            self.queries.lock().expect("lock").push(query.to_string());
            let total_count = self
                .search_totals
                .iter()
                .find(|(needle, _)| query.contains(needle.as_str()))
                .map(|(_, total)| *total)
                .unwrap_or(0);
            Ok(SearchResults {
                total_count,
                items: vec![SearchItem {
                    title: "Example".to_string(),
                    repository_url: "https://api.github.com/repos/acme/widgets".to_string(),
                }],
            })
        }

        async fn list_user_events_page(
            &self,
            _username: &str,
            page: u32,
            per_page: u32,
        ) -> anyhow::Result<Vec<Event>> {
            Ok(page_of(&self.events, page, per_page))
        }
    }

    fn page_of<T: Clone>(items: &[T], page: u32, per_page: u32) -> Vec<T> {
        items
            .iter()
            .skip(((page - 1) * per_page) as usize)
            .take(per_page as usize)
            .cloned()
            .collect()
    }

    #[tokio::test]
    async fn sums_commits_across_paginated_repositories() {
        let repositories: Vec<RemoteRepository> =
            (0..150).map(|i| repo("acme", &format!("repo-{i}"))).collect();
        let host = FakeHost {
            commits_by_repo: HashMap::from([
                ("acme/repo-3".to_string(), 2),
                ("acme/repo-120".to_string(), 105),
            ]),
            repositories,
            ..FakeHost::default()
        };
        let source = CommitSource::new(&host, "octocat", ErrorPolicy::ContinueOnError);

        let record = source.fetch_window(&window()).await.expect("commits counted");

        assert_eq!(record.commit_count, Some(107));
        assert_eq!(record.issue_count, None);
    }

    #[tokio::test]
    async fn inaccessible_repository_is_skipped() {
        let host = FakeHost {
            repositories: vec![repo("acme", "open"), repo("other", "locked")],
            commits_by_repo: HashMap::from([("acme/open".to_string(), 3)]),
            failing_repos: vec!["other/locked".to_string()],
            ..FakeHost::default()
        };
        let source = CommitSource::new(&host, "octocat", ErrorPolicy::ContinueOnError);

        let counts = source
            .counts_by_repository(&window())
            .await
            .expect("failure skipped");

        assert_eq!(counts, vec![(repo("acme", "open"), 3)]);
    }

    #[tokio::test]
    async fn abort_policy_surfaces_repository_failure() {
        let host = FakeHost {
            repositories: vec![repo("other", "locked")],
            failing_repos: vec!["other/locked".to_string()],
            ..FakeHost::default()
        };
        let source = CommitSource::new(&host, "octocat", ErrorPolicy::Abort);

        let err = source
            .fetch_window(&window())
            .await
            .expect_err("failure aborts");
        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::Source { unit, .. }) if unit == "repo other/locked"
        ));
    }

    #[tokio::test]
    async fn search_takes_reported_total() {
        let host = FakeHost {
            search_totals: HashMap::from([
                ("type:issue".to_string(), 2),
                ("type:pr".to_string(), 4),
            ]),
            ..FakeHost::default()
        };
        let issues = SearchSource::new(&host, "octocat", SearchKind::Issue);
        let prs = SearchSource::new(&host, "octocat", SearchKind::PullRequest);

        let issue_record = issues.fetch_window(&window()).await.expect("issues");
        let pr_record = prs.fetch_window(&window()).await.expect("prs");

        assert_eq!(issue_record.issue_count, Some(2));
        assert_eq!(pr_record.pull_request_count, Some(4));
        assert_eq!(
            host.queries.lock().expect("lock").clone(),
            vec![
                "author:octocat type:issue created:2025-08-06".to_string(),
                "author:octocat type:pr created:2025-08-06".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn counts_review_events_inside_window_only() {
        let host = FakeHost {
            events: vec![
                event("PullRequestReviewEvent", 15, 7),
                event("PullRequestReviewEvent", 10, 6),
                event("PushEvent", 9, 6),
                event("PullRequestReviewEvent", 0, 6),
                event("PullRequestReviewEvent", 23, 5),
            ],
            ..FakeHost::default()
        };
        let source = ReviewEventSource::new(&host, "octocat");

        let record = source.fetch_window(&window()).await.expect("events");

        assert_eq!(record.review_count, Some(2));
    }

    #[tokio::test]
    async fn window_older_than_event_stream_leaves_reviews_unset() {
        let host = FakeHost {
            events: (0..300).map(|_| event("PushEvent", 12, 20)).collect(),
            ..FakeHost::default()
        };
        let source = ReviewEventSource::new(&host, "octocat");

        let scanned = source.events_in(&window()).await.expect("events");
        let record = source.fetch_window(&window()).await.expect("events");

        assert!(!scanned.covers_window);
        assert!(scanned.events.is_empty());
        assert_eq!(record.review_count, None);
    }

    #[tokio::test]
    async fn empty_event_stream_leaves_reviews_unset() {
        let host = FakeHost::default();
        let source = ReviewEventSource::new(&host, "octocat");

        let record = source.fetch_window(&window()).await.expect("events");

        assert_eq!(record.review_count, None);
    }

    #[tokio::test]
    async fn quiet_window_inside_stream_reports_zero_reviews() {
        let host = FakeHost {
            events: vec![event("PushEvent", 12, 7), event("PushEvent", 12, 4)],
            ..FakeHost::default()
        };
        let source = ReviewEventSource::new(&host, "octocat");

        let record = source.fetch_window(&window()).await.expect("events");

        assert_eq!(record.review_count, Some(0));
    }

    struct FakeHealth {
        sleep: Vec<SleepRecord>,
        recovery: Vec<RecoveryRecord>,
        cycles: Vec<CycleRecord>,
        fail_recovery: bool,
    }

    #[async_trait]
    impl HealthApi for FakeHealth {
        async fn sleep(
            &self,
            _access_token: &str,
            _window: &DayWindow,
        ) -> anyhow::Result<Vec<SleepRecord>> {
            Ok(self.sleep.clone())
        }

        async fn recovery(
            &self,
            _access_token: &str,
            _window: &DayWindow,
        ) -> anyhow::Result<Vec<RecoveryRecord>> {
            if self.fail_recovery {
                anyhow::bail!("whoop API request failed: status=401 body=");
            }
            Ok(self.recovery.clone())
        }

        async fn cycles(
            &self,
            _access_token: &str,
            _window: &DayWindow,
        ) -> anyhow::Result<Vec<CycleRecord>> {
            Ok(self.cycles.clone())
        }
    }

    fn sleep_record(performance: f64, in_bed_millis: u64) -> SleepRecord {
        SleepRecord {
            score: Some(SleepScore {
                stage_summary: Some(SleepStageSummary {
                    total_in_bed_time_milli: Some(in_bed_millis),
                    ..SleepStageSummary::default()
                }),
                sleep_performance_percentage: Some(performance),
                sleep_efficiency_percentage: None,
            }),
        }
    }

    fn health_fixture() -> FakeHealth {
        FakeHealth {
            sleep: vec![sleep_record(91.0, 28_800_000), sleep_record(40.0, 1_800_000)],
            recovery: vec![RecoveryRecord {
                score: Some(RecoveryScore {
                    recovery_score: Some(66.0),
                    resting_heart_rate: Some(52.0),
                    hrv_rmssd_milli: Some(48.3),
                }),
            }],
            cycles: vec![CycleRecord { score: None }],
            fail_recovery: false,
        }
    }

    #[test]
    fn takes_first_sleep_record_only() {
        let metrics = sleep_metrics(&health_fixture().sleep);

        assert_eq!(metrics.sleep_score, Some(91.0));
        assert_eq!(metrics.sleep_duration_millis, Some(28_800_000));
        assert_eq!(metrics.sleep_efficiency, None);
    }

    #[test]
    fn zero_stage_durations_are_absent() {
        let metrics = sleep_metrics(&[sleep_record(75.0, 0)]);

        assert_eq!(metrics.sleep_score, Some(75.0));
        assert_eq!(metrics.sleep_duration_millis, None);
        assert_eq!(metrics.deep_sleep_millis, None);
    }

    #[test]
    fn unscored_records_stay_absent() {
        assert_eq!(cycle_metrics(&health_fixture().cycles), HealthMetrics::default());
        assert_eq!(sleep_metrics(&[]), HealthMetrics::default());
        assert_eq!(
            cycle_metrics(&[CycleRecord {
                score: Some(CycleScore {
                    strain: Some(12.4),
                }),
            }])
            .strain_score,
            Some(12.4)
        );
    }

    #[tokio::test]
    async fn collect_day_merges_and_skips_failed_sources() {
        let api = FakeHealth {
            fail_recovery: true,
            ..health_fixture()
        };
        let mut sources: Vec<Box<dyn DaySource + '_>> = Vec::new();
        for kind in SourceKind::HEALTH {
            sources.push(Box::new(
                HealthSource::new(&api, "token", kind).expect("health kind"),
            ));
        }

        let collected = collect_day(&sources, &window(), ErrorPolicy::ContinueOnError)
            .await
            .expect("collects");

        assert_eq!(
            collected.completed,
            vec![SourceKind::Sleep, SourceKind::Cycle]
        );
        assert_eq!(collected.skipped, vec![SourceKind::Recovery]);
        assert_eq!(collected.record.health.sleep_score, Some(91.0));
        assert_eq!(collected.record.health.recovery_score, None);
    }

    #[tokio::test]
    async fn collect_day_aborts_under_abort_policy() {
        let api = FakeHealth {
            fail_recovery: true,
            ..health_fixture()
        };
        let sources: Vec<Box<dyn DaySource + '_>> = vec![Box::new(
            HealthSource::new(&api, "token", SourceKind::Recovery).expect("health kind"),
        )];

        let err = collect_day(&sources, &window(), ErrorPolicy::Abort)
            .await
            .expect_err("aborts");
        assert!(matches!(err, SyncError::Source { unit, .. } if unit == "recovery"));
    }

    #[test]
    fn health_source_rejects_github_kinds() {
        let api = health_fixture();
        assert!(HealthSource::new(&api, "token", SourceKind::Commits).is_err());
    }
}
