use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};

use crate::aggregate::{
    CommitSource, DaySource, ErrorPolicy, ReviewEventSource, SearchKind, SearchSource,
};
use crate::config::AppConfig;
use crate::github::GitHubClient;
use crate::notion::NotionClient;
use crate::reconcile::ReconcileOutcome;
use crate::sync::{github_sources, health_sources, sync_day, SyncRunSummary};
use crate::whoop::auth::{TokenProvider, WhoopOAuth};
use crate::whoop::WhoopClient;
use crate::window::DayWindow;

#[derive(Debug, Parser)]
#[command(name = "daily-sync")]
#[command(about = "Sync daily GitHub activity and Whoop health data into a Notion database")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sync every source into one entry
    Sync(SyncArgs),
    /// Sync commits, issues, pull requests and reviews
    Github(SyncArgs),
    /// Sync sleep, recovery and strain
    Whoop(SyncArgs),
    /// Print a GitHub contribution breakdown without writing anything
    Contributions(DayArgs),
    /// Check the destination database schema
    Inspect,
    /// Obtain Whoop OAuth tokens
    WhoopAuth {
        #[command(subcommand)]
        command: WhoopAuthCommand,
    },
}

#[derive(Debug, Subcommand)]
enum WhoopAuthCommand {
    /// Print the authorization URL
    Url {
        /// Defaults to a fresh value per invocation
        #[arg(long)]
        state: Option<String>,
    },
    /// Exchange an authorization code for tokens
    Exchange { code: String },
}

#[derive(Debug, Clone, Args)]
struct DayArgs {
    /// Calendar day in UTC (YYYY-MM-DD)
    #[arg(long, conflicts_with = "days_ago")]
    date: Option<NaiveDate>,
    /// Days before today in UTC
    #[arg(long, default_value_t = 1)]
    days_ago: i64,
}

impl DayArgs {
    fn window(&self) -> DayWindow {
        match self.date {
            Some(date) => DayWindow::for_date(date),
            None => DayWindow::resolve(Utc::now(), self.days_ago),
        }
    }
}

#[derive(Debug, Clone, Args)]
struct SyncArgs {
    #[command(flatten)]
    day: DayArgs,
    /// Abort on the first failing repository or source instead of skipping it
    #[arg(long)]
    fail_fast: bool,
}

impl SyncArgs {
    fn policy(&self) -> ErrorPolicy {
        if self.fail_fast {
            ErrorPolicy::Abort
        } else {
            ErrorPolicy::ContinueOnError
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncScope {
    All,
    Github,
    Health,
}

impl SyncScope {
    fn includes_github(self) -> bool {
        matches!(self, Self::All | Self::Github)
    }

    fn includes_health(self) -> bool {
        matches!(self, Self::All | Self::Health)
    }
}

pub async fn run_from_args<I, T>(args: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let config = AppConfig::load()?;
    run_command(cli.command, &config).await
}

async fn run_command(command: Command, config: &AppConfig) -> anyhow::Result<()> {
    match command {
        Command::Sync(args) => handle_sync(config, SyncScope::All, &args).await?,
        Command::Github(args) => handle_sync(config, SyncScope::Github, &args).await?,
        Command::Whoop(args) => handle_sync(config, SyncScope::Health, &args).await?,
        Command::Contributions(day) => handle_contributions(config, &day).await?,
        Command::Inspect => handle_inspect(config).await?,
        Command::WhoopAuth { command } => handle_whoop_auth(config, command).await?,
    }

    Ok(())
}

async fn handle_sync(config: &AppConfig, scope: SyncScope, args: &SyncArgs) -> anyhow::Result<()> {
    let window = args.day.window();
    let policy = args.policy();

    // Resolve all configuration before touching the network.
    let target = match scope {
        SyncScope::Health => config.health_notion_target()?,
        SyncScope::All | SyncScope::Github => config.notion_target()?,
    };
    let github = if scope.includes_github() {
        let username = config.require_github_username()?;
        let client = GitHubClient::new(config.require_github_token()?)?;
        Some((client, username))
    } else {
        None
    };
    let mut tokens = if scope.includes_health() {
        let oauth = WhoopOAuth::new(
            config.whoop_client_id.clone(),
            config.whoop_client_secret.clone(),
            config.whoop_redirect_uri.clone(),
        )?;
        Some(TokenProvider::new(
            config.whoop_access_token(),
            config.whoop_refresh_token(),
            oauth,
        )?)
    } else {
        None
    };
    let store = NotionClient::new(&target)?;
    let whoop = WhoopClient::new()?;

    let mut sources: Vec<Box<dyn DaySource + '_>> = Vec::new();
    if let Some((client, username)) = &github {
        sources.extend(github_sources(client, username, policy));
    }
    if let Some(tokens) = tokens.as_mut() {
        sources.extend(health_sources(&whoop, tokens).await?);
    }

    let summary = sync_day(&sources, &store, &window, policy).await?;
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &SyncRunSummary) {
    let record = &summary.record;
    let count = |value: Option<u64>| value.map_or("-".to_string(), |v| v.to_string());

    println!("Date: {}", summary.date);
    println!(
        "  commits={} issues={} pull_requests={} reviews={}",
        count(record.commit_count),
        count(record.issue_count),
        count(record.pull_request_count),
        count(record.review_count)
    );
    println!("  total contributions={}", record.total_contributions());
    if !record.health.is_empty() {
        println!("  health: {:?}", record.health);
    }
    if !summary.skipped.is_empty() {
        let skipped: Vec<&str> = summary.skipped.iter().map(|kind| kind.as_str()).collect();
        println!("  skipped sources: {}", skipped.join(", "));
    }

    match &summary.outcome {
        ReconcileOutcome::Created(id) => println!("Created entry {id}"),
        ReconcileOutcome::Updated(id) => println!("Updated entry {id}"),
        ReconcileOutcome::NothingToSync => println!("No activity found, nothing to sync"),
    }
}

async fn handle_contributions(config: &AppConfig, day: &DayArgs) -> anyhow::Result<()> {
    let window = day.window();
    let username = config.require_github_username()?;
    let github = GitHubClient::new(config.require_github_token()?)?;

    let user = github.fetch_authenticated_user().await?;
    println!("Authenticated as: {}", user.login);
    println!(
        "Contributions for {} ({} to {})",
        window.label(),
        window.start_iso(),
        window.end_iso()
    );

    let commit_source = CommitSource::new(&github, username, ErrorPolicy::ContinueOnError);
    let commit_counts = commit_source.counts_by_repository(&window).await?;
    let commits: u64 = commit_counts.iter().map(|(_, count)| count).sum();
    println!("\nCommits: {commits}");
    for (repo, count) in &commit_counts {
        println!("  {}: {count}", repo.full_name());
    }

    let mut search_totals = Vec::new();
    for (label, kind) in [
        ("Issues", SearchKind::Issue),
        ("Pull requests", SearchKind::PullRequest),
    ] {
        let source = SearchSource::new(&github, username, kind);
        match source.search(&window).await {
            Ok(results) => {
                println!("\n{label}: {}", results.total_count);
                for item in &results.items {
                    println!("  {}: {}", item.repository_name(), item.title);
                }
                search_totals.push(results.total_count);
            }
            Err(err) => println!("\n{label}: could not search ({err:#})"),
        }
    }

    let review_source = ReviewEventSource::new(&github, username);
    let reviews = match review_source.events_in(&window).await {
        Ok(scanned) => {
            println!("\nEvents: {}", scanned.events.len());
            for event in &scanned.events {
                let repo = event.repo.as_ref().map_or("unknown repo", |r| r.name.as_str());
                println!(
                    "  {} {} in {repo}",
                    event.created_at.format("%H:%M:%S"),
                    event.event_type
                );
            }
            scanned.review_count()
        }
        Err(err) => {
            println!("\nEvents: could not list ({err:#})");
            None
        }
    };
    match reviews {
        Some(reviews) => println!("\nReviews: {reviews}"),
        None => println!("\nReviews: unknown, the event stream does not reach this day"),
    }

    let total = commits + search_totals.iter().sum::<u64>() + reviews.unwrap_or(0);
    println!("\nTotal contributions found: {total}");
    Ok(())
}

async fn handle_inspect(config: &AppConfig) -> anyhow::Result<()> {
    let notion = NotionClient::new(&config.notion_target()?)?;
    let database = notion
        .retrieve_database()
        .await
        .context("retrieving the destination database")?;

    println!("Database: {} ({})", database.display_title(), notion.database_id());
    println!("\nProperties:");
    for (name, schema) in &database.properties {
        println!("  {name} ({})", schema.property_type);
    }

    println!("\nProperties written by sync:");
    let checks = database.check_properties();
    for check in &checks {
        let status = match (&check.found_type, check.is_ok()) {
            (_, true) => "ok".to_string(),
            (Some(found), false) => format!("wrong type {found}"),
            (None, false) => "missing".to_string(),
        };
        println!("  {} ({}): {status}", check.name, check.expected_type);
    }

    let problems = checks.iter().filter(|check| !check.is_ok()).count();
    if problems > 0 {
        println!("\n{problems} properties need attention");
    }
    Ok(())
}

async fn handle_whoop_auth(config: &AppConfig, command: WhoopAuthCommand) -> anyhow::Result<()> {
    let oauth = WhoopOAuth::new(
        config.whoop_client_id.clone(),
        config.whoop_client_secret.clone(),
        config.whoop_redirect_uri.clone(),
    )?;

    match command {
        WhoopAuthCommand::Url { state } => {
            let state = state.unwrap_or_else(|| oauth_state(Utc::now()));
            let url = oauth.authorize_url(&state)?;
            println!("Open this URL and authorize the app:\n{url}");
            println!(
                "\nThen run: daily-sync whoop-auth exchange <code> with the `code` from {}",
                config.whoop_redirect_uri
            );
            println!("Check that the callback's `state` parameter is {state}");
        }
        WhoopAuthCommand::Exchange { code } => {
            config.require_whoop_client_secret()?;
            let grant = oauth.exchange_code(&code).await?;
            println!("WHOOP_ACCESS_TOKEN={}", grant.access_token);
            if let Some(refresh_token) = &grant.refresh_token {
                println!("WHOOP_REFRESH_TOKEN={refresh_token}");
            }
            if let Some(expires_in) = grant.expires_in {
                println!("# expires in {expires_in} seconds");
            }
            if let Some(scope) = &grant.scope {
                println!("# scope: {scope}");
            }
        }
    }

    Ok(())
}

fn oauth_state(now: DateTime<Utc>) -> String {
    let nanos = now.timestamp_nanos_opt().unwrap_or_else(|| now.timestamp());
    format!("dns-{nanos:x}")
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use clap::Parser;
    use pretty_assertions::{assert_eq, assert_ne};

    use super::*;

    #[test]
    fn parses_sync_with_literal_date() {
        let cli = Cli::parse_from(["daily-sync", "sync", "--date", "2025-08-06", "--fail-fast"]);

        let Command::Sync(args) = cli.command else {
            panic!("expected sync command");
        };
        assert_eq!(args.day.window().date_key(), "2025-08-06");
        assert_eq!(args.policy(), ErrorPolicy::Abort);
    }

    #[test]
    fn defaults_to_yesterday_and_continue_on_error() {
        let cli = Cli::parse_from(["daily-sync", "github"]);

        let Command::Github(args) = cli.command else {
            panic!("expected github command");
        };
        assert_eq!(args.day.days_ago, 1);
        assert_eq!(args.day.date, None);
        assert_eq!(args.policy(), ErrorPolicy::ContinueOnError);
    }

    #[test]
    fn date_and_days_ago_conflict() {
        let result = Cli::try_parse_from([
            "daily-sync",
            "whoop",
            "--date",
            "2025-08-06",
            "--days-ago",
            "2",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_whoop_auth_exchange() {
        let cli = Cli::parse_from(["daily-sync", "whoop-auth", "exchange", "abc123"]);

        let Command::WhoopAuth {
            command: WhoopAuthCommand::Exchange { code },
        } = cli.command
        else {
            panic!("expected whoop-auth exchange");
        };
        assert_eq!(code, "abc123");
    }

    #[test]
    fn oauth_state_changes_per_invocation() {
        let first = Utc
            .with_ymd_and_hms(2025, 8, 6, 10, 0, 0)
            .single()
            .expect("valid datetime");
        let second = first + chrono::Duration::milliseconds(1);

        let state = oauth_state(first);
        assert!(state.len() >= 8);
        assert_ne!(state, oauth_state(second));
    }

    #[test]
    fn whoop_auth_url_state_is_optional() {
        let cli = Cli::parse_from(["daily-sync", "whoop-auth", "url"]);

        let Command::WhoopAuth {
            command: WhoopAuthCommand::Url { state },
        } = cli.command
        else {
            panic!("expected whoop-auth url");
        };
        assert_eq!(state, None);
    }

    #[test]
    fn scopes_select_sources() {
        assert!(SyncScope::All.includes_github() && SyncScope::All.includes_health());
        assert!(!SyncScope::Github.includes_health());
        assert!(!SyncScope::Health.includes_github());
    }
}
