use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRepository {
    pub owner: String,
    pub name: String,
    pub private: bool,
}

impl RemoteRepository {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HealthMetrics {
    pub sleep_score: Option<f64>,
    pub recovery_score: Option<f64>,
    pub strain_score: Option<f64>,
    pub hrv_rmssd: Option<f64>,
    pub resting_heart_rate: Option<f64>,
    pub sleep_efficiency: Option<f64>,
    pub sleep_duration_millis: Option<u64>,
    pub deep_sleep_millis: Option<u64>,
    pub rem_sleep_millis: Option<u64>,
}

impl HealthMetrics {
    /// Zero durations count as no data, the same as when they are written out.
    pub fn is_empty(&self) -> bool {
        let scores = [
            self.sleep_score,
            self.recovery_score,
            self.strain_score,
            self.hrv_rmssd,
            self.resting_heart_rate,
            self.sleep_efficiency,
        ];
        let durations = [
            self.sleep_duration_millis,
            self.deep_sleep_millis,
            self.rem_sleep_millis,
        ];

        scores.iter().all(Option::is_none)
            && durations.into_iter().flatten().all(|millis| millis == 0)
    }

    pub fn merge(self, newer: Self) -> Self {
        Self {
            sleep_score: newer.sleep_score.or(self.sleep_score),
            recovery_score: newer.recovery_score.or(self.recovery_score),
            strain_score: newer.strain_score.or(self.strain_score),
            hrv_rmssd: newer.hrv_rmssd.or(self.hrv_rmssd),
            resting_heart_rate: newer.resting_heart_rate.or(self.resting_heart_rate),
            sleep_efficiency: newer.sleep_efficiency.or(self.sleep_efficiency),
            sleep_duration_millis: newer.sleep_duration_millis.or(self.sleep_duration_millis),
            deep_sleep_millis: newer.deep_sleep_millis.or(self.deep_sleep_millis),
            rem_sleep_millis: newer.rem_sleep_millis.or(self.rem_sleep_millis),
        }
    }
}

/// One calendar day of activity. `None` means the source did not report the field,
/// which is different from a reported zero.
#[derive(Debug, Clone, PartialEq)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub commit_count: Option<u64>,
    pub issue_count: Option<u64>,
    pub pull_request_count: Option<u64>,
    pub review_count: Option<u64>,
    pub health: HealthMetrics,
}

impl DayRecord {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            commit_count: None,
            issue_count: None,
            pull_request_count: None,
            review_count: None,
            health: HealthMetrics::default(),
        }
    }

    pub fn merge(self, newer: Self) -> Self {
        debug_assert_eq!(self.date, newer.date, "merging records for different days");
        Self {
            date: self.date,
            commit_count: newer.commit_count.or(self.commit_count),
            issue_count: newer.issue_count.or(self.issue_count),
            pull_request_count: newer.pull_request_count.or(self.pull_request_count),
            review_count: newer.review_count.or(self.review_count),
            health: self.health.merge(newer.health),
        }
    }

    pub fn has_activity(&self) -> bool {
        let any_count = [
            self.commit_count,
            self.issue_count,
            self.pull_request_count,
            self.review_count,
        ]
        .into_iter()
        .flatten()
        .any(|count| count > 0);

        any_count || !self.health.is_empty()
    }

    pub fn total_contributions(&self) -> u64 {
        [
            self.commit_count,
            self.issue_count,
            self.pull_request_count,
            self.review_count,
        ]
        .into_iter()
        .flatten()
        .sum()
    }
}
