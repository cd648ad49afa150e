use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub records: Vec<T>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SleepStageSummary {
    pub total_in_bed_time_milli: Option<u64>,
    pub total_slow_wave_sleep_time_milli: Option<u64>,
    pub total_rem_sleep_time_milli: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SleepScore {
    pub stage_summary: Option<SleepStageSummary>,
    pub sleep_performance_percentage: Option<f64>,
    pub sleep_efficiency_percentage: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SleepRecord {
    pub score: Option<SleepScore>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecoveryScore {
    pub recovery_score: Option<f64>,
    pub resting_heart_rate: Option<f64>,
    pub hrv_rmssd_milli: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecoveryRecord {
    pub score: Option<RecoveryScore>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CycleScore {
    pub strain: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CycleRecord {
    pub score: Option<CycleScore>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    pub scope: Option<String>,
}
