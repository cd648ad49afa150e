use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    pub fn for_date(date: NaiveDate) -> Self {
        let start = date.and_time(NaiveTime::MIN).and_utc();
        let end = date.and_time(end_of_day()).and_utc();
        Self { date, start, end }
    }

    pub fn resolve(reference: DateTime<Utc>, offset_days: i64) -> Self {
        let today = reference.date_naive();
        let shift = Days::new(offset_days.unsigned_abs());
        let date = if offset_days >= 0 {
            today.checked_sub_days(shift)
        } else {
            today.checked_add_days(shift)
        };
        Self::for_date(date.unwrap_or(today))
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }

    pub fn date_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn start_iso(&self) -> String {
        format_instant(self.start)
    }

    pub fn end_iso(&self) -> String {
        format_instant(self.end)
    }

    pub fn label(&self) -> String {
        self.date.format("%a %b %d %Y").to_string()
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

fn format_instant(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
