use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::{WeekRange, DAYS_PER_WEEK};
use crate::health::DailySum;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum AuthorizationState {
    #[default]
    Unrequested,
    Denied,
    Granted,
}

impl AuthorizationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorizationState::Unrequested => "Unrequested",
            AuthorizationState::Denied => "Denied",
            AuthorizationState::Granted => "Granted",
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, AuthorizationState::Granted)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyStepCount {
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub count: u64,
}

/// Per-day totals for one week. Always holds exactly seven days ordered by
/// start-of-day.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStepCounts {
    days: Vec<DailyStepCount>,
}

impl WeeklyStepCounts {
    /// Zero-fills every day of `week` that has no matching sum.
    pub fn assemble(week: &WeekRange, sums: &[DailySum]) -> Self {
        let days = week
            .days
            .iter()
            .map(|bounds| {
                let count = sums
                    .iter()
                    .filter(|sum| bounds.contains(sum.start))
                    .filter_map(|sum| sum.count)
                    .sum();
                DailyStepCount {
                    date: bounds.date,
                    start: bounds.start,
                    count,
                }
            })
            .collect::<Vec<_>>();

        debug_assert_eq!(days.len(), DAYS_PER_WEEK);
        Self { days }
    }

    pub fn days(&self) -> &[DailyStepCount] {
        &self.days
    }

    pub fn count_for(&self, date: NaiveDate) -> u64 {
        self.days
            .iter()
            .find(|day| day.date == date)
            .map(|day| day.count)
            .unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.days.iter().map(|day| day.count).sum()
    }

    pub fn week_start(&self) -> NaiveDate {
        self.days[0].date
    }
}

fn default_source() -> String {
    "import".into()
}

/// A recorded step sample. It is attributed to the day containing `start`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StepSample {
    #[serde(default = "new_sample_id")]
    pub id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub count: u64,
    #[serde(default = "default_source")]
    pub source: String,
}

fn new_sample_id() -> String {
    Uuid::new_v4().to_string()
}

impl StepSample {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, count: u64) -> Self {
        Self {
            id: new_sample_id(),
            start,
            end,
            count,
            source: default_source(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::week_range;
    use chrono::{FixedOffset, TimeZone, Weekday};

    fn week() -> WeekRange {
        let tz = FixedOffset::east_opt(9 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        week_range(&now, Weekday::Sun)
    }

    #[test]
    fn assemble_fills_missing_days_with_zero() {
        let week = week();
        let sums = vec![
            DailySum {
                start: week.days[1].start,
                end: week.days[1].end,
                count: Some(4_200),
            },
            DailySum {
                start: week.days[3].start,
                end: week.days[3].end,
                count: None,
            },
        ];

        let weekly = WeeklyStepCounts::assemble(&week, &sums);

        assert_eq!(weekly.days().len(), 7);
        assert_eq!(weekly.days()[1].count, 4_200);
        assert_eq!(weekly.days()[3].count, 0);
        assert_eq!(weekly.total(), 4_200);
        assert_eq!(weekly.week_start(), week.first_date());
        for (day, bounds) in weekly.days().iter().zip(&week.days) {
            assert_eq!(day.start, bounds.start);
        }
    }

    #[test]
    fn assemble_with_no_sums_is_all_zero() {
        let weekly = WeeklyStepCounts::assemble(&week(), &[]);
        assert_eq!(weekly.days().len(), 7);
        assert!(weekly.days().iter().all(|day| day.count == 0));
    }

    #[test]
    fn sample_json_defaults_id_and_source() {
        let sample: StepSample = serde_json::from_str(
            r#"{"start":"2026-10-16T01:00:00Z","end":"2026-10-16T01:10:00Z","count":850}"#,
        )
        .unwrap();
        assert_eq!(sample.count, 850);
        assert_eq!(sample.source, "import");
        assert!(Uuid::parse_str(&sample.id).is_ok());
    }
}
