//! Day and week boundaries in the user's calendar.
//!
//! All boundaries are computed in the caller's time zone and returned as UTC
//! instants so they can be handed to the health gateway unchanged.

use chrono::{
    DateTime, Datelike, Days, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc, Weekday,
};
use serde::Serialize;

pub const DAYS_PER_WEEK: usize = 7;

/// Source of "now" in the user's local time zone.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// One calendar day as a half-open `[start, end)` interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBounds {
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayBounds {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub days: Vec<DayBounds>,
}

impl WeekRange {
    pub fn first_date(&self) -> NaiveDate {
        self.days[0].date
    }
}

/// Start of `date` in `tz`. Falls back to the first representable local time
/// when midnight falls into a DST gap.
pub fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

pub fn day_bounds<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DayBounds {
    let next = date.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX);
    DayBounds {
        date,
        start: start_of_day(tz, date),
        end: start_of_day(tz, next),
    }
}

/// `[start of today, now)`.
pub fn today_interval<Tz: TimeZone>(now: &DateTime<Tz>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start_of_day(&now.timezone(), now.date_naive());
    (start, now.with_timezone(&Utc))
}

pub fn week_start_date(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let offset = (date.weekday().num_days_from_monday() + 7
        - week_start.num_days_from_monday())
        % 7;
    date.checked_sub_days(Days::new(offset as u64))
        .unwrap_or(NaiveDate::MIN)
}

/// The seven days of the week containing `now`, starting on `week_start`.
pub fn week_range<Tz: TimeZone>(now: &DateTime<Tz>, week_start: Weekday) -> WeekRange {
    let tz = now.timezone();
    let first = week_start_date(now.date_naive(), week_start);
    let days: Vec<DayBounds> = first
        .iter_days()
        .take(DAYS_PER_WEEK)
        .map(|date| day_bounds(&tz, date))
        .collect();

    WeekRange {
        start: days[0].start,
        end: days[DAYS_PER_WEEK - 1].end,
        days,
    }
}

/// Month/day plus weekday abbreviation, e.g. `10/16 (Fri)`.
pub fn day_label(date: NaiveDate) -> String {
    date.format("%-m/%-d (%a)").to_string()
}
