use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::WeekRange;
use crate::models::Goal;
use crate::tracker::TrackerState;

use super::{chart::DailyChart, weekly::WeeklyChart};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GraphTab {
    #[default]
    Today,
    ThisWeek,
}

/// Graph screen: a tab switch between today's ring and the weekly pager.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphView {
    pub tab: GraphTab,
    pub daily: DailyChart,
    pub weekly: WeeklyChart,
}

impl GraphView {
    pub fn new(
        state: &TrackerState,
        goal: Goal,
        week: &WeekRange,
        today: NaiveDate,
        tab: GraphTab,
    ) -> Self {
        Self {
            tab,
            daily: DailyChart::new(state.today_count(), goal),
            weekly: WeeklyChart::new(week, state.weekly.as_ref(), goal, today),
        }
    }
}

impl fmt::Display for GraphView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tab {
            GraphTab::Today => {
                writeln!(f, "[Today]  This week")?;
                writeln!(f, "Today's steps")?;
                write!(f, "{}", self.daily)
            }
            GraphTab::ThisWeek => {
                writeln!(f, "Today  [This week]")?;
                write!(f, "{}", self.weekly)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::week_range;
    use crate::models::{AuthorizationState, DailyStepCount};
    use chrono::{FixedOffset, TimeZone, Utc, Weekday};

    #[test]
    fn twelve_thousand_five_hundred_over_ten_thousand_is_full() {
        let tz = FixedOffset::east_opt(9 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2026, 10, 16, 18, 0, 0).unwrap();
        let week = week_range(&now, Weekday::Sun);

        let mut state = TrackerState::new();
        state.authorization = AuthorizationState::Granted;
        state.apply_daily(
            DailyStepCount {
                date: now.date_naive(),
                start: week.days[5].start,
                count: 12_500,
            },
            Utc::now(),
        );

        let view = GraphView::new(&state, Goal::new(10_000), &week, now.date_naive(), GraphTab::Today);
        assert_eq!(view.daily.fill_fraction, 1.0);
        assert!(view.daily.achieved);
        assert_eq!(view.weekly.panes.len(), 7);

        let weekly = GraphView { tab: GraphTab::ThisWeek, ..view };
        assert!(weekly.to_string().contains("This week's steps"));
    }
}
