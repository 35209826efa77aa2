use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar::{day_label, WeekRange};
use crate::models::{Goal, WeeklyStepCounts};

use super::chart::DailyChart;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyPane {
    pub date: NaiveDate,
    pub label: String,
    pub chart: DailyChart,
}

/// Seven paged day charts for the current week.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyChart {
    pub panes: Vec<WeeklyPane>,
    pub selected: usize,
}

impl WeeklyChart {
    /// Days come from `week`, so every pane exists even before the first
    /// fetch; counts missing from `weekly` show as 0.
    pub fn new(
        week: &WeekRange,
        weekly: Option<&WeeklyStepCounts>,
        goal: Goal,
        today: NaiveDate,
    ) -> Self {
        let panes: Vec<WeeklyPane> = week
            .days
            .iter()
            .map(|day| {
                let count = weekly.map(|w| w.count_for(day.date)).unwrap_or(0);
                WeeklyPane {
                    date: day.date,
                    label: day_label(day.date),
                    chart: DailyChart::new(count, goal),
                }
            })
            .collect();

        let selected = panes
            .iter()
            .position(|pane| pane.date == today)
            .unwrap_or(0);

        Self { panes, selected }
    }

    pub fn select(&mut self, index: usize) {
        self.selected = index.min(self.panes.len().saturating_sub(1));
    }

    pub fn selected_pane(&self) -> Option<&WeeklyPane> {
        self.panes.get(self.selected)
    }
}

impl fmt::Display for WeeklyChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "This week's steps")?;
        let tabs: Vec<String> = self
            .panes
            .iter()
            .enumerate()
            .map(|(index, pane)| {
                if index == self.selected {
                    format!("[{}]", pane.label)
                } else {
                    pane.label.clone()
                }
            })
            .collect();
        writeln!(f, "{}", tabs.join("  "))?;
        if let Some(pane) = self.selected_pane() {
            write!(f, "{}", pane.chart)?;
        }
        Ok(())
    }
}
