use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::models::{Goal, GOAL_STEP, MAX_GOAL, MIN_GOAL};
use crate::settings::SettingsStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "action", content = "value")]
pub enum SettingsAction {
    Increment,
    Decrement,
    Set(i64),
}

impl SettingsAction {
    /// Writes the resulting goal through the store, which normalizes it.
    pub fn apply(self, settings: &SettingsStore) -> Result<Goal> {
        let current = settings.daily_goal();
        let target = match self {
            SettingsAction::Increment => current.increment(),
            SettingsAction::Decrement => current.decrement(),
            SettingsAction::Set(value) => Goal::new(value),
        };
        settings.set_daily_goal(target.value() as i64)
    }
}

/// Stepper bound to the daily goal.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub goal: u32,
    pub min: u32,
    pub max: u32,
    pub step: u32,
    pub can_increment: bool,
    pub can_decrement: bool,
}

impl SettingsView {
    pub fn new(goal: Goal) -> Self {
        Self {
            goal: goal.value(),
            min: MIN_GOAL,
            max: MAX_GOAL,
            step: GOAL_STEP,
            can_increment: goal.value() < MAX_GOAL,
            can_decrement: goal.value() > MIN_GOAL,
        }
    }
}

impl fmt::Display for SettingsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Goal settings")?;
        write!(
            f,
            "Daily step goal: {}  [{}] [{}]",
            self.goal,
            if self.can_decrement { "-" } else { " " },
            if self.can_increment { "+" } else { " " },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn actions_step_and_clamp_through_the_store() {
        let dir = TempDir::new().unwrap();
        let settings = SettingsStore::new(dir.path().join("settings.json")).unwrap();

        assert_eq!(SettingsAction::Increment.apply(&settings).unwrap().value(), 11_000);
        assert_eq!(SettingsAction::Decrement.apply(&settings).unwrap().value(), 10_000);
        assert_eq!(SettingsAction::Set(60_000).apply(&settings).unwrap().value(), MAX_GOAL);
        assert_eq!(SettingsAction::Increment.apply(&settings).unwrap().value(), MAX_GOAL);
        assert_eq!(settings.daily_goal().value(), MAX_GOAL);
    }

    #[test]
    fn bounds_disable_stepper_buttons() {
        let view = SettingsView::new(Goal::new(MIN_GOAL as i64));
        assert!(!view.can_decrement);
        assert!(view.can_increment);

        let view = SettingsView::new(Goal::new(MAX_GOAL as i64));
        assert!(view.can_decrement);
        assert!(!view.can_increment);
    }
}
