use anyhow::{Context, Result};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};
use tokio::sync::watch;

use crate::models::Goal;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct UserSettings {
    daily_goal: Goal,
    week_start: Weekday,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            daily_goal: Goal::default(),
            week_start: Weekday::Sun,
        }
    }
}

/// Persisted user settings. The daily goal is normalized on every write and
/// broadcast to subscribers.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
    goal_tx: watch::Sender<Goal>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data: UserSettings = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };

        let (goal_tx, _) = watch::channel(data.daily_goal);

        Ok(Self {
            path,
            data: RwLock::new(data),
            goal_tx,
        })
    }

    pub fn daily_goal(&self) -> Goal {
        self.data.read().unwrap().daily_goal
    }

    /// Stores `value` clamped to the goal range and rounded to a whole step.
    pub fn set_daily_goal(&self, value: i64) -> Result<Goal> {
        let goal = Goal::new(value);
        {
            let mut guard = self.data.write().unwrap();
            let updated = UserSettings {
                daily_goal: goal,
                ..guard.clone()
            };
            self.persist(&updated)?;
            *guard = updated;
        }
        self.goal_tx.send_replace(goal);
        Ok(goal)
    }

    pub fn subscribe_goal(&self) -> watch::Receiver<Goal> {
        self.goal_tx.subscribe()
    }

    pub fn week_start(&self) -> Weekday {
        self.data.read().unwrap().week_start
    }

    pub fn set_week_start(&self, week_start: Weekday) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        let updated = UserSettings {
            week_start,
            ..guard.clone()
        };
        self.persist(&updated)?;
        *guard = updated;
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
