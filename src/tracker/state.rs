use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AuthorizationState, DailyStepCount, WeeklyStepCounts};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
    PlatformUnavailable,
    AuthorizationDenied,
    QueryFailure,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub recorded_at: DateTime<Utc>,
}

/// Immutable view of the tracker, published after every change.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TrackerState {
    pub authorization: AuthorizationState,
    pub daily: Option<DailyStepCount>,
    pub weekly: Option<WeeklyStepCounts>,
    pub periodic_refresh_active: bool,
    pub last_diagnostic: Option<Diagnostic>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TrackerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Today's total, 0 until the first successful query.
    pub fn today_count(&self) -> u64 {
        self.daily.map(|daily| daily.count).unwrap_or(0)
    }

    pub fn apply_daily(&mut self, daily: DailyStepCount, at: DateTime<Utc>) {
        self.daily = Some(daily);
        self.updated_at = Some(at);
    }

    pub fn apply_weekly(&mut self, weekly: WeeklyStepCounts, at: DateTime<Utc>) {
        self.weekly = Some(weekly);
        self.updated_at = Some(at);
    }

    pub fn record(&mut self, kind: DiagnosticKind, message: String, at: DateTime<Utc>) {
        self.last_diagnostic = Some(Diagnostic {
            kind,
            message,
            recorded_at: at,
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RefreshKind {
    Daily,
    Weekly,
}

impl RefreshKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshKind::Daily => "daily",
            RefreshKind::Weekly => "weekly",
        }
    }
}

/// Result of one refresh request once its response has been handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome", content = "message")]
pub enum RefreshOutcome {
    Applied,
    /// A newer request of the same kind was applied first.
    Stale,
    Failed(String),
}

/// Tags refresh requests so that a response older than the last applied
/// one is dropped.
#[derive(Debug, Default)]
pub(crate) struct RequestSequencer {
    next: u64,
    daily_applied: u64,
    weekly_applied: u64,
}

impl RequestSequencer {
    pub fn issue(&mut self) -> u64 {
        self.next += 1;
        self.next
    }

    fn applied(&mut self, kind: RefreshKind) -> &mut u64 {
        match kind {
            RefreshKind::Daily => &mut self.daily_applied,
            RefreshKind::Weekly => &mut self.weekly_applied,
        }
    }

    pub fn is_stale(&mut self, kind: RefreshKind, seq: u64) -> bool {
        seq < *self.applied(kind)
    }

    /// Marks `seq` as applied unless a newer response already was.
    pub fn accept(&mut self, kind: RefreshKind, seq: u64) -> bool {
        let applied = self.applied(kind);
        if seq < *applied {
            return false;
        }
        *applied = seq;
        true
    }
}
