use serde::{Deserialize, Serialize};

pub const MIN_GOAL: u32 = 1_000;
pub const MAX_GOAL: u32 = 50_000;
pub const GOAL_STEP: u32 = 1_000;
pub const DEFAULT_GOAL: u32 = 10_000;

/// Daily step goal. Always a multiple of `GOAL_STEP` inside
/// `[MIN_GOAL, MAX_GOAL]`; every constructor normalizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct Goal(u32);

impl Goal {
    /// Clamp into range, then round to the nearest step.
    pub fn new(value: i64) -> Self {
        let clamped = value.clamp(MIN_GOAL as i64, MAX_GOAL as i64) as u32;
        let rounded = (clamped + GOAL_STEP / 2) / GOAL_STEP * GOAL_STEP;
        Self(rounded.clamp(MIN_GOAL, MAX_GOAL))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn increment(self) -> Self {
        Self::new(self.0 as i64 + GOAL_STEP as i64)
    }

    pub fn decrement(self) -> Self {
        Self::new(self.0 as i64 - GOAL_STEP as i64)
    }

    pub fn is_achieved_by(self, count: u64) -> bool {
        count >= self.0 as u64
    }
}

impl Default for Goal {
    fn default() -> Self {
        Self(DEFAULT_GOAL)
    }
}

impl From<i64> for Goal {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<Goal> for i64 {
    fn from(goal: Goal) -> Self {
        goal.0 as i64
    }
}
