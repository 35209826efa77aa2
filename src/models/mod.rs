pub mod goal;
pub mod steps;

pub use goal::{Goal, DEFAULT_GOAL, GOAL_STEP, MAX_GOAL, MIN_GOAL};
pub use steps::{AuthorizationState, DailyStepCount, StepSample, WeeklyStepCounts};
