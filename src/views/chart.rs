use std::fmt;

use serde::Serialize;

use crate::models::Goal;

const RING_WIDTH: usize = 20;

/// `count / goal` clamped to `[0, 1]`. A zero goal counts as met.
pub fn fill_fraction(count: u64, goal: u32) -> f64 {
    if goal == 0 {
        return 1.0;
    }
    (count as f64 / goal as f64).clamp(0.0, 1.0)
}

/// Progress ring for one day.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyChart {
    pub steps: u64,
    pub goal: u32,
    pub fill_fraction: f64,
    pub achieved: bool,
}

impl DailyChart {
    pub fn new(steps: u64, goal: Goal) -> Self {
        Self {
            steps,
            goal: goal.value(),
            fill_fraction: fill_fraction(steps, goal.value()),
            achieved: goal.is_achieved_by(steps),
        }
    }
}

impl fmt::Display for DailyChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filled = (self.fill_fraction * RING_WIDTH as f64).round() as usize;
        writeln!(
            f,
            "[{}{}] {:>3.0}%",
            "#".repeat(filled),
            "-".repeat(RING_WIDTH - filled),
            self.fill_fraction * 100.0
        )?;
        writeln!(f, "{} steps", self.steps)?;
        write!(f, "Goal: {} steps", self.goal)?;
        if self.achieved {
            write!(f, "\nGoal achieved! Congratulations!")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GOAL_STEP, MAX_GOAL, MIN_GOAL};

    #[test]
    fn fill_fraction_matches_clamped_ratio_for_every_goal() {
        let counts = [0u64, 1, 999, 1_000, 7_500, 10_000, 12_500, 49_999, 50_000, 120_000];
        for goal in (MIN_GOAL..=MAX_GOAL).step_by(GOAL_STEP as usize) {
            for &count in &counts {
                let chart = DailyChart::new(count, Goal::new(goal as i64));
                let expected = (count as f64 / goal as f64).min(1.0);
                assert!((chart.fill_fraction - expected).abs() < f64::EPSILON);
                assert_eq!(chart.achieved, count >= goal as u64);
            }
        }
    }

    #[test]
    fn over_goal_is_clamped_and_achieved() {
        let chart = DailyChart::new(12_500, Goal::new(10_000));
        assert_eq!(chart.fill_fraction, 1.0);
        assert!(chart.achieved);
        assert!(chart.to_string().contains("Goal achieved"));
    }

    #[test]
    fn zero_goal_does_not_divide() {
        assert_eq!(fill_fraction(0, 0), 1.0);
        assert_eq!(fill_fraction(500, 0), 1.0);
    }

    #[test]
    fn renders_partial_ring() {
        let chart = DailyChart::new(5_000, Goal::new(10_000));
        let rendered = chart.to_string();
        assert!(rendered.starts_with("[##########----------]  50%"));
        assert!(!rendered.contains("Goal achieved"));
    }
}
