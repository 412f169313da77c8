//! Daily adherence scoring.
//!
//! A day scores up to 100 points against the profile's goals:
//! - Protein: 40
//! - Calories: 30 (only when calories were logged)
//! - Steps: 30, or 20 when the HIIT feature is enabled
//! - Workout: 10, only when the HIIT feature is enabled

use crate::{DayInput, Profile};
use serde::{Deserialize, Serialize};

pub const PROTEIN_POINTS: u32 = 40;
pub const CALORIE_POINTS: u32 = 30;
pub const UNDER_TARGET_CALORIE_POINTS: u32 = 25;
pub const WORKOUT_POINTS: u32 = 10;
pub const MAX_SCORE: u32 = 100;

/// Half-width of the calorie window that earns full points (kcal)
pub const CALORIE_WINDOW_KCAL: i64 = 100;

/// Points per component for one day
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub protein: u32,
    pub calories: u32,
    pub steps: u32,
    pub workout: u32,
}

impl ScoreBreakdown {
    /// Sum of the components, clamped to 100
    pub fn total(&self) -> u32 {
        self.protein
            .saturating_add(self.calories)
            .saturating_add(self.steps)
            .saturating_add(self.workout)
            .min(MAX_SCORE)
    }
}

/// Weight of the steps component for a profile
pub fn step_weight(profile: &Profile) -> u32 {
    if profile.hiit_enabled {
        20
    } else {
        30
    }
}

/// Score each component of a day against the profile's goals
pub fn score_breakdown(input: &DayInput, profile: &Profile) -> ScoreBreakdown {
    ScoreBreakdown {
        protein: proportional_points(input.protein, profile.protein_goal, PROTEIN_POINTS),
        calories: calorie_points(input.calories, profile.calorie_goal),
        steps: proportional_points(input.steps, profile.step_goal, step_weight(profile)),
        workout: if profile.hiit_enabled && input.hiit {
            WORKOUT_POINTS
        } else {
            0
        },
    }
}

/// Daily adherence score in `0..=100`
pub fn calculate_score(input: &DayInput, profile: &Profile) -> u32 {
    score_breakdown(input, profile).total()
}

/// Full weight once the goal is met, otherwise the floored share of it
fn proportional_points(value: u32, goal: u32, weight: u32) -> u32 {
    if value >= goal {
        return weight;
    }
    (f64::from(value) / f64::from(goal) * f64::from(weight)).floor() as u32
}

/// Calorie points: full inside ±100 kcal of the goal, 25 under it, and
/// 5 points lost per 50 kcal over it
fn calorie_points(calories: u32, goal: u32) -> u32 {
    if calories == 0 {
        return 0;
    }

    let calories = i64::from(calories);
    let goal = i64::from(goal);

    if (goal - CALORIE_WINDOW_KCAL..=goal + CALORIE_WINDOW_KCAL).contains(&calories) {
        CALORIE_POINTS
    } else if calories < goal {
        UNDER_TARGET_CALORIE_POINTS
    } else {
        let penalty = (calories - goal) / 50 * 5;
        (i64::from(CALORIE_POINTS) - penalty).max(0) as u32
    }
}
