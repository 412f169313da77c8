//! Reference TDEE suggestion for onboarding.
//!
//! The self-reported activity level is only used here. Daily logs compute
//! their own TDEE from steps instead.

use crate::engine::calculate_bmr;
use crate::{ActivityLevel, Profile};

/// Classic activity multiplier for a self-reported level
pub fn activity_multiplier(level: ActivityLevel) -> f64 {
    match level {
        ActivityLevel::Sedentary => 1.2,
        ActivityLevel::Light => 1.375,
        ActivityLevel::Moderate => 1.55,
        ActivityLevel::Active => 1.725,
    }
}

/// Suggested reference TDEE: `round(BMR × activity multiplier)`
pub fn suggest_reference_tdee(profile: &Profile) -> i64 {
    let bmr = calculate_bmr(
        profile.weight_kg,
        profile.height_cm,
        f64::from(profile.age),
        profile.sex,
    );
    (bmr * activity_multiplier(profile.activity_level)).round() as i64
}
