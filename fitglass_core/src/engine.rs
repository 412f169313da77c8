//! Metabolic estimation engine.
//!
//! Pure functions turning a body profile and a day's activity into energy
//! expenditure, calorie deficit and estimated fat loss:
//! - BMR via Mifflin-St Jeor
//! - Step-bucketed activity factor plus a flat HIIT bonus
//! - Deficit floored at zero, fat loss at 7700 kcal per kg
//!
//! Nothing here validates its inputs. Negative or NaN values propagate
//! arithmetically.

use crate::{BodyMetrics, DailyFatLoss, DeficitResult, Sex, TdeeBreakdown, TdeeResult};

/// Energy content of one kilogram of adipose tissue
pub const KCAL_PER_KG_FAT: f64 = 7700.0;

/// Flat bonus for a completed short high-intensity session, regardless of
/// the configured duration
pub const HIIT_BONUS_KCAL: u32 = 60;

/// Upper bound for the grams display value
pub const MAX_DISPLAY_FAT_LOSS_GRAMS: u32 = 250;

/// Calculate Basal Metabolic Rate (kcal/day) with Mifflin-St Jeor
///
/// ```text
/// male:   10 × weight + 6.25 × height − 5 × age + 5
/// female: 10 × weight + 6.25 × height − 5 × age − 161
/// ```
pub fn calculate_bmr(weight_kg: f64, height_cm: f64, age_years: f64, sex: Sex) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * age_years;
    match sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    }
}

/// Activity multiplier selected by the day's step count
///
/// | Steps    | Factor |
/// |----------|--------|
/// | ≥10,000  | 1.55   |
/// | ≥7,500   | 1.40   |
/// | ≥5,000   | 1.25   |
/// | <5,000   | 1.15   |
pub fn activity_factor_from_steps(steps: u32) -> f64 {
    if steps >= 10_000 {
        1.55
    } else if steps >= 7_500 {
        1.40
    } else if steps >= 5_000 {
        1.25
    } else {
        1.15
    }
}

/// Total daily energy expenditure: `round(BMR × factor + HIIT bonus)`
pub fn calculate_total_burn(metrics: &BodyMetrics, steps: u32, did_hiit: bool) -> TdeeResult {
    let bmr = calculate_bmr(
        metrics.weight_kg,
        metrics.height_cm,
        metrics.age_years,
        metrics.sex,
    );
    let activity_factor = activity_factor_from_steps(steps);
    let hiit_bonus = if did_hiit { HIIT_BONUS_KCAL } else { 0 };

    let tdee = (bmr * activity_factor + f64::from(hiit_bonus)).round() as i64;

    TdeeResult {
        tdee,
        breakdown: TdeeBreakdown {
            bmr: bmr.round() as i64,
            activity_factor,
            hiit_bonus,
        },
    }
}

/// Calorie deficit and the fat loss it implies
///
/// A surplus yields zero deficit and zero fat loss. `fat_lost_kg` is rounded
/// to four decimals and left uncapped; only `fat_lost_grams` is capped.
pub fn calculate_deficit_and_fat_loss(calories_consumed: u32, total_burn: i64) -> DeficitResult {
    let raw = (total_burn - i64::from(calories_consumed)).max(0);
    let deficit = u32::try_from(raw).unwrap_or(u32::MAX);

    let fat_lost_kg = round_to(f64::from(deficit) / KCAL_PER_KG_FAT, 4);
    let raw_grams = (fat_lost_kg * 1000.0).round() as u32;
    let fat_lost_grams = raw_grams.min(MAX_DISPLAY_FAT_LOSS_GRAMS);

    DeficitResult {
        deficit,
        fat_lost_kg,
        fat_lost_grams,
    }
}

/// Full calculation for one day: TDEE, then deficit against intake
pub fn calculate_daily_fat_loss(
    metrics: &BodyMetrics,
    steps: u32,
    did_hiit: bool,
    calories_consumed: u32,
) -> DailyFatLoss {
    let tdee_result = calculate_total_burn(metrics, steps, did_hiit);
    let deficit_result = calculate_deficit_and_fat_loss(calories_consumed, tdee_result.tdee);

    tracing::trace!(
        tdee = tdee_result.tdee,
        deficit = deficit_result.deficit,
        "computed daily energy balance"
    );

    DailyFatLoss {
        tdee_result,
        deficit_result,
        has_deficit: deficit_result.deficit > 0,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
