//! Core domain types for FitGlass.
//!
//! This module defines the fundamental types used throughout the system:
//! - The user's physiological profile and goals
//! - A day's raw inputs and the persisted daily log
//! - Engine result records (TDEE breakdown, deficit)

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Parse an ISO calendar date (`YYYY-MM-DD`)
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| Error::InvalidDate(s.to_string()))
}

// ============================================================================
// Profile Types
// ============================================================================

/// Biological sex, selects the Mifflin-St Jeor constant
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    #[default]
    Male,
    Female,
}

/// Self-reported activity level
///
/// Only consulted when suggesting a reference TDEE at onboarding. The
/// per-day engine derives activity from the step count instead.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    #[default]
    Sedentary,
    Light,
    Moderate,
    Active,
}

/// The user's long-lived profile
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(alias = "gender")]
    pub sex: Sex,
    pub age: u32,
    #[serde(rename = "height")]
    pub height_cm: f64,
    #[serde(rename = "weight")]
    pub weight_kg: f64,
    pub current_fat_mass: f64,
    pub goal_fat_mass: f64,
    pub protein_goal: u32,
    pub calorie_goal: u32,
    pub step_goal: u32,
    /// Reference TDEE cached at onboarding, distinct from the per-day value
    pub tdee: i64,
    #[serde(default)]
    pub activity_level: ActivityLevel,
    #[serde(default)]
    pub hiit_enabled: bool,
    #[serde(default = "default_hiit_duration")]
    pub hiit_duration: u32,
}

fn default_hiit_duration() -> u32 {
    15
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: String::new(),
            sex: Sex::Male,
            age: 25,
            height_cm: 175.0,
            weight_kg: 75.0,
            current_fat_mass: 27.0,
            goal_fat_mass: 20.0,
            protein_goal: 70,
            calorie_goal: 1400,
            step_goal: 6000,
            tdee: 1950,
            activity_level: ActivityLevel::Sedentary,
            hiit_enabled: false,
            hiit_duration: default_hiit_duration(),
        }
    }
}

impl Profile {
    /// The subset of the profile the metabolic engine reads
    pub fn body_metrics(&self) -> BodyMetrics {
        BodyMetrics {
            weight_kg: self.weight_kg,
            height_cm: self.height_cm,
            age_years: f64::from(self.age),
            sex: self.sex,
        }
    }
}

/// Inputs to the BMR formula
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyMetrics {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age_years: f64,
    pub sex: Sex,
}

// ============================================================================
// Daily Input and Log Types
// ============================================================================

/// One day's raw inputs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayInput {
    pub date: NaiveDate,
    pub calories: u32,
    pub protein: u32,
    pub steps: u32,
    pub hiit: bool,
}

/// A partial update to a day's inputs
///
/// Unset fields fall back to the stored log for that date, then to zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogPatch {
    pub calories: Option<u32>,
    pub protein: Option<u32>,
    pub steps: Option<u32>,
    pub hiit: Option<bool>,
}

impl LogPatch {
    /// Resolve the patch against an optional existing log
    pub fn resolve(&self, date: NaiveDate, existing: Option<&DailyLog>) -> DayInput {
        DayInput {
            date,
            calories: self
                .calories
                .or(existing.map(|l| l.calories))
                .unwrap_or(0),
            protein: self.protein.or(existing.map(|l| l.protein)).unwrap_or(0),
            steps: self.steps.or(existing.map(|l| l.steps)).unwrap_or(0),
            hiit: self.hiit.or(existing.map(|l| l.hiit)).unwrap_or(false),
        }
    }
}

/// The persisted record of one calendar day
///
/// Derived fields are computed once at save time from the inputs and the
/// profile snapshot, and are never recomputed afterwards.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyLog {
    pub date: NaiveDate,
    pub calories: u32,
    pub protein: u32,
    pub steps: u32,
    pub hiit: bool,
    pub score: u32,
    /// Estimated fat lost in kg, uncapped
    pub fat_lost: f64,
    /// Display value in grams, capped at 250
    pub fat_lost_grams: u32,
    pub deficit: u32,
    pub tdee: i64,
}

impl DailyLog {
    /// The raw inputs this log was computed from
    pub fn input(&self) -> DayInput {
        DayInput {
            date: self.date,
            calories: self.calories,
            protein: self.protein,
            steps: self.steps,
            hiit: self.hiit,
        }
    }
}

// ============================================================================
// Engine Result Types
// ============================================================================

/// Components of a day's TDEE
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TdeeBreakdown {
    /// BMR rounded to whole kcal
    pub bmr: i64,
    pub activity_factor: f64,
    pub hiit_bonus: u32,
}

/// Rounded total daily energy expenditure plus its components
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TdeeResult {
    pub tdee: i64,
    pub breakdown: TdeeBreakdown,
}

/// Energy balance for a day
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeficitResult {
    pub deficit: u32,
    pub fat_lost_kg: f64,
    pub fat_lost_grams: u32,
}

/// Combined engine output for one day
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyFatLoss {
    pub tdee_result: TdeeResult,
    pub deficit_result: DeficitResult,
    pub has_deficit: bool,
}
