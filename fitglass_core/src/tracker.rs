//! Save orchestration: inputs + profile snapshot → persisted daily log.
//!
//! The tracker is the only place that combines the pure engine with a
//! repository. Derived fields are computed once per save from the profile
//! as it is at that moment; changing the profile later never rewrites
//! stored logs.

use crate::aggregation::{self, FatMassProgress, GoalCounts, RollingAverages, TrendPoint};
use crate::engine::calculate_daily_fat_loss;
use crate::goals::suggest_reference_tdee;
use crate::repository::{LogRepository, ProfileRepository};
use crate::scoring::calculate_score;
use crate::{DailyLog, DayInput, LogPatch, Profile, Result};
use chrono::NaiveDate;
use serde::Serialize;

impl DailyLog {
    /// Build the persisted record for a day from its inputs and a profile
    pub fn compute(input: &DayInput, profile: &Profile) -> Self {
        let result = calculate_daily_fat_loss(
            &profile.body_metrics(),
            input.steps,
            input.hiit,
            input.calories,
        );

        DailyLog {
            date: input.date,
            calories: input.calories,
            protein: input.protein,
            steps: input.steps,
            hiit: input.hiit,
            score: calculate_score(input, profile),
            fat_lost: result.deficit_result.fat_lost_kg,
            fat_lost_grams: result.deficit_result.fat_lost_grams,
            deficit: result.deficit_result.deficit,
            tdee: result.tdee_result.tdee,
        }
    }
}

/// Everything the progress views display
#[derive(Clone, Debug, Serialize)]
pub struct Summary {
    pub today: NaiveDate,
    pub days_logged: usize,
    pub total_fat_lost_kg: f64,
    pub short_window: RollingAverages,
    pub long_window: RollingAverages,
    pub goal_counts: GoalCounts,
    pub weekly: Vec<DailyLog>,
    pub progress: FatMassProgress,
    pub days_to_goal: Option<u32>,
    pub trend: Vec<TrendPoint>,
}

/// Orchestrates saves and reads against a repository
pub struct Tracker<R> {
    repo: R,
    short_window: usize,
    long_window: usize,
}

impl<R> Tracker<R>
where
    R: LogRepository + ProfileRepository,
{
    /// Tracker with the default 7- and 30-day windows
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            short_window: 7,
            long_window: 30,
        }
    }

    pub fn with_windows(mut self, short_window: usize, long_window: usize) -> Self {
        self.short_window = short_window;
        self.long_window = long_window;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn profile(&self) -> Result<Profile> {
        self.repo.load_profile()
    }

    /// Load, modify and save the profile as one step
    ///
    /// Stored logs keep the values computed when they were saved.
    pub fn update_profile<F>(&mut self, f: F) -> Result<Profile>
    where
        F: FnOnce(&mut Profile),
    {
        self.repo.modify_profile(f)
    }

    /// Save an onboarding profile with its suggested reference TDEE
    pub fn onboard(&mut self, mut profile: Profile) -> Result<Profile> {
        profile.tdee = suggest_reference_tdee(&profile);
        tracing::info!(
            "Onboarded profile with reference TDEE {} kcal ({:?})",
            profile.tdee,
            profile.activity_level
        );
        self.repo.save_profile(&profile)?;
        Ok(profile)
    }

    /// Merge `patch` over the stored log for `date`, recompute derived
    /// fields from the current profile and save
    pub fn save_day(&mut self, date: NaiveDate, patch: LogPatch) -> Result<DailyLog> {
        let existing = self.repo.get_log(date)?;
        let input = patch.resolve(date, existing.as_ref());
        let profile = self.repo.load_profile()?;

        let log = DailyLog::compute(&input, &profile);
        tracing::debug!(
            "Computed {}: score {}, tdee {}, deficit {}",
            date,
            log.score,
            log.tdee,
            log.deficit
        );

        self.repo.put_log(log.clone())?;
        Ok(log)
    }

    pub fn delete_day(&mut self, date: NaiveDate) -> Result<bool> {
        self.repo.delete_log(date)
    }

    pub fn log_for(&self, date: NaiveDate) -> Result<Option<DailyLog>> {
        self.repo.get_log(date)
    }

    /// All logs, newest first
    pub fn history(&self) -> Result<Vec<DailyLog>> {
        let mut logs = self.repo.list_logs()?;
        logs.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(logs)
    }

    /// Aggregate every stored log as of `today`
    pub fn summary(&self, today: NaiveDate) -> Result<Summary> {
        let profile = self.repo.load_profile()?;
        let logs = self.repo.list_logs()?;

        Ok(Summary {
            today,
            days_logged: logs.len(),
            total_fat_lost_kg: aggregation::total_fat_lost(&logs),
            short_window: aggregation::rolling_averages(&logs, self.short_window),
            long_window: aggregation::rolling_averages(&logs, self.long_window),
            goal_counts: aggregation::goal_counts(&logs, &profile),
            weekly: aggregation::weekly_logs(&logs, today),
            progress: aggregation::fat_mass_progress(&profile, &logs),
            days_to_goal: aggregation::days_to_goal(&profile, &logs, today),
            trend: aggregation::cumulative_fat_trend(&logs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{ChangeFeed, FileRepository, MemoryRepository, StoreEvent};
    use crate::Sex;
    use std::sync::{Arc, Mutex};

    fn reference_profile() -> Profile {
        Profile {
            sex: Sex::Male,
            age: 21,
            height_cm: 174.0,
            weight_kg: 71.0,
            ..Profile::default()
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, day).unwrap()
    }

    #[test]
    fn test_compute_reference_day() {
        let input = DayInput {
            date: date(1),
            calories: 1_370,
            protein: 70,
            steps: 3_000,
            hiit: false,
        };

        let log = DailyLog::compute(&input, &reference_profile());
        assert_eq!(log.tdee, 1952);
        assert_eq!(log.deficit, 582);
        assert_eq!(log.fat_lost, 0.0756);
        assert_eq!(log.fat_lost_grams, 76);
        // 40 protein + 30 calories (within ±100 of 1400) + 15 steps
        assert_eq!(log.score, 85);
        assert_eq!(log.input(), input);
    }

    #[test]
    fn test_save_day_merges_partial_updates() {
        crate::logging::init_test();
        let mut tracker = Tracker::new(MemoryRepository::with_profile(reference_profile()));

        tracker
            .save_day(
                date(2),
                LogPatch {
                    calories: Some(1_370),
                    ..LogPatch::default()
                },
            )
            .unwrap();
        let log = tracker
            .save_day(
                date(2),
                LogPatch {
                    steps: Some(3_000),
                    protein: Some(70),
                    ..LogPatch::default()
                },
            )
            .unwrap();

        assert_eq!(log.calories, 1_370);
        assert_eq!(log.steps, 3_000);
        assert!(!log.hiit);
        assert_eq!(log.tdee, 1952);
        assert_eq!(tracker.history().unwrap().len(), 1);
    }

    #[test]
    fn test_new_day_defaults_missing_fields_to_zero() {
        let mut tracker = Tracker::new(MemoryRepository::new());
        let log = tracker
            .save_day(
                date(3),
                LogPatch {
                    hiit: Some(true),
                    ..LogPatch::default()
                },
            )
            .unwrap();

        assert_eq!(log.calories, 0);
        assert_eq!(log.protein, 0);
        assert_eq!(log.steps, 0);
        assert!(log.hiit);
    }

    #[test]
    fn test_profile_change_does_not_rewrite_history() {
        let mut tracker = Tracker::new(MemoryRepository::with_profile(reference_profile()));
        let patch = LogPatch {
            calories: Some(1_370),
            protein: Some(70),
            steps: Some(3_000),
            hiit: Some(false),
        };

        let before = tracker.save_day(date(4), patch).unwrap();
        tracker.update_profile(|p| p.weight_kg = 95.0).unwrap();

        let stored = tracker.log_for(date(4)).unwrap().unwrap();
        assert_eq!(stored, before);

        // Re-saving the same day picks up the new profile
        let resaved = tracker.save_day(date(4), LogPatch::default()).unwrap();
        assert!(resaved.tdee > before.tdee);
    }

    #[test]
    fn test_delete_day() {
        let mut tracker = Tracker::new(MemoryRepository::new());
        tracker.save_day(date(5), LogPatch::default()).unwrap();

        assert!(tracker.delete_day(date(5)).unwrap());
        assert!(!tracker.delete_day(date(5)).unwrap());
        assert!(tracker.log_for(date(5)).unwrap().is_none());
    }

    #[test]
    fn test_onboard_sets_reference_tdee() {
        let mut tracker = Tracker::new(MemoryRepository::new());
        let profile = tracker.onboard(reference_profile()).unwrap();

        assert_eq!(profile.tdee, 2037);
        assert_eq!(tracker.profile().unwrap().tdee, 2037);
    }

    #[test]
    fn test_summary_over_file_repository() {
        let temp_dir = tempfile::tempdir().unwrap();
        let repo = FileRepository::open(temp_dir.path()).unwrap();
        let mut tracker = Tracker::new(repo).with_windows(2, 30);
        tracker.update_profile(|p| *p = reference_profile()).unwrap();

        for (day, calories) in [(10, 1_370), (11, 1_370), (12, 3_000)] {
            tracker
                .save_day(
                    date(day),
                    LogPatch {
                        calories: Some(calories),
                        protein: Some(80),
                        steps: Some(3_000),
                        hiit: Some(false),
                    },
                )
                .unwrap();
        }

        let summary = tracker.summary(date(12)).unwrap();
        assert_eq!(summary.days_logged, 3);
        assert!((summary.total_fat_lost_kg - 0.1512).abs() < 1e-9);
        assert_eq!(summary.short_window.days_logged, 2);
        assert_eq!(summary.long_window.days_logged, 3);
        assert_eq!(summary.goal_counts.protein_goal_days, 3);
        assert_eq!(summary.goal_counts.calorie_ceiling_days, 2);
        assert_eq!(summary.weekly.first().map(|l| l.date), Some(date(10)));
        assert!(summary.days_to_goal.is_some());
        assert_eq!(summary.trend.len(), 3);
        assert_eq!(summary.trend.last().map(|p| p.cumulative_grams), Some(151));
    }

    #[test]
    fn test_saves_reach_subscribers() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);

        let mut repo = MemoryRepository::new();
        repo.subscribe(Box::new(move |event: &StoreEvent| {
            sink.lock().unwrap().push(event.clone())
        }));

        let mut tracker = Tracker::new(repo);
        let saved = tracker.save_day(date(20), LogPatch::default()).unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.as_slice(), &[StoreEvent::LogSaved(saved)]);
    }
}
