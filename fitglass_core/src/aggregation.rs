//! Summary statistics over a collection of daily logs.
//!
//! Every function takes the logs as an unordered slice and applies its own
//! ordering. Sums use the uncapped `fat_lost` kg value, never the capped
//! grams display field.

use crate::{DailyLog, Profile};
use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Averages over the N most recent logs
#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq)]
pub struct RollingAverages {
    /// Requested window size
    pub window: usize,
    /// Logs actually found inside the window
    pub days_logged: usize,
    pub calories: f64,
    pub protein: f64,
    pub steps: f64,
    pub workout_days: usize,
    pub fat_lost_grams_per_day: f64,
}

/// How many logged days met each goal
///
/// These are plain counts over the whole collection, not consecutive runs.
#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq, Eq)]
pub struct GoalCounts {
    pub protein_goal_days: usize,
    pub calorie_ceiling_days: usize,
    pub workout_days: usize,
}

/// Progress toward the body-fat goal
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct FatMassProgress {
    pub fat_loss_goal_kg: f64,
    pub total_lost_kg: f64,
    pub current_fat_mass_kg: f64,
    pub remaining_kg: f64,
    pub percent_complete: f64,
}

/// One point of the cumulative fat-loss series
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub cumulative_grams: i64,
}

/// Cumulative fat lost in kg
pub fn total_fat_lost(logs: &[DailyLog]) -> f64 {
    logs.iter().map(|l| l.fat_lost).sum()
}

/// The `n` most recent logs, newest first
pub fn most_recent(logs: &[DailyLog], n: usize) -> Vec<&DailyLog> {
    let mut sorted: Vec<&DailyLog> = logs.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.truncate(n);
    sorted
}

/// Averages over the `window` most recent logs by date
///
/// Returns zeros when there are no logs.
pub fn rolling_averages(logs: &[DailyLog], window: usize) -> RollingAverages {
    let recent = most_recent(logs, window);
    let count = recent.len();

    if count == 0 {
        return RollingAverages {
            window,
            ..RollingAverages::default()
        };
    }

    let n = count as f64;
    let mean = |f: fn(&DailyLog) -> f64| recent.iter().map(|l| f(l)).sum::<f64>() / n;

    RollingAverages {
        window,
        days_logged: count,
        calories: mean(|l| f64::from(l.calories)),
        protein: mean(|l| f64::from(l.protein)),
        steps: mean(|l| f64::from(l.steps)),
        workout_days: recent.iter().filter(|l| l.hiit).count(),
        fat_lost_grams_per_day: mean(|l| l.fat_lost) * 1000.0,
    }
}

/// Logs dated within the last seven days of `today`, oldest first
///
/// Logs dated after `today` are kept.
pub fn weekly_logs(logs: &[DailyLog], today: NaiveDate) -> Vec<DailyLog> {
    let cutoff = today - Duration::days(7);
    let mut week: Vec<DailyLog> = logs.iter().filter(|l| l.date >= cutoff).cloned().collect();
    week.sort_by(|a, b| a.date.cmp(&b.date));
    week
}

/// Count days meeting the protein goal, staying under the calorie ceiling
/// (goal + 100 kcal), and completing a workout
pub fn goal_counts(logs: &[DailyLog], profile: &Profile) -> GoalCounts {
    let calorie_ceiling = u64::from(profile.calorie_goal) + 100;

    GoalCounts {
        protein_goal_days: logs
            .iter()
            .filter(|l| l.protein >= profile.protein_goal)
            .count(),
        calorie_ceiling_days: logs
            .iter()
            .filter(|l| u64::from(l.calories) <= calorie_ceiling)
            .count(),
        workout_days: logs.iter().filter(|l| l.hiit).count(),
    }
}

/// Fat-mass progress from the profile's starting point and goal
///
/// A zero fat-loss goal gives a non-finite percentage; nothing is guarded.
pub fn fat_mass_progress(profile: &Profile, logs: &[DailyLog]) -> FatMassProgress {
    let fat_loss_goal_kg = profile.current_fat_mass - profile.goal_fat_mass;
    let total_lost_kg = total_fat_lost(logs);

    FatMassProgress {
        fat_loss_goal_kg,
        total_lost_kg,
        current_fat_mass_kg: profile.current_fat_mass - total_lost_kg,
        remaining_kg: fat_loss_goal_kg - total_lost_kg,
        percent_complete: total_lost_kg / fat_loss_goal_kg * 100.0,
    }
}

/// Projected days until the fat-loss goal at the past week's average rate
///
/// `None` when nothing was logged this week or the average loss is zero.
pub fn days_to_goal(profile: &Profile, logs: &[DailyLog], today: NaiveDate) -> Option<u32> {
    let week = weekly_logs(logs, today);
    if week.is_empty() {
        return None;
    }

    let daily_rate = total_fat_lost(&week) / week.len() as f64;
    if daily_rate <= 0.0 {
        return None;
    }

    let remaining = fat_mass_progress(profile, logs).remaining_kg;
    Some((remaining / daily_rate).ceil().max(0.0) as u32)
}

/// Running total of fat lost per logged day, oldest first, in grams
pub fn cumulative_fat_trend(logs: &[DailyLog]) -> Vec<TrendPoint> {
    let mut sorted: Vec<&DailyLog> = logs.iter().collect();
    sorted.sort_by(|a, b| a.date.cmp(&b.date));

    let mut cumulative = 0.0;
    sorted
        .into_iter()
        .map(|l| {
            cumulative += l.fat_lost;
            TrendPoint {
                date: l.date,
                cumulative_grams: (cumulative * 1000.0).round() as i64,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_log(date: NaiveDate, calories: u32, steps: u32, fat_lost: f64) -> DailyLog {
        DailyLog {
            date,
            calories,
            protein: 80,
            steps,
            hiit: false,
            score: 50,
            fat_lost,
            fat_lost_grams: ((fat_lost * 1000.0).round() as u32).min(250),
            deficit: (fat_lost * 7700.0).round() as u32,
            tdee: 2000,
        }
    }

    #[test]
    fn test_total_fat_lost_uses_uncapped_kg() {
        let logs = vec![
            create_test_log(date(2024, 1, 1), 0, 0, 1.0),
            create_test_log(date(2024, 1, 2), 1500, 0, 0.25),
        ];
        assert_eq!(logs[0].fat_lost_grams, 250);
        assert_eq!(total_fat_lost(&logs), 1.25);
        assert_eq!(total_fat_lost(&[]), 0.0);
    }

    #[test]
    fn test_rolling_windows_select_most_recent() {
        let start = date(2024, 1, 1);
        let mut logs = Vec::new();

        // 30 logs spread over 45 days
        for i in 0..30i64 {
            let day = start + Duration::days(i * 3 / 2);
            let steps = if i >= 23 { 10_000 } else { 0 };
            let mut log = create_test_log(day, 2_000, steps, 0.05);
            log.hiit = i % 2 == 0;
            logs.push(log);
        }
        // Older entries that must never be selected
        for i in 1..=5 {
            logs.push(create_test_log(start - Duration::days(i), 500, 0, 0.0));
        }
        // Unordered input
        logs.reverse();
        logs.swap(0, 17);

        let month = rolling_averages(&logs, 30);
        assert_eq!(month.days_logged, 30);
        assert_eq!(month.calories, 2_000.0);
        assert!((month.steps - 70_000.0 / 30.0).abs() < 1e-9);
        assert_eq!(month.workout_days, 15);
        assert!((month.fat_lost_grams_per_day - 50.0).abs() < 1e-9);

        let week = rolling_averages(&logs, 7);
        assert_eq!(week.days_logged, 7);
        assert_eq!(week.calories, 2_000.0);
        assert_eq!(week.steps, 10_000.0);
        assert_eq!(week.protein, 80.0);
    }

    #[test]
    fn test_rolling_averages_with_few_logs() {
        let logs = vec![
            create_test_log(date(2024, 1, 1), 1_000, 4_000, 0.0),
            create_test_log(date(2024, 1, 2), 2_000, 6_000, 0.1),
        ];
        let averages = rolling_averages(&logs, 7);
        assert_eq!(averages.window, 7);
        assert_eq!(averages.days_logged, 2);
        assert_eq!(averages.calories, 1_500.0);
        assert_eq!(averages.steps, 5_000.0);
        assert!((averages.fat_lost_grams_per_day - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_rolling_averages_empty() {
        let averages = rolling_averages(&[], 30);
        assert_eq!(averages.days_logged, 0);
        assert_eq!(averages.calories, 0.0);
        assert_eq!(averages.fat_lost_grams_per_day, 0.0);
    }

    #[test]
    fn test_weekly_logs_window_and_order() {
        let today = date(2024, 3, 15);
        let logs = vec![
            create_test_log(date(2024, 3, 15), 0, 0, 0.0),
            create_test_log(date(2024, 3, 7), 0, 0, 0.0),
            create_test_log(date(2024, 3, 16), 0, 0, 0.0),
            create_test_log(date(2024, 3, 8), 0, 0, 0.0),
            create_test_log(date(2024, 2, 1), 0, 0, 0.0),
        ];

        let week: Vec<NaiveDate> = weekly_logs(&logs, today).iter().map(|l| l.date).collect();
        assert_eq!(
            week,
            vec![date(2024, 3, 8), date(2024, 3, 15), date(2024, 3, 16)]
        );
    }

    #[test]
    fn test_goal_counts() {
        let profile = Profile::default();
        let mut logs = vec![
            create_test_log(date(2024, 1, 1), 1_500, 0, 0.0),
            create_test_log(date(2024, 1, 2), 1_501, 0, 0.0),
            create_test_log(date(2024, 1, 3), 900, 0, 0.0),
        ];
        logs[1].protein = 69;
        logs[2].protein = 70;
        logs[2].hiit = true;

        let counts = goal_counts(&logs, &profile);
        assert_eq!(
            counts,
            GoalCounts {
                protein_goal_days: 2,
                calorie_ceiling_days: 2,
                workout_days: 1,
            }
        );
    }

    #[test]
    fn test_fat_mass_progress() {
        let profile = Profile::default();
        let logs = vec![
            create_test_log(date(2024, 1, 1), 0, 0, 0.5),
            create_test_log(date(2024, 1, 2), 0, 0, 0.25),
        ];

        let progress = fat_mass_progress(&profile, &logs);
        assert_eq!(progress.fat_loss_goal_kg, 7.0);
        assert_eq!(progress.total_lost_kg, 0.75);
        assert_eq!(progress.current_fat_mass_kg, 26.25);
        assert_eq!(progress.remaining_kg, 6.25);
        assert!((progress.percent_complete - 0.75 / 7.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_days_to_goal() {
        let profile = Profile::default();
        let today = date(2024, 3, 15);
        let logs = vec![
            create_test_log(date(2024, 3, 14), 0, 0, 0.25),
            create_test_log(date(2024, 3, 15), 0, 0, 0.75),
        ];

        // remaining 6.0 kg at 0.5 kg/day
        assert_eq!(days_to_goal(&profile, &logs, today), Some(12));
    }

    #[test]
    fn test_days_to_goal_without_progress() {
        let profile = Profile::default();
        let today = date(2024, 3, 15);

        assert_eq!(days_to_goal(&profile, &[], today), None);

        let stale = vec![create_test_log(date(2024, 1, 1), 0, 0, 0.5)];
        assert_eq!(days_to_goal(&profile, &stale, today), None);

        let flat = vec![create_test_log(date(2024, 3, 14), 3_000, 0, 0.0)];
        assert_eq!(days_to_goal(&profile, &flat, today), None);
    }

    #[test]
    fn test_cumulative_fat_trend() {
        let logs = vec![
            create_test_log(date(2024, 1, 3), 0, 0, 0.1),
            create_test_log(date(2024, 1, 1), 0, 0, 0.05),
            create_test_log(date(2024, 1, 2), 0, 0, 0.0),
        ];

        let trend = cumulative_fat_trend(&logs);
        let grams: Vec<i64> = trend.iter().map(|p| p.cumulative_grams).collect();
        assert_eq!(trend[0].date, date(2024, 1, 1));
        assert_eq!(grams, vec![50, 50, 150]);
    }
}
