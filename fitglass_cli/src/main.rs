use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use fitglass_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "fitglass")]
#[command(about = "Daily fat-loss tracker: energy balance and adherence scoring", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the profile and compute its reference TDEE
    Onboard(ProfileArgs),

    /// Show or edit the profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Record (or update) a day's calories, protein, steps and workout
    Log {
        /// Day to record, defaults to today
        #[arg(long, value_parser = date_arg)]
        date: Option<NaiveDate>,

        /// Calories consumed (kcal)
        #[arg(long)]
        calories: Option<u32>,

        /// Protein eaten (g)
        #[arg(long)]
        protein: Option<u32>,

        /// Step count
        #[arg(long)]
        steps: Option<u32>,

        /// Mark the workout as completed
        #[arg(long, conflicts_with = "no_hiit")]
        hiit: bool,

        /// Mark the workout as not completed
        #[arg(long)]
        no_hiit: bool,
    },

    /// Show one day's log
    Show {
        #[arg(long, value_parser = date_arg)]
        date: Option<NaiveDate>,
    },

    /// Delete one day's log
    Delete {
        #[arg(long, value_parser = date_arg)]
        date: NaiveDate,
    },

    /// List logged days, newest first
    History {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Totals, rolling averages and goal progress
    Summary {
        /// Reference day for weekly figures, defaults to today
        #[arg(long, value_parser = date_arg)]
        today: Option<NaiveDate>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Logs from the past seven days, oldest first
    Week {
        #[arg(long, value_parser = date_arg)]
        today: Option<NaiveDate>,
    },

    /// Export all logs to CSV
    Export {
        #[arg(long)]
        out: PathBuf,
    },

    /// Compact the log journal
    Compact {
        /// Remove archived journals after compaction
        #[arg(long)]
        cleanup: bool,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Print the current profile
    Show,
    /// Change profile fields; saved logs keep their values
    Set(ProfileArgs),
}

#[derive(Args)]
struct ProfileArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long, value_enum)]
    sex: Option<SexArg>,
    /// Age in years
    #[arg(long)]
    age: Option<u32>,
    /// Height in cm
    #[arg(long)]
    height: Option<f64>,
    /// Weight in kg
    #[arg(long)]
    weight: Option<f64>,
    /// Current fat mass in kg
    #[arg(long)]
    current_fat: Option<f64>,
    /// Goal fat mass in kg
    #[arg(long)]
    goal_fat: Option<f64>,
    #[arg(long)]
    protein_goal: Option<u32>,
    #[arg(long)]
    calorie_goal: Option<u32>,
    #[arg(long)]
    step_goal: Option<u32>,
    #[arg(long, value_enum)]
    activity: Option<ActivityArg>,
    /// Enable the workout feature (true/false)
    #[arg(long)]
    hiit: Option<bool>,
    /// Workout duration in minutes
    #[arg(long)]
    hiit_duration: Option<u32>,
}

#[derive(Clone, Copy, ValueEnum)]
enum SexArg {
    Male,
    Female,
}

#[derive(Clone, Copy, ValueEnum)]
enum ActivityArg {
    Sedentary,
    Light,
    Moderate,
    Active,
}

impl From<SexArg> for Sex {
    fn from(arg: SexArg) -> Self {
        match arg {
            SexArg::Male => Sex::Male,
            SexArg::Female => Sex::Female,
        }
    }
}

impl From<ActivityArg> for ActivityLevel {
    fn from(arg: ActivityArg) -> Self {
        match arg {
            ActivityArg::Sedentary => ActivityLevel::Sedentary,
            ActivityArg::Light => ActivityLevel::Light,
            ActivityArg::Moderate => ActivityLevel::Moderate,
            ActivityArg::Active => ActivityLevel::Active,
        }
    }
}

impl ProfileArgs {
    fn apply(&self, profile: &mut Profile) {
        if let Some(ref name) = self.name {
            profile.name = name.clone();
        }
        if let Some(sex) = self.sex {
            profile.sex = sex.into();
        }
        if let Some(age) = self.age {
            profile.age = age;
        }
        if let Some(height) = self.height {
            profile.height_cm = height;
        }
        if let Some(weight) = self.weight {
            profile.weight_kg = weight;
        }
        if let Some(fat) = self.current_fat {
            profile.current_fat_mass = fat;
        }
        if let Some(fat) = self.goal_fat {
            profile.goal_fat_mass = fat;
        }
        if let Some(goal) = self.protein_goal {
            profile.protein_goal = goal;
        }
        if let Some(goal) = self.calorie_goal {
            profile.calorie_goal = goal;
        }
        if let Some(goal) = self.step_goal {
            profile.step_goal = goal;
        }
        if let Some(level) = self.activity {
            profile.activity_level = level.into();
        }
        if let Some(enabled) = self.hiit {
            profile.hiit_enabled = enabled;
        }
        if let Some(minutes) = self.hiit_duration {
            profile.hiit_duration = minutes;
        }
    }
}

fn date_arg(s: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn main() -> Result<()> {
    fitglass_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    tracing::debug!("Using data directory {:?}", data_dir);
    let repo = FileRepository::open(&data_dir)?;
    let mut tracker = Tracker::new(repo).with_windows(
        config.summary.short_window_days,
        config.summary.long_window_days,
    );

    match cli.command {
        Commands::Onboard(args) => cmd_onboard(&mut tracker, &args),
        Commands::Profile { action } => match action {
            ProfileAction::Show => cmd_profile_show(&tracker),
            ProfileAction::Set(args) => cmd_profile_set(&mut tracker, &args),
        },
        Commands::Log {
            date,
            calories,
            protein,
            steps,
            hiit,
            no_hiit,
        } => {
            let hiit = match (hiit, no_hiit) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let patch = config.input.clamp(LogPatch {
                calories,
                protein,
                steps,
                hiit,
            });
            cmd_log(&mut tracker, date.unwrap_or_else(today), patch)
        }
        Commands::Show { date } => cmd_show(&tracker, date.unwrap_or_else(today)),
        Commands::Delete { date } => cmd_delete(&mut tracker, date),
        Commands::History { limit } => cmd_history(&tracker, limit),
        Commands::Summary { today: day, json } => {
            cmd_summary(&tracker, day.unwrap_or_else(today), json)
        }
        Commands::Week { today: day } => cmd_week(&tracker, day.unwrap_or_else(today)),
        Commands::Export { out } => cmd_export(&tracker, &out),
        Commands::Compact { cleanup } => cmd_compact(&tracker, cleanup),
    }
}

fn cmd_onboard(tracker: &mut Tracker<FileRepository>, args: &ProfileArgs) -> Result<()> {
    let mut profile = tracker.profile()?;
    args.apply(&mut profile);
    let profile = tracker.onboard(profile)?;

    println!("✓ Profile saved");
    println!("  Reference TDEE: {} kcal", profile.tdee);
    display_profile(&profile);
    Ok(())
}

fn cmd_profile_show(tracker: &Tracker<FileRepository>) -> Result<()> {
    display_profile(&tracker.profile()?);
    Ok(())
}

fn cmd_profile_set(tracker: &mut Tracker<FileRepository>, args: &ProfileArgs) -> Result<()> {
    let profile = tracker.update_profile(|p| args.apply(p))?;
    println!("✓ Profile updated (saved logs keep their values)");
    display_profile(&profile);
    Ok(())
}

fn cmd_log(tracker: &mut Tracker<FileRepository>, date: NaiveDate, patch: LogPatch) -> Result<()> {
    let log = tracker.save_day(date, patch)?;
    println!(
        "✓ Logged {}: score {}, TDEE {} kcal, deficit {} kcal, fat lost {} g",
        log.date, log.score, log.tdee, log.deficit, log.fat_lost_grams
    );
    Ok(())
}

fn cmd_show(tracker: &Tracker<FileRepository>, date: NaiveDate) -> Result<()> {
    match tracker.log_for(date)? {
        Some(log) => display_log(&log),
        None => println!("No log for {}", date),
    }
    Ok(())
}

fn cmd_delete(tracker: &mut Tracker<FileRepository>, date: NaiveDate) -> Result<()> {
    if tracker.delete_day(date)? {
        println!("✓ Deleted log for {}", date);
    } else {
        println!("No log for {}", date);
    }
    Ok(())
}

fn cmd_history(tracker: &Tracker<FileRepository>, limit: Option<usize>) -> Result<()> {
    let logs = tracker.history()?;
    if logs.is_empty() {
        println!("No logs yet.");
        return Ok(());
    }

    for log in logs.iter().take(limit.unwrap_or(usize::MAX)) {
        println!("{}", format_row(log));
    }
    Ok(())
}

fn cmd_summary(tracker: &Tracker<FileRepository>, today: NaiveDate, json: bool) -> Result<()> {
    let summary = tracker.summary(today)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  PROGRESS as of {}", summary.today);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Days logged:      {}", summary.days_logged);
    println!("  Total fat lost:   {:.2} kg", summary.total_fat_lost_kg);
    println!(
        "  Fat mass:         {:.1} kg ({:.1} kg remaining, {:.0}% of goal)",
        summary.progress.current_fat_mass_kg,
        summary.progress.remaining_kg,
        summary.progress.percent_complete
    );
    match summary.days_to_goal {
        Some(days) => println!("  Goal in:          ~{} days at this week's rate", days),
        None => println!("  Goal in:          ? (no loss logged this week)"),
    }
    println!();
    display_averages(&summary.short_window);
    display_averages(&summary.long_window);
    println!(
        "  Goal days: protein {}, under calorie ceiling {}, workouts {}",
        summary.goal_counts.protein_goal_days,
        summary.goal_counts.calorie_ceiling_days,
        summary.goal_counts.workout_days
    );
    println!();
    Ok(())
}

fn cmd_week(tracker: &Tracker<FileRepository>, today: NaiveDate) -> Result<()> {
    let logs = tracker.repository().list_logs()?;
    let week = aggregation::weekly_logs(&logs, today);
    if week.is_empty() {
        println!("No logs in the past week.");
        return Ok(());
    }

    for log in &week {
        println!("{}", format_row(log));
    }
    Ok(())
}

fn cmd_export(tracker: &Tracker<FileRepository>, out: &Path) -> Result<()> {
    let logs = tracker.repository().list_logs()?;
    let count = export_csv(&logs, out)?;
    println!("✓ Exported {} logs to {}", count, out.display());
    Ok(())
}

fn cmd_compact(tracker: &Tracker<FileRepository>, cleanup: bool) -> Result<()> {
    let repo = tracker.repository();
    if !repo.journal_path().exists() {
        println!("No journal found - nothing to compact.");
        return Ok(());
    }

    let kept = repo.compact()?;
    println!("✓ Compacted journal to {} logs", kept);

    if cleanup {
        let cleaned = repo.cleanup_processed()?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed journal files", cleaned);
        }
    }
    Ok(())
}

fn display_profile(profile: &Profile) {
    println!();
    if !profile.name.is_empty() {
        println!("  Name:      {}", profile.name);
    }
    println!(
        "  Body:      {:?}, {} y, {} cm, {} kg",
        profile.sex, profile.age, profile.height_cm, profile.weight_kg
    );
    println!(
        "  Fat mass:  {} kg → {} kg",
        profile.current_fat_mass, profile.goal_fat_mass
    );
    println!(
        "  Goals:     {} kcal, {} g protein, {} steps",
        profile.calorie_goal, profile.protein_goal, profile.step_goal
    );
    println!(
        "  Workout:   {}",
        if profile.hiit_enabled {
            format!("enabled ({} min)", profile.hiit_duration)
        } else {
            "disabled".to_string()
        }
    );
    println!(
        "  Activity:  {:?} (reference TDEE {} kcal)",
        profile.activity_level, profile.tdee
    );
}

fn display_log(log: &DailyLog) {
    println!("\n  {}", log.date);
    println!("  Calories: {} kcal", log.calories);
    println!("  Protein:  {} g", log.protein);
    println!("  Steps:    {}", log.steps);
    println!("  Workout:  {}", if log.hiit { "yes" } else { "no" });
    println!("  TDEE:     {} kcal", log.tdee);
    println!("  Deficit:  {} kcal", log.deficit);
    println!("  Fat lost: {} g ({:.4} kg)", log.fat_lost_grams, log.fat_lost);
    println!("  Score:    {}", log.score);
}

fn display_averages(averages: &aggregation::RollingAverages) {
    println!(
        "  Last {} days ({} logged): {:.0} kcal, {:.0} g protein, {:.0} steps, {} workouts, {:.0} g fat/day",
        averages.window,
        averages.days_logged,
        averages.calories,
        averages.protein,
        averages.steps,
        averages.workout_days,
        averages.fat_lost_grams_per_day
    );
}

fn format_row(log: &DailyLog) -> String {
    format!(
        "{}  {:>5} kcal  {:>3} g  {:>6} steps  {:<3}  score {:>3}  fat {:>3} g",
        log.date,
        log.calories,
        log.protein,
        log.steps,
        if log.hiit { "yes" } else { "no" },
        log.score,
        log.fat_lost_grams
    )
}
