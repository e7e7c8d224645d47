//! fitlog CLI - fasting, body composition and habit tracking.

use anyhow::{bail, Result};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fitlog_cli::{Config, TerminalSurface};
use fitlog_core::{
    FastingSession, ReadingEntry, SleepEntry, SleepQuality, Time, Trend, WeightEntry,
    WorkoutEntry,
};
use fitlog_import::{HttpIntermediary, ImportSettings, Importer};
use fitlog_progress::{
    format_hours_minutes, observe, SystemClock, TimedSession, DEFAULT_TICK_INTERVAL,
};
use fitlog_storage::{recent, JsonStorage, Storage};

const DEFAULT_HISTORY: usize = 5;

#[derive(Parser)]
#[command(name = "fitlog")]
#[command(about = "Track fasting, weight, workouts, sleep and reading", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Intermittent fasting
    #[command(subcommand)]
    Fast(FastCommand),
    /// Weight and body composition
    #[command(subcommand)]
    Weight(WeightCommand),
    /// Bodyweight workouts
    #[command(subcommand)]
    Workout(WorkoutCommand),
    /// Sleep log
    #[command(subcommand)]
    Sleep(SleepCommand),
    /// Daily reading habit
    #[command(subcommand)]
    Reading(ReadingCommand),
    /// Fitness goals
    #[command(subcommand)]
    Goals(GoalsCommand),
}

#[derive(Subcommand)]
enum FastCommand {
    /// Start a fast now
    Start,
    /// End the running fast
    End,
    /// Show progress of the running fast
    Status {
        /// Keep updating until Ctrl-C
        #[arg(long)]
        watch: bool,
    },
    /// Recent fasts
    History {
        #[arg(long, default_value_t = DEFAULT_HISTORY)]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum WeightCommand {
    /// Record a weigh-in
    Add {
        /// Weight in kg
        weight: f64,
        /// Body fat, %
        #[arg(long)]
        fat: Option<f64>,
        /// Muscle, %
        #[arg(long)]
        muscle: Option<f64>,
    },
    /// Recent weigh-ins
    History {
        #[arg(long, default_value_t = DEFAULT_HISTORY)]
        limit: usize,
    },
    /// Fetch the latest measurement from Withings
    Import {
        /// Store the imported measurement as a weigh-in
        #[arg(long)]
        save: bool,
    },
}

#[derive(Subcommand)]
enum WorkoutCommand {
    /// Record a workout
    Add {
        #[arg(long, default_value_t = 0)]
        pushups: u32,
        #[arg(long, default_value_t = 0)]
        situps: u32,
        #[arg(long, default_value_t = 0)]
        plank_seconds: u32,
    },
    /// Recent workouts
    History {
        #[arg(long, default_value_t = DEFAULT_HISTORY)]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum SleepCommand {
    /// Record a night of sleep
    Add {
        /// 1 (horrible) to 5 (excellent)
        #[arg(long)]
        quality: u8,
        /// Hours slept
        #[arg(long)]
        hours: f64,
    },
    /// Recent nights
    History {
        #[arg(long, default_value_t = DEFAULT_HISTORY)]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum ReadingCommand {
    /// Mark today's reading as done
    Done,
    /// Recent reading days
    History {
        #[arg(long, default_value_t = DEFAULT_HISTORY)]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum GoalsCommand {
    /// Show current goals
    Show,
    /// Change one goal
    Set { key: String, value: f64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let mut storage = JsonStorage::new(&config.data_dir).await?;

    match cli.command {
        Commands::Fast(cmd) => fast(&mut storage, cmd).await?,
        Commands::Weight(cmd) => weight(&mut storage, &config, cmd).await?,
        Commands::Workout(cmd) => workout(&mut storage, cmd).await?,
        Commands::Sleep(cmd) => sleep(&mut storage, cmd).await?,
        Commands::Reading(cmd) => reading(&mut storage, cmd).await?,
        Commands::Goals(cmd) => goals(&mut storage, cmd).await?,
    }

    Ok(())
}

async fn fast(storage: &mut JsonStorage, cmd: FastCommand) -> Result<()> {
    match cmd {
        FastCommand::Start => {
            if let Some(active) = storage.active_fasting().await? {
                bail!("A fast is already running since {}", format_time(active.start_time));
            }
            let session = FastingSession::start(Utc::now());
            storage.save_fasting(&session).await?;
            info!("Started fast {}", session.id);
            println!("Fast started at {}", format_time(session.start_time));
        }
        FastCommand::End => {
            let Some(mut session) = storage.active_fasting().await? else {
                bail!("No fast is running");
            };
            session.end(Utc::now())?;
            storage.save_fasting(&session).await?;
            info!("Ended fast {}", session.id);
            let minutes = session.duration_minutes.unwrap_or_default();
            println!("Fast ended after {}", format_hours_minutes(minutes as f64));
        }
        FastCommand::Status { watch } => {
            let Some(active) = storage.active_fasting().await? else {
                println!("No fast is running");
                return Ok(());
            };
            let goals = storage.load_goals().await?;
            let session = TimedSession::new(active.start_time, goals.fasting_target_minutes())?;

            if !watch {
                let snapshot = session.progress_at(Utc::now());
                println!("Started:   {}", format_time(active.start_time));
                println!("Elapsed:   {}", snapshot.elapsed_label());
                println!("Progress:  {:.1}%", snapshot.percent_complete);
                if snapshot.goal_reached {
                    println!("Goal of {} reached", format_hours_minutes(session.target_minutes()));
                } else {
                    println!("Remaining: {}", snapshot.remaining_label());
                }
                return Ok(());
            }

            let handle = observe(session, DEFAULT_TICK_INTERVAL, SystemClock, |snapshot| {
                let status = if snapshot.goal_reached {
                    "goal reached".to_string()
                } else {
                    format!("{} left", snapshot.remaining_label())
                };
                print!(
                    "\r{:>5.1}%  {} elapsed, {}   ",
                    snapshot.percent_complete,
                    snapshot.elapsed_label(),
                    status
                );
                let _ = std::io::stdout().flush();
            })?;

            tokio::signal::ctrl_c().await?;
            handle.cancel();
            println!();
        }
        FastCommand::History { limit } => {
            let sessions = storage.list_fasting().await?;
            let rows = recent(&sessions, limit);
            if rows.is_empty() {
                println!("No fasts yet");
                return Ok(());
            }

            println!("{:<17} {:<17} {:>9}  vs previous", "Start", "End", "Duration");
            for (i, session) in rows.iter().enumerate() {
                let duration = session.duration_minutes.map(|m| m as f64);
                let previous = rows
                    .get(i + 1)
                    .and_then(|p| p.duration_minutes)
                    .map(|m| m as f64);
                println!(
                    "{:<17} {:<17} {:>9}  {}",
                    format_time(session.start_time),
                    session.end_time.map(format_time).unwrap_or_else(|| "running".to_string()),
                    duration.map(format_hours_minutes).unwrap_or_else(|| "-".to_string()),
                    Trend::between(duration, previous).symbol()
                );
            }
        }
    }
    Ok(())
}

async fn weight(storage: &mut JsonStorage, config: &Config, cmd: WeightCommand) -> Result<()> {
    match cmd {
        WeightCommand::Add { weight, fat, muscle } => {
            let entry = WeightEntry::new(Utc::now(), weight, fat, muscle)?;
            storage.save_weight(&entry).await?;
            info!("Recorded weight {}", entry.id);
            println!("Recorded {:.1} kg", entry.weight);
        }
        WeightCommand::History { limit } => {
            let entries = storage.list_weights().await?;
            let rows = recent(&entries, limit);
            if rows.is_empty() {
                println!("No weigh-ins yet");
                return Ok(());
            }

            println!("{}", weight_header());
            for (i, entry) in rows.iter().enumerate() {
                println!("{}", weight_row(entry, rows.get(i + 1)));
            }
        }
        WeightCommand::Import { save } => {
            let http = HttpIntermediary::new(config.intermediary.clone());
            let importer = Importer::new(
                Arc::new(http.clone()),
                Arc::new(http),
                Arc::new(TerminalSurface),
            )
            .with_settings(ImportSettings {
                consent_timeout: config.consent_timeout,
                ..Default::default()
            });

            let measurement = match importer.import().await {
                Ok(Some(measurement)) => measurement,
                Ok(None) => {
                    println!("No measurements in the last 24 hours");
                    return Ok(());
                }
                Err(e) if e.is_cancellation() => {
                    println!("Import cancelled: {}", e);
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };

            println!("Measured at {}", format_time(measurement.observed_at));
            println!("  Weight: {}", optional(measurement.weight, "kg"));
            println!("  Fat:    {}", optional(measurement.fat_percentage, "%"));
            println!("  Muscle: {}", optional(measurement.muscle_percentage, "%"));

            if save {
                let Some(weight) = measurement.weight else {
                    bail!("Imported measurement has no weight; nothing saved");
                };
                let entry = WeightEntry::new(
                    measurement.observed_at,
                    weight,
                    measurement.fat_percentage,
                    measurement.muscle_percentage,
                )?;
                storage.save_weight(&entry).await?;
                info!("Saved imported weight {}", entry.id);
                println!("Saved as a weigh-in");
            }
        }
    }
    Ok(())
}

async fn workout(storage: &mut JsonStorage, cmd: WorkoutCommand) -> Result<()> {
    match cmd {
        WorkoutCommand::Add { pushups, situps, plank_seconds } => {
            let entry = WorkoutEntry::new(Utc::now(), pushups, situps, plank_seconds);
            storage.save_workout(&entry).await?;
            info!("Recorded workout {}", entry.id);
            println!(
                "Recorded {} push-ups, {} sit-ups, {}s plank",
                entry.pushups, entry.situps, entry.plank_seconds
            );
        }
        WorkoutCommand::History { limit } => {
            let entries = storage.list_workouts().await?;
            let rows = recent(&entries, limit);
            if rows.is_empty() {
                println!("No workouts yet");
                return Ok(());
            }

            println!("{}", workout_header());
            for (i, entry) in rows.iter().enumerate() {
                println!("{}", workout_row(entry, rows.get(i + 1)));
            }
        }
    }
    Ok(())
}

async fn sleep(storage: &mut JsonStorage, cmd: SleepCommand) -> Result<()> {
    match cmd {
        SleepCommand::Add { quality, hours } => {
            let entry = SleepEntry::new(Utc::now(), SleepQuality::new(quality)?, hours)?;
            storage.save_sleep(&entry).await?;
            info!("Recorded sleep {}", entry.id);
            println!("Recorded {:.1}h of {} sleep", entry.hours, entry.quality.label().to_lowercase());
        }
        SleepCommand::History { limit } => {
            let entries = storage.list_sleep().await?;
            let rows = recent(&entries, limit);
            if rows.is_empty() {
                println!("No sleep logged yet");
                return Ok(());
            }

            println!("{:<17} {:<10} {:>8}", "Date", "Quality", "Hours");
            for (i, entry) in rows.iter().enumerate() {
                let previous = rows.get(i + 1).map(|p| p.hours);
                println!(
                    "{:<17} {:<10} {}",
                    format_time(entry.recorded_at),
                    entry.quality.label(),
                    with_trend(Some(entry.hours), previous),
                );
            }
        }
    }
    Ok(())
}

async fn reading(storage: &mut JsonStorage, cmd: ReadingCommand) -> Result<()> {
    match cmd {
        ReadingCommand::Done => {
            let existing = storage.list_reading().await?;
            let entry = ReadingEntry::log(Utc::now(), &existing)?;
            storage.save_reading(&entry).await?;
            info!("Logged reading {}", entry.id);
            println!("Reading done for today");
        }
        ReadingCommand::History { limit } => {
            let entries = storage.list_reading().await?;
            let rows = recent(&entries, limit);
            if rows.is_empty() {
                println!("No reading logged yet");
                return Ok(());
            }
            for entry in rows {
                println!("{}", format_time(entry.recorded_at));
            }
        }
    }
    Ok(())
}

async fn goals(storage: &mut JsonStorage, cmd: GoalsCommand) -> Result<()> {
    let mut goals = storage.load_goals().await?;
    match cmd {
        GoalsCommand::Show => {
            for (key, value) in goals.entries() {
                println!("{:<26} {}", key, value);
            }
        }
        GoalsCommand::Set { key, value } => {
            goals.set(&key, value)?;
            storage.save_goals(&goals).await?;
            info!("Updated goal {}", key);
            println!("{} = {}", key, value);
        }
    }
    Ok(())
}

fn format_time(at: Time) -> String {
    at.with_timezone(&Local).format("%d/%m/%Y %H:%M").to_string()
}

fn optional(value: Option<f64>, unit: &str) -> String {
    value
        .map(|v| format!("{:.1} {}", v, unit))
        .unwrap_or_else(|| "-".to_string())
}

fn with_trend(current: Option<f64>, previous: Option<f64>) -> String {
    let value = current
        .map(|v| format!("{:.1}", v))
        .unwrap_or_else(|| "-".to_string());
    trend_cell(value, Trend::between(current, previous))
}

fn count_with_trend(current: u32, previous: Option<u32>) -> String {
    let trend = Trend::between(Some(current as f64), previous.map(|p| p as f64));
    trend_cell(current.to_string(), trend)
}

/// A value right-aligned in 8 columns followed by its trend marker.
fn trend_cell(value: String, trend: Trend) -> String {
    format!("{:>8} {}", value, trend.symbol())
}

/// Header for columns of [`trend_cell`]s, labels aligned with the values.
fn trend_header(labels: &[&str]) -> String {
    let columns: Vec<String> = labels.iter().map(|l| format!("{:>8}  ", l)).collect();
    format!("{:<17} {}", "Date", columns.join(" ")).trim_end().to_string()
}

fn weight_header() -> String {
    trend_header(&["Weight", "Fat", "Muscle"])
}

fn weight_row(entry: &WeightEntry, previous: Option<&WeightEntry>) -> String {
    format!(
        "{:<17} {} {} {}",
        format_time(entry.recorded_at),
        with_trend(Some(entry.weight), previous.map(|p| p.weight)),
        with_trend(entry.fat_percentage, previous.and_then(|p| p.fat_percentage)),
        with_trend(entry.muscle_percentage, previous.and_then(|p| p.muscle_percentage)),
    )
}

fn workout_header() -> String {
    trend_header(&["Push-ups", "Sit-ups", "Plank(s)"])
}

fn workout_row(entry: &WorkoutEntry, previous: Option<&WorkoutEntry>) -> String {
    format!(
        "{:<17} {} {} {}",
        format_time(entry.recorded_at),
        count_with_trend(entry.pushups, previous.map(|p| p.pushups)),
        count_with_trend(entry.situps, previous.map(|p| p.situps)),
        count_with_trend(entry.plank_seconds, previous.map(|p| p.plank_seconds)),
    )
}
