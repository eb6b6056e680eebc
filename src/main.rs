use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;

use fall_tracker_rs::chart::{ChartSink, JsonSeriesSink, SeriesRecorder};
use fall_tracker_rs::contacts::JsonContactStore;
use fall_tracker_rs::export::{timeline, SessionExport};
use fall_tracker_rs::incident::{AutoConfirm, ConfirmPrompt, FallNotifier, FixedLocation, LogDialer};
use fall_tracker_rs::{DetectionConfig, Location, Tracker};

#[derive(Parser, Debug)]
#[command(name = "fall_tracker")]
#[command(about = "Activity timeline, step count and fall alerts from an IMU CSV log", long_about = None)]
struct Args {
    /// CSV log (time,ax,ay,az,wx,wy,wz[,...]); `.gz` is decompressed
    #[arg(value_name = "CSV")]
    input: Option<PathBuf>,

    /// JSON file with detection thresholds
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override acceleration magnitude threshold
    #[arg(long)]
    accel_threshold: Option<f64>,

    /// Override angular velocity magnitude threshold
    #[arg(long)]
    gyro_threshold: Option<f64>,

    /// Key-value JSON file holding the emergency contact
    #[arg(long, default_value = "fall_tracker_contacts.json")]
    contacts: PathBuf,

    /// Store this emergency contact name before processing
    #[arg(long, requires = "set_contact_phone")]
    set_contact_name: Option<String>,

    /// Store this emergency contact phone before processing
    #[arg(long, requires = "set_contact_name")]
    set_contact_phone: Option<String>,

    /// Latitude of the current position
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude of the current position
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Call the emergency contact without asking
    #[arg(long, default_value_t = false)]
    yes: bool,

    /// Write chart series and a session export here
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Print the session export as JSON instead of the text timeline
    #[arg(long, default_value_t = false)]
    json: bool,
}

/// Asks on stdin; anything but y/yes declines.
struct StdinConfirm;

impl ConfirmPrompt for StdinConfirm {
    fn confirm(&mut self, message: &str) -> bool {
        print!("{} [y/N] ", message);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(e) => {
                log::warn!("could not read confirmation: {}", e);
                false
            }
        }
    }
}

fn build_config(args: &Args) -> Result<DetectionConfig> {
    let mut config = match args.config.as_ref() {
        Some(path) => DetectionConfig::load(path)?,
        None => DetectionConfig::default(),
    };
    if let Some(v) = args.accel_threshold {
        config.acceleration_threshold = v;
    }
    if let Some(v) = args.gyro_threshold {
        config.angular_velocity_threshold = v;
    }
    config.validate()?;
    Ok(config)
}

fn chart_sinks(args: &Args) -> Result<(Box<dyn ChartSink + Send>, Box<dyn ChartSink + Send>)> {
    match args.output_dir.as_ref() {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output dir {}", dir.display()))?;
            Ok((
                Box::new(JsonSeriesSink::new(
                    "acceleration",
                    dir.join("acceleration_series.json"),
                )),
                Box::new(JsonSeriesSink::new(
                    "angular_velocity",
                    dir.join("angular_velocity_series.json"),
                )),
            ))
        }
        None => Ok((
            Box::new(SeriesRecorder::new("acceleration")),
            Box::new(SeriesRecorder::new("angular_velocity")),
        )),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = build_config(&args)?;
    let location = match (args.lat, args.lon) {
        (Some(latitude), Some(longitude)) => Some(Location {
            latitude,
            longitude,
        }),
        _ => None,
    };
    let confirm: Box<dyn ConfirmPrompt + Send> = if args.yes {
        Box::new(AutoConfirm(true))
    } else {
        Box::new(StdinConfirm)
    };
    let notifier = FallNotifier::new(
        Box::new(JsonContactStore::new(&args.contacts)),
        Box::new(FixedLocation(location)),
        Box::new(LogDialer),
        confirm,
    );
    let (accel_sink, gyro_sink) = chart_sinks(&args)?;
    let tracker = Tracker::new(config, notifier, accel_sink, gyro_sink);

    if let (Some(name), Some(phone)) = (&args.set_contact_name, &args.set_contact_phone) {
        let contact = tracker.save_contact(name, phone)?;
        println!("Emergency contact saved: {} ({})", contact.name, contact.phone);
    }

    let Some(input) = args.input.as_ref() else {
        if args.set_contact_name.is_some() {
            return Ok(());
        }
        anyhow::bail!("Provide a CSV file to process");
    };

    log::info!("[{}] processing {}", Utc::now().format("%H:%M:%S"), input.display());
    let outcome = tracker
        .process_file(input)
        .await
        .with_context(|| format!("Failed to process {}", input.display()))?;
    let summary = tracker.summary()?;
    let report = tracker.generate_report()?;
    let export = SessionExport::new(&input.display().to_string(), &outcome, summary, report);

    if let Some(dir) = args.output_dir.as_ref() {
        let path = export.save(dir)?;
        log::info!("session saved to {}", path.display());
    }

    if args.json {
        println!("{}", export.to_json()?);
        return Ok(());
    }

    println!("\n=== Activity Timeline ===");
    for entry in timeline(&outcome.processed.segmentation.intervals) {
        println!("{}", entry.describe());
    }

    println!("\n=== Health Report ({}) ===", export.report.period);
    println!(
        "Samples: {} ({} rows skipped)",
        outcome.processed.parse_stats.accepted, outcome.processed.parse_stats.skipped
    );
    println!("Total steps: {}", export.report.total_steps);
    println!("Average steps per day: {}", export.report.avg_steps_per_day);
    println!(
        "Falls recorded: {} ({} fall intervals detected)",
        export.report.fall_count,
        outcome.processed.segmentation.fall_count()
    );
    for rec in &export.report.recommendations {
        println!("  - {}", rec);
    }

    Ok(())
}
