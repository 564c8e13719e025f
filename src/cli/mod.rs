//! Command-line interface for the scan renamer.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::RenamerConfig;
use crate::core::naming::format_value;
use crate::core::schedule::{self, Schedule};
use crate::processors::ordering::EntryOrder;
use crate::processors::renaming;

#[derive(Parser)]
#[command(name = "scan-renamer")]
#[command(about = "Rename field-scan data files to their measured values", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rename the files of a scan directory to field-value names
    Rename {
        /// Directory containing the scan files
        directory: PathBuf,
        /// Builtin schedule id to apply
        #[arg(short, long)]
        schedule: Option<String>,
        /// YAML file with a custom schedule (overrides --schedule)
        #[arg(long)]
        schedule_file: Option<PathBuf>,
        /// Filename prefix for target names
        #[arg(long)]
        prefix: Option<String>,
        /// Filename suffix for target names
        #[arg(long)]
        suffix: Option<String>,
        /// Replacement for the decimal point in target names
        #[arg(long)]
        decimal_mark: Option<String>,
        /// Entry ordering policy: listing, name, numeric or created
        #[arg(short, long)]
        order: Option<EntryOrder>,
        /// Only rename files with this extension
        #[arg(short, long)]
        extension: Option<String>,
        /// Preview changes without renaming files
        #[arg(long)]
        dry_run: bool,
    },

    /// List builtin schedules
    Schedules {
        /// Show the full segment table of one schedule
        id: Option<String>,
    },
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Shorten a value to fit the summary column, cutting on character
/// boundaries so multibyte names (e.g. non-ASCII paths) never split.
fn clip_value(value: &str) -> String {
    if value.chars().count() > 39 {
        let head: String = value.chars().take(36).collect();
        format!("{}...", head)
    } else {
        value.to_string()
    }
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<62} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        println!("║ {:<20}: {:<39} ║", key, clip_value(value));
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    // Load config
    let config = match &cli.config {
        Some(path) => match RenamerConfig::from_yaml(path) {
            Ok(cfg) => {
                info!("Loaded config from: {}", path.display());
                cfg
            }
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}, using defaults",
                    path.display(),
                    e
                );
                RenamerConfig::default()
            }
        },
        None => RenamerConfig::default(),
    };

    // Dispatch to subcommands
    match cli.command {
        Commands::Rename {
            directory,
            schedule,
            schedule_file,
            prefix,
            suffix,
            decimal_mark,
            order,
            extension,
            dry_run,
        } => {
            cmd_rename(
                &directory,
                schedule.as_deref(),
                schedule_file.as_deref(),
                prefix,
                suffix,
                decimal_mark,
                order,
                extension,
                dry_run,
                &config,
            );
        }
        Commands::Schedules { id } => {
            cmd_schedules(id.as_deref());
        }
    }
}

/// Pick the schedule for a run: an explicit file wins over an id flag,
/// which wins over the configured default.
fn resolve_schedule(
    schedule_file: Option<&Path>,
    schedule_id: Option<&str>,
    config: &RenamerConfig,
) -> Result<Schedule, Box<dyn std::error::Error>> {
    if let Some(path) = schedule_file {
        return Schedule::from_yaml(path);
    }

    let id = schedule_id.unwrap_or(&config.schedule);
    schedule::builtin(id).map_err(|e| {
        format!("{} (available: {})", e, schedule::builtin_ids().join(", ")).into()
    })
}

fn cmd_rename(
    directory: &Path,
    schedule_id: Option<&str>,
    schedule_file: Option<&Path>,
    prefix: Option<String>,
    suffix: Option<String>,
    decimal_mark: Option<String>,
    order: Option<EntryOrder>,
    extension: Option<String>,
    dry_run: bool,
    config: &RenamerConfig,
) {
    let start = Instant::now();

    if dry_run {
        println!("DRY RUN: No files will be renamed");
    }

    // Apply CLI overrides on top of the config
    let mut naming = config.naming.clone();
    if let Some(p) = prefix {
        naming.prefix = p;
    }
    if let Some(s) = suffix {
        naming.suffix = s;
    }
    if let Some(m) = decimal_mark {
        naming.decimal_mark = m;
    }

    let mut scan = config.scan.clone();
    if let Some(o) = order {
        scan.order = o;
    }
    if let Some(e) = extension {
        scan.extension = Some(e);
    }

    let sched = match resolve_schedule(schedule_file, schedule_id, config) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to resolve schedule: {}", e);
            std::process::exit(1);
        }
    };

    println!("Renaming scan files...");
    println!("Directory: {}", directory.display());
    println!("Schedule: {}", sched.id);
    println!("Order: {}", scan.order);
    if let Some(ext) = &scan.extension {
        println!("Extension filter: {}", ext);
    }

    let spinner = create_spinner("Renaming scan files...");

    match renaming::rename_all(directory, &sched, &naming, &scan, dry_run) {
        Ok(report) => {
            spinner.finish_and_clear();

            if !report.is_clean() {
                warn!(
                    "{} file(s) were left with their old names",
                    report.conflict_count() + report.missing_count() + report.failed_count()
                );
            }

            print_summary(
                "Rename Complete",
                &[
                    ("Directory", directory.display().to_string()),
                    ("Schedule", sched.id.clone()),
                    ("Files", report.records.len().to_string()),
                    ("Renamed", report.renamed_count().to_string()),
                    ("Unchanged", report.unchanged_count().to_string()),
                    ("Conflicts", report.conflict_count().to_string()),
                    ("Missing", report.missing_count().to_string()),
                    ("Failed", report.failed_count().to_string()),
                    ("Dry run", dry_run.to_string()),
                    ("Duration", format!("{:.2?}", start.elapsed())),
                ],
            );
        }
        Err(e) => {
            spinner.finish_and_clear();
            error!("Renaming failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn cmd_schedules(id: Option<&str>) {
    match id {
        Some(id) => {
            let sched = match schedule::builtin(id) {
                Ok(s) => s,
                Err(e) => {
                    error!(
                        "{} (available: {})",
                        e,
                        schedule::builtin_ids().join(", ")
                    );
                    std::process::exit(1);
                }
            };

            println!("Schedule {}: {}", sched.id, sched.description);
            println!("Precision: {} decimal digits", sched.precision);
            println!("Segments:");
            for segment in &sched.segments {
                let range = match segment.end {
                    Some(end) => format!("{}..={}", segment.start, end),
                    None => format!("{}..", segment.start),
                };
                println!(
                    "  {:<10} base {:<8} step {}",
                    range,
                    format_value(segment.base, sched.precision),
                    format_value(segment.step, sched.precision),
                );
            }
        }
        None => {
            println!("{:<4} {:<9} {:<10} DESCRIPTION", "ID", "SEGMENTS", "PRECISION");
            for sched in schedule::builtins() {
                println!(
                    "{:<4} {:<9} {:<10} {}",
                    sched.id,
                    sched.segments.len(),
                    sched.precision,
                    sched.description
                );
            }
        }
    }
}
