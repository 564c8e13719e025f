//! Batch renaming of scan files to field-value names.
//!
//! Renaming runs in three phases:
//! 1. scan the directory in the configured order,
//! 2. plan every rename up front (index -> value -> target name),
//! 3. execute the plan file by file.
//!
//! Planning is all-or-nothing: an index no segment covers or two indices
//! mapping to the same name abort the run before any file is touched.
//! Execution recovers per file: a missing source or an occupied target is
//! recorded and skipped while the rest of the batch proceeds.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{NamingConfig, ScanConfig};
use crate::core::naming;
use crate::core::schedule::{Schedule, ScheduleError};
use crate::processors::ordering::{scan_entries, ScanError};

/// Errors that abort a renaming run before any file is touched.
#[derive(Debug, Error)]
pub enum RenameError {
    #[error("Failed to scan directory: {0}")]
    Scan(#[from] ScanError),

    #[error("Invalid schedule: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("Indices {first_index} and {second_index} both map to '{name}'")]
    DuplicateTarget {
        first_index: u32,
        second_index: u32,
        name: String,
    },
}

/// Result type for renaming operations.
pub type Result<T> = std::result::Result<T, RenameError>;

/// One planned rename: a source file and the target name computed for its
/// batch index.
#[derive(Debug, Clone, PartialEq)]
pub struct RenameStep {
    pub index: u32,
    pub source: PathBuf,
    pub target: PathBuf,
}

/// What happened to a single file during execution.
#[derive(Debug, Clone, PartialEq)]
pub enum RenameOutcome {
    /// File was renamed (or would be, on a dry run).
    Renamed,
    /// File already carries its target name.
    Unchanged,
    /// Target name is taken by another file; source left in place.
    Conflict,
    /// Source disappeared between scanning and renaming.
    Missing,
    /// The rename syscall failed for another reason.
    Failed(String),
}

/// Outcome of one planned rename after execution.
#[derive(Debug, Clone)]
pub struct RenameRecord {
    pub index: u32,
    pub source: PathBuf,
    pub target: PathBuf,
    pub outcome: RenameOutcome,
}

/// Results of a whole renaming run.
#[derive(Debug, Default)]
pub struct RenameReport {
    pub records: Vec<RenameRecord>,
}

impl RenameReport {
    pub fn renamed_count(&self) -> usize {
        self.count(|o| *o == RenameOutcome::Renamed)
    }

    pub fn unchanged_count(&self) -> usize {
        self.count(|o| *o == RenameOutcome::Unchanged)
    }

    pub fn conflict_count(&self) -> usize {
        self.count(|o| *o == RenameOutcome::Conflict)
    }

    pub fn missing_count(&self) -> usize {
        self.count(|o| *o == RenameOutcome::Missing)
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, RenameOutcome::Failed(_)))
    }

    /// True when every file ended up renamed or already named correctly.
    pub fn is_clean(&self) -> bool {
        self.records
            .iter()
            .all(|r| matches!(r.outcome, RenameOutcome::Renamed | RenameOutcome::Unchanged))
    }

    fn count(&self, pred: impl Fn(&RenameOutcome) -> bool) -> usize {
        self.records.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Compute the target name for every file of a batch.
///
/// Files keep their directory; only the final component changes. The
/// schedule maps each position to a value, the naming config turns the
/// value into a filename.
///
/// # Arguments
///
/// * `files` - Batch in its final order; position is the schedule index
/// * `schedule` - Index-to-value map
/// * `naming` - Prefix, suffix and decimal mark for target names
///
/// # Errors
///
/// Returns [`RenameError::Schedule`] if any index is covered by no
/// segment, and [`RenameError::DuplicateTarget`] if two indices map to
/// the same name. Both abort the run before any rename happens.
pub fn plan_renames(
    files: &[PathBuf],
    schedule: &Schedule,
    naming: &NamingConfig,
) -> Result<Vec<RenameStep>> {
    let mut steps = Vec::with_capacity(files.len());
    let mut seen: HashMap<String, u32> = HashMap::with_capacity(files.len());

    for (position, source) in files.iter().enumerate() {
        let index = position as u32;
        let value = schedule.value_at(index)?;
        let name = naming::file_name(naming, value, schedule.precision);

        if let Some(&first_index) = seen.get(&name) {
            return Err(RenameError::DuplicateTarget {
                first_index,
                second_index: index,
                name,
            });
        }
        seen.insert(name.clone(), index);

        steps.push(RenameStep {
            index,
            source: source.clone(),
            target: source.with_file_name(name),
        });
    }

    Ok(steps)
}

/// Execute a rename plan, one file at a time.
///
/// Each step is checked and renamed independently; a failed step is
/// recorded and the batch continues. With `dry_run` the same checks run
/// but no file is moved.
///
/// # Returns
///
/// A [`RenameReport`] with one record per step.
pub fn execute_plan(steps: &[RenameStep], dry_run: bool) -> RenameReport {
    let mut report = RenameReport::default();

    for step in steps {
        let outcome = execute_step(step, dry_run);
        report.records.push(RenameRecord {
            index: step.index,
            source: step.source.clone(),
            target: step.target.clone(),
            outcome,
        });
    }

    report
}

fn execute_step(step: &RenameStep, dry_run: bool) -> RenameOutcome {
    let source_name = short_name(&step.source);
    let target_name = short_name(&step.target);

    if step.source == step.target {
        println!("Unchanged [{}]: {}", step.index, source_name);
        return RenameOutcome::Unchanged;
    }

    if !step.source.exists() {
        eprintln!(
            "Missing [{}]: {} disappeared before renaming",
            step.index, source_name
        );
        return RenameOutcome::Missing;
    }

    // fs::rename would silently replace an existing target on Unix;
    // check first so both files survive a collision.
    if step.target.exists() {
        eprintln!(
            "Conflict [{}]: {} already exists, keeping {}",
            step.index, target_name, source_name
        );
        return RenameOutcome::Conflict;
    }

    if dry_run {
        println!(
            "Would rename [{}]: {} -> {}",
            step.index, source_name, target_name
        );
        return RenameOutcome::Renamed;
    }

    match fs::rename(&step.source, &step.target) {
        Ok(()) => {
            println!(
                "Renamed [{}]: {} -> {}",
                step.index, source_name, target_name
            );
            RenameOutcome::Renamed
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            eprintln!(
                "Missing [{}]: {} disappeared before renaming",
                step.index, source_name
            );
            RenameOutcome::Missing
        }
        Err(e) => {
            eprintln!("Failed [{}]: {}: {}", step.index, source_name, e);
            RenameOutcome::Failed(e.to_string())
        }
    }
}

/// Rename every matching file in a directory according to a schedule.
///
/// Composes the three phases: scan in the configured order, plan all
/// targets, execute. The schedule is validated first so a malformed one
/// fails before the directory is read.
///
/// # Arguments
///
/// * `directory` - Directory holding the batch
/// * `schedule` - Index-to-value map, validated before use
/// * `naming` - Prefix, suffix and decimal mark for target names
/// * `scan` - Ordering policy and extension filter
/// * `dry_run` - Report what would happen without moving files
///
/// # Errors
///
/// Returns an error if the schedule is invalid, the directory cannot be
/// scanned, or the plan maps two indices to the same name. Per-file
/// failures do not error; they are recorded in the report.
pub fn rename_all(
    directory: &Path,
    schedule: &Schedule,
    naming: &NamingConfig,
    scan: &ScanConfig,
    dry_run: bool,
) -> Result<RenameReport> {
    schedule.validate()?;

    let files = scan_entries(directory, scan.extension.as_deref(), scan.order)?;
    let steps = plan_renames(&files, schedule, naming)?;

    Ok(execute_plan(&steps, dry_run))
}

fn short_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
