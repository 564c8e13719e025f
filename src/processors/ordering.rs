//! Directory scanning and batch ordering.
//!
//! Indices are assigned by position in the scanned batch, so the
//! enumeration order decides every target name. The order is therefore an
//! explicit policy rather than whatever the OS returns from a directory
//! listing.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while scanning a directory.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Failed to read directory {path}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Policy for ordering the files of a batch before indices are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryOrder {
    /// Raw order returned by the OS directory listing. Not stable across
    /// filesystems; only useful to reproduce historical runs.
    Listing,
    /// Lexicographic filename order.
    #[default]
    Name,
    /// Ascending numeric order of the last number in the file stem.
    /// Files without a number sort after all numbered ones.
    Numeric,
    /// Ascending file creation time, falling back to modification time
    /// where the filesystem does not record creation.
    Created,
}

impl fmt::Display for EntryOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntryOrder::Listing => "listing",
            EntryOrder::Name => "name",
            EntryOrder::Numeric => "numeric",
            EntryOrder::Created => "created",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for EntryOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "listing" => Ok(EntryOrder::Listing),
            "name" => Ok(EntryOrder::Name),
            "numeric" => Ok(EntryOrder::Numeric),
            "created" => Ok(EntryOrder::Created),
            other => Err(format!(
                "unknown order '{}' (expected listing, name, numeric or created)",
                other
            )),
        }
    }
}

/// Enumerate the files of a directory in a well-defined order.
///
/// Subdirectories are skipped. When `extension` is given, only files whose
/// extension matches it (case-insensitively, with or without a leading dot)
/// are returned.
///
/// # Arguments
///
/// * `directory` - Directory to scan
/// * `extension` - Optional extension filter, e.g. `"DAT"` or `".dat"`
/// * `order` - Ordering policy applied to the result
///
/// # Errors
///
/// Returns [`ScanError::DirectoryNotFound`] if `directory` does not exist
/// or is not a directory, and [`ScanError::ReadDir`] if it cannot be read.
pub fn scan_entries(
    directory: &Path,
    extension: Option<&str>,
    order: EntryOrder,
) -> std::result::Result<Vec<PathBuf>, ScanError> {
    if !directory.is_dir() {
        return Err(ScanError::DirectoryNotFound(directory.to_path_buf()));
    }

    let wanted = extension.map(|ext| ext.trim_start_matches('.'));

    let mut files: Vec<PathBuf> = fs::read_dir(directory)
        .map_err(|source| ScanError::ReadDir {
            path: directory.to_path_buf(),
            source,
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && wanted.map_or(true, |want| {
                    path.extension()
                        .map(|ext| ext.eq_ignore_ascii_case(want))
                        .unwrap_or(false)
                })
        })
        .collect();

    match order {
        EntryOrder::Listing => {}
        EntryOrder::Name => files.sort(),
        EntryOrder::Numeric => {
            let number = Regex::new(r"\d+").unwrap();
            files.sort_by_cached_key(|path| (stem_number(path, &number), path.clone()));
        }
        EntryOrder::Created => {
            // Cache the key so each entry is stat'd once, not per comparison.
            files.sort_by_cached_key(|path| (creation_time(path), path.clone()));
        }
    }

    Ok(files)
}

/// Last number in the file stem, or `u64::MAX` when there is none so
/// unnumbered files sort to the end.
fn stem_number(path: &Path, pattern: &Regex) -> u64 {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    pattern
        .find_iter(stem)
        .last()
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .unwrap_or(u64::MAX)
}

fn creation_time(path: &Path) -> SystemTime {
    match fs::metadata(path) {
        Ok(meta) => meta.created().or_else(|_| meta.modified()).unwrap_or(UNIX_EPOCH),
        Err(_) => UNIX_EPOCH,
    }
}
