//! Batch renamer for magnetic-field scan data files.
//!
//! This crate provides tools for:
//! - Computing the field value each file of a scan records, from its
//!   position in the batch (piecewise-linear schedules)
//! - Building filenames that carry the value (configurable prefix, suffix
//!   and decimal mark)
//! - Renaming whole directories: ordered enumeration, upfront planning,
//!   per-file conflict recovery and dry runs
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use scan_renamer::config::{NamingConfig, ScanConfig};
//! use scan_renamer::core::schedule;
//! use scan_renamer::processors::renaming::rename_all;
//!
//! let sched = schedule::builtin("0").unwrap();
//! let report = rename_all(
//!     Path::new("scan_data"),
//!     &sched,
//!     &NamingConfig::default(),
//!     &ScanConfig::default(),
//!     false,
//! )
//! .unwrap();
//! println!("renamed {} files", report.renamed_count());
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;

pub use config::{NamingConfig, RenamerConfig, ScanConfig};
pub use core::schedule::{Schedule, Segment};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
