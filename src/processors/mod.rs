//! File processing modules.

pub mod ordering;
pub mod renaming;

// Re-export key types for convenience
pub use ordering::{scan_entries, EntryOrder, ScanError};
pub use renaming::{
    execute_plan, plan_renames, rename_all, RenameError, RenameOutcome, RenameRecord,
    RenameReport, RenameStep,
};
