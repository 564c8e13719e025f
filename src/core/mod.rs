//! Core data types: schedules and filename construction.

pub mod naming;
pub mod schedule;

pub use naming::{file_name, format_value};
pub use schedule::{Schedule, ScheduleError, Segment};
