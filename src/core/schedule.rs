//! Field schedules: piecewise-linear maps from file index to field value.
//!
//! A schedule is an ordered list of segments, each mapping a contiguous
//! index range to a measurement value by an affine formula. Schedules are
//! either taken from the builtin table (one row per measurement run) or
//! loaded from a YAML file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest number of decimal digits a schedule may round to.
pub const MAX_PRECISION: u8 = 9;

/// Errors raised by schedule validation and value lookup.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Schedule '{id}' has no segments")]
    Empty { id: String },

    #[error("Schedule '{id}': first segment starts at index {found}, expected 0")]
    FirstSegmentStart { id: String, found: u32 },

    #[error("Schedule '{id}': indices {expected}..{found} are covered by no segment")]
    Gap { id: String, expected: u32, found: u32 },

    #[error("Schedule '{id}': segment starting at index {start} overlaps the previous segment")]
    Overlap { id: String, start: u32 },

    #[error("Schedule '{id}': segment range [{start}, {end}] is inverted")]
    InvertedRange { id: String, start: u32, end: u32 },

    #[error("Schedule '{id}': last segment ends at index {end}, expected it to be open-ended")]
    BoundedTail { id: String, end: u32 },

    #[error("Schedule '{id}': precision {precision} exceeds the maximum of {MAX_PRECISION}")]
    PrecisionTooLarge { id: String, precision: u8 },

    #[error("No segment covers index {index} in schedule '{id}'")]
    NoSegment { id: String, index: u32 },

    #[error("Unknown schedule id '{0}'")]
    UnknownSchedule(String),
}

/// Result type for schedule operations.
pub type Result<T> = std::result::Result<T, ScheduleError>;

/// One contiguous index range mapped by an affine formula.
///
/// The value at index `i` within the range is `base + step * (i - start)`,
/// so `base` is always the value at the segment's own first index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// First index covered by this segment (inclusive).
    pub start: u32,
    /// Last index covered (inclusive). `None` means the segment is
    /// open-ended; only the last segment of a schedule may be.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<u32>,
    /// Value at index `start`.
    pub base: f64,
    /// Value increment per index step.
    pub step: f64,
}

impl Segment {
    /// Returns true if `index` falls inside this segment's range.
    #[inline]
    pub fn contains(&self, index: u32) -> bool {
        index >= self.start && self.end.map_or(true, |end| index <= end)
    }

    /// Raw (unrounded) value at `index`, assuming `index >= start`.
    #[inline]
    fn value_at(&self, index: u32) -> f64 {
        self.base + self.step * f64::from(index - self.start)
    }
}

/// An ordered set of segments covering every index from 0 upward, plus the
/// rounding precision used when the value is turned into text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Identifier used to select the schedule ("0".."5" for builtins).
    pub id: String,
    /// Human-readable summary of the measurement run.
    #[serde(default)]
    pub description: String,
    /// Number of decimal digits kept when rounding computed values.
    pub precision: u8,
    /// Segments ordered by ascending `start`.
    pub segments: Vec<Segment>,
}

impl Schedule {
    /// Compute the measurement value for a zero-based file index.
    ///
    /// Scans segments in order and applies the first one whose range
    /// contains `index`, then rounds to the schedule's precision. On a
    /// schedule that passed [`Schedule::validate`] every index matches; a
    /// raw schedule with a gap or bounded tail yields
    /// [`ScheduleError::NoSegment`] rather than any stale or implicit value.
    ///
    /// # Arguments
    ///
    /// * `index` - Zero-based position of the file in the batch
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::NoSegment`] if no segment covers `index`.
    pub fn value_at(&self, index: u32) -> Result<f64> {
        let segment = self
            .segments
            .iter()
            .find(|s| s.contains(index))
            .ok_or_else(|| ScheduleError::NoSegment {
                id: self.id.clone(),
                index,
            })?;

        Ok(round_to(segment.value_at(index), self.precision))
    }

    /// Check the structural invariants of the schedule.
    ///
    /// A valid schedule has at least one segment, starts at index 0, is
    /// contiguous and non-overlapping, ends with an open-ended segment (so
    /// every index from 0 upward is covered by exactly one segment), and
    /// rounds to at most [`MAX_PRECISION`] digits.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<()> {
        if self.precision > MAX_PRECISION {
            return Err(ScheduleError::PrecisionTooLarge {
                id: self.id.clone(),
                precision: self.precision,
            });
        }

        let first = match self.segments.first() {
            Some(first) => first,
            None => return Err(ScheduleError::Empty { id: self.id.clone() }),
        };

        if first.start != 0 {
            return Err(ScheduleError::FirstSegmentStart {
                id: self.id.clone(),
                found: first.start,
            });
        }

        for segment in &self.segments {
            if let Some(end) = segment.end {
                if end < segment.start {
                    return Err(ScheduleError::InvertedRange {
                        id: self.id.clone(),
                        start: segment.start,
                        end,
                    });
                }
            }
        }

        for pair in self.segments.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            match prev.end {
                // An open-ended segment followed by anything shadows it.
                None => {
                    return Err(ScheduleError::Overlap {
                        id: self.id.clone(),
                        start: next.start,
                    });
                }
                Some(end) if next.start <= end => {
                    return Err(ScheduleError::Overlap {
                        id: self.id.clone(),
                        start: next.start,
                    });
                }
                Some(end) if next.start > end + 1 => {
                    return Err(ScheduleError::Gap {
                        id: self.id.clone(),
                        expected: end + 1,
                        found: next.start,
                    });
                }
                Some(_) => {}
            }
        }

        if let Some(end) = self.segments.last().and_then(|s| s.end) {
            return Err(ScheduleError::BoundedTail {
                id: self.id.clone(),
                end,
            });
        }

        Ok(())
    }

    /// Load and validate a schedule from a YAML file.
    ///
    /// The expected document shape:
    ///
    /// ```yaml
    /// id: my-run
    /// description: custom field scan
    /// precision: 3
    /// segments:
    ///   - { start: 0, end: 22, base: 4.0, step: 2.0 }
    ///   - { start: 23, base: 49.0, step: 1.0 }   # no end -> open-ended
    /// ```
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let schedule: Schedule = serde_yaml::from_str(&content)?;
        schedule.validate()?;
        Ok(schedule)
    }
}

/// Round `value` to `decimals` decimal digits, half away from zero.
pub fn round_to(value: f64, decimals: u8) -> f64 {
    let scale = 10f64.powi(i32::from(decimals));
    (value * scale).round() / scale
}

/// Builtin schedule table, one row per measurement run.
///
/// Columns: id, description, precision, segments as (start, end, base, step).
/// Continuation segments are expressed with the value at their own first
/// index as `base`, so boundaries can be read straight off the table.
const BUILTINS: &[(&str, &str, u8, &[(u32, Option<u32>, f64, f64)])] = &[
    (
        "0",
        "Decreasing field scan, 39 -> 0 mT in 1 mT steps",
        2,
        &[(0, None, 39.0, -1.0)],
    ),
    (
        "1",
        "Increasing field scan, 2 mT coarse steps to 48 mT, fine region to 58.5 mT",
        3,
        &[
            (0, Some(22), 4.0, 2.0),
            (23, Some(24), 49.0, 1.0),
            (25, Some(28), 50.5, 0.5),
            (29, Some(50), 52.2, 0.3),
            (51, None, 59.0, 0.5),
        ],
    ),
    (
        "2",
        "Increasing field scan, 2 mT coarse steps to 50 mT, 0.3 mT fine region",
        3,
        &[
            (0, Some(23), 4.0, 2.0),
            (24, Some(27), 51.0, 1.0),
            (28, Some(46), 52.2, 0.3),
            (47, None, 59.0, 0.5),
        ],
    ),
    (
        "3",
        "Short scan from 50 mT, 0.3 mT fine region, 0.5 mT tail",
        3,
        &[
            (0, Some(4), 50.0, 1.0),
            (5, Some(19), 54.3, 0.3),
            (20, None, 59.0, 0.5),
        ],
    ),
    (
        "4",
        "Increasing field scan, 3 mT coarse steps to 49 mT, 0.3 mT fine region",
        3,
        &[
            (0, Some(15), 4.0, 3.0),
            (16, Some(20), 50.0, 0.5),
            (21, Some(40), 52.3, 0.3),
            (41, None, 59.0, 1.0),
        ],
    ),
    (
        "5",
        "Increasing field scan, 3 mT coarse steps to 49 mT, 0.1 mT fine region",
        3,
        &[
            (0, Some(15), 4.0, 3.0),
            (16, Some(20), 50.0, 0.5),
            (21, Some(80), 52.1, 0.1),
            (81, None, 59.0, 1.0),
        ],
    ),
];

fn build(row: &(&str, &str, u8, &[(u32, Option<u32>, f64, f64)])) -> Schedule {
    let (id, description, precision, segments) = *row;
    Schedule {
        id: id.to_string(),
        description: description.to_string(),
        precision,
        segments: segments
            .iter()
            .map(|&(start, end, base, step)| Segment {
                start,
                end,
                base,
                step,
            })
            .collect(),
    }
}

/// Look up a builtin schedule by id.
///
/// # Errors
///
/// Returns [`ScheduleError::UnknownSchedule`] if no builtin has the id.
pub fn builtin(id: &str) -> Result<Schedule> {
    BUILTINS
        .iter()
        .find(|row| row.0 == id)
        .map(build)
        .ok_or_else(|| ScheduleError::UnknownSchedule(id.to_string()))
}

/// All builtin schedules in table order.
pub fn builtins() -> Vec<Schedule> {
    BUILTINS.iter().map(build).collect()
}

/// Ids of all builtin schedules in table order.
pub fn builtin_ids() -> Vec<&'static str> {
    BUILTINS.iter().map(|row| row.0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn open_ended(start: u32, base: f64, step: f64) -> Segment {
        Segment {
            start,
            end: None,
            base,
            step,
        }
    }

    fn bounded(start: u32, end: u32, base: f64, step: f64) -> Segment {
        Segment {
            start,
            end: Some(end),
            base,
            step,
        }
    }

    fn schedule(segments: Vec<Segment>) -> Schedule {
        Schedule {
            id: "test".to_string(),
            description: String::new(),
            precision: 3,
            segments,
        }
    }

    #[test]
    fn test_builtin_lookup() {
        let zero = builtin("0").unwrap();
        assert_eq!(zero.precision, 2);
        assert_eq!(zero.segments.len(), 1);

        assert!(matches!(
            builtin("7"),
            Err(ScheduleError::UnknownSchedule(_))
        ));
        assert_eq!(builtin_ids(), vec!["0", "1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_all_builtins_validate() {
        for schedule in builtins() {
            schedule.validate().unwrap();
        }
    }

    #[test]
    fn test_schedule_zero_values() {
        let s = builtin("0").unwrap();
        assert_eq!(s.value_at(0).unwrap(), 39.0);
        assert_eq!(s.value_at(1).unwrap(), 38.0);
        assert_eq!(s.value_at(39).unwrap(), 0.0);
        assert_eq!(s.value_at(40).unwrap(), -1.0);
    }

    #[test]
    fn test_schedule_one_boundaries() {
        let s = builtin("1").unwrap();
        assert_eq!(s.value_at(0).unwrap(), 4.0);
        assert_eq!(s.value_at(22).unwrap(), 48.0);
        assert_eq!(s.value_at(23).unwrap(), 49.0);
        assert_eq!(s.value_at(24).unwrap(), 50.0);
        assert_eq!(s.value_at(25).unwrap(), 50.5);
        assert_eq!(s.value_at(28).unwrap(), 52.0);
        assert_eq!(s.value_at(29).unwrap(), 52.2);
        assert_eq!(s.value_at(50).unwrap(), 58.5);
        assert_eq!(s.value_at(51).unwrap(), 59.0);
    }

    #[test]
    fn test_base_value_at_every_segment_start() {
        for schedule in builtins() {
            for segment in &schedule.segments {
                assert_eq!(
                    schedule.value_at(segment.start).unwrap(),
                    round_to(segment.base, schedule.precision),
                    "schedule {} segment at {}",
                    schedule.id,
                    segment.start
                );
            }
        }
    }

    #[test]
    fn test_affine_within_segments() {
        for schedule in builtins() {
            for segment in &schedule.segments {
                let last = segment.end.unwrap_or(segment.start + 8);
                for index in segment.start..last.min(segment.start + 8) {
                    let diff = schedule.value_at(index + 1).unwrap()
                        - schedule.value_at(index).unwrap();
                    assert!(
                        (diff - segment.step).abs() < 1e-9,
                        "schedule {} step at index {}: {} != {}",
                        schedule.id,
                        index,
                        diff,
                        segment.step
                    );
                }
            }
        }
    }

    #[test]
    fn test_monotonic_builtins() {
        // Schedule "0" strictly decreases; "1", "3", "4", "5" strictly
        // increase. "2" is excluded: see test_schedule_two_collision.
        let s = builtin("0").unwrap();
        for i in 0..60 {
            assert!(s.value_at(i + 1).unwrap() < s.value_at(i).unwrap());
        }

        for id in ["1", "3", "4", "5"] {
            let s = builtin(id).unwrap();
            for i in 0..100 {
                assert!(
                    s.value_at(i + 1).unwrap() > s.value_at(i).unwrap(),
                    "schedule {} not increasing at index {}",
                    id,
                    i
                );
            }
        }
    }

    #[test]
    fn test_schedule_two_collision() {
        // The original run "2" maps two indices to the same field value;
        // kept as-is so existing data stays reproducible. Batches that
        // reach index 34 are refused by the duplicate-target check in the
        // renamer instead.
        let s = builtin("2").unwrap();
        assert_eq!(s.value_at(27).unwrap(), 54.0);
        assert_eq!(s.value_at(34).unwrap(), 54.0);
    }

    #[test]
    fn test_validate_rejects_empty() {
        let s = schedule(vec![]);
        assert!(matches!(s.validate(), Err(ScheduleError::Empty { .. })));
    }

    #[test]
    fn test_validate_rejects_nonzero_start() {
        let s = schedule(vec![open_ended(3, 1.0, 1.0)]);
        assert!(matches!(
            s.validate(),
            Err(ScheduleError::FirstSegmentStart { found: 3, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_gap() {
        let s = schedule(vec![bounded(0, 5, 1.0, 1.0), open_ended(8, 9.0, 1.0)]);
        assert!(matches!(
            s.validate(),
            Err(ScheduleError::Gap {
                expected: 6,
                found: 8,
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_overlap() {
        let s = schedule(vec![bounded(0, 5, 1.0, 1.0), open_ended(5, 9.0, 1.0)]);
        assert!(matches!(
            s.validate(),
            Err(ScheduleError::Overlap { start: 5, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_interior_open_segment() {
        let s = schedule(vec![open_ended(0, 1.0, 1.0), open_ended(6, 9.0, 1.0)]);
        assert!(matches!(
            s.validate(),
            Err(ScheduleError::Overlap { start: 6, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bounded_tail() {
        let s = schedule(vec![bounded(0, 10, 1.0, 1.0)]);
        assert!(matches!(
            s.validate(),
            Err(ScheduleError::BoundedTail { end: 10, .. })
        ));
    }

    #[test]
    fn test_validate_accepts_single_index_segment() {
        let s = schedule(vec![bounded(0, 0, 1.0, 1.0), open_ended(1, 2.0, 1.0)]);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let s = schedule(vec![bounded(0, 5, 1.0, 1.0), bounded(6, 4, 2.0, 1.0)]);
        assert!(matches!(
            s.validate(),
            Err(ScheduleError::InvertedRange { start: 6, end: 4, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_oversized_precision() {
        let mut s = schedule(vec![open_ended(0, 1.0, 1.0)]);
        s.precision = 12;
        assert!(matches!(
            s.validate(),
            Err(ScheduleError::PrecisionTooLarge { precision: 12, .. })
        ));
    }

    #[test]
    fn test_value_beyond_bounded_tail_fails_loudly() {
        // A raw (unvalidated) schedule with a bounded tail must error for
        // uncovered indices, never fall back to a previous value.
        let s = schedule(vec![bounded(0, 10, 1.0, 1.0)]);
        assert!(matches!(
            s.value_at(11),
            Err(ScheduleError::NoSegment { index: 11, .. })
        ));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(52.23456, 3), 52.235);
        assert_eq!(round_to(52.2, 3), 52.2);
        assert_eq!(round_to(39.0, 2), 39.0);
        assert_eq!(round_to(-1.2345, 2), -1.23);
    }

    #[test]
    fn test_from_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "id: custom").unwrap();
        writeln!(file, "description: two-part run").unwrap();
        writeln!(file, "precision: 3").unwrap();
        writeln!(file, "segments:").unwrap();
        writeln!(file, "  - {{ start: 0, end: 4, base: 10.0, step: 2.0 }}").unwrap();
        writeln!(file, "  - {{ start: 5, base: 20.0, step: 0.5 }}").unwrap();
        file.flush().unwrap();

        let s = Schedule::from_yaml(file.path()).unwrap();
        assert_eq!(s.id, "custom");
        assert_eq!(s.value_at(4).unwrap(), 18.0);
        assert_eq!(s.value_at(5).unwrap(), 20.0);
        assert_eq!(s.value_at(7).unwrap(), 21.0);
    }

    #[test]
    fn test_from_yaml_rejects_gap() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "id: broken").unwrap();
        writeln!(file, "precision: 3").unwrap();
        writeln!(file, "segments:").unwrap();
        writeln!(file, "  - {{ start: 0, end: 4, base: 10.0, step: 2.0 }}").unwrap();
        writeln!(file, "  - {{ start: 9, base: 20.0, step: 0.5 }}").unwrap();
        file.flush().unwrap();

        assert!(Schedule::from_yaml(file.path()).is_err());
    }
}
