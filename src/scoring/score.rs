// src/scoring/score.rs
use std::fmt;

use serde::{Deserialize, Serialize};

use super::ranges::{ideal_range, IdealRange};
use super::{IndexName, IndexValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Rating {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            Rating::Excellent
        } else if percentage >= 60.0 {
            Rating::Good
        } else if percentage >= 40.0 {
            Rating::Fair
        } else {
            Rating::Poor
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Rating::Excellent => "Excellent",
            Rating::Good => "Good",
            Rating::Fair => "Fair",
            Rating::Poor => "Poor",
        })
    }
}

/// Aggregate over the present index values.
///
/// `evaluated == 0` means nothing could be measured; the percentage is 0 in
/// that case but it is not a measured result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub percentage: f64,
    pub rating: Rating,
    pub in_range: usize,
    pub evaluated: usize,
}

impl ScoreSummary {
    pub fn has_data(&self) -> bool {
        self.evaluated > 0
    }
}

/// Whether a present value satisfies the index's ideal range.
pub fn in_range(name: IndexName, value: IndexValue) -> bool {
    match ideal_range(name) {
        IdealRange::Class(expected) => value.as_class() == Some(expected),
        IdealRange::Interval { min, max } => {
            let v = value.as_f64();
            match (min, max) {
                (None, Some(max)) => v <= max,
                (Some(min), None) => v >= min,
                (Some(min), Some(max)) => min <= v && v <= max,
                (None, None) => false,
            }
        }
    }
}

/// Percentage of present values inside their ideal range, and its rating.
/// Absent values are left out of both counts.
pub fn score<I>(values: I) -> ScoreSummary
where
    I: IntoIterator<Item = (IndexName, Option<IndexValue>)>,
{
    let (in_range_count, evaluated) = values
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| in_range(name, value)))
        .fold((0usize, 0usize), |(hits, total), hit| {
            (hits + usize::from(hit), total + 1)
        });

    let percentage = if evaluated > 0 {
        in_range_count as f64 / evaluated as f64 * 100.0
    } else {
        0.0
    };

    ScoreSummary {
        percentage,
        rating: Rating::from_percentage(percentage),
        in_range: in_range_count,
        evaluated,
    }
}
