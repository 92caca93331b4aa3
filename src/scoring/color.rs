// src/scoring/color.rs
use std::fmt;

use serde::{Deserialize, Serialize};

use super::ranges::{ideal_range, IdealRange};
use super::{IndexName, IndexValue};

/// Severity color shown next to an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Grey,
    Green,
    Yellow,
    Red,
    /// A two-sided range could not place the value (NaN).
    Blue,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Color::Grey => "grey",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Red => "red",
            Color::Blue => "blue",
        })
    }
}

/// Tolerance above the upper bound before a value turns red.
fn upper_tolerance(name: IndexName) -> f64 {
    match name {
        IndexName::Phosphorus | IndexName::Potassium => 1.5,
        _ => 1.2,
    }
}

pub fn colorize(name: IndexName, value: Option<IndexValue>) -> Color {
    let Some(value) = value else {
        return Color::Grey;
    };

    let (min, max) = match ideal_range(name) {
        IdealRange::Class(expected) => {
            return if value.as_class() == Some(expected) {
                Color::Green
            } else {
                Color::Red
            };
        }
        IdealRange::Interval { min, max } => (min, max),
    };
    let v = value.as_f64();

    match (min, max) {
        (None, Some(max)) => {
            if v <= max {
                Color::Green
            } else if v <= max * 1.2 {
                Color::Yellow
            } else {
                Color::Red
            }
        }
        (Some(min), None) => {
            if v >= min {
                Color::Green
            } else if v >= min * 0.8 {
                Color::Yellow
            } else {
                Color::Red
            }
        }
        (Some(min), Some(max)) => {
            if min <= v && v <= max {
                Color::Green
            } else if v < min {
                if v >= min * 0.8 {
                    Color::Yellow
                } else {
                    Color::Red
                }
            } else if v > max {
                if v <= max * upper_tolerance(name) {
                    Color::Yellow
                } else {
                    Color::Red
                }
            } else {
                Color::Blue
            }
        }
        (None, None) => Color::Blue,
    }
}
