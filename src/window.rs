// src/window.rs
use std::fmt;

use chrono::{Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Date range used to filter imagery. `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InputError> {
        if start > end {
            return Err(InputError::InvertedWindow {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Parse two `YYYY-MM-DD` dates.
    pub fn parse(start: &str, end: &str) -> Result<Self, InputError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// Widen symmetrically by `days` on both sides.
    pub fn widen(&self, days: u32) -> Self {
        let delta = Duration::days(i64::from(days));
        Self {
            start: self.start - delta,
            end: self.end + delta,
        }
    }

    /// One calendar month ending at `end`.
    pub fn month_ending(&self) -> Self {
        let start = self
            .end
            .checked_sub_months(Months::new(1))
            .unwrap_or(NaiveDate::MIN);
        Self {
            start,
            end: self.end,
        }
    }

    /// A single-day window starting at `start`.
    pub fn first_day(&self) -> Self {
        Self {
            start: self.start,
            end: self.start + Duration::days(1),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    /// Consecutive periods of `period_days` starting at `start` while the
    /// period start is before `end`. The last period may run past `end`.
    pub fn periods(&self, period_days: u32) -> Vec<TimeWindow> {
        let mut periods = Vec::new();
        if period_days == 0 {
            return periods;
        }
        let step = Duration::days(i64::from(period_days));
        let mut current = self.start;
        while current < self.end {
            periods.push(TimeWindow {
                start: current,
                end: current + step,
            });
            current += step;
        }
        periods
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}–{}", self.start.format("%Y-%m-%d"), self.end.format("%Y-%m-%d"))
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate, InputError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| InputError::BadDate(s.to_string()))
}
