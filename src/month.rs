//! Calendar month value type used as the timeline's time axis

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A calendar month, serialized as `YYYY-MM`
///
/// Ordering is chronological and matches the lexicographic order of the
/// string form for four-digit years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Month {
    year: i32,
    /// 1-12
    month: u32,
}

impl Month {
    /// Earliest representable month
    pub const MIN: Month = Month { year: 0, month: 1 };

    /// Build a month, rejecting month numbers outside 1-12
    pub fn new(year: i32, month: u32) -> Result<Self, ValidationError> {
        if !(1..=12).contains(&month) || !(0..=9999).contains(&year) {
            return Err(ValidationError::MalformedMonth(format!("{:04}-{:02}", year, month)));
        }
        Ok(Self { year, month })
    }

    /// Month containing the given date
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Month of the local wall clock. Only binaries call this; the engine takes
    /// `now` as a parameter.
    pub fn current() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn is_december(&self) -> bool {
        self.month == 12
    }

    /// First day of this month
    pub fn first_day(&self) -> NaiveDate {
        // year and month are range-checked on construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    fn ordinal(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    fn from_ordinal(ordinal: i64) -> Self {
        Self {
            year: ordinal.div_euclid(12) as i32,
            month: ordinal.rem_euclid(12) as u32 + 1,
        }
    }

    /// Shift by a signed number of months
    pub fn add_months(&self, months: i32) -> Self {
        Self::from_ordinal(self.ordinal() + months as i64)
    }

    /// `add_months` that returns `None` when the result leaves years 0-9999
    pub fn checked_add_months(&self, months: i32) -> Option<Self> {
        let shifted = Self::from_ordinal(self.ordinal() + months as i64);
        (0..=9999).contains(&shifted.year).then_some(shifted)
    }

    pub fn next(&self) -> Self {
        self.add_months(1)
    }

    pub fn prev(&self) -> Self {
        self.add_months(-1)
    }

    /// Signed number of months from `self` to `later`
    ///
    /// Negative when `later` precedes `self`.
    pub fn months_until(&self, later: Month) -> i32 {
        (later.ordinal() - self.ordinal()) as i32
    }

    /// Inclusive iterator over `[self, end]`; empty when `end < self`
    pub fn range_inclusive(self, end: Month) -> impl Iterator<Item = Month> {
        let count = self.months_until(end) + 1;
        (0..count.max(0)).map(move |offset| self.add_months(offset))
    }
}

/// Months elapsed from `start` to `target`
pub fn months_between(start: Month, target: Month) -> i32 {
    start.months_until(target)
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ValidationError::MalformedMonth(s.to_string());
        let trimmed = s.trim();
        let (year, month) = trimmed.split_once('-').ok_or_else(malformed)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(malformed());
        }
        let year: i32 = year.parse().map_err(|_| malformed())?;
        let month: u32 = month.parse().map_err(|_| malformed())?;
        Self::new(year, month).map_err(|_| malformed())
    }
}

impl TryFrom<String> for Month {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Month> for String {
    fn from(month: Month) -> Self {
        month.to_string()
    }
}
