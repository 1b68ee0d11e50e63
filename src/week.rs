use std::fmt::{self, Display};
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::error::ReportError;

/// An ISO week, Monday through Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Week {
    start: NaiveDate,
}

/// Dates whose week and prior week are both representable.
pub fn in_range(date: NaiveDate) -> bool {
    date.checked_sub_days(Days::new(13)).is_some() && date.checked_add_days(Days::new(6)).is_some()
}

impl Week {
    /// Week containing `date`. Dates outside [`in_range`] clamp to the
    /// earliest representable day.
    pub fn containing(date: NaiveDate) -> Self {
        let offset = u64::from(date.weekday().num_days_from_monday());
        Week {
            start: date.checked_sub_days(Days::new(offset)).unwrap_or(NaiveDate::MIN),
        }
    }

    pub fn from_iso(year: i32, week: u32) -> Option<Self> {
        NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
            .filter(|start| in_range(*start))
            .map(|start| Week { start })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX)
    }

    pub fn prior(&self) -> Self {
        Week {
            start: self.start.checked_sub_days(Days::new(7)).unwrap_or(NaiveDate::MIN),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end()
    }

    /// ISO year and week number.
    pub fn iso(&self) -> (i32, u32) {
        let iso = self.start.iso_week();
        (iso.year(), iso.week())
    }
}

impl Display for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (year, week) = self.iso();
        write!(f, "{year}-W{week:02}")
    }
}

/// Accepts `2026-W08` (or `2026W08`).
impl FromStr for Week {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ReportError::InvalidWeek(s.to_owned());
        let trimmed = s.trim();
        let (year, week) = trimmed
            .split_once("-W")
            .or_else(|| trimmed.split_once('W'))
            .ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let week = week.parse::<u32>().map_err(|_| invalid())?;
        Week::from_iso(year, week).ok_or_else(invalid)
    }
}
