//! Calendar positions of years, months, weeks and days
//!
//! Weeks are clipped to their month: a month is split into every week that
//! overlaps it (4 to 6 of them), each trimmed to the month's first and last
//! day. Days inside a week are numbered in week-start order.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use finchart_config::WeekStart;
use serde::{Deserialize, Serialize};

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateSpan {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Check if a date is within the span
    pub fn contains(&self, date: &NaiveDate) -> bool {
        *date >= self.start && *date <= self.end
    }

    /// Number of days covered
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Week layout used to split months into weeks and weeks into days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    week_start: WeekStart,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new(WeekStart::Monday)
    }
}

impl Calendar {
    pub fn new(week_start: WeekStart) -> Self {
        Self { week_start }
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    /// First weekday of every week
    pub fn first_weekday(&self) -> Weekday {
        match self.week_start {
            WeekStart::Monday => Weekday::Mon,
            WeekStart::Sunday => Weekday::Sun,
        }
    }

    /// The seven weekdays in week-start order
    pub fn weekday_order(&self) -> [Weekday; 7] {
        let mut order = [self.first_weekday(); 7];
        for i in 1..7 {
            order[i] = order[i - 1].succ();
        }
        order
    }

    /// Position of `date` within its week, 0 being the first weekday
    pub fn day_of_week(&self, date: NaiveDate) -> u32 {
        match self.week_start {
            WeekStart::Monday => date.weekday().num_days_from_monday(),
            WeekStart::Sunday => date.weekday().num_days_from_sunday(),
        }
    }

    /// First day of the full (unclipped) week containing `date`
    pub fn week_start_of(&self, date: NaiveDate) -> NaiveDate {
        date - Duration::days(self.day_of_week(date) as i64)
    }

    /// Span of a whole year, `None` when the year is out of range
    pub fn year_span(&self, year: i32) -> Option<DateSpan> {
        Some(DateSpan::new(
            NaiveDate::from_ymd_opt(year, 1, 1)?,
            NaiveDate::from_ymd_opt(year, 12, 31)?,
        ))
    }

    /// Span of a month given its zero-based number
    pub fn month_span(&self, year: i32, month0: u32) -> Option<DateSpan> {
        let start = NaiveDate::from_ymd_opt(year, month0 + 1, 1)?;
        let next = if month0 == 11 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month0 + 2, 1)?
        };
        Some(DateSpan::new(start, next.pred_opt()?))
    }

    /// Every week overlapping the month, clipped to the month
    pub fn weeks_of_month(&self, year: i32, month0: u32) -> Vec<DateSpan> {
        let Some(month) = self.month_span(year, month0) else {
            return vec![];
        };

        let mut weeks = Vec::with_capacity(6);
        let mut cursor = month.start;
        while cursor <= month.end {
            let week_end = self.week_start_of(cursor) + Duration::days(6);
            let end = week_end.min(month.end);
            weeks.push(DateSpan::new(cursor, end));
            cursor = end + Duration::days(1);
        }
        weeks
    }

    /// Date of the day at `ordinal` in the week containing `week.start`
    pub fn day_in_week(&self, week: &DateSpan, ordinal: usize) -> NaiveDate {
        self.week_start_of(week.start) + Duration::days(ordinal as i64)
    }
}
