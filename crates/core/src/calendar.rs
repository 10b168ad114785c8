use anyhow::{anyhow, Result};
use chrono::{Datelike, Months, NaiveDate, TimeZone};

use crate::model::Task;
use crate::views;

/// A single month laid out for a Sunday-first calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthGrid {
    first_day: NaiveDate,
}

impl MonthGrid {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        let first_day = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| anyhow!("Invalid calendar month {year}-{month:02}"))?;
        Ok(Self { first_day })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    /// Parse a `YYYY-MM` month label.
    pub fn parse(label: &str) -> Result<Self> {
        let trimmed = label.trim();
        let first_day = NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d")
            .map_err(|_| anyhow!("Invalid month '{}': expected YYYY-MM", label))?;
        Ok(Self { first_day })
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    /// Heading such as "June 2024".
    pub fn title(&self) -> String {
        self.first_day.format("%B %Y").to_string()
    }

    /// Empty cells before the first day in a week starting on Sunday.
    pub fn leading_blanks(&self) -> usize {
        self.first_day.weekday().num_days_from_sunday() as usize
    }

    pub fn days_in_month(&self) -> u32 {
        self.days().count() as u32
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let month = self.first_day.month();
        self.first_day
            .iter_days()
            .take_while(move |day| day.month() == month)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    pub fn previous(&self) -> Self {
        Self {
            first_day: self
                .first_day
                .checked_sub_months(Months::new(1))
                .unwrap_or(self.first_day),
        }
    }

    pub fn next(&self) -> Self {
        Self {
            first_day: self
                .first_day
                .checked_add_months(Months::new(1))
                .unwrap_or(self.first_day),
        }
    }

    /// Tasks scheduled on each day of the month, in day order.
    pub fn tasks_by_day<'a, Tz: TimeZone>(
        &self,
        tasks: &'a [Task],
        tz: &Tz,
    ) -> Vec<(NaiveDate, Vec<&'a Task>)> {
        let mut grouped = views::group_by_date(tasks, tz);
        self.days()
            .map(|day| (day, grouped.remove(&day).unwrap_or_default()))
            .collect()
    }
}
