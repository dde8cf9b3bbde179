//! Month grid and tasks per day.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;
use thiserror::Error;

use crate::models::Task;

const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid month {year}-{month}")]
pub struct CalendarError {
    pub year: i32,
    pub month: u32,
}

/// A calendar month, as `(year, month)` with `month` in 1..=12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// # Errors
    ///
    /// Returns `CalendarError` if the month is outside 1..=12 or the year is
    /// out of range.
    pub fn new(year: i32, month: u32) -> Result<Self, CalendarError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|_| Self { year, month })
            .ok_or(CalendarError { year, month })
    }

    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    fn first_day(self) -> Result<NaiveDate, CalendarError> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).ok_or(CalendarError {
            year: self.year,
            month: self.month,
        })
    }
}

/// One day cell with the tasks due that day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub tasks: Vec<Task>,
}

/// Everything needed to draw one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub month: YearMonth,
    pub month_name: &'static str,
    pub days_in_month: u32,
    /// Weekday of the 1st, counted from Sunday = 0.
    pub first_weekday: u32,
    pub previous: YearMonth,
    pub next: YearMonth,
    pub days: Vec<CalendarDay>,
}

impl MonthGrid {
    /// Build the grid for `month`, placing `tasks` on their due dates (UTC).
    ///
    /// # Errors
    ///
    /// Returns `CalendarError` if a neighbouring month is out of range.
    pub fn build(month: YearMonth, tasks: &[Task]) -> Result<Self, CalendarError> {
        let first = month.first_day()?;
        let error = CalendarError {
            year: month.year,
            month: month.month,
        };
        let next_first = first.checked_add_months(Months::new(1)).ok_or(error.clone())?;
        let previous_first = first.checked_sub_months(Months::new(1)).ok_or(error)?;

        let days: Vec<CalendarDay> = first
            .iter_days()
            .take_while(|date| *date < next_first)
            .map(|date| CalendarDay {
                date,
                tasks: tasks_on(tasks, date).into_iter().cloned().collect(),
            })
            .collect();

        Ok(Self {
            month,
            month_name: month_name(first.month0()),
            days_in_month: u32::try_from(days.len()).unwrap_or(u32::MAX),
            first_weekday: first.weekday().num_days_from_sunday(),
            previous: YearMonth::of(previous_first),
            next: YearMonth::of(next_first),
            days,
        })
    }
}

fn month_name(month0: u32) -> &'static str {
    usize::try_from(month0)
        .ok()
        .and_then(|index| MONTH_NAMES.get(index))
        .copied()
        .unwrap_or_default()
}

/// Tasks due on `date` (UTC), in catalog order.
#[must_use]
pub fn tasks_on(tasks: &[Task], date: NaiveDate) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|task| task.due.date_naive() == date)
        .collect()
}
