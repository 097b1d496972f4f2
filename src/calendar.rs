// Workday arithmetic for completion forecasts.
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::{BTreeSet, HashSet};

/// Weekend pattern plus a holiday set. Days in neither are workdays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkCalendar {
    weekend: HashSet<Weekday>,
    holidays: BTreeSet<NaiveDate>,
}

impl Default for WorkCalendar {
    /// Friday/Saturday weekend, no holidays.
    fn default() -> Self {
        Self {
            weekend: [Weekday::Fri, Weekday::Sat].into_iter().collect(),
            holidays: BTreeSet::new(),
        }
    }
}

impl WorkCalendar {
    pub fn new(
        weekend: impl IntoIterator<Item = Weekday>,
        holidays: impl IntoIterator<Item = NaiveDate>,
    ) -> Self {
        Self {
            weekend: weekend.into_iter().collect(),
            holidays: holidays.into_iter().collect(),
        }
    }

    /// Map 0-indexed, Sunday-first day numbers to weekdays. Out-of-range numbers yield `None`.
    pub fn weekday_from_index(index: u8) -> Option<Weekday> {
        match index {
            0 => Some(Weekday::Sun),
            1 => Some(Weekday::Mon),
            2 => Some(Weekday::Tue),
            3 => Some(Weekday::Wed),
            4 => Some(Weekday::Thu),
            5 => Some(Weekday::Fri),
            6 => Some(Weekday::Sat),
            _ => None,
        }
    }

    pub fn add_holidays(&mut self, dates: impl IntoIterator<Item = NaiveDate>) {
        self.holidays.extend(dates);
    }

    pub fn is_weekend(&self, date: NaiveDate) -> bool {
        self.weekend.contains(&date.weekday())
    }

    pub fn is_workday(&self, date: NaiveDate) -> bool {
        !self.is_weekend(date) && !self.holidays.contains(&date)
    }

    /// Step forward one calendar day at a time until `n` workdays have
    /// passed. The start date itself is never counted. `n == 0` returns
    /// `start` unchanged.
    pub fn advance(&self, start: NaiveDate, n: u32) -> NaiveDate {
        if n == 0 {
            return start;
        }
        // A calendar with every weekday off would never terminate.
        if self.weekend.len() >= 7 {
            return start;
        }
        let mut date = start;
        let mut counted = 0u32;
        while counted < n {
            date = match date.succ_opt() {
                Some(next) => next,
                None => return date,
            };
            if self.is_workday(date) {
                counted += 1;
            }
        }
        date
    }

    /// Number of workdays in `(start, end]`; 0 when `end <= start`.
    pub fn workdays_between(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        if end <= start {
            return 0;
        }
        start
            .iter_days()
            .skip(1)
            .take_while(|d| *d <= end)
            .filter(|d| self.is_workday(*d))
            .count() as u32
    }
}
