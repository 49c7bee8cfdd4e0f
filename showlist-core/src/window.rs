//! The "upcoming" window occurrences must fall into.

use chrono::{DateTime, Months, NaiveTime};
use chrono_tz::Tz;

use crate::constants::DEFAULT_WINDOW_MONTHS;
use crate::event::local_datetime;

/// Half-open range `[start, end)` in the display zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl Window {
    /// Window starting at the beginning of `now`'s day and spanning
    /// `months` calendar months.
    pub fn starting_today(now: DateTime<Tz>, months: u32) -> Self {
        let zone = now.timezone();
        let today = now.date_naive();
        let last_day = today
            .checked_add_months(Months::new(months))
            .unwrap_or(chrono::NaiveDate::MAX);

        Window {
            start: local_datetime(zone, today.and_time(NaiveTime::MIN)),
            end: local_datetime(zone, last_day.and_time(NaiveTime::MIN)),
        }
    }

    /// Default six-month window.
    pub fn upcoming(now: DateTime<Tz>) -> Self {
        Self::starting_today(now, DEFAULT_WINDOW_MONTHS)
    }

    pub fn contains(&self, instant: &DateTime<Tz>) -> bool {
        *instant >= self.start && *instant < self.end
    }
}
