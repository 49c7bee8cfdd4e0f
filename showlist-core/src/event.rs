//! Calendar components and the concrete occurrences expanded from them.
//!
//! A `CalendarComponent` is one VEVENT as it appears in the feed. The
//! expander turns each component into zero or more `Occurrence`s whose
//! start has been resolved into the display time zone.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

/// A start or end value as written in the feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EventTime {
    /// `VALUE=DATE`, i.e. an all-day value
    Date(NaiveDate),
    DateTimeUtc(DateTime<Utc>),
    /// No zone information; interpreted in the display zone
    DateTimeFloating(NaiveDateTime),
    DateTimeZoned {
        datetime: NaiveDateTime,
        tzid: String,
    },
}

impl EventTime {
    pub fn is_all_day(&self) -> bool {
        matches!(self, EventTime::Date(_))
    }

    /// Resolve into the display zone. All-day values become local midnight.
    ///
    /// A TZID that chrono-tz does not know is treated as floating.
    pub fn resolve(&self, display: Tz) -> DateTime<Tz> {
        match self {
            EventTime::Date(d) => local_datetime(display, d.and_time(chrono::NaiveTime::MIN)),
            EventTime::DateTimeUtc(dt) => dt.with_timezone(&display),
            EventTime::DateTimeFloating(dt) => local_datetime(display, *dt),
            EventTime::DateTimeZoned { datetime, tzid } => match tzid.parse::<Tz>() {
                Ok(zone) => local_datetime(zone, *datetime).with_timezone(&display),
                Err(_) => {
                    log::debug!("Unknown TZID '{}', treating time as floating", tzid);
                    local_datetime(display, *datetime)
                }
            },
        }
    }
}

/// Map a wall-clock time onto `zone`, picking the earlier instant when the
/// time is ambiguous and shifting forward past a DST gap.
pub(crate) fn local_datetime(zone: Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    let mapped = zone.from_local_datetime(&naive);
    if let Some(dt) = mapped.earliest() {
        return dt;
    }
    zone.from_local_datetime(&(naive + chrono::Duration::hours(1)))
        .earliest()
        .unwrap_or_else(|| zone.from_utc_datetime(&naive))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EventStatus {
    Confirmed,
    Tentative,
    Cancelled,
}

/// Recurrence data for a master event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recurrence {
    /// RRULE value without the `RRULE:` prefix
    pub rrule: String,
    pub exdates: Vec<EventTime>,
}

/// One VEVENT from the feed.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarComponent {
    pub uid: String,
    pub title: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub start: EventTime,
    pub end: Option<EventTime>,
    pub status: EventStatus,
    pub recurrence: Option<Recurrence>,
    /// Set on instance overrides of a recurring event
    pub recurrence_id: Option<EventTime>,
}

impl CalendarComponent {
    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    /// Time from start to end, resolved in `display`.
    pub fn span(&self, display: Tz) -> Option<TimeDelta> {
        let end = self.end.as_ref()?;
        Some(end.resolve(display) - self.start.resolve(display))
    }
}

impl fmt::Display for CalendarComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.title.is_empty() {
            write!(f, "(No title)")
        } else {
            write!(f, "{}", self.title)
        }
    }
}

/// One concrete instance of a component.
///
/// Text fields are borrowed from the parent component; only the times are
/// owned.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence<'a> {
    pub title: &'a str,
    pub location: Option<&'a str>,
    pub description: Option<&'a str>,
    pub start: DateTime<Tz>,
    pub end: Option<DateTime<Tz>>,
    pub all_day: bool,
}

impl<'a> Occurrence<'a> {
    /// Build an occurrence of `component` starting at `start`. `span` is the
    /// component's duration from [`CalendarComponent::span`].
    pub fn of(
        component: &'a CalendarComponent,
        start: DateTime<Tz>,
        span: Option<TimeDelta>,
    ) -> Self {
        let end = span.map(|span| start + span);

        Occurrence {
            title: &component.title,
            location: component.location.as_deref(),
            description: component.description.as_deref(),
            start,
            end,
            all_day: component.start.is_all_day(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_resolve_all_day_is_local_midnight() {
        let tz = chrono_tz::America::Chicago;
        let date = EventTime::Date(NaiveDate::from_ymd_opt(2025, 3, 17).unwrap());
        let resolved = date.resolve(tz);
        assert_eq!(resolved.hour(), 0);
        assert_eq!(resolved.date_naive(), NaiveDate::from_ymd_opt(2025, 3, 17).unwrap());
    }

    #[test]
    fn test_resolve_zoned_converts_to_display_zone() {
        let zoned = EventTime::DateTimeZoned {
            datetime: NaiveDate::from_ymd_opt(2025, 6, 1)
                .unwrap()
                .and_hms_opt(21, 0, 0)
                .unwrap(),
            tzid: "America/New_York".to_string(),
        };
        let resolved = zoned.resolve(chrono_tz::America::Chicago);
        assert_eq!(resolved.hour(), 20);
    }

    #[test]
    fn test_resolve_unknown_tzid_is_floating() {
        let zoned = EventTime::DateTimeZoned {
            datetime: NaiveDate::from_ymd_opt(2025, 6, 1)
                .unwrap()
                .and_hms_opt(21, 0, 0)
                .unwrap(),
            tzid: "Mars/Olympus_Mons".to_string(),
        };
        let resolved = zoned.resolve(chrono_tz::UTC);
        assert_eq!(resolved.hour(), 21);
    }

    #[test]
    fn test_local_datetime_skips_dst_gap() {
        // 2:30 AM does not exist on 2025-03-09 in Chicago
        let naive = NaiveDate::from_ymd_opt(2025, 3, 9)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        let resolved = local_datetime(chrono_tz::America::Chicago, naive);
        assert_eq!(resolved.hour(), 3);
    }
}
