//! Feed parsing using the icalendar crate's parser.

use chrono::{NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Component, Property, read_calendar, unfold},
};

use crate::error::{ShowListError, ShowListResult};
use crate::event::{CalendarComponent, EventStatus, EventTime, Recurrence};

/// Parse a whole feed into its VEVENT components, in feed order.
///
/// Components other than VEVENT are ignored. A VEVENT without a readable
/// DTSTART is skipped with a warning.
pub fn parse_feed(content: &str) -> ShowListResult<Vec<CalendarComponent>> {
    if !content.contains("BEGIN:VCALENDAR") {
        return Err(ShowListError::Parse("feed has no VCALENDAR".to_string()));
    }

    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).map_err(ShowListError::Parse)?;

    let components = calendar
        .components
        .iter()
        .filter(|c| c.name == "VEVENT")
        .enumerate()
        .filter_map(|(index, vevent)| {
            let parsed = parse_vevent(vevent, index);
            if parsed.is_none() {
                log::warn!("Skipping VEVENT #{} without a usable DTSTART", index);
            }
            parsed
        })
        .collect();

    Ok(components)
}

fn parse_vevent(vevent: &Component, index: usize) -> Option<CalendarComponent> {
    let start = to_event_time(DatePerhapsTime::try_from(vevent.find_prop("DTSTART")?).ok()?);
    let end = vevent
        .find_prop("DTEND")
        .and_then(|p| DatePerhapsTime::try_from(p).ok())
        .map(to_event_time);

    let uid = vevent
        .find_prop("UID")
        .map(|p| p.val.to_string())
        .unwrap_or_else(|| format!("vevent-{}", index));
    let title = text_prop(vevent, "SUMMARY").unwrap_or_default();
    let location = text_prop(vevent, "LOCATION");
    let description = text_prop(vevent, "DESCRIPTION");

    let status = vevent
        .find_prop("STATUS")
        .map(|p| match p.val.as_ref() {
            "TENTATIVE" => EventStatus::Tentative,
            "CANCELLED" => EventStatus::Cancelled,
            _ => EventStatus::Confirmed,
        })
        .unwrap_or(EventStatus::Confirmed);

    let rrule = vevent.find_prop("RRULE").map(|p| p.val.to_string());
    let exdates: Vec<EventTime> = vevent
        .properties
        .iter()
        .filter(|p| p.name == "EXDATE")
        .flat_map(parse_exdate_property)
        .collect();
    let recurrence = rrule.map(|rrule| Recurrence { rrule, exdates });

    let recurrence_id = vevent
        .find_prop("RECURRENCE-ID")
        .and_then(|p| DatePerhapsTime::try_from(p).ok())
        .map(to_event_time);

    Some(CalendarComponent {
        uid,
        title,
        location,
        description,
        start,
        end,
        status,
        recurrence,
        recurrence_id,
    })
}

/// Read a TEXT property, unescaping it. Empty values count as absent.
fn text_prop(component: &Component, name: &str) -> Option<String> {
    component
        .find_prop(name)
        .map(|p| unescape_text(p.val.as_ref()))
        .filter(|s| !s.trim().is_empty())
}

/// Undo RFC 5545 TEXT escaping (`\n`, `\,`, `\;`, `\\`).
fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

const STAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

fn to_event_time(dpt: DatePerhapsTime) -> EventTime {
    let cal_dt = match dpt {
        DatePerhapsTime::Date(d) => return EventTime::Date(d),
        DatePerhapsTime::DateTime(cal_dt) => cal_dt,
    };
    match cal_dt {
        CalendarDateTime::Utc(dt) => EventTime::DateTimeUtc(dt),
        CalendarDateTime::Floating(naive) => EventTime::DateTimeFloating(naive),
        CalendarDateTime::WithTimezone { date_time, tzid } => {
            warn_unknown_tzid(&tzid);
            EventTime::DateTimeZoned {
                datetime: date_time,
                tzid,
            }
        }
    }
}

/// Unknown zones are read as floating later on; say so once, at parse time.
fn warn_unknown_tzid(tzid: &str) {
    if tzid.parse::<Tz>().is_err() {
        log::warn!("Unknown TZID '{}', times in it are read as floating", tzid);
    }
}

/// Parse an EXDATE property, which may carry TZID or VALUE=DATE and a
/// comma-separated list of values.
fn parse_exdate_property(prop: &Property) -> Vec<EventTime> {
    let param = |key: &str| {
        prop.params
            .iter()
            .find(|p| p.key == key)
            .and_then(|p| p.val.as_ref().map(|v| v.to_string()))
    };
    let tzid = param("TZID");
    let is_date = param("VALUE").as_deref() == Some("DATE");
    if let Some(tzid) = &tzid {
        warn_unknown_tzid(tzid);
    }

    prop.val
        .as_ref()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| exdate_value(s, is_date, tzid.as_deref()))
        .collect()
}

fn exdate_value(value: &str, is_date: bool, tzid: Option<&str>) -> Option<EventTime> {
    if is_date {
        return NaiveDate::parse_from_str(value, "%Y%m%d").ok().map(EventTime::Date);
    }
    let (stamp, is_utc) = match value.strip_suffix('Z') {
        Some(stamp) => (stamp, true),
        None => (value, false),
    };
    let datetime = NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT).ok()?;
    Some(match (is_utc, tzid) {
        (true, _) => EventTime::DateTimeUtc(datetime.and_utc()),
        (false, Some(tzid)) => EventTime::DateTimeZoned {
            datetime,
            tzid: tzid.to_string(),
        },
        (false, None) => EventTime::DateTimeFloating(datetime),
    })
}
