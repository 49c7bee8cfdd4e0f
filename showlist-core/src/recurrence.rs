//! Occurrence expansion.
//!
//! Turns components into concrete occurrences inside the upcoming window.
//! Recurring components are expanded lazily through the rrule crate and
//! capped, so unbounded rules always terminate.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use rrule::RRuleSet;

use crate::constants::DEFAULT_RECURRENCE_CAP;
use crate::error::{ShowListError, ShowListResult};
use crate::event::{CalendarComponent, EventStatus, EventTime, Occurrence, local_datetime};
use crate::window::Window;

/// Lazy, finite sequence of occurrences for one component.
pub type Occurrences<'a> = Box<dyn Iterator<Item = Occurrence<'a>> + 'a>;

#[derive(Debug, Clone, Copy)]
pub struct Expander {
    display: Tz,
    window: Window,
    cap: usize,
}

impl Expander {
    pub fn new(display: Tz, window: Window) -> Self {
        Expander {
            display,
            window,
            cap: DEFAULT_RECURRENCE_CAP,
        }
    }

    /// Maximum number of occurrences emitted per recurring component.
    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Expand one component.
    ///
    /// - Without a rule: one occurrence if it starts on/after the window start.
    /// - With a rule: successive starts until one passes the window end or
    ///   `cap` occurrences were emitted. Starts before the window are
    ///   stepped over but not emitted.
    ///
    /// `skip` lists extra instance starts to leave out (overridden instances).
    pub fn expand<'a>(
        &self,
        component: &'a CalendarComponent,
        skip: &[EventTime],
    ) -> ShowListResult<Occurrences<'a>> {
        let display = self.display;
        let span = component.span(display);

        let Some(recurrence) = &component.recurrence else {
            let start = component.start.resolve(display);
            let single = (start >= self.window.start)
                .then(|| Occurrence::of(component, start, span));
            return Ok(Box::new(single.into_iter()));
        };

        let rrule_str = build_rrule_string(
            &component.start,
            &recurrence.rrule,
            recurrence.exdates.iter().chain(skip),
            display,
        );

        let rrule_set: RRuleSet = rrule_str.parse().map_err(|e| ShowListError::Expansion {
            uid: component.uid.clone(),
            reason: format!("{}", e),
        })?;

        // The rule iterator is pulled only until the window end or the cap
        let window = self.window;
        let starts: Vec<DateTime<Tz>> = rrule_set
            .into_iter()
            .map(|dt| dt.with_timezone(&display))
            .take_while(|start| *start <= window.end)
            .filter(|start| *start >= window.start)
            .take(self.cap)
            .collect();

        Ok(Box::new(
            starts
                .into_iter()
                .map(move |start| Occurrence::of(component, start, span)),
        ))
    }

    /// Expand every component and pool the results in encounter order.
    ///
    /// A component whose rule cannot be expanded contributes nothing; the
    /// others are unaffected. Cancelled components are dropped, and
    /// instances replaced by an override component are skipped on the master.
    pub fn expand_all<'a>(&self, components: &'a [CalendarComponent]) -> Vec<Occurrence<'a>> {
        let mut overridden: HashMap<&str, Vec<EventTime>> = HashMap::new();
        for component in components {
            if let Some(recurrence_id) = &component.recurrence_id {
                overridden
                    .entry(component.uid.as_str())
                    .or_default()
                    .push(recurrence_id.clone());
            }
        }

        let mut pooled = Vec::new();
        for component in components {
            if component.status == EventStatus::Cancelled {
                log::debug!("Skipping cancelled event '{}'", component);
                continue;
            }

            let skip: &[EventTime] = match (&component.recurrence, overridden.get(component.uid.as_str())) {
                (Some(_), Some(ids)) => ids.as_slice(),
                _ => &[],
            };

            match self.expand(component, skip) {
                Ok(occurrences) => pooled.extend(occurrences),
                Err(e) => log::warn!("{}", e),
            }
        }

        log::debug!(
            "Expanded {} components into {} occurrences",
            components.len(),
            pooled.len()
        );
        pooled
    }
}

/// Build an iCalendar-format rule set string for the rrule crate parser.
///
/// Every time is written as a zoned local time so that DTSTART and EXDATE
/// compare in the same zone. All-day and floating values use the display zone.
fn build_rrule_string<'t>(
    start: &EventTime,
    rrule: &str,
    exdates: impl Iterator<Item = &'t EventTime>,
    display: Tz,
) -> String {
    let mut lines = vec![time_line("DTSTART", start, display)];
    lines.push(format!("RRULE:{}", normalize_until(rrule, rule_zone(start, display))));
    lines.extend(exdates.map(|exdate| time_line("EXDATE", exdate, display)));
    lines.join("\n")
}

/// The zone DTSTART is written in by `time_line`.
fn rule_zone(start: &EventTime, display: Tz) -> Tz {
    match start {
        EventTime::DateTimeUtc(_) => Tz::UTC,
        EventTime::DateTimeZoned { tzid, .. } => tzid.parse().unwrap_or(display),
        EventTime::Date(_) | EventTime::DateTimeFloating(_) => display,
    }
}

fn time_line(name: &str, time: &EventTime, display: Tz) -> String {
    match time {
        EventTime::DateTimeUtc(dt) => format!("{}:{}", name, dt.format("%Y%m%dT%H%M%SZ")),
        EventTime::DateTimeZoned { datetime, tzid } if tzid.parse::<Tz>().is_ok() => {
            format!("{};TZID={}:{}", name, tzid, datetime.format("%Y%m%dT%H%M%S"))
        }
        other => {
            let local: DateTime<Tz> = other.resolve(display);
            format!(
                "{};TZID={}:{}",
                name,
                display.name(),
                local.format("%Y%m%dT%H%M%S")
            )
        }
    }
}

/// The rrule crate wants UNTIL as a UTC date-time when DTSTART carries a
/// zone; feeds also write date-only and floating UNTIL values.
///
/// Those are wall-clock values in `zone`, the DTSTART zone. A date-only UNTIL
/// covers that whole day.
fn normalize_until(rrule: &str, zone: Tz) -> String {
    rrule
        .split(';')
        .map(|part| match part.split_once('=') {
            Some((key, value)) if key.eq_ignore_ascii_case("UNTIL") => {
                match until_wall_clock(value) {
                    Some(local) => {
                        let utc = local_datetime(zone, local).with_timezone(&Utc);
                        format!("{}={}", key, utc.format("%Y%m%dT%H%M%SZ"))
                    }
                    None => part.to_string(),
                }
            }
            _ => part.to_string(),
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// Wall-clock end of a floating or date-only UNTIL. `None` for UTC values
/// and for anything unreadable, which the rrule parser reports itself.
fn until_wall_clock(value: &str) -> Option<NaiveDateTime> {
    if value.ends_with('Z') {
        return None;
    }
    if value.len() == 8 {
        return NaiveDate::parse_from_str(value, "%Y%m%d")
            .ok()?
            .and_hms_opt(23, 59, 59);
    }
    NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Recurrence;
    use chrono::{TimeZone, Timelike};

    fn tz() -> Tz {
        chrono_tz::America::Chicago
    }

    fn now() -> DateTime<Tz> {
        tz().with_ymd_and_hms(2025, 3, 10, 14, 0, 0).unwrap()
    }

    fn expander() -> Expander {
        Expander::new(tz(), Window::upcoming(now()))
    }

    fn component(uid: &str, start: EventTime, rrule: Option<&str>) -> CalendarComponent {
        CalendarComponent {
            uid: uid.to_string(),
            title: format!("Event {}", uid),
            location: None,
            description: None,
            start,
            end: None,
            status: EventStatus::Confirmed,
            recurrence: rrule.map(|r| Recurrence {
                rrule: r.to_string(),
                exdates: vec![],
            }),
            recurrence_id: None,
        }
    }

    fn floating(y: i32, m: u32, d: u32, h: u32, min: u32) -> EventTime {
        EventTime::DateTimeFloating(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, min, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_single_past_event_yields_nothing() {
        let c = component("past", floating(2025, 3, 9, 21, 0), None);
        assert_eq!(expander().expand(&c, &[]).unwrap().count(), 0);
    }

    #[test]
    fn test_single_event_earlier_today_is_kept() {
        let c = component("today", floating(2025, 3, 10, 9, 0), None);
        let occurrences: Vec<_> = expander().expand(&c, &[]).unwrap().collect();
        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].title, "Event today");
    }

    #[test]
    fn test_daily_rule_is_capped() {
        let c = component("daily", floating(2025, 3, 10, 20, 0), Some("FREQ=DAILY"));
        let occurrences: Vec<_> = expander().expand(&c, &[]).unwrap().collect();
        assert_eq!(occurrences.len(), DEFAULT_RECURRENCE_CAP);
    }

    #[test]
    fn test_custom_cap() {
        let c = component("daily", floating(2025, 3, 10, 20, 0), Some("FREQ=DAILY"));
        let count = expander().with_cap(3).expand(&c, &[]).unwrap().count();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_weekly_rule_stops_at_window_end() {
        let e = expander();
        let c = component("weekly", floating(2025, 1, 1, 20, 0), Some("FREQ=WEEKLY"));
        let occurrences: Vec<_> = e.expand(&c, &[]).unwrap().collect();
        assert!(!occurrences.is_empty());
        assert!(occurrences.len() < DEFAULT_RECURRENCE_CAP);
        for occ in &occurrences {
            assert!(occ.start >= e.window().start);
            assert!(occ.start <= e.window().end);
        }
    }

    #[test]
    fn test_rule_started_long_ago_skips_past_instances() {
        let e = expander();
        let c = component("old", floating(2019, 3, 11, 20, 0), Some("FREQ=MONTHLY"));
        let occurrences: Vec<_> = e.expand(&c, &[]).unwrap().collect();
        assert_eq!(occurrences[0].start.date_naive(), NaiveDate::from_ymd_opt(2025, 3, 11).unwrap());
        assert_eq!(occurrences[0].start.hour(), 20);
    }

    #[test]
    fn test_exdates_are_excluded() {
        let mut c = component("ex", floating(2025, 3, 12, 20, 0), Some("FREQ=WEEKLY;COUNT=3"));
        if let Some(r) = c.recurrence.as_mut() {
            r.exdates.push(floating(2025, 3, 19, 20, 0));
        }
        let days: Vec<u32> = expander()
            .expand(&c, &[])
            .unwrap()
            .map(|o| chrono::Datelike::day(&o.start.date_naive()))
            .collect();
        assert_eq!(days, vec![12, 26]);
    }

    #[test]
    fn test_utc_rule_with_until() {
        let start = EventTime::DateTimeUtc(Utc.with_ymd_and_hms(2025, 3, 12, 2, 0, 0).unwrap());
        let c = component("utc", start, Some("FREQ=WEEKLY;UNTIL=20250326T020000Z"));
        assert_eq!(expander().expand(&c, &[]).unwrap().count(), 3);
    }

    #[test]
    fn test_all_day_rule_with_date_until() {
        let start = EventTime::Date(NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
        let c = component("allday", start, Some("FREQ=WEEKLY;UNTIL=20250329"));
        let occurrences: Vec<_> = expander().expand(&c, &[]).unwrap().collect();
        assert_eq!(occurrences.len(), 3);
        assert!(occurrences.iter().all(|o| o.all_day));
    }

    #[test]
    fn test_malformed_rule_is_an_expansion_error() {
        let c = component("bad", floating(2025, 3, 12, 20, 0), Some("FREQ=SOMETIMES"));
        assert!(matches!(
            expander().expand(&c, &[]),
            Err(ShowListError::Expansion { .. })
        ));
    }

    #[test]
    fn test_expand_all_contains_failures() {
        let components = vec![
            component("bad", floating(2025, 3, 12, 20, 0), Some("FREQ=SOMETIMES")),
            component("good", floating(2025, 3, 14, 20, 0), None),
        ];
        let pooled = expander().expand_all(&components);
        assert_eq!(pooled.len(), 1);
        assert_eq!(pooled[0].title, "Event good");
    }

    #[test]
    fn test_expand_all_drops_cancelled() {
        let mut cancelled = component("x", floating(2025, 3, 14, 20, 0), None);
        cancelled.status = EventStatus::Cancelled;
        assert!(expander().expand_all(&[cancelled]).is_empty());
    }

    #[test]
    fn test_expand_all_replaces_overridden_instance() {
        let master = component("gig", floating(2025, 3, 12, 20, 0), Some("FREQ=WEEKLY;COUNT=2"));
        let mut moved = component("gig", floating(2025, 3, 20, 21, 0), None);
        moved.recurrence_id = Some(floating(2025, 3, 19, 20, 0));

        let components = vec![master, moved];
        let pooled = expander().expand_all(&components);
        let days: Vec<u32> = pooled
            .iter()
            .map(|o| chrono::Datelike::day(&o.start.date_naive()))
            .collect();
        assert_eq!(days, vec![12, 20]);
    }

    #[test]
    fn test_duration_is_kept_on_instances() {
        let mut c = component("dur", floating(2025, 3, 12, 20, 0), Some("FREQ=WEEKLY;COUNT=2"));
        c.end = Some(floating(2025, 3, 12, 23, 30));
        for occ in expander().expand(&c, &[]).unwrap() {
            let end = occ.end.expect("Should have end");
            assert_eq!((end - occ.start).num_minutes(), 210);
        }
    }

    #[test]
    fn test_floating_until_includes_last_instance() {
        let c = component(
            "until",
            floating(2025, 3, 15, 20, 0),
            Some("FREQ=WEEKLY;UNTIL=20250329T200000"),
        );
        let starts: Vec<String> = expander()
            .expand(&c, &[])
            .unwrap()
            .map(|o| o.start.format("%m/%d %H:%M").to_string())
            .collect();
        assert_eq!(starts, vec!["03/15 20:00", "03/22 20:00", "03/29 20:00"]);
    }

    #[test]
    fn test_zoned_until_is_read_in_dtstart_zone() {
        let start = EventTime::DateTimeZoned {
            datetime: NaiveDate::from_ymd_opt(2025, 3, 15)
                .unwrap()
                .and_hms_opt(21, 0, 0)
                .unwrap(),
            tzid: "America/New_York".to_string(),
        };
        let c = component("ny", start, Some("FREQ=WEEKLY;UNTIL=20250329T210000"));
        assert_eq!(expander().expand(&c, &[]).unwrap().count(), 3);
    }

    #[test]
    fn test_unknown_tzid_rule_expands_as_floating() {
        let start = EventTime::DateTimeZoned {
            datetime: NaiveDate::from_ymd_opt(2025, 3, 12)
                .unwrap()
                .and_hms_opt(20, 0, 0)
                .unwrap(),
            tzid: "Mars/Olympus_Mons".to_string(),
        };
        let mut c = component("mars", start, Some("FREQ=WEEKLY;COUNT=3"));
        c.end = Some(EventTime::DateTimeZoned {
            datetime: NaiveDate::from_ymd_opt(2025, 3, 12)
                .unwrap()
                .and_hms_opt(22, 0, 0)
                .unwrap(),
            tzid: "Mars/Olympus_Mons".to_string(),
        });
        let occurrences: Vec<_> = expander().expand(&c, &[]).unwrap().collect();
        assert_eq!(occurrences.len(), 3);
        for occ in &occurrences {
            assert_eq!(occ.start.hour(), 20);
            assert_eq!(occ.end.map(|end| end.hour()), Some(22));
        }
    }

    #[test]
    fn test_normalize_until() {
        let chicago = tz();
        // 23:59:59 CDT on 3/29
        assert_eq!(
            normalize_until("FREQ=WEEKLY;UNTIL=20250329", chicago),
            "FREQ=WEEKLY;UNTIL=20250330T045959Z"
        );
        // 20:00 CDT on 3/29
        assert_eq!(
            normalize_until("FREQ=WEEKLY;UNTIL=20250329T200000;BYDAY=SA", chicago),
            "FREQ=WEEKLY;UNTIL=20250330T010000Z;BYDAY=SA"
        );
        assert_eq!(
            normalize_until("FREQ=WEEKLY;UNTIL=20250329T200000", Tz::UTC),
            "FREQ=WEEKLY;UNTIL=20250329T200000Z"
        );
        assert_eq!(
            normalize_until("FREQ=WEEKLY;UNTIL=20250330T010000Z", chicago),
            "FREQ=WEEKLY;UNTIL=20250330T010000Z"
        );
        assert_eq!(normalize_until("FREQ=DAILY;COUNT=4", chicago), "FREQ=DAILY;COUNT=4");
    }
}
