//! The shows pipeline: fetch → parse → expand → select → format → render.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::config::ShowListConfig;
use crate::constants::{DEFAULT_MAX_EVENTS, DEFAULT_RECURRENCE_CAP, DEFAULT_WINDOW_MONTHS};
use crate::error::ShowListResult;
use crate::extract::{DisplayRow, VenueBook};
use crate::ics::parse_feed;
use crate::recurrence::Expander;
use crate::render::{ShowsContainer, render_outcome};
use crate::retrieve::FeedRetriever;
use crate::select::select_upcoming;
use crate::window::Window;

#[derive(Debug, Clone)]
pub struct ShowsPipeline {
    display: Tz,
    venues: VenueBook,
    max_events: usize,
    window_months: u32,
    recurrence_cap: usize,
}

impl ShowsPipeline {
    pub fn new(display: Tz) -> Self {
        ShowsPipeline {
            display,
            venues: VenueBook::default(),
            max_events: DEFAULT_MAX_EVENTS,
            window_months: DEFAULT_WINDOW_MONTHS,
            recurrence_cap: DEFAULT_RECURRENCE_CAP,
        }
    }

    pub fn from_config(config: &ShowListConfig) -> Self {
        ShowsPipeline {
            display: config.display_timezone(),
            venues: config.venue_book(),
            max_events: config.max_events,
            window_months: config.window_months,
            recurrence_cap: config.recurrence_cap,
        }
    }

    /// Current time in the display zone.
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.display)
    }

    /// Everything after retrieval. Synchronous and deterministic for a
    /// given `feed` and `now`.
    pub fn rows_from_feed(&self, feed: &str, now: DateTime<Tz>) -> ShowListResult<Vec<DisplayRow>> {
        let now = now.with_timezone(&self.display);
        let components = parse_feed(feed)?;

        let window = Window::starting_today(now, self.window_months);
        let expander = Expander::new(self.display, window).with_cap(self.recurrence_cap);
        let pooled = expander.expand_all(&components);
        let selected = select_upcoming(pooled, &window, self.max_events);

        log::info!(
            "{} shows selected from {} feed entries",
            selected.len(),
            components.len()
        );

        Ok(selected
            .iter()
            .map(|occ| DisplayRow::from_occurrence(occ, &self.venues))
            .collect())
    }

    /// Fetch the feed and produce display rows.
    pub async fn load(
        &self,
        retriever: &FeedRetriever,
        now: DateTime<Tz>,
    ) -> ShowListResult<Vec<DisplayRow>> {
        let feed = retriever.fetch().await?;
        self.rows_from_feed(&feed, now)
    }

    /// Full run: load and render into `container`. Never fails; errors
    /// become the "unable to load" state.
    pub async fn run<C: ShowsContainer + ?Sized>(
        &self,
        retriever: &FeedRetriever,
        container: &mut C,
        now: DateTime<Tz>,
    ) {
        let outcome = self.load(retriever, now).await;
        render_outcome(container, outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{HtmlContainer, HtmlElement, MessageKind};
    use crate::retrieve::FeedSource;
    use chrono::TimeZone;

    const FEED: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
BEGIN:VEVENT\r\n\
UID:one\r\n\
SUMMARY:9pm San Jac Saloon\r\n\
DTSTART;TZID=America/Chicago:20250321T210000\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:two\r\n\
SUMMARY:Show\r\n\
LOCATION:The Other Room\r\n\
DTSTART;TZID=America/Chicago:20250318T200500\r\n\
DESCRIPTION:see http://x.test/y>\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:old\r\n\
SUMMARY:Last year\r\n\
DTSTART;TZID=America/Chicago:20240318T200000\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    fn now() -> DateTime<Tz> {
        chrono_tz::America::Chicago
            .with_ymd_and_hms(2025, 3, 17, 12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_rows_from_feed() {
        let pipeline = ShowsPipeline::new(chrono_tz::America::Chicago);
        let rows = pipeline.rows_from_feed(FEED, now()).expect("Should build rows");
        assert_eq!(
            rows,
            vec![
                DisplayRow {
                    date: "TUE 3/18".to_string(),
                    time: "8:05PM".to_string(),
                    venue: "The Other Room".to_string(),
                    link: Some("http://x.test/y".to_string()),
                },
                DisplayRow {
                    date: "FRI 3/21".to_string(),
                    time: "9:00PM".to_string(),
                    venue: "San Jac Saloon".to_string(),
                    link: None,
                },
            ]
        );
    }

    #[test]
    fn test_rows_from_feed_is_idempotent() {
        let pipeline = ShowsPipeline::new(chrono_tz::America::Chicago);
        let first = pipeline.rows_from_feed(FEED, now()).unwrap();
        let second = pipeline.rows_from_feed(FEED, now()).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_run_renders_unavailable_when_retrieval_fails() {
        let mut server = mockito::Server::new_async().await;
        let _any = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(500)
            .expect(2)
            .create_async()
            .await;
        let retriever = FeedRetriever::new(FeedSource {
            calendar_id: "x".to_string(),
            feed_url_template: format!("{}/{{id}}.ics", server.url()),
            proxy_url_template: format!("{}/proxy?url={{url}}", server.url()),
        });

        let mut container = HtmlContainer::new();
        ShowsPipeline::new(chrono_tz::America::Chicago)
            .run(&retriever, &mut container, now())
            .await;

        assert_eq!(container.children(), &[HtmlElement::Message(MessageKind::Unavailable)]);
    }
}
