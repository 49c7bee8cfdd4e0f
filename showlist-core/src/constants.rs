//! Fixed defaults for the shows widget.

/// Public iCal feed for a Google calendar; `{id}` is percent-encoded.
pub const DEFAULT_FEED_URL_TEMPLATE: &str =
    "https://calendar.google.com/calendar/ical/{id}/public/basic.ics";

/// CORS proxy used when the direct request fails; `{url}` is percent-encoded.
pub const DEFAULT_PROXY_URL_TEMPLATE: &str = "https://api.allorigins.win/raw?url={url}";

pub const DEFAULT_CALENDAR_ID: &str = "sanjacsaloon.shows@gmail.com";

pub const DEFAULT_VENUE: &str = "San Jac Saloon";

/// Number of shows listed.
pub const DEFAULT_MAX_EVENTS: usize = 5;

pub const DEFAULT_WINDOW_MONTHS: u32 = 6;

/// Upper bound on occurrences emitted for one recurring event.
pub const DEFAULT_RECURRENCE_CAP: usize = 50;

/// How long a contact-form message stays on the page.
pub const FORM_MESSAGE_TTL_SECS: u64 = 5;
