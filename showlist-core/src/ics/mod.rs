//! Calendar feed parsing.
//!
//! Reads the iCalendar text of a public feed (RFC 5545) into
//! `CalendarComponent`s.

mod parse;

pub use parse::parse_feed;
