//! Core of the showlist widget.
//!
//! Loads a public calendar feed and turns it into the short list of
//! upcoming shows displayed on the site:
//! - `retrieve` fetches the feed, falling back to a CORS proxy
//! - `ics` parses it into `CalendarComponent`s
//! - `recurrence` expands components into `Occurrence`s inside a `Window`
//! - `select` sorts and truncates, `extract` derives `DisplayRow`s
//! - `render` draws rows onto a `ShowsContainer`
//! - `page` wires the site's UI events to these handlers

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod extract;
pub mod ics;
pub mod page;
pub mod pipeline;
pub mod recurrence;
pub mod render;
pub mod retrieve;
pub mod select;
pub mod window;

pub use config::ShowListConfig;
pub use error::{ShowListError, ShowListResult};
pub use event::{CalendarComponent, EventTime, Occurrence};
pub use extract::{DisplayRow, VenueBook};
pub use pipeline::ShowsPipeline;
pub use render::{HtmlContainer, ShowsContainer};
pub use retrieve::{FeedRetriever, FeedSource};
pub use window::Window;
