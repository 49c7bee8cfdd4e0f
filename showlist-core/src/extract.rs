//! Display fields derived from a single occurrence.
//!
//! Venue and link detection are heuristic: each is an ordered list of named
//! rules, and the first rule that produces a value wins.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_VENUE;
use crate::event::Occurrence;

static RE_TIME_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\d{1,2}(?::\d{2})?\s*(?:am|pm)?\s+(.+)$").expect("valid time prefix regex")
});
static RE_ANCHOR_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<a\s[^>]*?href\s*=\s*["']([^"']+)["']"#).expect("valid anchor regex")
});
static RE_BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s"'<]+"#).expect("valid url regex"));

/// Words that mark a title as a generic label rather than a venue name.
const GENERIC_TITLE_WORDS: &[&str] = &["show", "gig"];

/// The rendering-ready projection of an occurrence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRow {
    pub date: String,
    pub time: String,
    pub venue: String,
    /// `None` renders a placeholder cell, never an empty link.
    pub link: Option<String>,
}

impl DisplayRow {
    pub fn from_occurrence(occ: &Occurrence, venues: &VenueBook) -> Self {
        DisplayRow {
            date: date_label(occ),
            time: time_label(occ),
            venue: venue_label(occ, venues),
            link: extract_link(occ),
        }
    }
}

/// `"MON 3/17"`
pub fn date_label(occ: &Occurrence) -> String {
    let weekday = occ.start.format("%a").to_string().to_uppercase();
    occ.start.format(&format!("{} %-m/%-d", weekday)).to_string()
}

/// `"All Day"` or `"9:05PM"`
pub fn time_label(occ: &Occurrence) -> String {
    if occ.all_day {
        return "All Day".to_string();
    }
    occ.start.format("%-I:%M%p").to_string()
}

/// A title substring that identifies a known venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueKeyword {
    pub keyword: String,
    pub venue: String,
}

/// Known venues and the fallback used when nothing better is found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueBook {
    pub default_venue: String,
    pub keywords: Vec<VenueKeyword>,
}

impl Default for VenueBook {
    fn default() -> Self {
        VenueBook {
            default_venue: DEFAULT_VENUE.to_string(),
            keywords: vec![VenueKeyword {
                keyword: "San Jac".to_string(),
                venue: DEFAULT_VENUE.to_string(),
            }],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VenueRule {
    /// The LOCATION field, when present and non-empty
    Location,
    /// A known venue keyword in the title
    KnownVenue,
    /// Title with a leading time of day removed (`"8:30pm Rustic Tavern"`)
    TimePrefixedTitle,
    /// A title that reads like a name rather than "Show" or "Gig"
    PlainTitle,
    Default,
}

/// Venue rules in priority order.
pub const VENUE_RULES: [VenueRule; 5] = [
    VenueRule::Location,
    VenueRule::KnownVenue,
    VenueRule::TimePrefixedTitle,
    VenueRule::PlainTitle,
    VenueRule::Default,
];

impl VenueRule {
    pub fn apply(self, occ: &Occurrence, venues: &VenueBook) -> Option<String> {
        let title = occ.title.trim();
        match self {
            VenueRule::Location => occ
                .location
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string),
            VenueRule::KnownVenue => {
                let lowered = title.to_lowercase();
                venues
                    .keywords
                    .iter()
                    .find(|k| lowered.contains(&k.keyword.to_lowercase()))
                    .map(|k| k.venue.clone())
            }
            VenueRule::TimePrefixedTitle => RE_TIME_PREFIX
                .captures(title)
                .and_then(|caps| caps.get(1))
                .map(|rest| rest.as_str().trim().to_string())
                .filter(|rest| !rest.is_empty()),
            VenueRule::PlainTitle => {
                let lowered = title.to_lowercase();
                let generic = GENERIC_TITLE_WORDS.iter().any(|w| lowered.contains(w));
                (title.chars().count() > 3 && !generic).then(|| title.to_string())
            }
            VenueRule::Default => Some(venues.default_venue.clone()),
        }
    }
}

pub fn venue_label(occ: &Occurrence, venues: &VenueBook) -> String {
    VENUE_RULES
        .iter()
        .find_map(|rule| rule.apply(occ, venues))
        .unwrap_or_else(|| venues.default_venue.clone())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRule {
    /// `href` of the first HTML anchor
    AnchorHref,
    /// First bare http(s) URL
    BareUrl,
}

/// Link rules in priority order.
pub const LINK_RULES: [LinkRule; 2] = [LinkRule::AnchorHref, LinkRule::BareUrl];

impl LinkRule {
    pub fn apply(self, description: &str) -> Option<String> {
        let found = match self {
            LinkRule::AnchorHref => RE_ANCHOR_HREF
                .captures(description)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str()),
            LinkRule::BareUrl => RE_BARE_URL.find(description).map(|m| m.as_str()),
        }?;

        let url = found.trim().trim_end_matches(['<', '>']);
        (!url.is_empty()).then(|| url.to_string())
    }
}

/// The external link in the description, if any. Empty matches are absent.
pub fn extract_link(occ: &Occurrence) -> Option<String> {
    let description = occ.description?;
    LINK_RULES.iter().find_map(|rule| rule.apply(description))
}
