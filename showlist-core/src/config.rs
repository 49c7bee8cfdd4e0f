//! Showlist configuration.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CALENDAR_ID, DEFAULT_FEED_URL_TEMPLATE, DEFAULT_MAX_EVENTS, DEFAULT_PROXY_URL_TEMPLATE,
    DEFAULT_RECURRENCE_CAP, DEFAULT_VENUE, DEFAULT_WINDOW_MONTHS,
};
use crate::error::{ShowListError, ShowListResult};
use crate::extract::{VenueBook, VenueKeyword};
use crate::retrieve::FeedSource;

fn default_calendar_id() -> String {
    DEFAULT_CALENDAR_ID.to_string()
}

fn default_feed_url_template() -> String {
    DEFAULT_FEED_URL_TEMPLATE.to_string()
}

fn default_proxy_url_template() -> String {
    DEFAULT_PROXY_URL_TEMPLATE.to_string()
}

fn default_venue() -> String {
    DEFAULT_VENUE.to_string()
}

fn default_venue_keywords() -> Vec<VenueKeyword> {
    VenueBook::default().keywords
}

fn default_max_events() -> usize {
    DEFAULT_MAX_EVENTS
}

fn default_window_months() -> u32 {
    DEFAULT_WINDOW_MONTHS
}

fn default_recurrence_cap() -> usize {
    DEFAULT_RECURRENCE_CAP
}

/// Configuration at ~/.config/showlist/config.toml
///
/// Every field has a default, so a missing or empty file is valid.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ShowListConfig {
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,

    #[serde(default = "default_feed_url_template")]
    pub feed_url_template: String,

    #[serde(default = "default_proxy_url_template")]
    pub proxy_url_template: String,

    /// IANA zone used for the window and labels; system zone when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    #[serde(default = "default_venue")]
    pub default_venue: String,

    /// Title keywords, tried in the order written
    #[serde(default = "default_venue_keywords")]
    pub venue_keywords: Vec<VenueKeyword>,

    #[serde(default = "default_max_events")]
    pub max_events: usize,

    #[serde(default = "default_window_months")]
    pub window_months: u32,

    #[serde(default = "default_recurrence_cap")]
    pub recurrence_cap: usize,

    /// Action URL of the contact form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_action: Option<String>,
}

impl Default for ShowListConfig {
    fn default() -> Self {
        ShowListConfig {
            calendar_id: default_calendar_id(),
            feed_url_template: default_feed_url_template(),
            proxy_url_template: default_proxy_url_template(),
            timezone: None,
            default_venue: default_venue(),
            venue_keywords: default_venue_keywords(),
            max_events: default_max_events(),
            window_months: default_window_months(),
            recurrence_cap: default_recurrence_cap(),
            contact_action: None,
        }
    }
}

impl ShowListConfig {
    pub fn config_path() -> ShowListResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ShowListError::Config("Could not determine config directory".into()))?
            .join("showlist");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, falling back to defaults when the
    /// file does not exist.
    pub fn load() -> ShowListResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> ShowListResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> ShowListResult<Self> {
        let config: ShowListConfig =
            toml::from_str(content).map_err(|e| ShowListError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ShowListResult<()> {
        if !self.feed_url_template.contains("{id}") {
            return Err(ShowListError::Config(
                "feed_url_template must contain {id}".to_string(),
            ));
        }
        if !self.proxy_url_template.contains("{url}") {
            return Err(ShowListError::Config(
                "proxy_url_template must contain {url}".to_string(),
            ));
        }
        if let Some(tz) = &self.timezone {
            tz.parse::<Tz>()
                .map_err(|_| ShowListError::Config(format!("Unknown timezone '{}'", tz)))?;
        }
        Ok(())
    }

    pub fn feed_source(&self) -> FeedSource {
        FeedSource {
            calendar_id: self.calendar_id.clone(),
            feed_url_template: self.feed_url_template.clone(),
            proxy_url_template: self.proxy_url_template.clone(),
        }
    }

    pub fn venue_book(&self) -> VenueBook {
        VenueBook {
            default_venue: self.default_venue.clone(),
            keywords: self.venue_keywords.clone(),
        }
    }

    /// The configured zone, else the system zone, else UTC.
    pub fn display_timezone(&self) -> Tz {
        if let Some(tz) = self.timezone.as_deref().and_then(|t| t.parse::<Tz>().ok()) {
            return tz;
        }
        match iana_time_zone::get_timezone() {
            Ok(name) => name.parse::<Tz>().unwrap_or_else(|_| {
                log::warn!("System timezone '{}' is not a known IANA zone, using UTC", name);
                Tz::UTC
            }),
            Err(e) => {
                log::warn!("Could not determine system timezone ({}), using UTC", e);
                Tz::UTC
            }
        }
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> ShowListResult<()> {
        let contents = format!(
            "\
# showlist configuration

# Google calendar whose public feed lists the shows:
# calendar_id = \"{}\"

# Feed and CORS proxy URL templates:
# feed_url_template = \"{}\"
# proxy_url_template = \"{}\"

# Zone for dates and times (defaults to the system zone):
# timezone = \"America/Chicago\"

# Venue shown when an event names none:
# default_venue = \"{}\"

# Title keywords that identify a venue; the first match wins:
# [[venue_keywords]]
# keyword = \"San Jac\"
# venue = \"San Jac Saloon\"

# How many shows to list, how far ahead to look, and the per-event cap
# for repeating entries:
# max_events = {}
# window_months = {}
# recurrence_cap = {}

# Where the contact form posts to:
# contact_action = \"https://formspree.io/f/yourformid\"
",
            DEFAULT_CALENDAR_ID,
            DEFAULT_FEED_URL_TEMPLATE,
            DEFAULT_PROXY_URL_TEMPLATE,
            DEFAULT_VENUE,
            DEFAULT_MAX_EVENTS,
            DEFAULT_WINDOW_MONTHS,
            DEFAULT_RECURRENCE_CAP,
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ShowListError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| ShowListError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
