//! Feed retrieval over HTTP, with a single fallback through a CORS proxy.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CALENDAR_ID, DEFAULT_FEED_URL_TEMPLATE, DEFAULT_PROXY_URL_TEMPLATE};
use crate::error::{ShowListError, ShowListResult};

/// Where the feed lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedSource {
    pub calendar_id: String,
    /// Must contain `{id}`
    pub feed_url_template: String,
    /// Must contain `{url}`
    pub proxy_url_template: String,
}

impl Default for FeedSource {
    fn default() -> Self {
        FeedSource {
            calendar_id: DEFAULT_CALENDAR_ID.to_string(),
            feed_url_template: DEFAULT_FEED_URL_TEMPLATE.to_string(),
            proxy_url_template: DEFAULT_PROXY_URL_TEMPLATE.to_string(),
        }
    }
}

impl FeedSource {
    pub fn for_calendar(calendar_id: &str) -> Self {
        FeedSource {
            calendar_id: calendar_id.to_string(),
            ..Self::default()
        }
    }

    pub fn feed_url(&self) -> String {
        self.feed_url_template
            .replace("{id}", &urlencoding::encode(&self.calendar_id))
    }

    pub fn proxy_url(&self) -> String {
        self.proxy_url_template
            .replace("{url}", &urlencoding::encode(&self.feed_url()))
    }
}

pub struct FeedRetriever {
    http: reqwest::Client,
    source: FeedSource,
}

impl FeedRetriever {
    pub fn new(source: FeedSource) -> Self {
        FeedRetriever {
            http: reqwest::Client::new(),
            source,
        }
    }

    /// Fetch the raw feed text.
    ///
    /// Tries the feed URL first; if that request fails or answers with a
    /// non-success status, tries the proxy URL once.
    pub async fn fetch(&self) -> ShowListResult<String> {
        let direct_url = self.source.feed_url();
        let direct_err = match self.get_text(&direct_url).await {
            Ok(text) => return Ok(text),
            Err(e) => e,
        };
        log::warn!("Direct feed request failed ({}), retrying through proxy", direct_err);

        let proxy_url = self.source.proxy_url();
        self.get_text(&proxy_url).await.map_err(|proxy_err| {
            ShowListError::Retrieval(format!("direct: {}; proxy: {}", direct_err, proxy_err))
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, String> {
        log::debug!("GET {}", url);
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| format!("request to {} failed: {}", url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(format!("{} returned {}", url, status));
        }

        resp.text()
            .await
            .map_err(|e| format!("could not read body from {}: {}", url, e))
    }
}
