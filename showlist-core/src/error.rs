//! Error types for the showlist pipeline.

use thiserror::Error;

/// Errors that can occur while loading and rendering shows.
#[derive(Error, Debug)]
pub enum ShowListError {
    /// Both the direct and the proxied feed request failed.
    #[error("Could not retrieve calendar feed: {0}")]
    Retrieval(String),

    #[error("ICS parse error: {0}")]
    Parse(String),

    /// A single component's recurrence could not be expanded.
    /// Contained by the expander; never reaches the renderer.
    #[error("Could not expand recurrence for '{uid}': {reason}")]
    Expansion { uid: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Contact form submission failed: {0}")]
    Submit(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for showlist operations.
pub type ShowListResult<T> = Result<T, ShowListError>;
