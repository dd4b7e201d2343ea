//! Error types for the cangalha-search crate.
//!
//! These errors stay inside the crate boundary: the public lookup functions
//! degrade every failure to "no result". They are still typed so that each
//! source and route can log exactly what went wrong.

/// Errors that can occur while querying a snippet source.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Every access route for a source was tried and none produced a result.
    #[error("all routes failed: {0}")]
    AllRoutesFailed(String),

    /// An HTTP request to a source failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Failed to parse a source response (JSON or feed XML).
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for cangalha-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
