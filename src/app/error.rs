use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfluenceError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A single feed's transport or parse failure. Swallowed by the
    /// aggregator (the feed contributes nothing), surfaced unchanged by
    /// standalone fetch callers.
    #[error("fetch failed for feed '{feed}': {source}")]
    FetchFailed {
        feed: String,
        #[source]
        source: Box<ConfluenceError>,
    },

    #[error("all feeds failed during aggregation")]
    AllFeedsFailed,

    #[error("aggregation cancelled")]
    Cancelled,

    #[error("feed '{0}' timed out")]
    Timeout(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("listing parse error: {0}")]
    Parse(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ConfluenceError {
    /// Scope an error to the feed it happened on.
    ///
    /// Boundary-crossing failures (bad arguments, auth) pass through
    /// unchanged; anything else becomes `FetchFailed` for that feed.
    pub fn for_feed(self, feed: &str) -> Self {
        match self {
            e @ (ConfluenceError::InvalidArgument(_) | ConfluenceError::Unauthorized(_)) => e,
            e @ ConfluenceError::FetchFailed { .. } => e,
            other => ConfluenceError::FetchFailed {
                feed: feed.to_string(),
                source: Box::new(other),
            },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ConfluenceError::Unauthorized(_))
    }
}

pub type Result<T> = std::result::Result<T, ConfluenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_feed_wraps_transport_errors() {
        let err = ConfluenceError::Parse("bad json".into()).for_feed("rust");
        match err {
            ConfluenceError::FetchFailed { feed, .. } => assert_eq!(feed, "rust"),
            other => panic!("expected FetchFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_for_feed_passes_auth_through() {
        let err = ConfluenceError::Unauthorized("expired".into()).for_feed("rust");
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_for_feed_does_not_double_wrap() {
        let inner = ConfluenceError::Parse("bad".into()).for_feed("rust");
        match inner.for_feed("science") {
            ConfluenceError::FetchFailed { feed, .. } => assert_eq!(feed, "rust"),
            other => panic!("expected FetchFailed, got {other:?}"),
        }
    }
}
