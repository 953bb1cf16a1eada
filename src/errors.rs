use thiserror::Error;

/// Failures raised while fetching or interpreting one of the catalog feeds.
///
/// None of these reach the rendering side: `catalog.rs` turns each one into a
/// degraded result or a status message.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("request for {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    #[error("{url} answered with status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("{url} returned an HTML page instead of JSON")]
    HtmlPayload { url: String },

    #[error("decoding JSON from {url}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unrecognized {feed} feed shape")]
    UnrecognizedShape { feed: &'static str },

    #[error("search index is unavailable: the concurrent load failed")]
    IndexUnavailable,
}

impl CatalogError {
    pub fn fetch(url: &str, reason: impl ToString) -> Self {
        Self::Fetch {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}
