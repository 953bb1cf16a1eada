use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::categories::normalize_category_map;
use crate::errors::CatalogError;
use crate::manifest::normalize_manifest;
use crate::models::{Article, CategoryMap};

/// Source of raw feed text. Anything other than a successful body is a failure;
/// status codes are not interpreted further.
#[async_trait]
pub trait TextFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, CatalogError>;
}

/// `TextFetcher` over HTTP.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TextFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, CatalogError> {
        let start = std::time::Instant::now();
        debug!("Fetching feed - url={}", url);

        // Feeds are static per session but may change between sessions.
        let resp = self
            .client
            .get(url)
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(|e| CatalogError::fetch(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            warn!("Feed request rejected - url={}, status={}", url, status.as_u16());
            return Err(CatalogError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(|e| CatalogError::fetch(url, e))?;
        debug!(
            "Feed fetched - url={}, duration={:.2}s, bytes={}",
            url,
            start.elapsed().as_secs_f32(),
            body.len()
        );
        Ok(body)
    }
}

/// Parse feed text as JSON, refusing HTML error pages up front.
pub fn parse_feed_text(url: &str, text: &str) -> Result<Value, CatalogError> {
    if text.trim_start().starts_with('<') {
        return Err(CatalogError::HtmlPayload { url: url.to_string() });
    }
    serde_json::from_str(text).map_err(|source| CatalogError::Json {
        url: url.to_string(),
        source,
    })
}

pub async fn fetch_json(fetcher: &dyn TextFetcher, url: &str) -> Result<Value, CatalogError> {
    let text = fetcher.fetch_text(url).await?;
    parse_feed_text(url, &text)
}

/// Load the category dictionary. Every failure degrades to an empty map.
pub async fn load_category_map(fetcher: &dyn TextFetcher, url: &str) -> CategoryMap {
    match fetch_json(fetcher, url).await {
        Ok(payload) => {
            let map = normalize_category_map(payload);
            info!("Category dictionary loaded - url={}, categories={}", url, map.len());
            map
        }
        Err(e) => {
            warn!("Category dictionary unavailable, showing raw ids - url={}, error={}", url, e);
            CategoryMap::new()
        }
    }
}

/// Load and normalise the article manifest. Failures are returned to the caller.
pub async fn load_manifest(
    fetcher: &dyn TextFetcher,
    url: &str,
    categories: &CategoryMap,
    plain_articles_dir: &str,
) -> Result<Vec<Article>, CatalogError> {
    let start = std::time::Instant::now();
    let payload = fetch_json(fetcher, url).await?;
    let articles = normalize_manifest(payload, categories, plain_articles_dir)?;
    info!(
        "Manifest loaded - url={}, duration={:.2}s, articles={}",
        url,
        start.elapsed().as_secs_f32(),
        articles.len()
    );
    Ok(articles)
}
