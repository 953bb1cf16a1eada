//! Lazily built full-text search index with single-flight loading.
//!
//! The first caller fetches and builds the document set; callers arriving while
//! that load is in flight poll the `loading` flag on a fixed interval and then
//! share the cached result. Once loaded, the index is never re-validated.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api_types::{
    digits_only, first_string, ParsedFeed, SearchSourcePayload, SearchSourceShape,
};
use crate::errors::CatalogError;
use crate::fetch::{fetch_json, TextFetcher};
use crate::models::SearchDocument;

const ID_KEYS: [&str; 3] = ["slug", "articleId", "id"];

pub type SearchIndex = Arc<Vec<SearchDocument>>;

pub struct SearchIndexLoader {
    fetcher: Arc<dyn TextFetcher>,
    url: String,
    poll_interval: Duration,
    index: Mutex<Option<SearchIndex>>,
    loaded: AtomicBool,
    loading: AtomicBool,
}

/// Clears the `loading` flag on every exit path of a load, including cancellation.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SearchIndexLoader {
    pub fn new(fetcher: Arc<dyn TextFetcher>, url: impl Into<String>, poll_interval: Duration) -> Self {
        Self {
            fetcher,
            url: url.into(),
            poll_interval,
            index: Mutex::new(None),
            loaded: AtomicBool::new(false),
            loading: AtomicBool::new(false),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Return the index, loading it on first use.
    pub async fn get(&self) -> Result<SearchIndex, CatalogError> {
        if let Some(docs) = self.cached() {
            return Ok(docs);
        }

        if self.loading.swap(true, Ordering::AcqRel) {
            debug!("Search index load in flight, waiting - url={}", self.url);
            while self.loading.load(Ordering::Acquire) {
                tokio::time::sleep(self.poll_interval).await;
            }
            return self.cached().ok_or(CatalogError::IndexUnavailable);
        }
        let _guard = LoadingGuard(&self.loading);

        // A load may have finished between the cache check and taking the flag.
        if let Some(docs) = self.cached() {
            return Ok(docs);
        }

        let start = std::time::Instant::now();
        let payload = fetch_json(self.fetcher.as_ref(), &self.url).await.map_err(|e| {
            warn!("Search index load failed - url={}, error={}", self.url, e);
            e
        })?;
        let docs: SearchIndex = Arc::new(build_documents(payload)?);

        *self.slot() = Some(Arc::clone(&docs));
        self.loaded.store(true, Ordering::Release);
        info!(
            "Search index loaded - url={}, duration={:.2}s, docs={}",
            self.url,
            start.elapsed().as_secs_f32(),
            docs.len()
        );
        Ok(docs)
    }

    /// Drop the cached index; the next `get` fetches again.
    pub fn invalidate(&self) {
        *self.slot() = None;
        self.loaded.store(false, Ordering::Release);
    }

    fn cached(&self) -> Option<SearchIndex> {
        if !self.is_loaded() {
            return None;
        }
        self.slot().clone()
    }

    fn slot(&self) -> MutexGuard<'_, Option<SearchIndex>> {
        self.index.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Build search documents from any accepted search-source shape.
pub fn build_documents(payload: Value) -> Result<Vec<SearchDocument>, CatalogError> {
    match SearchSourceShape::detect(payload) {
        ParsedFeed::Recognized(shape, SearchSourcePayload::Records(records)) => {
            debug!("Search source shape recognized - shape={:?}, records={}", shape, records.len());
            Ok(records
                .iter()
                .enumerate()
                .map(|(position, record)| document_from_record(record, position))
                .collect())
        }
        ParsedFeed::Recognized(_, SearchSourcePayload::Keyed(entries)) => {
            debug!("Search source is a keyed object - entries={}", entries.len());
            Ok(entries
                .iter()
                .map(|(key, value)| {
                    let id = normalize_doc_id(key);
                    SearchDocument {
                        slug: id.clone(),
                        article_id: id.clone(),
                        text: collect_strings(value),
                        id,
                    }
                })
                .collect())
        }
        ParsedFeed::Unrecognized => Err(CatalogError::UnrecognizedShape { feed: "search source" }),
    }
}

fn document_from_record(record: &Value, position: usize) -> SearchDocument {
    let raw_id = first_string(record, &ID_KEYS).unwrap_or_else(|| position.to_string());
    let id = normalize_doc_id(&raw_id);
    let text = match record.get("text").and_then(Value::as_str) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => collect_strings(record),
    };
    SearchDocument {
        slug: first_string(record, &["slug"]).unwrap_or_else(|| id.clone()),
        article_id: first_string(record, &["articleId"]).unwrap_or_else(|| id.clone()),
        text,
        id,
    }
}

/// The embedded digit run of an id, or the id itself when it has no digits.
fn normalize_doc_id(raw: &str) -> String {
    let digits = digits_only(raw);
    if digits.is_empty() {
        raw.to_string()
    } else {
        digits
    }
}

/// Every string leaf of `value`, depth first, joined by single spaces.
pub fn collect_strings(value: &Value) -> String {
    fn walk<'a>(v: &'a Value, buf: &mut Vec<&'a str>) {
        match v {
            Value::String(s) => buf.push(s),
            Value::Array(xs) => xs.iter().for_each(|x| walk(x, buf)),
            Value::Object(map) => map.values().for_each(|x| walk(x, buf)),
            _ => {}
        }
    }
    let mut buf = Vec::new();
    walk(value, &mut buf);
    buf.join(" ")
}
