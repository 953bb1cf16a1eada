//! One page session: load the feeds, hold the store and the search index, and
//! turn every outcome into something the rendering side can show.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::categories::options_by_name;
use crate::config::CatalogConfig;
use crate::errors::CatalogError;
use crate::fetch::{load_category_map, load_manifest, TextFetcher};
use crate::models::QueryResult;
use crate::ordering::{present, ResultView};
use crate::query::{QueryEngine, ALL};
use crate::search_index::SearchIndexLoader;
use crate::store::ArticleStore;

/// Plain-text message shown in place of a result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusMessage {
    Loading,
    NoPublishedArticles,
    NoMatches,
    LoadFailed,
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StatusMessage::Loading => "記事を読み込み中...",
            StatusMessage::NoPublishedArticles => "現在、公開されている記事はありません。",
            StatusMessage::NoMatches => "該当する記事はありません。",
            StatusMessage::LoadFailed => "記事データの読み込みに失敗しました。",
        };
        f.write_str(text)
    }
}

/// What the rendering side receives for any request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Response {
    Results(ResultView),
    Status(StatusMessage),
}

pub struct Catalog {
    config: CatalogConfig,
    store: ArticleStore,
    index: SearchIndexLoader,
}

impl Catalog {
    /// Load categories (best effort) then the manifest (required).
    pub async fn load(fetcher: Arc<dyn TextFetcher>, config: CatalogConfig) -> Result<Self, CatalogError> {
        let start = std::time::Instant::now();
        info!("Catalog load started - manifest={}", config.manifest_url());

        let categories = load_category_map(fetcher.as_ref(), &config.categories_url()).await;
        let articles = load_manifest(
            fetcher.as_ref(),
            &config.manifest_url(),
            &categories,
            &config.plain_articles_dir,
        )
        .await?;

        let store = ArticleStore::new(articles, categories);
        let index = SearchIndexLoader::new(fetcher, config.search_source_url(), config.poll_interval());

        info!(
            "Catalog load completed - duration={:.2}s, articles={}, latest_issue={}, years={}",
            start.elapsed().as_secs_f32(),
            store.len(),
            store.latest_issue_number(),
            store.available_years().len()
        );
        Ok(Self { config, store, index })
    }

    /// Like `load`, but a failure becomes the user-visible status message.
    pub async fn open(fetcher: Arc<dyn TextFetcher>, config: CatalogConfig) -> Result<Self, StatusMessage> {
        Self::load(fetcher, config).await.map_err(|e| {
            error!("Catalog load failed - error={}", e);
            StatusMessage::LoadFailed
        })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn store(&self) -> &ArticleStore {
        &self.store
    }

    pub fn search_index(&self) -> &SearchIndexLoader {
        &self.index
    }

    pub fn engine(&self) -> QueryEngine<'_> {
        QueryEngine::new(&self.store, &self.index)
    }

    /// Year pull-down values, newest first.
    pub fn year_options(&self) -> Vec<String> {
        self.store.available_years()
    }

    /// Category pull-down values as `(id, name)`, sorted by name.
    pub fn category_options(&self) -> Vec<(String, String)> {
        options_by_name(self.store.categories())
    }

    /// First view after loading: everything, grouped by issue.
    pub fn initial_view(&self) -> Response {
        if self.store.is_empty() {
            return Response::Status(StatusMessage::NoPublishedArticles);
        }
        self.reset()
    }

    /// Clear query, year and category.
    pub fn reset(&self) -> Response {
        self.respond(QueryResult::grouped(self.store.articles().to_vec()))
    }

    pub async fn search(&self, query: &str, year: &str, category: &str) -> Response {
        debug!("Search requested - query={:?}, year={}, category={}", query, year, category);
        let result = self.engine().search(query, year, category).await;
        self.respond(result)
    }

    /// `search` with no year or category restriction.
    pub async fn search_all(&self, query: &str) -> Response {
        self.search(query, ALL, ALL).await
    }

    fn respond(&self, result: QueryResult) -> Response {
        if result.articles.is_empty() {
            return Response::Status(StatusMessage::NoMatches);
        }
        Response::Results(present(result, self.store.latest_issue_number()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StubFetcher;

    fn config() -> CatalogConfig {
        CatalogConfig::default()
    }

    fn stub() -> StubFetcher {
        StubFetcher::default()
            .with(
                "/indexes/categories.json",
                r#"{ "categories": [{ "id": "c1", "name": "Economy", "order": 1 }] }"#,
            )
            .with(
                "/_manifest.json",
                r#"{ "files": [
                    { "slug": "215301", "issue": "2153", "title": "Tax", "publishDate": "2025/08/08", "categoryIds": ["c1"] },
                    { "slug": "215302", "issue": "2153", "title": "Hidden", "isHidden": "true" },
                    { "slug": "215201", "issue": "2152", "title": "Old", "publishDate": "2025/08/01" }
                ] }"#,
            )
    }

    #[tokio::test]
    async fn load_builds_store_and_options() {
        let catalog = Catalog::load(Arc::new(stub()), config()).await.unwrap();
        assert_eq!(catalog.store().len(), 2);
        assert_eq!(catalog.year_options(), vec!["2025"]);
        assert_eq!(catalog.category_options(), vec![("c1".to_string(), "Economy".to_string())]);
        assert!(!catalog.search_index().is_loaded());
    }

    #[tokio::test]
    async fn manifest_failure_becomes_load_failed() {
        let fetcher = StubFetcher::default().with("/_manifest.json", "<html>oops</html>");
        let status = Catalog::open(Arc::new(fetcher), config()).await.err();
        assert_eq!(status, Some(StatusMessage::LoadFailed));
    }

    #[tokio::test]
    async fn empty_manifest_shows_no_published_articles() {
        let fetcher = StubFetcher::default().with("/_manifest.json", r#"{ "articles": [] }"#);
        let catalog = Catalog::load(Arc::new(fetcher), config()).await.unwrap();
        assert_eq!(
            catalog.initial_view(),
            Response::Status(StatusMessage::NoPublishedArticles)
        );
    }

    #[tokio::test]
    async fn search_without_hits_reports_no_matches() {
        let catalog = Catalog::load(Arc::new(stub()), config()).await.unwrap();
        // No search source is served, so this runs on the title fallback.
        assert_eq!(
            catalog.search_all("nothing like this").await,
            Response::Status(StatusMessage::NoMatches)
        );
        match catalog.search_all("tax").await {
            Response::Results(ResultView::Flat(rows)) => {
                assert_eq!(rows.len(), 1);
                assert!(rows[0].is_new);
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn reset_returns_grouped_view() {
        let catalog = Catalog::load(Arc::new(stub()), config()).await.unwrap();
        match catalog.reset() {
            Response::Results(ResultView::Grouped(groups)) => assert_eq!(groups.len(), 2),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn status_messages_render_as_text() {
        assert_eq!(StatusMessage::NoMatches.to_string(), "該当する記事はありません。");
    }
}
