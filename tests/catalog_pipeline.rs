use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use newsletter_catalog::query::ALL;
use newsletter_catalog::{
    Catalog, CatalogConfig, CatalogError, PresentationMode, Response, ResultView, StatusMessage,
    TextFetcher,
};

#[derive(Default)]
struct MapFetcher {
    bodies: HashMap<String, String>,
    calls: AtomicUsize,
}

impl MapFetcher {
    fn with(mut self, url: &str, body: &str) -> Self {
        self.bodies.insert(url.to_string(), body.to_string());
        self
    }
}

#[async_trait]
impl TextFetcher for MapFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| CatalogError::fetch(url, "not served"))
    }
}

const CATEGORIES: &str = r#"{ "categories": [
    { "id": "c1", "name": "Economy", "order": 1 },
    { "id": "c2", "name": "Politics", "order": 2 }
] }"#;

const MANIFEST: &str = r#"{ "files": [
    { "slug": "215301", "issue": "2153", "title": "東京の税制改正", "publishDate": "2025/08/08", "categoryIds": ["c1"], "sequenceNum": 1 },
    { "slug": "215302", "issue": "2153", "title": "Hidden draft", "publishDate": "2025/08/08", "categoryIds": ["c1"], "isHidden": true },
    { "slug": "215303", "issue": "2153", "title": "Diet session", "publishDate": "2025/08/08", "categoryIds": ["c2"], "sequenceNum": 2 },
    { "slug": "215201", "issue": "2152", "title": "Summer outlook", "publishDate": "2025/08/01", "categoryIds": ["c1", "c9"] },
    { "slug": "G0007", "issue": "G0007", "title": "Year-end special", "publishDate": "2024/12/24" },
    { "slug": "210001", "issue": "2100", "title": "Old times", "publishDate": "2024/01/10", "hidden": "true" }
] }"#;

const SEARCH_SOURCE: &str = r#"{
    "215301": { "title": "東京の税制改正", "body": ["東京都は", "新しい税制を"] },
    "215302": { "title": "Hidden draft", "body": ["税制 東京 secret"] },
    "215303.json": { "title": "Diet session", "body": ["parliament"] },
    "210001": { "body": ["old secret"] }
}"#;

fn fetcher(with_search: bool) -> MapFetcher {
    let f = MapFetcher::default()
        .with("/indexes/categories.json", CATEGORIES)
        .with("/_manifest.json", MANIFEST);
    if with_search {
        f.with("/build_plain_articles/_search_source.json", SEARCH_SOURCE)
    } else {
        f
    }
}

async fn catalog(with_search: bool) -> Catalog {
    Catalog::load(Arc::new(fetcher(with_search)), CatalogConfig::default())
        .await
        .expect("catalog loads")
}

#[tokio::test]
async fn hidden_articles_never_surface() {
    let catalog = catalog(true).await;
    let hidden = ["215302", "210001"];
    for query in ["", "secret", "東京 税制", "Hidden", "old"] {
        for year in [ALL, "2024", "2025"] {
            for category in [ALL, "c1", "c2", "Economy"] {
                let result = catalog.engine().search(query, year, category).await;
                assert!(
                    result.articles.iter().all(|a| !hidden.contains(&a.slug.as_str())),
                    "hidden article surfaced for {query:?}/{year}/{category}"
                );
            }
        }
    }
}

#[tokio::test]
async fn grouped_view_puts_exceptional_first_and_issues_descending() {
    let catalog = catalog(false).await;
    let result = catalog.engine().search("", ALL, ALL).await;
    assert_eq!(result.mode, PresentationMode::Grouped);

    let articles = &result.articles;
    assert!(articles[0].is_exceptional);
    let numbers: Vec<u64> = articles
        .iter()
        .filter(|a| !a.is_exceptional)
        .map(|a| a.issue.issue_number)
        .collect();
    assert!(numbers.windows(2).all(|w| w[0] >= w[1]));

    match catalog.initial_view() {
        Response::Results(ResultView::Grouped(groups)) => {
            let headings: Vec<&str> = groups.iter().map(|g| g.heading.as_str()).collect();
            assert_eq!(
                headings,
                vec!["No.G0007(2024/12/24)", "No.2153(2025/08/08)", "No.2152(2025/08/01)"]
            );
            let first_issue: Vec<&str> = groups[1].articles.iter().map(|a| a.slug.as_str()).collect();
            assert_eq!(first_issue, vec!["215301", "215303"]);
        }
        other => panic!("unexpected initial view: {other:?}"),
    }
}

#[tokio::test]
async fn categories_resolve_and_unknown_ids_pass_through() {
    let catalog = catalog(false).await;
    let summer = catalog
        .store()
        .articles()
        .iter()
        .find(|a| a.slug == "215201")
        .expect("215201 present");
    assert_eq!(summer.category, "Economy, c9");
    assert_eq!(
        summer.plain_path.as_deref(),
        Some("/build_plain_articles/215201.json")
    );
}

#[tokio::test]
async fn keyword_search_is_conjunctive_and_flat() {
    let catalog = catalog(true).await;
    let result = catalog.engine().search("東京　税制", ALL, ALL).await;
    assert_eq!(result.mode, PresentationMode::Flat);
    let slugs: Vec<&str> = result.articles.iter().map(|a| a.slug.as_str()).collect();
    assert_eq!(slugs, vec!["215301"]);

    // "215303.json" in the index reconciles to the catalog's "215303".
    let result = catalog.engine().search("parliament", ALL, "c2").await;
    assert_eq!(result.articles.len(), 1);
    assert_eq!(result.articles[0].slug, "215303");
}

#[tokio::test]
async fn search_index_is_fetched_once_per_session() {
    let fetcher = Arc::new(fetcher(true));
    let catalog = Catalog::load(fetcher.clone(), CatalogConfig::default())
        .await
        .expect("catalog loads");
    let after_load = fetcher.calls.load(Ordering::SeqCst);

    let (a, b) = tokio::join!(catalog.search_all("東京"), catalog.search_all("Diet"));
    assert!(matches!(a, Response::Results(_)));
    assert!(matches!(b, Response::Results(_)));
    catalog.search_all("parliament").await;

    assert_eq!(fetcher.calls.load(Ordering::SeqCst), after_load + 1);
}

#[tokio::test]
async fn missing_index_falls_back_to_titles() {
    let catalog = catalog(false).await;
    match catalog.search_all("outlook").await {
        Response::Results(ResultView::Flat(rows)) => {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].article.slug, "215201");
            assert_eq!(rows[0].label, "No.2152(2025/08/01)");
            assert!(!rows[0].is_new);
        }
        other => panic!("unexpected response: {other:?}"),
    }
    assert_eq!(
        catalog.search_all("parliament").await,
        Response::Status(StatusMessage::NoMatches)
    );
}

#[tokio::test]
async fn missing_category_dictionary_shows_raw_ids() {
    let fetcher = MapFetcher::default().with("/_manifest.json", MANIFEST);
    let catalog = Catalog::load(Arc::new(fetcher), CatalogConfig::default())
        .await
        .expect("catalog loads");
    let tax = &catalog.store().articles()[0];
    assert_eq!(tax.category, "c1");
    assert!(catalog.category_options().is_empty());
    assert_eq!(catalog.year_options(), vec!["2025", "2024"]);
}

#[tokio::test]
async fn unusable_manifest_reports_load_failure() {
    let fetcher = MapFetcher::default().with("/_manifest.json", r#"{ "rows": [] }"#);
    let status = Catalog::open(Arc::new(fetcher), CatalogConfig::default())
        .await
        .err();
    assert_eq!(status, Some(StatusMessage::LoadFailed));
}
