use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::api_types::digits_only;
use crate::models::{Article, QueryResult, SearchDocument};
use crate::ordering::sort_articles;
use crate::search_index::SearchIndexLoader;
use crate::store::ArticleStore;

/// Filter value meaning "no restriction" for year and category.
pub const ALL: &str = "all";

pub struct QueryEngine<'a> {
    store: &'a ArticleStore,
    index: &'a SearchIndexLoader,
}

impl<'a> QueryEngine<'a> {
    pub fn new(store: &'a ArticleStore, index: &'a SearchIndexLoader) -> Self {
        Self { store, index }
    }

    /// Answer a year / category / keyword query.
    ///
    /// Never fails: an unusable search index degrades to title matching, and a
    /// reconciliation miss degrades to title-or-category matching.
    pub async fn search(&self, query: &str, year: &str, category: &str) -> QueryResult {
        let year = year.trim();
        let category = category.trim();
        let base = filter_base(self.store.articles(), year, category);
        let query = query.trim();

        if query.is_empty() {
            let articles = sort_articles(base.into_iter().cloned().collect());
            return if category == ALL {
                QueryResult::grouped(articles)
            } else {
                QueryResult::flat(articles)
            };
        }

        let tokens = tokenize(query);
        if tokens.is_empty() {
            return QueryResult::flat(sort_articles(base.into_iter().cloned().collect()));
        }

        let docs = match self.index.get().await {
            Ok(docs) => docs,
            Err(e) => {
                warn!("Search index unavailable, matching titles only - error={}", e);
                return QueryResult::flat(sort_articles(title_fallback(&base, query)));
            }
        };

        let hits = matching_documents(&docs, &tokens);
        let found = reconcile(&base, &hits);
        debug!(
            "Keyword search - tokens={}, docs={}, hits={}, reconciled={}",
            tokens.len(),
            docs.len(),
            hits.len(),
            found.len()
        );

        if found.is_empty() {
            if !hits.is_empty() {
                info!("Search hits did not map onto catalog ids, falling back - hits={}", hits.len());
            }
            return QueryResult::flat(sort_articles(title_or_category_fallback(&base, query)));
        }
        QueryResult::flat(sort_articles(found))
    }
}

/// Articles matching the selected year and category.
pub fn filter_base<'s>(articles: &'s [Article], year: &str, category: &str) -> Vec<&'s Article> {
    articles
        .iter()
        .filter(|a| year == ALL || a.publish_year().as_deref() == Some(year))
        .filter(|a| {
            category == ALL
                || a.category_ids.iter().any(|id| id == category)
                || a.category_names().any(|name| name == category)
        })
        .collect()
}

/// Split on runs of ASCII or full-width spaces.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .split([' ', '\u{3000}'])
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Documents whose text contains every token, case-insensitively.
pub fn matching_documents<'d>(docs: &'d [SearchDocument], tokens: &[String]) -> Vec<&'d SearchDocument> {
    let tokens: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
    docs.par_iter()
        .filter(|d| {
            if d.text.is_empty() {
                return false;
            }
            let text = d.text.to_lowercase();
            tokens.iter().all(|t| text.contains(t.as_str()))
        })
        .collect()
}

/// Map search hits back onto base articles, tolerating id formatting drift.
///
/// Each base article is reachable by its raw id and by the digit run of that id;
/// each hit tries its raw id first, then its digit run. An article hit by several
/// documents appears once, at its first hit.
pub fn reconcile(base: &[&Article], hits: &[&SearchDocument]) -> Vec<Article> {
    let mut by_id: HashMap<String, usize> = HashMap::new();
    for (i, a) in base.iter().enumerate() {
        let raw = a.catalog_id().trim();
        if raw.is_empty() {
            continue;
        }
        by_id.insert(raw.to_string(), i);
        let numeric = digits_only(raw);
        if !numeric.is_empty() && numeric != raw {
            by_id.entry(numeric).or_insert(i);
        }
    }

    let mut seen = HashSet::new();
    let mut found = Vec::new();
    for doc in hits {
        let id = doc.lookup_id();
        if id.is_empty() {
            continue;
        }
        let numeric = digits_only(id);
        let hit = by_id
            .get(id)
            .or_else(|| (!numeric.is_empty() && numeric != id).then(|| by_id.get(&numeric)).flatten());
        if let Some(&i) = hit {
            if seen.insert(i) {
                found.push(base[i].clone());
            }
        }
    }
    found
}

fn title_fallback(base: &[&Article], query: &str) -> Vec<Article> {
    let needle = query.to_lowercase();
    base.iter()
        .filter(|a| a.title.to_lowercase().contains(&needle))
        .map(|a| (*a).clone())
        .collect()
}

fn title_or_category_fallback(base: &[&Article], query: &str) -> Vec<Article> {
    let needle = query.to_lowercase();
    base.iter()
        .filter(|a| a.title.to_lowercase().contains(&needle) || a.category.to_lowercase().contains(&needle))
        .map(|a| (*a).clone())
        .collect()
}
