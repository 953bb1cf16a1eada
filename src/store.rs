use std::collections::BTreeSet;

use crate::models::{Article, CategoryMap};
use crate::ordering;

/// The visible article collection for one session, with its derived aggregates.
///
/// Built wholesale from a normalised manifest and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ArticleStore {
    articles: Vec<Article>,
    categories: CategoryMap,
    latest_issue_number: u64,
    years: BTreeSet<String>,
}

impl ArticleStore {
    pub fn new(articles: Vec<Article>, categories: CategoryMap) -> Self {
        let latest_issue_number = articles
            .iter()
            .filter(|a| !a.is_hidden && !a.issue.is_exceptional)
            .map(|a| a.issue.issue_number)
            .max()
            .unwrap_or(0);
        let years = articles.iter().filter_map(Article::publish_year).collect();

        Self {
            articles,
            categories,
            latest_issue_number,
            years,
        }
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn categories(&self) -> &CategoryMap {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn latest_issue_number(&self) -> u64 {
        self.latest_issue_number
    }

    /// Distinct publication years, newest first.
    pub fn available_years(&self) -> Vec<String> {
        self.years.iter().rev().cloned().collect()
    }

    /// Exceptional articles and those from the latest numbered issue carry the "new" badge.
    pub fn is_new(&self, article: &Article) -> bool {
        ordering::is_new(article, self.latest_issue_number)
    }
}
