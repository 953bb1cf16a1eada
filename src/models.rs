use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::api_types::digits_only;

/// Sequence number used for articles that carry none; sorts after every real value.
pub const SEQUENCE_LAST: u32 = u32::MAX;

/// Title shown for records that arrive without one.
pub const UNTITLED: &str = "(無題)";

/// Category id → display name.
pub type CategoryMap = BTreeMap<String, String>;

/// Issue identity derived from a record's `issue` field (or its slug).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct IssueInfo {
    pub issue_label: String, // "2153", "0215", "G0007" or ""
    pub issue_number: u64,   // 0 for exceptional issues
    pub is_exceptional: bool,
    pub publish_date: String, // "YYYY/MM/DD" or ""
}

/// One catalog entry after normalisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub slug: String,
    pub article_id: String,
    pub title: String,
    pub publish_date: String,
    pub issue_raw: Option<String>,
    pub sequence_num: Option<u32>,
    pub category_ids: Vec<String>,
    pub category: String, // resolved names, ", "-joined
    pub is_hidden: bool,
    pub is_exceptional: bool,
    pub issue: IssueInfo,
    #[serde(rename = "_plainPath", skip_serializing_if = "Option::is_none")]
    pub plain_path: Option<String>,
}

impl Article {
    /// Leading four characters of `publishDate`, kept only when they are four digits.
    pub fn publish_year(&self) -> Option<String> {
        publish_year(&self.publish_date)
    }

    pub fn sequence_key(&self) -> u32 {
        self.sequence_num.unwrap_or(SEQUENCE_LAST)
    }

    /// Identifier used for reconciliation: `slug`, else `articleId`.
    pub fn catalog_id(&self) -> &str {
        if self.slug.is_empty() {
            &self.article_id
        } else {
            &self.slug
        }
    }

    /// Resolved category names, split back out of the display string.
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.category
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

pub fn publish_year(date: &str) -> Option<String> {
    let head: String = date.chars().take(4).collect();
    let year = digits_only(&head);
    (year.len() == 4).then_some(year)
}

/// One entry of the full-text search index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDocument {
    pub id: String,
    pub slug: String,
    pub article_id: String,
    pub text: String,
}

impl SearchDocument {
    /// Identifier tried first during reconciliation: `slug | articleId | id`.
    pub fn lookup_id(&self) -> &str {
        [&self.slug, &self.article_id, &self.id]
            .into_iter()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentationMode {
    Grouped,
    Flat,
}

/// Articles answering one query, plus the view they should be shown in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub articles: Vec<Article>,
    pub mode: PresentationMode,
}

impl QueryResult {
    pub fn grouped(articles: Vec<Article>) -> Self {
        Self {
            articles,
            mode: PresentationMode::Grouped,
        }
    }

    pub fn flat(articles: Vec<Article>) -> Self {
        Self {
            articles,
            mode: PresentationMode::Flat,
        }
    }
}
