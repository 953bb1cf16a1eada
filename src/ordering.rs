use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::models::{Article, PresentationMode, QueryResult};

/// Presentation order shared by the grouped and flat views.
///
/// Exceptional issues first, then newer issues, then lower sequence numbers
/// (missing ones last), then slug.
pub fn compare_articles(a: &Article, b: &Article) -> Ordering {
    b.issue
        .is_exceptional
        .cmp(&a.issue.is_exceptional)
        .then_with(|| b.issue.issue_number.cmp(&a.issue.issue_number))
        .then_with(|| a.sequence_key().cmp(&b.sequence_key()))
        .then_with(|| a.slug.cmp(&b.slug))
}

pub fn sort_articles(mut articles: Vec<Article>) -> Vec<Article> {
    articles.sort_by(compare_articles);
    articles
}

/// "new" badge: exceptional, or from the latest numbered issue.
pub fn is_new(article: &Article, latest_issue_number: u64) -> bool {
    article.issue.is_exceptional
        || (latest_issue_number > 0 && article.issue.issue_number == latest_issue_number)
}

/// `No.2153(2025/08/08)`; either half is omitted when empty.
pub fn issue_heading(issue_label: &str, publish_date: &str) -> String {
    let mut s = String::new();
    if !issue_label.is_empty() {
        s.push_str("No.");
        s.push_str(issue_label);
    }
    if !publish_date.is_empty() {
        s.push('(');
        s.push_str(publish_date);
        s.push(')');
    }
    s
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueGroup {
    pub issue_label: String,
    pub publish_date: String,
    pub heading: String,
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatEntry {
    pub article: Article,
    pub label: String,
    pub is_new: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", content = "rows", rename_all = "lowercase")]
pub enum ResultView {
    Grouped(Vec<IssueGroup>),
    Flat(Vec<FlatEntry>),
}

impl ResultView {
    pub fn is_empty(&self) -> bool {
        match self {
            ResultView::Grouped(groups) => groups.is_empty(),
            ResultView::Flat(rows) => rows.is_empty(),
        }
    }
}

/// Sort a result and shape it for its presentation mode.
pub fn present(result: QueryResult, latest_issue_number: u64) -> ResultView {
    let sorted = sort_articles(result.articles);
    match result.mode {
        PresentationMode::Grouped => ResultView::Grouped(group_by_issue(sorted)),
        PresentationMode::Flat => ResultView::Flat(
            sorted
                .into_iter()
                .map(|article| FlatEntry {
                    label: issue_heading(&article.issue.issue_label, &article.issue.publish_date),
                    is_new: is_new(&article, latest_issue_number),
                    article,
                })
                .collect(),
        ),
    }
}

/// Partition a sorted list by `(issue label, publish date)`; groups keep the
/// position of their first member.
fn group_by_issue(sorted: Vec<Article>) -> Vec<IssueGroup> {
    let mut groups: Vec<IssueGroup> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for article in sorted {
        let key = (article.issue.issue_label.clone(), article.issue.publish_date.clone());
        let slot = *index.entry(key).or_insert_with_key(|(label, date)| {
            groups.push(IssueGroup {
                issue_label: label.clone(),
                publish_date: date.clone(),
                heading: issue_heading(label, date),
                articles: Vec::new(),
            });
            groups.len() - 1
        });
        if let Some(group) = groups.get_mut(slot) {
            group.articles.push(article);
        }
    }
    groups
}
