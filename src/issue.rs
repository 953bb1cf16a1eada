use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

use crate::api_types::{digits_only, first_string, loose_string};
use crate::models::IssueInfo;

/// "G" followed by four or more digits marks an exceptional issue.
static EXCEPTIONAL_ISSUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[Gg][0-9]{4,}$").expect("exceptional issue pattern compiles"));

pub fn is_exceptional_issue(raw: &str) -> bool {
    EXCEPTIONAL_ISSUE.is_match(raw.trim())
}

/// Derive the issue identity of one article.
///
/// `issue` is the raw `issue` field (absent → `None`). When it carries no
/// digits, the first four characters of `slug` are used instead. `force_exceptional`
/// comes from an explicit exceptional flag on manifest records.
pub fn extract_issue_info(
    issue: Option<&str>,
    slug: &str,
    publish_date: &str,
    force_exceptional: bool,
) -> IssueInfo {
    let raw = issue.map(str::trim).unwrap_or("");

    if is_exceptional_issue(raw) || force_exceptional {
        let issue_label = if raw.is_empty() {
            numeric_label(raw, slug).0
        } else {
            raw.to_uppercase()
        };
        return IssueInfo {
            issue_label,
            issue_number: 0,
            is_exceptional: true,
            publish_date: publish_date.to_string(),
        };
    }

    let (issue_label, issue_number) = numeric_label(raw, slug);
    IssueInfo {
        issue_label,
        issue_number,
        is_exceptional: false,
        publish_date: publish_date.to_string(),
    }
}

/// Same derivation straight from a raw feed record.
///
/// Only identifiers the record actually carries feed the slug fallback, so a
/// record without any gets no issue number.
pub fn issue_info_from_record(record: &Value, force_exceptional: bool) -> IssueInfo {
    let issue = loose_string(record.get("issue"));
    let slug = first_string(record, &["slug", "articleId", "id"]).unwrap_or_default();
    let publish_date = first_string(record, &["publishDate", "date"]).unwrap_or_default();
    extract_issue_info(issue.as_deref(), &slug, &publish_date, force_exceptional)
}

fn numeric_label(raw: &str, slug: &str) -> (String, u64) {
    let mut digits = digits_only(raw);
    if digits.is_empty() {
        let head: String = slug.chars().take(4).collect();
        digits = digits_only(&head);
    }
    if digits.is_empty() {
        return (String::new(), 0);
    }
    let number = digits.parse::<u64>().unwrap_or_else(|_| {
        warn!("Issue number out of range, ordering it as the newest - digits={}", digits);
        u64::MAX
    });
    (format!("{digits:0>4}"), number)
}
