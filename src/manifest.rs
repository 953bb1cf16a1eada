use serde_json::Value;
use tracing::{debug, info};

use crate::api_types::{
    first_string, loose_flag, loose_string, loose_u32, string_list, ManifestShape, ParsedFeed,
};
use crate::categories::resolve_category_names;
use crate::errors::CatalogError;
use crate::issue::issue_info_from_record;
use crate::models::{Article, CategoryMap, UNTITLED};

const ID_KEYS: [&str; 3] = ["slug", "articleId", "id"];
const DATE_KEYS: [&str; 2] = ["publishDate", "date"];
const HIDDEN_KEYS: [&str; 2] = ["isHidden", "hidden"];
const EXCEPTIONAL_KEYS: [&str; 3] = ["isExceptional", "exceptional", "特別号"];

/// Turn a parsed manifest payload into the visible article collection.
///
/// Hidden articles are dropped here, after every record is normalised, and
/// nowhere else.
pub fn normalize_manifest(
    payload: Value,
    categories: &CategoryMap,
    plain_articles_dir: &str,
) -> Result<Vec<Article>, CatalogError> {
    let (shape, records) = match ManifestShape::detect(payload) {
        ParsedFeed::Recognized(shape, records) => (shape, records),
        ParsedFeed::Unrecognized => return Err(CatalogError::UnrecognizedShape { feed: "manifest" }),
    };
    debug!(
        "Manifest shape recognized - shape={}, manifest_style={}, records={}",
        shape.name(),
        shape.is_manifest_style(),
        records.len()
    );

    let mut articles: Vec<Article> = records
        .iter()
        .enumerate()
        .map(|(position, r)| normalize_record(r, position, shape, categories, plain_articles_dir))
        .collect();

    let before = articles.len();
    articles.retain(|a| !a.is_hidden);
    let hidden = before - articles.len();
    info!(
        "Manifest normalized - shape={}, articles={}, hidden={}",
        shape.name(),
        articles.len(),
        hidden
    );

    Ok(articles)
}

fn normalize_record(
    record: &Value,
    position: usize,
    shape: ManifestShape,
    categories: &CategoryMap,
    plain_articles_dir: &str,
) -> Article {
    // Records without any identifier fall back to their position in the feed.
    let slug = first_string(record, &ID_KEYS).unwrap_or_else(|| position.to_string());
    let article_id = first_string(record, &["articleId"]).unwrap_or_else(|| slug.clone());
    let title = first_string(record, &["title"]).unwrap_or_else(|| UNTITLED.to_string());
    let publish_date = first_string(record, &DATE_KEYS).unwrap_or_default();
    let issue_raw = loose_string(record.get("issue"));
    let category_ids = string_list(record.get("categoryIds"));
    let category = resolve_category_names(&category_ids, categories);

    let is_hidden = loose_flag(record, &HIDDEN_KEYS);
    let flagged_exceptional = loose_flag(record, &EXCEPTIONAL_KEYS);
    // The positional slug is identity only; it never becomes an issue number.
    let issue = issue_info_from_record(record, flagged_exceptional);

    let plain_path = shape.is_manifest_style().then(|| {
        first_string(record, &["path"])
            .unwrap_or_else(|| format!("{}/{}.json", plain_articles_dir.trim_end_matches('/'), slug))
    });

    Article {
        article_id,
        title,
        publish_date,
        issue_raw,
        sequence_num: loose_u32(record.get("sequenceNum")),
        category_ids,
        category,
        is_hidden,
        is_exceptional: issue.is_exceptional,
        issue,
        plain_path,
        slug,
    }
}
