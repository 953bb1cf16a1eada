use itertools::Itertools;
use serde_json::Value;
use tracing::{debug, warn};

use crate::api_types::{loose_string, ApiCategory, CategoryPayload, CategoryShape, ParsedFeed};
use crate::models::CategoryMap;

/// Build the id → name dictionary from either accepted shape.
///
/// Any other payload yields an empty map: articles then show raw ids.
pub fn normalize_category_map(payload: Value) -> CategoryMap {
    match CategoryShape::detect(payload) {
        ParsedFeed::Recognized(_, CategoryPayload::Records(records)) => {
            let total = records.len();
            let map: CategoryMap = records
                .into_iter()
                .filter_map(|r| serde_json::from_value::<ApiCategory>(r).ok())
                .filter_map(|c| {
                    let id = loose_string(c.id.as_ref())?;
                    let name = loose_string(c.name.as_ref())?;
                    Some((id, name))
                })
                .collect();
            debug!("Category records normalized - records={}, kept={}", total, map.len());
            map
        }
        ParsedFeed::Recognized(_, CategoryPayload::Flat(obj)) => obj
            .into_iter()
            .map(|(id, v)| (id, loose_string(Some(&v)).unwrap_or_default()))
            .collect(),
        ParsedFeed::Unrecognized => {
            warn!("Category dictionary has an unrecognized shape, using raw ids");
            CategoryMap::new()
        }
    }
}

/// Resolve ids to names (unknown ids pass through) and join them for display.
pub fn resolve_category_names(ids: &[String], map: &CategoryMap) -> String {
    ids.iter()
        .map(|id| map.get(id).map(String::as_str).unwrap_or(id.as_str()))
        .join(", ")
}

/// `(id, name)` pairs sorted by display name, for the category pull-down.
pub fn options_by_name(map: &CategoryMap) -> Vec<(String, String)> {
    map.iter()
        .map(|(id, name)| (id.clone(), name.clone()))
        .sorted_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)))
        .collect()
}
