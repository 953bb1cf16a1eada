//! Raw feed shapes and the loose-value helpers shared by every normaliser.
//!
//! Each feed accepts several top-level layouts. Detection tries the known
//! layouts in a fixed priority order and reports which one matched; a payload
//! that fits none of them is `Unrecognized`, never a silent empty success.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Outcome of matching a payload against a feed's known shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedFeed<S, T> {
    Recognized(S, T),
    Unrecognized,
}

/* -------------------------------------------------------------------------- */
/* Manifest                                                                   */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestShape {
    Articles,
    Items,
    List,
    Data,
    Files,
    Entries,
    BareArray,
}

impl ManifestShape {
    /// Keyed shapes in priority order.
    const KEYED: [(&'static str, ManifestShape); 6] = [
        ("articles", ManifestShape::Articles),
        ("items", ManifestShape::Items),
        ("list", ManifestShape::List),
        ("data", ManifestShape::Data),
        ("files", ManifestShape::Files),
        ("entries", ManifestShape::Entries),
    ];

    /// `files` / `entries` manifests list per-article files and get extra coercion.
    pub fn is_manifest_style(self) -> bool {
        matches!(self, ManifestShape::Files | ManifestShape::Entries)
    }

    pub fn name(self) -> &'static str {
        match self {
            ManifestShape::Articles => "articles",
            ManifestShape::Items => "items",
            ManifestShape::List => "list",
            ManifestShape::Data => "data",
            ManifestShape::Files => "files",
            ManifestShape::Entries => "entries",
            ManifestShape::BareArray => "array",
        }
    }

    pub fn detect(payload: Value) -> ParsedFeed<ManifestShape, Vec<Value>> {
        match payload {
            Value::Object(mut obj) => {
                for (key, shape) in Self::KEYED {
                    if let Some(Value::Array(records)) = obj.remove(key) {
                        return ParsedFeed::Recognized(shape, records);
                    }
                }
                ParsedFeed::Unrecognized
            }
            Value::Array(records) => ParsedFeed::Recognized(ManifestShape::BareArray, records),
            _ => ParsedFeed::Unrecognized,
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Category dictionary                                                        */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCategory {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryShape {
    /// `{ "categories": [{ id, name }] }`
    Records,
    /// `{ "<id>": "<name>", ... }`
    Flat,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CategoryPayload {
    Records(Vec<Value>),
    Flat(Map<String, Value>),
}

impl CategoryShape {
    pub fn detect(payload: Value) -> ParsedFeed<CategoryShape, CategoryPayload> {
        match payload {
            Value::Object(mut obj) => match obj.remove("categories") {
                Some(Value::Array(records)) => {
                    ParsedFeed::Recognized(CategoryShape::Records, CategoryPayload::Records(records))
                }
                Some(other) => {
                    obj.insert("categories".to_string(), other);
                    ParsedFeed::Recognized(CategoryShape::Flat, CategoryPayload::Flat(obj))
                }
                None => ParsedFeed::Recognized(CategoryShape::Flat, CategoryPayload::Flat(obj)),
            },
            _ => ParsedFeed::Unrecognized,
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Search source                                                              */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchSourceShape {
    Articles,
    Docs,
    BareArray,
    /// `{ "<id>": { ... }, ... }`; every key is a document id.
    Keyed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchSourcePayload {
    Records(Vec<Value>),
    Keyed(Map<String, Value>),
}

impl SearchSourceShape {
    pub fn detect(payload: Value) -> ParsedFeed<SearchSourceShape, SearchSourcePayload> {
        match payload {
            Value::Object(mut obj) => {
                // A non-array `articles` / `docs` value is just another keyed document.
                for (key, shape) in [("articles", SearchSourceShape::Articles), ("docs", SearchSourceShape::Docs)] {
                    if matches!(obj.get(key), Some(Value::Array(_))) {
                        if let Some(Value::Array(records)) = obj.remove(key) {
                            return ParsedFeed::Recognized(shape, SearchSourcePayload::Records(records));
                        }
                    }
                }
                ParsedFeed::Recognized(SearchSourceShape::Keyed, SearchSourcePayload::Keyed(obj))
            }
            Value::Array(records) => {
                ParsedFeed::Recognized(SearchSourceShape::BareArray, SearchSourcePayload::Records(records))
            }
            _ => ParsedFeed::Unrecognized,
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Loose value helpers                                                        */
/* -------------------------------------------------------------------------- */

/// `true` or the string `"true"`; everything else is false.
pub fn loose_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim() == "true",
        _ => false,
    }
}

/// First alias present on the record that coerces to true.
pub fn loose_flag(record: &Value, keys: &[&str]) -> bool {
    keys.iter().any(|k| loose_bool(record.get(k)))
}

/// Trimmed, non-empty text from a string or number value.
pub fn loose_string(value: Option<&Value>) -> Option<String> {
    let s = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

/// First of `keys` carrying a usable string on the record.
pub fn first_string(record: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| loose_string(record.get(k)))
}

/// Non-negative integer from a number or a numeric string.
pub fn loose_u32(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Array of ids (strings or numbers); anything else yields an empty list.
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(xs)) => xs.iter().filter_map(|x| loose_string(Some(x))).collect(),
        _ => Vec::new(),
    }
}

pub fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}
