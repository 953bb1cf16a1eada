//! Catalog engine for a newsletter article archive.
//!
//! Feeds (category dictionary, article manifest, search source) are fetched
//! through a [`fetch::TextFetcher`], normalised into [`models::Article`]s held
//! by an [`store::ArticleStore`], and queried by year, category and keywords.
//! Results come back ordered by issue and shaped for a grouped or flat view.

pub mod api_types;
pub mod catalog;
pub mod categories;
pub mod config;
pub mod errors;
pub mod fetch;
pub mod issue;
pub mod manifest;
pub mod models;
pub mod ordering;
pub mod query;
pub mod render;
pub mod search_index;
pub mod store;

pub use catalog::{Catalog, Response, StatusMessage};
pub use config::CatalogConfig;
pub use errors::CatalogError;
pub use fetch::{HttpFetcher, TextFetcher};
pub use models::{Article, PresentationMode, QueryResult, SearchDocument};
pub use ordering::ResultView;
