//! Inputs accepted by the services before validation.

use serde::Deserialize;

/// Catalog listing filters as received from a caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookFilter {
    pub q: Option<String>,
    pub category: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub isbn: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub published_year: Option<i64>,
    pub description: Option<String>,
    pub total_copies: Option<i64>,
}
