//! Product records written by the enrichment and catalog-sync paths.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Region;

/// A product attached to a trend by the enricher.
///
/// `price` is the display string returned by the shopping provider
/// (e.g. `"R$ 89,90"`), kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrendProduct {
    pub title: String,
    pub link: Option<String>,
    pub price: Option<String>,
    pub thumbnail: Option<String>,
    pub store_id: i64,
    pub brand_id: Option<i64>,
}

/// Canonical catalog product built from an immersive product page.
///
/// Keyed by `external_id`. On upsert every `Some` field overwrites the stored
/// value and every `None` field leaves the stored value untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProductRecord {
    pub external_id: String,
    pub search_query_id: i64,
    pub region: Region,
    pub title: String,
    pub brand: Option<String>,
    pub price: Option<Decimal>,
    pub thumbnail_url: Option<String>,
    pub store_name: Option<String>,
    pub store_link: Option<String>,
    pub rating: Option<Decimal>,
    pub reviews: Option<i32>,
    pub variants: Option<serde_json::Value>,
    pub other_details: Option<serde_json::Value>,
}
