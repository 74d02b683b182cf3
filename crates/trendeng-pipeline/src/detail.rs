//! Resolves one shopping result to an upserted catalog product.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use trendeng_core::{CatalogProductRecord, Region};
use trendeng_shopping::{ProductDetail, ProductResult, ShoppingItem};

use crate::{CatalogStore, PipelineError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailOutcome {
    /// The result carries no immersive page token.
    NoToken,
    /// The provider failed or returned no product or no stores.
    NoProduct,
    /// Neither a product id nor a store link to key the record on.
    Unidentifiable,
    Untitled,
    Saved { id: i64, external_id: String },
}

pub struct DetailFetcher {
    store: Arc<dyn CatalogStore>,
    detail: Arc<dyn ProductDetail>,
}

impl DetailFetcher {
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>, detail: Arc<dyn ProductDetail>) -> Self {
        Self { store, detail }
    }

    /// Fetches the immersive page for `item` and upserts the product.
    ///
    /// Safe to repeat: the write is keyed on the external product id.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if the upsert fails.
    pub async fn fetch_and_save(
        &self,
        item: &ShoppingItem,
        search_query_id: i64,
        region: Region,
    ) -> Result<DetailOutcome, PipelineError> {
        let Some(token) = item
            .immersive_product_page_token
            .as_deref()
            .filter(|t| !t.is_empty())
        else {
            return Ok(DetailOutcome::NoToken);
        };

        let product = match self.detail.detail(token).await {
            Ok(Some(product)) => product,
            Ok(None) => return Ok(DetailOutcome::NoProduct),
            Err(e) => {
                tracing::warn!(search_query_id, error = %e, "product detail fetch failed");
                return Ok(DetailOutcome::NoProduct);
            }
        };

        let record = match build_record(item, &product, search_query_id, region) {
            Ok(record) => record,
            Err(outcome) => {
                if outcome == DetailOutcome::Untitled {
                    tracing::warn!(search_query_id, "product detail has no title; skipping");
                }
                return Ok(outcome);
            }
        };

        let id = self.store.upsert_catalog_product(&record).await?;
        tracing::debug!(id, external_id = %record.external_id, "catalog product saved");
        Ok(DetailOutcome::Saved {
            id,
            external_id: record.external_id,
        })
    }
}

/// Builds the catalog record from the search hit and its detail page, or
/// says why it cannot.
///
/// The first store offer supplies store name, link and price. The external
/// id falls back from the detail page's id to the search hit's id to a
/// SHA-256 of the store link.
///
/// # Errors
///
/// Returns the [`DetailOutcome`] describing why no record can be built.
pub fn build_record(
    item: &ShoppingItem,
    product: &ProductResult,
    search_query_id: i64,
    region: Region,
) -> Result<CatalogProductRecord, DetailOutcome> {
    let Some(offer) = product.stores.first() else {
        return Err(DetailOutcome::NoProduct);
    };

    let store_link = non_empty(offer.link.as_deref());
    let external_id = match non_empty(product.product_id.as_deref())
        .or_else(|| non_empty(item.product_id.as_deref()))
    {
        Some(id) => id.to_string(),
        None => match store_link {
            Some(link) => format!("{:x}", Sha256::digest(link.as_bytes())),
            None => return Err(DetailOutcome::Unidentifiable),
        },
    };

    let Some(title) =
        non_empty(product.title.as_deref()).or_else(|| non_empty(item.title.as_deref()))
    else {
        return Err(DetailOutcome::Untitled);
    };

    Ok(CatalogProductRecord {
        external_id,
        search_query_id,
        region,
        title: title.to_string(),
        brand: non_empty(product.brand.as_deref()).map(str::to_string),
        price: offer.extracted_price.and_then(|p| decimal(p, 2)),
        thumbnail_url: product
            .thumbnails
            .first()
            .cloned()
            .or_else(|| item.thumbnail.clone()),
        store_name: non_empty(offer.name.as_deref()).map(str::to_string),
        store_link: store_link.map(str::to_string),
        rating: product.rating.and_then(|r| decimal(r, 2)),
        reviews: product.reviews.and_then(|r| i32::try_from(r).ok()),
        variants: product.variants.clone(),
        other_details: other_details(
            product.price_range.as_ref(),
            offer.details_and_offers.as_ref(),
        ),
    })
}

/// Collects the free-form detail fields that are present. Absent parts are
/// left out so a sparse re-fetch does not overwrite stored values with nulls.
fn other_details(
    price_range: Option<&Value>,
    details_and_offers: Option<&Value>,
) -> Option<Value> {
    let mut details = Map::new();
    for (key, value) in [
        ("price_range", price_range),
        ("details_and_offers", details_and_offers),
    ] {
        if let Some(value) = value.filter(|v| !v.is_null()) {
            details.insert(key.to_string(), value.clone());
        }
    }
    (!details.is_empty()).then_some(Value::Object(details))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn decimal(value: f64, scale: u32) -> Option<Decimal> {
    Decimal::try_from(value).ok().map(|d| d.round_dp(scale))
}

#[cfg(test)]
#[path = "detail_test.rs"]
mod tests;
