//! Attaches shopping-search products to a trend.

use std::sync::Arc;

use trendeng_core::{NewTrendProduct, Region};
use trendeng_shopping::{ShoppingItem, ShoppingSearch};

use crate::{BrandResolver, CatalogStore, PipelineError, Trend};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichOutcome {
    TrendNotFound,
    /// The trend's region is not a market the shopping provider serves.
    UnsupportedRegion,
    /// Search failed, was not configured, or found nothing.
    NoResults,
    Enriched {
        inserted: usize,
        skipped: usize,
        /// Products linked to the trend after this run, across all runs.
        total_products: i64,
    },
}

pub struct ProductEnricher {
    store: Arc<dyn CatalogStore>,
    search: Arc<dyn ShoppingSearch>,
    brands: Arc<dyn BrandResolver>,
}

impl ProductEnricher {
    #[must_use]
    pub fn new(
        store: Arc<dyn CatalogStore>,
        search: Arc<dyn ShoppingSearch>,
        brands: Arc<dyn BrandResolver>,
    ) -> Self {
        Self {
            store,
            search,
            brands,
        }
    }

    /// Loads the trend and enriches it.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if a store operation fails.
    pub async fn enrich_by_id(&self, trend_id: i64) -> Result<EnrichOutcome, PipelineError> {
        match self.store.trend_by_id(trend_id).await? {
            Some(trend) => self.enrich(&trend).await,
            None => {
                tracing::warn!(trend_id, "trend not found for enrichment");
                Ok(EnrichOutcome::TrendNotFound)
            }
        }
    }

    /// Searches for `trend` and stores every usable result.
    ///
    /// Search failures end the run quietly. Each product is written with its
    /// associations in one transaction; a store failure aborts the run and
    /// leaves earlier products in place.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if a store operation fails.
    pub async fn enrich(&self, trend: &Trend) -> Result<EnrichOutcome, PipelineError> {
        let category_id = self.store.category_id_by_slug(&trend.category).await?;
        if category_id.is_none() {
            tracing::warn!(
                trend_id = trend.id,
                category = %trend.category,
                "category not found; products will be uncategorized"
            );
        }

        let Ok(region) = trend.region.parse::<Region>() else {
            tracing::warn!(trend_id = trend.id, region = %trend.region, "unsupported trend region");
            return Ok(EnrichOutcome::UnsupportedRegion);
        };

        let results = match self.search.search(&trend.name, region).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(trend_id = trend.id, error = %e, "shopping search failed");
                return Ok(EnrichOutcome::NoResults);
            }
        };
        if results.is_empty() {
            tracing::info!(trend_id = trend.id, trend = %trend.name, "no shopping results");
            return Ok(EnrichOutcome::NoResults);
        }

        let mut inserted = 0usize;
        let mut skipped = 0usize;
        for item in &results.items {
            let Some((store_name, title)) = usable(item) else {
                tracing::debug!(trend_id = trend.id, ?item, "skipping result without store or title");
                skipped += 1;
                continue;
            };

            let store_id = self.store.get_or_create_store(store_name).await?;
            let brand_id = match self.brands.resolve(title) {
                Some(brand) => Some(self.store.get_or_create_brand(brand).await?),
                None => None,
            };

            let product = NewTrendProduct {
                title: title.to_string(),
                link: item.link.clone(),
                price: item.price.clone(),
                thumbnail: item.thumbnail.clone(),
                store_id,
                brand_id,
            };
            self.store
                .create_trend_product(trend.id, category_id, &product)
                .await?;
            inserted += 1;
        }

        let total_products = self.store.count_trend_products(trend.id).await?;
        tracing::info!(
            trend_id = trend.id,
            inserted,
            skipped,
            total_products,
            "trend enriched"
        );
        Ok(EnrichOutcome::Enriched {
            inserted,
            skipped,
            total_products,
        })
    }
}

fn usable(item: &ShoppingItem) -> Option<(&str, &str)> {
    let store = item.source.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
    let title = item.title.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
    Some((store, title))
}

#[cfg(test)]
#[path = "enricher_test.rs"]
mod tests;
