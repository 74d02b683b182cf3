//! In-memory doubles for the store, dispatcher and collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use trendeng_collectors::{CollectError, Collector, Locator, RawRecord};
use trendeng_core::{CatalogProductRecord, NewTrend, NewTrendProduct, Region};
use trendeng_shopping::{
    ProductDetail, ProductResult, ShoppingError, ShoppingResults, ShoppingSearch,
};

use crate::store::{RunType, TriggerSource};
use crate::{CatalogStore, PipelineError, RunLedger, Task, TaskDispatcher, TrackedQuery, Trend};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredProduct {
    pub id: i64,
    pub product: NewTrendProduct,
}

#[derive(Default)]
pub struct State {
    pub next_id: i64,
    pub trends: Vec<Trend>,
    pub categories: HashMap<String, i64>,
    pub stores: Vec<(i64, String)>,
    pub brands: Vec<(i64, String)>,
    pub products: Vec<StoredProduct>,
    pub trend_products: Vec<(i64, i64)>,
    pub product_categories: Vec<(i64, i64)>,
    pub queries: Vec<TrackedQuery>,
    pub filters: Vec<(i64, i64, String, String)>,
    pub catalog: Vec<(i64, CatalogProductRecord)>,
    pub runs: Vec<(i64, RunType, &'static str, Option<i32>)>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    pub state: Mutex<State>,
    /// Makes `create_trend_product` fail, for redelivery tests.
    pub fail_product_writes: std::sync::atomic::AtomicBool,
}

impl InMemoryStore {
    pub fn with_categories(slugs: &[&str]) -> Self {
        let store = Self::default();
        {
            let mut state = store.state.lock().unwrap();
            for slug in slugs {
                let id = state.next_id();
                state.categories.insert((*slug).to_string(), id);
            }
        }
        store
    }

    pub fn add_trend(&self, name: &str, region: &str, category: &str) -> Trend {
        let mut state = self.state.lock().unwrap();
        let trend = Trend {
            id: state.next_id(),
            name: name.to_string(),
            region: region.to_string(),
            category: category.to_string(),
            source: "Test".to_string(),
            score: 0,
        };
        state.trends.push(trend.clone());
        trend
    }

    pub fn add_query(&self, query: &str, region: Region) -> TrackedQuery {
        let mut state = self.state.lock().unwrap();
        let tracked = TrackedQuery {
            id: state.next_id(),
            query: query.to_string(),
            category: "acessorios".to_string(),
            region,
        };
        state.queries.push(tracked.clone());
        tracked
    }

    pub fn trends(&self) -> Vec<Trend> {
        self.state.lock().unwrap().trends.clone()
    }

    pub fn products(&self) -> Vec<StoredProduct> {
        self.state.lock().unwrap().products.clone()
    }

    pub fn catalog(&self) -> Vec<(i64, CatalogProductRecord)> {
        self.state.lock().unwrap().catalog.clone()
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn trend_by_id(&self, id: i64) -> Result<Option<Trend>, PipelineError> {
        let state = self.state.lock().unwrap();
        Ok(state.trends.iter().find(|t| t.id == id).cloned())
    }

    async fn trend_by_name_and_region(
        &self,
        name: &str,
        region: &str,
    ) -> Result<Option<Trend>, PipelineError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .trends
            .iter()
            .find(|t| t.name == name && t.region.eq_ignore_ascii_case(region))
            .cloned())
    }

    async fn create_trend(&self, trend: &NewTrend) -> Result<Trend, PipelineError> {
        let mut state = self.state.lock().unwrap();
        let created = Trend {
            id: state.next_id(),
            name: trend.name.clone(),
            region: trend.region.clone(),
            category: trend.category.clone(),
            source: trend.source.clone(),
            score: trend.score,
        };
        state.trends.push(created.clone());
        Ok(created)
    }

    async fn category_id_by_slug(&self, slug: &str) -> Result<Option<i64>, PipelineError> {
        Ok(self.state.lock().unwrap().categories.get(slug).copied())
    }

    async fn get_or_create_store(&self, name: &str) -> Result<i64, PipelineError> {
        let mut state = self.state.lock().unwrap();
        if let Some((id, _)) = state.stores.iter().find(|(_, n)| n == name) {
            return Ok(*id);
        }
        let id = state.next_id();
        state.stores.push((id, name.to_string()));
        Ok(id)
    }

    async fn get_or_create_brand(&self, name: &str) -> Result<i64, PipelineError> {
        let mut state = self.state.lock().unwrap();
        if let Some((id, _)) = state.brands.iter().find(|(_, n)| n == name) {
            return Ok(*id);
        }
        let id = state.next_id();
        state.brands.push((id, name.to_string()));
        Ok(id)
    }

    async fn create_trend_product(
        &self,
        trend_id: i64,
        category_id: Option<i64>,
        product: &NewTrendProduct,
    ) -> Result<i64, PipelineError> {
        if self.fail_product_writes.load(Ordering::SeqCst) {
            return Err(PipelineError::Store {
                operation: "create_trend_product",
                message: "simulated failure".to_string(),
            });
        }
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.products.push(StoredProduct {
            id,
            product: product.clone(),
        });
        state.trend_products.push((trend_id, id));
        if let Some(category_id) = category_id {
            state.product_categories.push((category_id, id));
        }
        Ok(id)
    }

    async fn count_trend_products(&self, trend_id: i64) -> Result<i64, PipelineError> {
        let state = self.state.lock().unwrap();
        let count = state
            .trend_products
            .iter()
            .filter(|(t, _)| *t == trend_id)
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn active_search_queries(
        &self,
        region: Region,
    ) -> Result<Vec<TrackedQuery>, PipelineError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .queries
            .iter()
            .filter(|q| q.region == region)
            .cloned()
            .collect())
    }

    async fn get_or_create_filter(
        &self,
        search_query_id: i64,
        name: &str,
        filter_type: &str,
    ) -> Result<i64, PipelineError> {
        let mut state = self.state.lock().unwrap();
        if let Some((id, ..)) = state
            .filters
            .iter()
            .find(|(_, q, n, _)| *q == search_query_id && n == name)
        {
            return Ok(*id);
        }
        let id = state.next_id();
        state
            .filters
            .push((id, search_query_id, name.to_string(), filter_type.to_string()));
        Ok(id)
    }

    async fn upsert_catalog_product(
        &self,
        record: &CatalogProductRecord,
    ) -> Result<i64, PipelineError> {
        let mut state = self.state.lock().unwrap();
        if let Some((id, existing)) = state
            .catalog
            .iter_mut()
            .find(|(_, r)| r.external_id == record.external_id)
        {
            existing.search_query_id = record.search_query_id;
            existing.region = record.region;
            existing.title.clone_from(&record.title);
            macro_rules! merge {
                ($($field:ident),*) => {
                    $(if record.$field.is_some() {
                        existing.$field.clone_from(&record.$field);
                    })*
                };
            }
            merge!(
                brand,
                price,
                thumbnail_url,
                store_name,
                store_link,
                rating,
                reviews,
                variants,
                other_details
            );
            return Ok(*id);
        }
        let id = state.next_id();
        state.catalog.push((id, record.clone()));
        Ok(id)
    }
}

#[async_trait]
impl RunLedger for InMemoryStore {
    async fn begin_run(
        &self,
        run_type: RunType,
        _region: Option<Region>,
        _trigger: TriggerSource,
    ) -> Option<i64> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.runs.push((id, run_type, "running", None));
        Some(id)
    }

    async fn complete_run(&self, run_id: i64, records_processed: i32) {
        let mut state = self.state.lock().unwrap();
        if let Some(run) = state.runs.iter_mut().find(|r| r.0 == run_id) {
            run.2 = "succeeded";
            run.3 = Some(records_processed);
        }
    }

    async fn fail_run(&self, run_id: i64, _message: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(run) = state.runs.iter_mut().find(|r| r.0 == run_id) {
            run.2 = "failed";
        }
    }
}

#[derive(Default)]
pub struct RecordingDispatcher {
    pub tasks: Mutex<Vec<Task>>,
}

impl RecordingDispatcher {
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.lock().unwrap().clone()
    }
}

impl TaskDispatcher for RecordingDispatcher {
    fn dispatch(&self, task: Task) {
        self.tasks.lock().unwrap().push(task);
    }
}

/// Answers every search with the same results, or with `error` when set.
#[derive(Default)]
pub struct StubSearch {
    pub results: Mutex<ShoppingResults>,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl StubSearch {
    pub fn returning(results: ShoppingResults) -> Self {
        Self {
            results: Mutex::new(results),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ShoppingSearch for StubSearch {
    async fn search(&self, _query: &str, _region: Region) -> Result<ShoppingResults, ShoppingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ShoppingError::NotConfigured { provider: "stub" });
        }
        Ok(self.results.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct StubDetail {
    pub product: Mutex<Option<ProductResult>>,
    pub calls: AtomicUsize,
}

impl StubDetail {
    pub fn returning(product: Option<ProductResult>) -> Self {
        Self {
            product: Mutex::new(product),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, product: Option<ProductResult>) {
        *self.product.lock().unwrap() = product;
    }
}

#[async_trait]
impl ProductDetail for StubDetail {
    async fn detail(&self, _page_token: &str) -> Result<Option<ProductResult>, ShoppingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.product.lock().unwrap().clone())
    }
}

pub enum StubCollector {
    Records(Vec<RawRecord>),
    Failing,
}

#[async_trait]
impl Collector for StubCollector {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn collect(&self, locator: &Locator) -> Result<Vec<RawRecord>, CollectError> {
        match self {
            StubCollector::Records(records) => Ok(records.clone()),
            StubCollector::Failing => Err(CollectError::UnsupportedLocator {
                collector: "stub",
                locator: locator.to_string(),
            }),
        }
    }
}
