use thiserror::Error;
use trendeng_collectors::CollectError;
use trendeng_db::DbError;
use trendeng_shopping::ShoppingError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("database error: {0}")]
    Db(#[from] DbError),

    /// Failure raised by a non-Postgres [`crate::CatalogStore`].
    #[error("store error during {operation}: {message}")]
    Store {
        operation: &'static str,
        message: String,
    },

    #[error("collector setup failed: {0}")]
    Collector(#[from] CollectError),

    #[error("shopping client setup failed: {0}")]
    Shopping(#[from] ShoppingError),
}
