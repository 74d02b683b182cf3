//! Audit rows for `collect`, `sync` and `enrich` runs.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `collection_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CollectionRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub run_type: String,
    pub region: Option<String>,
    pub trigger_source: String,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub records_processed: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

const RUN_COLUMNS: &str = "id, public_id, run_type, region, trigger_source, status, \
                           started_at, completed_at, records_processed, error_message, created_at";

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Creates a new run in `queued` status and returns it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_collection_run(
    pool: &PgPool,
    run_type: &str,
    region: Option<&str>,
    trigger_source: &str,
) -> Result<CollectionRunRow, DbError> {
    let row = sqlx::query_as::<_, CollectionRunRow>(&format!(
        "INSERT INTO collection_runs (public_id, run_type, region, trigger_source, status) \
         VALUES ($1, $2, $3, $4, 'queued') \
         RETURNING {RUN_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(run_type)
    .bind(region)
    .bind(trigger_source)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Moves a `queued` run to `running`.
///
/// # Errors
///
/// Returns [`DbError::InvalidCollectionRunTransition`] if the run is not
/// queued, or [`DbError::Sqlx`] if the update fails.
pub async fn start_collection_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE collection_runs \
         SET status = 'running', started_at = NOW() \
         WHERE id = $1 AND status = 'queued'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidCollectionRunTransition {
            id,
            expected_status: "queued",
        });
    }

    Ok(())
}

/// Moves a `running` run to `succeeded` and records how much it processed.
///
/// # Errors
///
/// Returns [`DbError::InvalidCollectionRunTransition`] if the run is not
/// running, or [`DbError::Sqlx`] if the update fails.
pub async fn complete_collection_run(
    pool: &PgPool,
    id: i64,
    records_processed: i32,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE collection_runs \
         SET status = 'succeeded', completed_at = NOW(), records_processed = $1 \
         WHERE id = $2 AND status = 'running'",
    )
    .bind(records_processed)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidCollectionRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Moves a `running` run to `failed` with an error message.
///
/// # Errors
///
/// Returns [`DbError::InvalidCollectionRunTransition`] if the run is not
/// running, or [`DbError::Sqlx`] if the update fails.
pub async fn fail_collection_run(
    pool: &PgPool,
    id: i64,
    error_message: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE collection_runs \
         SET status = 'failed', completed_at = NOW(), error_message = $1 \
         WHERE id = $2 AND status = 'running'",
    )
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidCollectionRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Fetches a single run by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists, or [`DbError::Sqlx`] if
/// the query fails.
pub async fn get_collection_run(pool: &PgPool, id: i64) -> Result<CollectionRunRow, DbError> {
    sqlx::query_as::<_, CollectionRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM collection_runs WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Returns the most recent `limit` runs.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_collection_runs(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<CollectionRunRow>, DbError> {
    let rows = sqlx::query_as::<_, CollectionRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM collection_runs \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
