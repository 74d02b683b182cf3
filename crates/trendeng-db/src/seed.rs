use sqlx::PgPool;
use trendeng_core::{CategoryConfig, SearchQueryConfig};

use crate::DbError;

/// Upsert the category tree: each parent, then its children pointing at it.
///
/// Returns the number of categories written. Runs in one transaction; any
/// failure rolls the whole tree back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_categories(pool: &PgPool, categories: &[CategoryConfig]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for parent in categories {
        let parent_id: i64 = sqlx::query_scalar(
            "INSERT INTO categories (name, slug, parent_id) \
             VALUES ($1, $2, NULL) \
             ON CONFLICT (slug) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 parent_id = NULL \
             RETURNING id",
        )
        .bind(&parent.name)
        .bind(parent.slug())
        .fetch_one(&mut *tx)
        .await?;
        count += 1;

        for child in &parent.children {
            sqlx::query(
                "INSERT INTO categories (name, slug, parent_id) \
                 VALUES ($1, $2, $3) \
                 ON CONFLICT (slug) DO UPDATE SET \
                     name = EXCLUDED.name, \
                     parent_id = EXCLUDED.parent_id",
            )
            .bind(&child.name)
            .bind(child.slug())
            .bind(parent_id)
            .execute(&mut *tx)
            .await?;
            count += 1;
        }
    }

    tx.commit().await?;
    Ok(count)
}

/// Register tracked search queries, looking each up by `(query, region)`
/// before inserting.
///
/// Returns the number of queries processed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_search_queries(
    pool: &PgPool,
    queries: &[SearchQueryConfig],
) -> Result<usize, DbError> {
    let mut count = 0usize;
    for q in queries {
        crate::get_or_create_search_query(pool, &q.query, &q.category, q.region, q.is_active)
            .await?;
        count += 1;
    }
    Ok(count)
}
