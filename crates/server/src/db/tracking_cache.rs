//! Durable tracker-id cache repository.
//!
//! One row per (courier, tracking number) pair. Tracker ids never change
//! once issued, so rows are insert-once and never updated.

use sqlx::{PgPool, Row};

use super::RepositoryError;
use crate::services::tracking::TrackerCacheStore;

/// Repository for the (courier, tracking number) to tracker id mapping.
#[derive(Clone)]
pub struct TrackerCacheRepository {
    pool: PgPool,
}

impl TrackerCacheRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Look up a cached tracker id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        courier: &str,
        tracking_number: &str,
    ) -> Result<Option<String>, RepositoryError> {
        let row = sqlx::query(
            r"
            SELECT tracker_id
            FROM tracker_cache
            WHERE courier = $1 AND tracking_number = $2
            ",
        )
        .bind(courier)
        .bind(tracking_number)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.try_get("tracker_id"))
            .transpose()
            .map_err(RepositoryError::from)
    }

    /// Record a tracker id for a (courier, tracking number) pair.
    ///
    /// Concurrent first lookups can race; the first insert wins and the
    /// loser's identical row is dropped silently.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        courier: &str,
        tracking_number: &str,
        tracker_id: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO tracker_cache (courier, tracking_number, tracker_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (courier, tracking_number) DO NOTHING
            ",
        )
        .bind(courier)
        .bind(tracking_number)
        .bind(tracker_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl TrackerCacheStore for TrackerCacheRepository {
    async fn get_tracker_id(
        &self,
        courier: &str,
        tracking_number: &str,
    ) -> Result<Option<String>, RepositoryError> {
        self.get(courier, tracking_number).await
    }

    async fn insert_tracker_id(
        &self,
        courier: &str,
        tracking_number: &str,
        tracker_id: &str,
    ) -> Result<(), RepositoryError> {
        self.insert(courier, tracking_number, tracker_id).await
    }
}
