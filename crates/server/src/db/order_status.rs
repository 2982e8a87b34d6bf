//! Persisted order status repository.
//!
//! Rows are written by the cancellation and order-edit flows; the
//! enrichment pipeline only ever reads them.

use chad_core::PersistedStatus;
use sqlx::{PgPool, Row};

use super::RepositoryError;
use crate::models::order::PersistedOrderStatus;
use crate::services::status::StatusStore;

/// Repository for pinned per-order statuses.
#[derive(Clone)]
pub struct OrderStatusRepository {
    pool: PgPool,
}

impl OrderStatusRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the pinned status for an order, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored status string
    /// is not a known status or the sentinel.
    pub async fn get_by_order_id(
        &self,
        order_id: &str,
    ) -> Result<Option<PersistedOrderStatus>, RepositoryError> {
        let row = sqlx::query(
            r"
            SELECT status, original_order_details
            FROM order_status
            WHERE order_id = $1
            ",
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let stored: String = row.try_get("status")?;
                let status = PersistedStatus::from_stored(&stored).map_err(|value| {
                    RepositoryError::DataCorruption(format!(
                        "invalid status in database: {value}"
                    ))
                })?;

                Ok(Some(PersistedOrderStatus {
                    status,
                    original_order_details: row.try_get("original_order_details")?,
                }))
            }
            None => Ok(None),
        }
    }
}

impl StatusStore for OrderStatusRepository {
    async fn get_status(
        &self,
        order_id: &str,
    ) -> Result<Option<PersistedOrderStatus>, RepositoryError> {
        self.get_by_order_id(order_id).await
    }
}
