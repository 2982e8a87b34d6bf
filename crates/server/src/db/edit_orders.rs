//! Edit-order snapshot repository.

use sqlx::{PgPool, Row};

use super::RepositoryError;
use crate::models::order::EditOrderSnapshot;
use crate::services::enrichment::EditOrderStore;

/// Repository for pre-edit order snapshots.
#[derive(Clone)]
pub struct EditOrderRepository {
    pool: PgPool,
}

impl EditOrderRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the pre-edit snapshot for an order, if an edit is pending.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_order_id(
        &self,
        order_id: &str,
    ) -> Result<Option<EditOrderSnapshot>, RepositoryError> {
        let row = sqlx::query(
            r"
            SELECT total_shipping_price_set, current_total_tax_set,
                   current_total_price_set, current_total_discounts_set,
                   line_items
            FROM edit_order
            WHERE order_id = $1
            ",
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(EditOrderSnapshot {
                total_shipping_price_set: row.try_get("total_shipping_price_set")?,
                current_total_tax_set: row.try_get("current_total_tax_set")?,
                current_total_price_set: row.try_get("current_total_price_set")?,
                current_total_discounts_set: row.try_get("current_total_discounts_set")?,
                line_items: row.try_get("line_items")?,
            })),
            None => Ok(None),
        }
    }
}

impl EditOrderStore for EditOrderRepository {
    async fn get_snapshot(
        &self,
        order_id: &str,
    ) -> Result<Option<EditOrderSnapshot>, RepositoryError> {
        self.get_by_order_id(order_id).await
    }
}
