//! Merchant configuration repository.

use chad_core::LateFrom;
use sqlx::{PgPool, Row};
use tracing::warn;

use super::RepositoryError;
use crate::models::merchant::OrderConfig;

/// Repository for per-store order configuration.
#[derive(Clone)]
pub struct MerchantRepository {
    pool: PgPool,
}

impl MerchantRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the order configuration for a store, if one is registered.
    ///
    /// An unparseable `late_from` value is logged and treated as the
    /// PLACED default rather than failing the lookup.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_order_config(
        &self,
        store_url: &str,
    ) -> Result<Option<OrderConfig>, RepositoryError> {
        let row = sqlx::query(
            r"
            SELECT lateness_threshold_days, late_from
            FROM merchant
            WHERE store_url = $1
            ",
        )
        .bind(store_url)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let stored: String = row.try_get("late_from")?;
                let late_from = stored.parse().unwrap_or_else(|_| {
                    warn!(store_url, late_from = %stored, "unknown late_from value, using placed");
                    LateFrom::Placed
                });

                Ok(Some(OrderConfig {
                    lateness_threshold_days: row.try_get("lateness_threshold_days")?,
                    late_from,
                }))
            }
            None => Ok(None),
        }
    }
}
