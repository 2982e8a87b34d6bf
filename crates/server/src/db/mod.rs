//! Database operations for the order-status `PostgreSQL` instance.
//!
//! Shopify stays the source of truth for orders; this database holds only
//! the derived and out-of-band state:
//!
//! ## Tables
//!
//! - `order_status` - Statuses pinned by cancellation/edit flows
//! - `edit_order` - Pre-edit order snapshots awaiting top-up payment
//! - `tracker_cache` - (courier, tracking number) to Ship24 tracker id
//! - `merchant` / `order_config` - Per-store lateness configuration
//!
//! # Migrations
//!
//! Migrations live in `crates/server/migrations/` and run on startup via
//! `sqlx::migrate!`.

pub mod edit_orders;
pub mod merchants;
pub mod order_status;
pub mod tracking_cache;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub use edit_orders::EditOrderRepository;
pub use merchants::MerchantRepository;
pub use order_status::OrderStatusRepository;
pub use tracking_cache::TrackerCacheRepository;

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Underlying database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value failed validation on the way out.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
