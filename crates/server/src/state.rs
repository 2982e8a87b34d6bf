//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::db::{
    EditOrderRepository, MerchantRepository, OrderStatusRepository, TrackerCacheRepository,
};
use crate::services::enrichment::OrderEnricher;
use crate::services::tracking::TrackingService;
use crate::ship24::{Ship24Client, Ship24Error};
use crate::shopify::{AdminClient, ShopifyError};

/// Error constructing the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("shopify client: {0}")]
    Shopify(#[from] ShopifyError),
    #[error("ship24 client: {0}")]
    Ship24(#[from] Ship24Error),
}

/// Enricher type as wired for production handlers.
pub type Enricher =
    OrderEnricher<OrderStatusRepository, EditOrderRepository, Ship24Client, TrackerCacheRepository>;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and API clients.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    shopify: AdminClient,
    tracking: TrackingService<Ship24Client, TrackerCacheRepository>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if one of the HTTP clients fails to build.
    pub fn new(config: ServerConfig, pool: PgPool) -> Result<Self, StateError> {
        let shopify = AdminClient::new(&config.shopify)?;
        let ship24 = Ship24Client::new(&config.ship24)?;
        let tracking = TrackingService::new(ship24, TrackerCacheRepository::new(pool.clone()));

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                shopify,
                tracking,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the Shopify Admin API client.
    #[must_use]
    pub fn shopify(&self) -> &AdminClient {
        &self.inner.shopify
    }

    /// Get a reference to the merchant configuration repository.
    #[must_use]
    pub fn merchants(&self) -> MerchantRepository {
        MerchantRepository::new(self.inner.pool.clone())
    }

    /// Build the enrichment pipeline over the shared pool and tracking
    /// service. The tracking memo cache is shared across all enrichers.
    #[must_use]
    pub fn enricher(&self) -> Enricher {
        OrderEnricher::new(
            OrderStatusRepository::new(self.inner.pool.clone()),
            EditOrderRepository::new(self.inner.pool.clone()),
            self.inner.tracking.clone(),
        )
    }
}
