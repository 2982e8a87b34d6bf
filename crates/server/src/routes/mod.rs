//! HTTP route handlers for the order-status API.
//!
//! # Route Structure
//!
//! ```text
//! GET /health                          - Liveness check
//! GET /health/ready                    - Readiness check (database ping)
//!
//! # Orders
//! GET /api/shopify/order/{order_id}    - One enriched order (permission-checked)
//! GET /api/shopify/order/email/{email} - All enriched orders for a shopper
//! ```
//!
//! Shopper identity arrives via the `x-shopper-email` and `x-shop-url`
//! headers, set by the upstream auth gateway.

pub mod orders;

use axum::{routing::get, Router};

use crate::state::AppState;

/// Create the order API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/shopify/order/{order_id}", get(orders::get_order_by_id))
        .route(
            "/api/shopify/order/email/{email}",
            get(orders::get_orders_by_email),
        )
}
