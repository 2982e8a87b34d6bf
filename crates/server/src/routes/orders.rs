//! Enriched order endpoints.

use axum::extract::{FromRequestParts, Path, State};
use axum::http::request::Parts;
use axum::Json;
use chrono::Utc;
use tracing::warn;

use chad_core::{extract_order_id, Email};

use crate::error::{AppError, Result};
use crate::models::merchant::OrderConfig;
use crate::models::order::OrderFacts;
use crate::state::AppState;

/// Shopper identity forwarded by the auth gateway.
#[derive(Debug, Clone)]
pub struct CurrentShopper {
    pub email: Email,
    pub store_url: String,
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentShopper {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let email = header_value(parts, "x-shopper-email")?;
        let email = Email::parse(email)
            .map_err(|e| AppError::Unauthorized(format!("invalid shopper email: {e}")))?;

        let store_url = header_value(parts, "x-shop-url")?.to_owned();
        if store_url.is_empty() {
            return Err(AppError::Unauthorized("missing shop url".to_string()));
        }

        Ok(Self { email, store_url })
    }
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Result<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized(format!("missing {name} header")))
}

/// `GET /api/shopify/order/{order_id}`
///
/// Returns one enriched order. Shoppers can only see their own orders; the
/// configured admin email can see any.
pub async fn get_order_by_id(
    State(state): State<AppState>,
    shopper: CurrentShopper,
    Path(order_id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    if !is_admin(&state, &shopper) {
        check_permission(&state, &shopper, &order_id).await?;
    }

    let facts = state
        .shopify()
        .get_order_by_id(&shopper.store_url, &order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;

    let config = order_config(&state, &shopper.store_url).await;
    let enriched = state
        .enricher()
        .enrich(&facts, extract_order_id(&facts.id), &config, Utc::now())
        .await;

    Ok(Json(serde_json::json!({ "data": { "order": enriched } })))
}

/// `GET /api/shopify/order/email/{email}`
///
/// Returns every order of the customer with that email, enriched. Shoppers
/// can only query their own email; the configured admin email can query any.
pub async fn get_orders_by_email(
    State(state): State<AppState>,
    shopper: CurrentShopper,
    Path(email): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let email =
        Email::parse(&email).map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;

    if !is_admin(&state, &shopper)
        && !shopper.email.as_str().eq_ignore_ascii_case(email.as_str())
    {
        return Err(AppError::Unauthorized(
            "cannot view orders of another shopper".to_string(),
        ));
    }

    let customers = state
        .shopify()
        .get_customers_by_email(&shopper.store_url, email.as_str())
        .await?;
    let customer_id = customers
        .edges
        .first()
        .and_then(|edge| edge.node.id.clone())
        .ok_or_else(|| AppError::NotFound(format!("customer {}", email.as_str())))?;

    let orders = state
        .shopify()
        .get_orders_by_customer_id(&shopper.store_url, &customer_id)
        .await?;

    let config = order_config(&state, &shopper.store_url).await;
    let enricher = state.enricher();
    let now = Utc::now();

    // Sequential per order; volumes are small (a shopper's own history).
    let mut edges = Vec::with_capacity(orders.edges.len());
    for edge in orders.edges {
        let mut facts = edge.node;
        prune_removed_line_items(&mut facts);
        let enriched = enricher
            .enrich(&facts, extract_order_id(&facts.id), &config, now)
            .await;
        edges.push(serde_json::json!({ "node": enriched }));
    }

    Ok(Json(serde_json::json!({
        "data": {
            "orders": { "edges": edges },
            "customers": customers,
        }
    })))
}

fn is_admin(state: &AppState, shopper: &CurrentShopper) -> bool {
    state
        .config()
        .admin_email
        .as_ref()
        .is_some_and(|admin| admin.as_str().eq_ignore_ascii_case(shopper.email.as_str()))
}

/// Verify the order belongs to the shopper before fetching the full order.
async fn check_permission(
    state: &AppState,
    shopper: &CurrentShopper,
    order_id: &str,
) -> Result<()> {
    let customer_email = state
        .shopify()
        .get_customer_email_by_order_id(&shopper.store_url, order_id)
        .await?;

    match customer_email {
        Some(email) if email.eq_ignore_ascii_case(shopper.email.as_str()) => Ok(()),
        _ => Err(AppError::Unauthorized(
            "order does not belong to this shopper".to_string(),
        )),
    }
}

/// Merchant lateness configuration, defaulting on lookup failure or when
/// the store has no row yet.
async fn order_config(state: &AppState, store_url: &str) -> OrderConfig {
    match state.merchants().get_order_config(store_url).await {
        Ok(Some(config)) => config,
        Ok(None) => OrderConfig::default(),
        Err(error) => {
            warn!(%error, store_url, "merchant config lookup failed, using defaults");
            OrderConfig::default()
        }
    }
}

/// Drop line items that were fully removed by an order edit: zero current
/// quantity and nothing left to refund.
fn prune_removed_line_items(facts: &mut OrderFacts) {
    if let Some(line_items) = facts.line_items.as_mut() {
        line_items
            .edges
            .retain(|edge| !(edge.node.current_quantity == 0 && edge.node.refundable_quantity == 0));
    }
}
