//! Order wire shapes consumed and produced by the enrichment pipeline.
//!
//! The input side mirrors the Shopify Admin API order node (camelCase);
//! fields the pipeline does not branch on are carried through untouched in
//! the flattened `extra` map so the response stays a superset of what the
//! platform returned.

use chad_core::{
    ChadStatus, FinancialStatus, FulfillmentDisplayStatus, FulfillmentStatus, MoneySet,
    PersistedStatus,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::tracking::TrackingDetails;

/// A GraphQL connection: a list of edges wrapping nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<T>>,
}

/// A single edge in a GraphQL connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

/// Raw order facts from the Order Data Provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFacts {
    /// Shopify gid, e.g. `gid://shopify/Order/123`.
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_financial_status: Option<FinancialStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_fulfillment_status: Option<FulfillmentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_total_price_set: Option<MoneySet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_outstanding_set: Option<MoneySet>,
    #[serde(default)]
    pub fulfillments: Vec<Fulfillment>,
    #[serde(default)]
    pub refunds: Vec<Refund>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<AddressRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_items: Option<Connection<LineItem>>,
    /// Unmodeled order fields, passed through to the response.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One shipment/batch of a fulfilled order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fulfillment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_status: Option<FulfillmentDisplayStatus>,
    #[serde(default)]
    pub requires_shipping: bool,
    #[serde(default)]
    pub tracking_info: Vec<TrackingInfo>,
}

/// Courier name and tracking number attached to a fulfillment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
}

/// A refund on the order; only the refunded money set matters here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Refund {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_refunded_set: Option<MoneySet>,
}

/// Customer record as returned alongside the order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Shipping address; only the recipient name fields are inspected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A line item with the quantities used for pruning fully-removed items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub current_quantity: i64,
    #[serde(default)]
    pub refundable_quantity: i64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Status row persisted per order by out-of-band processes.
///
/// Read-only from the enrichment pipeline's perspective; its absence triggers
/// fact-based classification.
#[derive(Debug, Clone)]
pub struct PersistedOrderStatus {
    pub status: PersistedStatus,
    /// Snapshot of the pre-edit order, captured when an edit pinned the
    /// status.
    pub original_order_details: Option<serde_json::Value>,
}

/// Pre-edit snapshot stored when an order edit awaits a top-up payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditOrderSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_shipping_price_set: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_total_tax_set: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_total_price_set: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_total_discounts_set: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_items: Option<serde_json::Value>,
}

/// Annotation attached when a cancellation request could not be honored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelationRequest {
    pub is_failed: bool,
    pub reason: String,
}

/// The enriched order view returned to the response layer.
///
/// Order fields (possibly overlaid with a persisted pre-edit snapshot) are
/// flattened at the top level; the derived annotations sit alongside them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedOrder {
    #[serde(flatten)]
    pub order: serde_json::Map<String, serde_json::Value>,
    pub chad_fulfillment_status: ChadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipped_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_details: Option<TrackingDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_info_error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelation_request: Option<CancelationRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_order: Option<EditOrderSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refunded_price_set: Option<MoneySet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_late: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub late_threshold: Option<DateTime<Utc>>,
    pub is_match_shopper_and_shipping_name: bool,
}
