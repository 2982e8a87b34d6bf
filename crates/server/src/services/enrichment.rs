//! Order enrichment orchestrator.
//!
//! Composes classification, tracking reconciliation, refund aggregation,
//! and lateness into one [`EnrichedOrder`]. Everything downstream of the
//! order fetch fails soft: a broken store or courier integration degrades
//! the payload, it never fails the request.

use chrono::{DateTime, Utc};
use tracing::warn;

use chad_core::ChadStatus;

use crate::db::RepositoryError;
use crate::models::merchant::OrderConfig;
use crate::models::order::{CancelationRequest, EditOrderSnapshot, EnrichedOrder, OrderFacts};
use crate::services::lateness::{self, Lateness};
use crate::services::refunds::aggregate_refunds;
use crate::services::status::{classify, StatusStore};
use crate::services::tracking::{TrackerCacheStore, TrackingProvider, TrackingService};

/// Reason attached when a cancellation request could not be honored.
const CANCELATION_FAILED_REASON: &str = "The order is already fulfilled";

/// Message attached when tracking info exists but no status came back.
const TRACKING_UNAVAILABLE_MESSAGE: &str = "Status not available";

/// Read access to pre-edit order snapshots awaiting a top-up payment.
#[allow(async_fn_in_trait)]
pub trait EditOrderStore {
    async fn get_snapshot(
        &self,
        order_id: &str,
    ) -> Result<Option<EditOrderSnapshot>, RepositoryError>;
}

/// Per-request enrichment pipeline over concrete store and provider
/// implementations.
pub struct OrderEnricher<S, E, P, C> {
    status_store: S,
    edit_orders: E,
    tracking: TrackingService<P, C>,
}

impl<S, E, P, C> OrderEnricher<S, E, P, C>
where
    S: StatusStore,
    E: EditOrderStore,
    P: TrackingProvider,
    C: TrackerCacheStore,
{
    pub fn new(status_store: S, edit_orders: E, tracking: TrackingService<P, C>) -> Self {
        Self {
            status_store,
            edit_orders,
            tracking,
        }
    }

    /// Enrich one order. `now` is injected so lateness is testable.
    pub async fn enrich(
        &self,
        facts: &OrderFacts,
        order_id: &str,
        config: &OrderConfig,
        now: DateTime<Utc>,
    ) -> EnrichedOrder {
        let classification = classify(&self.status_store, facts, order_id).await;
        let mut status = classification.status;

        let mut order = order_value(facts, order_id);
        overlay_snapshot(&mut order, classification.original_order_details);

        // Shipment timestamps come straight off the first fulfillment.
        let first_fulfillment = facts.fulfillments.first();
        let shipped_at = first_fulfillment.and_then(|f| f.created_at);
        let delivered_at = first_fulfillment.and_then(|f| f.delivered_at);

        let mut tracking_details = None;
        let mut tracking_info_error_message = None;
        if let Some((courier, number)) = eligible_tracking(facts) {
            match self.tracking.get_tracking_details(courier, number).await {
                Some(details) => {
                    // Courier truth beats fact-based classification.
                    status = details.chad_status;
                    tracking_details = Some(details);
                }
                None => {
                    tracking_info_error_message = Some(TRACKING_UNAVAILABLE_MESSAGE.to_string());
                }
            }
        }

        let cancelation_request = classification.is_cancelation_failed.then(|| {
            CancelationRequest {
                is_failed: true,
                reason: CANCELATION_FAILED_REASON.to_string(),
            }
        });

        let original_order = if matches!(status, ChadStatus::PaymentPending | ChadStatus::OnHold) {
            match self.edit_orders.get_snapshot(order_id).await {
                Ok(snapshot) => snapshot,
                Err(error) => {
                    warn!(%error, order_id, "edit-order snapshot lookup failed, skipping");
                    None
                }
            }
        } else {
            None
        };

        let refunded_price_set = if status == ChadStatus::Refunded {
            match aggregate_refunds(&facts.refunds) {
                Ok(set) => set,
                Err(error) => {
                    warn!(%error, order_id, "refund aggregation failed, skipping");
                    None
                }
            }
        } else {
            None
        };

        // Lateness runs last: in SHIPPED mode it depends on the final status,
        // tracking override included.
        let (is_late, late_threshold) = match lateness::evaluate(facts, status, config, now) {
            Lateness::Applies(result) => (Some(result.is_late), Some(result.late_threshold)),
            Lateness::NotApplicable => (None, None),
        };

        EnrichedOrder {
            order,
            chad_fulfillment_status: status,
            shipped_at,
            delivered_at,
            tracking_details,
            tracking_info_error_message,
            cancelation_request,
            original_order,
            refunded_price_set,
            is_late,
            late_threshold,
            is_match_shopper_and_shipping_name: names_match(facts),
        }
    }
}

/// Serialize the facts back into a flat field map for the response.
fn order_value(facts: &OrderFacts, order_id: &str) -> serde_json::Map<String, serde_json::Value> {
    match serde_json::to_value(facts) {
        Ok(serde_json::Value::Object(map)) => map,
        Ok(_) | Err(_) => {
            warn!(order_id, "order facts did not serialize to an object");
            serde_json::Map::new()
        }
    }
}

/// Overlay a persisted pre-edit snapshot onto the order fields, key by key.
///
/// This is a merge, not a replacement: live order fields absent from the
/// snapshot stay in the response. Earlier behavior swapped in the snapshot
/// wholesale on the by-id endpoint; the merge was unified across both
/// endpoints so a partial snapshot cannot silently drop live fields.
fn overlay_snapshot(
    order: &mut serde_json::Map<String, serde_json::Value>,
    snapshot: Option<serde_json::Value>,
) {
    if let Some(serde_json::Value::Object(snapshot)) = snapshot {
        for (key, value) in snapshot {
            order.insert(key, value);
        }
    }
}

/// First shippable fulfillment's first (courier, number) pair, if complete.
fn eligible_tracking(facts: &OrderFacts) -> Option<(&str, &str)> {
    let fulfillment = facts
        .fulfillments
        .iter()
        .find(|f| f.requires_shipping && !f.tracking_info.is_empty())?;
    let info = fulfillment.tracking_info.first()?;
    match (info.company.as_deref(), info.number.as_deref()) {
        (Some(company), Some(number)) if !company.is_empty() && !number.is_empty() => {
            Some((company, number))
        }
        _ => None,
    }
}

/// Whether the shopper's name matches the shipping recipient. A missing
/// record or an entirely blank customer name counts as a mismatch.
fn names_match(facts: &OrderFacts) -> bool {
    let (Some(customer), Some(address)) = (&facts.customer, &facts.shipping_address) else {
        return false;
    };
    if customer.first_name.is_none() && customer.last_name.is_none() {
        return false;
    }
    customer.first_name == address.first_name && customer.last_name == address.last_name
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chad_core::PersistedStatus;

    use super::*;
    use crate::models::order::PersistedOrderStatus;
    use crate::ship24::types::TrackerResult;
    use crate::services::tracking::TrackingError;

    struct FixedStatusStore(Option<PersistedOrderStatus>);

    impl StatusStore for FixedStatusStore {
        async fn get_status(
            &self,
            _order_id: &str,
        ) -> Result<Option<PersistedOrderStatus>, RepositoryError> {
            Ok(self.0.clone())
        }
    }

    struct FixedEditOrders(Option<EditOrderSnapshot>);

    impl EditOrderStore for FixedEditOrders {
        async fn get_snapshot(
            &self,
            _order_id: &str,
        ) -> Result<Option<EditOrderSnapshot>, RepositoryError> {
            Ok(self.0.clone())
        }
    }

    /// Provider answering every call with a fixed milestone.
    struct MilestoneProvider(Option<&'static str>);

    impl TrackingProvider for MilestoneProvider {
        async fn initiate_tracker(
            &self,
            _tracking_number: &str,
        ) -> Result<Option<TrackerResult>, TrackingError> {
            let Some(milestone) = self.0 else {
                return Ok(None);
            };
            Ok(Some(
                serde_json::from_value(serde_json::json!({
                    "trackings": [{
                        "tracker": {"trackerId": "trk-9"},
                        "shipment": {"statusMilestone": milestone}
                    }]
                }))
                .unwrap(),
            ))
        }

        async fn get_tracker_results(
            &self,
            _tracker_id: &str,
        ) -> Result<Option<TrackerResult>, TrackingError> {
            self.initiate_tracker("").await
        }
    }

    struct NoopCache;

    impl TrackerCacheStore for NoopCache {
        async fn get_tracker_id(
            &self,
            _courier: &str,
            _tracking_number: &str,
        ) -> Result<Option<String>, RepositoryError> {
            Ok(None)
        }

        async fn insert_tracker_id(
            &self,
            _courier: &str,
            _tracking_number: &str,
            _tracker_id: &str,
        ) -> Result<(), RepositoryError> {
            Ok(())
        }
    }

    fn enricher(
        persisted: Option<PersistedOrderStatus>,
        snapshot: Option<EditOrderSnapshot>,
        milestone: Option<&'static str>,
    ) -> OrderEnricher<FixedStatusStore, FixedEditOrders, MilestoneProvider, NoopCache> {
        OrderEnricher::new(
            FixedStatusStore(persisted),
            FixedEditOrders(snapshot),
            TrackingService::new(MilestoneProvider(milestone), NoopCache),
        )
    }

    fn facts(value: serde_json::Value) -> OrderFacts {
        serde_json::from_value(value).unwrap()
    }

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn shipped_facts() -> OrderFacts {
        facts(serde_json::json!({
            "id": "gid://shopify/Order/1",
            "name": "#1001",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-05T00:00:00Z",
            "fulfillments": [{
                "createdAt": "2026-01-04T00:00:00Z",
                "updatedAt": "2026-01-04T12:00:00Z",
                "displayStatus": "IN_TRANSIT",
                "requiresShipping": true,
                "trackingInfo": [{"company": "usps", "number": "94001"}]
            }]
        }))
    }

    #[tokio::test]
    async fn test_tracking_status_overrides_classification() {
        let enricher = enricher(None, None, Some("delivered"));

        let enriched = enricher
            .enrich(
                &shipped_facts(),
                "1",
                &OrderConfig::default(),
                at("2026-01-06T00:00:00Z"),
            )
            .await;

        // Facts alone say SHIPPED, the courier says delivered.
        assert_eq!(enriched.chad_fulfillment_status, ChadStatus::Delivered);
        assert!(enriched.tracking_details.is_some());
        assert!(enriched.tracking_info_error_message.is_none());
        assert_eq!(enriched.shipped_at, Some(at("2026-01-04T00:00:00Z")));
    }

    #[tokio::test]
    async fn test_unavailable_tracking_attaches_error_message() {
        let enricher = enricher(None, None, None);

        let enriched = enricher
            .enrich(
                &shipped_facts(),
                "1",
                &OrderConfig::default(),
                at("2026-01-06T00:00:00Z"),
            )
            .await;

        assert_eq!(enriched.chad_fulfillment_status, ChadStatus::Shipped);
        assert!(enriched.tracking_details.is_none());
        assert_eq!(
            enriched.tracking_info_error_message.as_deref(),
            Some("Status not available")
        );
    }

    #[tokio::test]
    async fn test_tracking_skipped_without_complete_info() {
        let facts = facts(serde_json::json!({
            "id": "gid://shopify/Order/1",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z",
            "fulfillments": [{
                "displayStatus": "IN_TRANSIT",
                "requiresShipping": true,
                "trackingInfo": [{"company": "usps"}]
            }]
        }));
        let enricher = enricher(None, None, Some("delivered"));

        let enriched = enricher
            .enrich(&facts, "1", &OrderConfig::default(), at("2026-01-02T00:00:00Z"))
            .await;

        // No tracking number means no lookup and no error message either.
        assert_eq!(enriched.chad_fulfillment_status, ChadStatus::Shipped);
        assert!(enriched.tracking_details.is_none());
        assert!(enriched.tracking_info_error_message.is_none());
    }

    #[tokio::test]
    async fn test_cancelation_failed_sentinel_annotates_request() {
        let persisted = PersistedOrderStatus {
            status: PersistedStatus::CancelationFailed,
            original_order_details: None,
        };
        let enricher = enricher(Some(persisted), None, Some("in_transit"));

        let enriched = enricher
            .enrich(
                &shipped_facts(),
                "1",
                &OrderConfig::default(),
                at("2026-01-06T00:00:00Z"),
            )
            .await;

        let request = enriched.cancelation_request.unwrap();
        assert!(request.is_failed);
        assert_eq!(request.reason, "The order is already fulfilled");
        assert_eq!(enriched.chad_fulfillment_status, ChadStatus::Shipped);
    }

    #[tokio::test]
    async fn test_persisted_snapshot_overlays_order_fields() {
        let persisted = PersistedOrderStatus {
            status: PersistedStatus::Resolved(ChadStatus::CancelationRequested),
            original_order_details: Some(serde_json::json!({"name": "#1001-original"})),
        };
        let enricher = enricher(Some(persisted), None, None);
        let facts = facts(serde_json::json!({
            "id": "gid://shopify/Order/1",
            "name": "#1001",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z"
        }));

        let enriched = enricher
            .enrich(&facts, "1", &OrderConfig::default(), at("2026-01-02T00:00:00Z"))
            .await;

        assert_eq!(
            enriched.chad_fulfillment_status,
            ChadStatus::CancelationRequested
        );
        assert_eq!(enriched.order.get("name").unwrap(), "#1001-original");
        assert_eq!(enriched.order.get("id").unwrap(), "gid://shopify/Order/1");
    }

    #[tokio::test]
    async fn test_edit_order_snapshot_attached_for_payment_pending() {
        let persisted = PersistedOrderStatus {
            status: PersistedStatus::Resolved(ChadStatus::PaymentPending),
            original_order_details: None,
        };
        let snapshot: EditOrderSnapshot = serde_json::from_value(serde_json::json!({
            "currentTotalPriceSet": {"shopMoney": {"amount": "20.00", "currencyCode": "USD"}}
        }))
        .unwrap();
        let enricher = enricher(Some(persisted), Some(snapshot), None);
        let facts = facts(serde_json::json!({
            "id": "gid://shopify/Order/1",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z"
        }));

        let enriched = enricher
            .enrich(&facts, "1", &OrderConfig::default(), at("2026-01-02T00:00:00Z"))
            .await;

        assert_eq!(enriched.chad_fulfillment_status, ChadStatus::PaymentPending);
        assert!(enriched.original_order.is_some());
    }

    #[tokio::test]
    async fn test_refund_total_attached_for_refunded_orders() {
        let facts = facts(serde_json::json!({
            "id": "gid://shopify/Order/1",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z",
            "displayFulfillmentStatus": "UNFULFILLED",
            "currentTotalPriceSet": {"shopMoney": {"amount": "0", "currencyCode": "USD"}},
            "refunds": [
                {"totalRefundedSet": {"shopMoney": {"amount": "10.005", "currencyCode": "USD"}}},
                {"totalRefundedSet": {"shopMoney": {"amount": "5.00", "currencyCode": "USD"}}}
            ]
        }));
        let enricher = enricher(None, None, None);

        let enriched = enricher
            .enrich(&facts, "1", &OrderConfig::default(), at("2026-01-02T00:00:00Z"))
            .await;

        assert_eq!(enriched.chad_fulfillment_status, ChadStatus::Refunded);
        let set = enriched.refunded_price_set.unwrap();
        assert_eq!(set.shop_money.amount, "15.01");
        assert_eq!(set.currency_code(), Some("USD"));
    }

    #[tokio::test]
    async fn test_placed_lateness_fields_emitted() {
        let facts = facts(serde_json::json!({
            "id": "gid://shopify/Order/1",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z"
        }));
        let enricher = enricher(None, None, None);

        let enriched = enricher
            .enrich(&facts, "1", &OrderConfig::default(), at("2026-01-16T00:00:00Z"))
            .await;

        assert_eq!(enriched.is_late, Some(true));
        assert_eq!(enriched.late_threshold, Some(at("2026-01-15T00:00:00Z")));
    }

    #[tokio::test]
    async fn test_shipped_lateness_omitted_for_unshipped_order() {
        let facts = facts(serde_json::json!({
            "id": "gid://shopify/Order/1",
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-01T00:00:00Z"
        }));
        let config: OrderConfig = serde_json::from_value(serde_json::json!({
            "lateness_threshold_days": 7,
            "late_from": "shipped"
        }))
        .unwrap();
        let enricher = enricher(None, None, None);

        let enriched = enricher
            .enrich(&facts, "1", &config, at("2026-08-01T00:00:00Z"))
            .await;

        assert!(enriched.is_late.is_none());
        assert!(enriched.late_threshold.is_none());
    }

    #[tokio::test]
    async fn test_name_match_requires_both_records() {
        let base = serde_json::json!({
            "id": "gid://shopify/Order/1",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z"
        });
        let enricher = enricher(None, None, None);
        let config = OrderConfig::default();
        let now = at("2026-01-02T00:00:00Z");

        let enriched = enricher.enrich(&facts(base.clone()), "1", &config, now).await;
        assert!(!enriched.is_match_shopper_and_shipping_name);

        let mut matching = base.clone();
        matching["customer"] = serde_json::json!({"firstName": "Jo", "lastName": "Doe"});
        matching["shippingAddress"] = serde_json::json!({"firstName": "Jo", "lastName": "Doe"});
        let enriched = enricher.enrich(&facts(matching), "1", &config, now).await;
        assert!(enriched.is_match_shopper_and_shipping_name);

        let mut differing = base;
        differing["customer"] = serde_json::json!({"firstName": "Jo", "lastName": "Doe"});
        differing["shippingAddress"] = serde_json::json!({"firstName": "Sam", "lastName": "Doe"});
        let enriched = enricher.enrich(&facts(differing), "1", &config, now).await;
        assert!(!enriched.is_match_shopper_and_shipping_name);
    }
}
