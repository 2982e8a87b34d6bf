//! Chad-status classification rules.
//!
//! Reconciles platform-reported fulfillment/financial state, refunds, and a
//! persisted per-order override into one customer-facing [`ChadStatus`].
//! Rules run top to bottom; the first match wins. The function is a pure
//! read: it never writes persisted state.

use std::collections::HashSet;

use chad_core::{
    ChadStatus, FinancialStatus, FulfillmentDisplayStatus, FulfillmentStatus, MoneyError,
    MoneySet, PersistedStatus,
};
use rust_decimal::Decimal;
use tracing::warn;

use crate::db::RepositoryError;
use crate::models::order::{OrderFacts, PersistedOrderStatus};

/// Read access to statuses pinned by out-of-band processes (cancellation,
/// order edit).
#[allow(async_fn_in_trait)]
pub trait StatusStore {
    /// Fetch the persisted status for an order, if any.
    async fn get_status(
        &self,
        order_id: &str,
    ) -> Result<Option<PersistedOrderStatus>, RepositoryError>;
}

/// Internal classification failure; coerced to the ORDERED fallback at the
/// orchestrator boundary.
#[derive(Debug, thiserror::Error)]
pub enum ClassificationError {
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Outcome of classification.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub status: ChadStatus,
    /// Pre-edit snapshot carried alongside a pinned status.
    pub original_order_details: Option<serde_json::Value>,
    /// Set when the persisted status was the cancellation-failed sentinel.
    pub is_cancelation_failed: bool,
}

/// Classify an order, coercing any internal failure to the ORDERED fallback.
///
/// Availability of *a* status is preferred over correctness of a rare edge
/// case, so errors are logged here and never propagate. New call sites that
/// need to distinguish failures should use [`try_classify`] instead.
pub async fn classify<S: StatusStore>(
    store: &S,
    facts: &OrderFacts,
    order_id: &str,
) -> Classification {
    match try_classify(store, facts, order_id).await {
        Ok(classification) => classification,
        Err(error) => {
            warn!(%error, order_id, "status derivation failed, falling back to ORDERED");
            Classification::default()
        }
    }
}

/// Classify an order, surfacing internal failures.
///
/// Precedence:
/// 1. A persisted `Resolved` status always wins, together with its snapshot.
/// 2. The `CancelationFailed` sentinel sets the flag and derivation starts
///    over from facts.
/// 3. Otherwise the status is derived from facts via [`derive_from_facts`].
///
/// A failed store lookup is logged and treated as "no persisted status".
///
/// # Errors
///
/// Returns [`ClassificationError`] when a money amount on the facts cannot
/// be parsed.
pub async fn try_classify<S: StatusStore>(
    store: &S,
    facts: &OrderFacts,
    order_id: &str,
) -> Result<Classification, ClassificationError> {
    let mut is_cancelation_failed = false;

    match store.get_status(order_id).await {
        Ok(Some(persisted)) => match persisted.status {
            PersistedStatus::Resolved(status) => {
                return Ok(Classification {
                    status,
                    original_order_details: persisted.original_order_details,
                    is_cancelation_failed: false,
                });
            }
            PersistedStatus::CancelationFailed => is_cancelation_failed = true,
        },
        Ok(None) => {}
        Err(error) => {
            warn!(%error, order_id, "persisted status lookup failed, deriving from facts");
        }
    }

    Ok(Classification {
        status: derive_from_facts(facts)?,
        original_order_details: None,
        is_cancelation_failed,
    })
}

/// Derive a status from order facts alone, first match wins.
///
/// # Errors
///
/// Returns [`ClassificationError`] when a money amount cannot be parsed.
pub fn derive_from_facts(facts: &OrderFacts) -> Result<ChadStatus, ClassificationError> {
    // Rule a: anything moving or fulfilled means shipped.
    if facts.fulfillments.iter().any(|f| {
        matches!(
            f.display_status,
            Some(FulfillmentDisplayStatus::InTransit | FulfillmentDisplayStatus::Fulfilled)
        )
    }) {
        return Ok(ChadStatus::Shipped);
    }

    // Rule b: terminal fulfillment combinations. A fulfillment without a
    // display status counts as its own set member, so a canceled fulfillment
    // next to an unlabeled active one falls through instead of reading as
    // fully refunded.
    let distinct: HashSet<Option<FulfillmentDisplayStatus>> =
        facts.fulfillments.iter().map(|f| f.display_status).collect();
    let canceled = distinct.contains(&Some(FulfillmentDisplayStatus::Canceled));
    let delivered = distinct.contains(&Some(FulfillmentDisplayStatus::Delivered));
    match distinct.len() {
        1 if canceled => return Ok(ChadStatus::Refunded),
        1 if delivered => return Ok(ChadStatus::Delivered),
        2 if canceled && delivered => return Ok(ChadStatus::Delivered),
        _ => {}
    }

    // Rule c: unfulfilled orders with refunds on record. A missing
    // order-level status reads as UNFULFILLED.
    let fulfillment_status = facts.display_fulfillment_status.unwrap_or_default();
    if fulfillment_status == FulfillmentStatus::Unfulfilled && !facts.refunds.is_empty() {
        if amount_or_zero(facts.current_total_price_set.as_ref())?.is_zero() {
            return Ok(ChadStatus::Refunded);
        }

        let outstanding = amount_or_zero(facts.total_outstanding_set.as_ref())?;
        if facts.display_financial_status == Some(FinancialStatus::PartiallyPaid)
            || outstanding > Decimal::ZERO
        {
            return Ok(ChadStatus::PaymentPending);
        }
    }

    // Rule d: fixed fulfillment-status table, ORDERED as the default.
    Ok(map_fulfillment_status(fulfillment_status))
}

fn amount_or_zero(set: Option<&MoneySet>) -> Result<Decimal, ClassificationError> {
    Ok(set.map(MoneySet::amount).transpose()?.unwrap_or(Decimal::ZERO))
}

const fn map_fulfillment_status(status: FulfillmentStatus) -> ChadStatus {
    match status {
        FulfillmentStatus::Fulfilled
        | FulfillmentStatus::PartiallyFulfilled
        | FulfillmentStatus::InProgress => ChadStatus::Shipped,
        FulfillmentStatus::OnHold => ChadStatus::OnHold,
        FulfillmentStatus::Open
        | FulfillmentStatus::PendingFulfillment
        | FulfillmentStatus::Scheduled
        | FulfillmentStatus::Unfulfilled
        | FulfillmentStatus::Restocked
        | FulfillmentStatus::Other => ChadStatus::Ordered,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn facts(value: serde_json::Value) -> OrderFacts {
        serde_json::from_value(value).unwrap()
    }

    fn bare_facts() -> OrderFacts {
        facts(serde_json::json!({
            "id": "gid://shopify/Order/1",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z"
        }))
    }

    /// Store with a fixed answer.
    struct FixedStore(Option<PersistedOrderStatus>);

    impl StatusStore for FixedStore {
        async fn get_status(
            &self,
            _order_id: &str,
        ) -> Result<Option<PersistedOrderStatus>, RepositoryError> {
            Ok(self.0.clone())
        }
    }

    /// Store that always fails.
    struct BrokenStore;

    impl StatusStore for BrokenStore {
        async fn get_status(
            &self,
            _order_id: &str,
        ) -> Result<Option<PersistedOrderStatus>, RepositoryError> {
            Err(RepositoryError::DataCorruption("boom".to_string()))
        }
    }

    #[test]
    fn test_fulfilled_display_status_always_means_shipped() {
        // Precedence rule a wins regardless of every other field.
        let facts = facts(serde_json::json!({
            "id": "gid://shopify/Order/1",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z",
            "displayFulfillmentStatus": "UNFULFILLED",
            "displayFinancialStatus": "REFUNDED",
            "currentTotalPriceSet": {"shopMoney": {"amount": "0", "currencyCode": "USD"}},
            "fulfillments": [
                {"displayStatus": "CANCELED"},
                {"displayStatus": "FULFILLED"}
            ],
            "refunds": [{"totalRefundedSet": {"shopMoney": {"amount": "5.00"}}}]
        }));

        assert_eq!(derive_from_facts(&facts).unwrap(), ChadStatus::Shipped);
    }

    #[test]
    fn test_all_canceled_fulfillments_mean_refunded() {
        let facts = facts(serde_json::json!({
            "id": "gid://shopify/Order/1",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z",
            "fulfillments": [
                {"displayStatus": "CANCELED"},
                {"displayStatus": "CANCELED"}
            ]
        }));

        assert_eq!(derive_from_facts(&facts).unwrap(), ChadStatus::Refunded);
    }

    #[test]
    fn test_canceled_plus_delivered_means_delivered() {
        let facts = facts(serde_json::json!({
            "id": "gid://shopify/Order/1",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z",
            "fulfillments": [
                {"displayStatus": "CANCELED"},
                {"displayStatus": "DELIVERED"}
            ]
        }));

        assert_eq!(derive_from_facts(&facts).unwrap(), ChadStatus::Delivered);
    }

    #[test]
    fn test_canceled_plus_unlabeled_fulfillment_is_not_refunded() {
        // One canceled fulfillment next to one without a display status:
        // the set has two members, so rule b falls through to the table.
        let facts = facts(serde_json::json!({
            "id": "gid://shopify/Order/1",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z",
            "displayFulfillmentStatus": "ON_HOLD",
            "fulfillments": [
                {"displayStatus": "CANCELED"},
                {}
            ]
        }));

        assert_eq!(derive_from_facts(&facts).unwrap(), ChadStatus::OnHold);
    }

    #[test]
    fn test_mixed_unknown_combination_falls_through() {
        let facts = facts(serde_json::json!({
            "id": "gid://shopify/Order/1",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z",
            "displayFulfillmentStatus": "ON_HOLD",
            "fulfillments": [
                {"displayStatus": "CANCELED"},
                {"displayStatus": "ATTEMPTED_DELIVERY"}
            ]
        }));

        assert_eq!(derive_from_facts(&facts).unwrap(), ChadStatus::OnHold);
    }

    #[test]
    fn test_unfulfilled_with_refunds_and_zero_total_means_refunded() {
        let facts = facts(serde_json::json!({
            "id": "gid://shopify/Order/1",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z",
            "displayFulfillmentStatus": "UNFULFILLED",
            "currentTotalPriceSet": {"shopMoney": {"amount": "0.00", "currencyCode": "USD"}},
            "refunds": [{"totalRefundedSet": {"shopMoney": {"amount": "20.00"}}}]
        }));

        assert_eq!(derive_from_facts(&facts).unwrap(), ChadStatus::Refunded);
    }

    #[test]
    fn test_unfulfilled_with_refunds_and_outstanding_means_payment_pending() {
        let facts = facts(serde_json::json!({
            "id": "gid://shopify/Order/1",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z",
            "displayFulfillmentStatus": "UNFULFILLED",
            "currentTotalPriceSet": {"shopMoney": {"amount": "30.00", "currencyCode": "USD"}},
            "totalOutstandingSet": {"shopMoney": {"amount": "10.00", "currencyCode": "USD"}},
            "refunds": [{"totalRefundedSet": {"shopMoney": {"amount": "5.00"}}}]
        }));

        assert_eq!(derive_from_facts(&facts).unwrap(), ChadStatus::PaymentPending);
    }

    #[test]
    fn test_unfulfilled_refunds_nothing_outstanding_falls_to_table() {
        let facts = facts(serde_json::json!({
            "id": "gid://shopify/Order/1",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z",
            "displayFulfillmentStatus": "UNFULFILLED",
            "displayFinancialStatus": "PAID",
            "currentTotalPriceSet": {"shopMoney": {"amount": "30.00", "currencyCode": "USD"}},
            "totalOutstandingSet": {"shopMoney": {"amount": "0.00", "currencyCode": "USD"}},
            "refunds": [{"totalRefundedSet": {"shopMoney": {"amount": "5.00"}}}]
        }));

        assert_eq!(derive_from_facts(&facts).unwrap(), ChadStatus::Ordered);
    }

    #[test]
    fn test_no_fulfillments_no_refunds_defaults_to_ordered() {
        assert_eq!(
            derive_from_facts(&bare_facts()).unwrap(),
            ChadStatus::Ordered
        );
    }

    #[test]
    fn test_unparseable_amount_is_an_error() {
        let facts = facts(serde_json::json!({
            "id": "gid://shopify/Order/1",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z",
            "displayFulfillmentStatus": "UNFULFILLED",
            "currentTotalPriceSet": {"shopMoney": {"amount": "oops"}},
            "refunds": [{"totalRefundedSet": {"shopMoney": {"amount": "5.00"}}}]
        }));

        assert!(derive_from_facts(&facts).is_err());
    }

    #[tokio::test]
    async fn test_persisted_status_wins_over_facts() {
        // Facts alone would classify as SHIPPED.
        let facts = facts(serde_json::json!({
            "id": "gid://shopify/Order/1",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z",
            "fulfillments": [{"displayStatus": "IN_TRANSIT"}]
        }));

        let snapshot = serde_json::json!({"name": "#1001-before-edit"});
        let store = FixedStore(Some(PersistedOrderStatus {
            status: PersistedStatus::Resolved(ChadStatus::CancelationRequested),
            original_order_details: Some(snapshot.clone()),
        }));

        let classification = classify(&store, &facts, "1").await;
        assert_eq!(classification.status, ChadStatus::CancelationRequested);
        assert_eq!(classification.original_order_details, Some(snapshot));
        assert!(!classification.is_cancelation_failed);
    }

    #[tokio::test]
    async fn test_cancelation_failed_sentinel_rederives_and_flags() {
        let facts = facts(serde_json::json!({
            "id": "gid://shopify/Order/1",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z",
            "fulfillments": [{"displayStatus": "IN_TRANSIT"}]
        }));

        let store = FixedStore(Some(PersistedOrderStatus {
            status: PersistedStatus::CancelationFailed,
            original_order_details: None,
        }));

        let classification = classify(&store, &facts, "1").await;
        assert_eq!(classification.status, ChadStatus::Shipped);
        assert!(classification.is_cancelation_failed);
        assert!(classification.original_order_details.is_none());
    }

    #[tokio::test]
    async fn test_store_failure_falls_back_to_fact_derivation() {
        let facts = facts(serde_json::json!({
            "id": "gid://shopify/Order/1",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z",
            "fulfillments": [{"displayStatus": "DELIVERED"}]
        }));

        let classification = classify(&BrokenStore, &facts, "1").await;
        assert_eq!(classification.status, ChadStatus::Delivered);
        assert!(!classification.is_cancelation_failed);
    }

    #[tokio::test]
    async fn test_classification_error_coerces_to_ordered() {
        let facts = facts(serde_json::json!({
            "id": "gid://shopify/Order/1",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z",
            "displayFulfillmentStatus": "UNFULFILLED",
            "currentTotalPriceSet": {"shopMoney": {"amount": "oops"}},
            "refunds": [{"totalRefundedSet": {"shopMoney": {"amount": "5.00"}}}]
        }));

        let classification = classify(&FixedStore(None), &facts, "1").await;
        assert_eq!(classification.status, ChadStatus::Ordered);
        assert!(classification.original_order_details.is_none());
        assert!(!classification.is_cancelation_failed);
    }
}
