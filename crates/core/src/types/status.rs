//! Status enums for orders, fulfillments, and the derived chad status.

use serde::{Deserialize, Serialize};

/// Normalized, customer-facing order status.
///
/// Distinct from Shopify's raw fulfillment/financial status: this is the
/// single value shown to the shopper after reconciling platform state,
/// persisted overrides, refunds, and courier tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChadStatus {
    #[default]
    Ordered,
    Shipped,
    Delivered,
    Refunded,
    CancelationRequested,
    OnHold,
    DeliveryException,
    PaymentPending,
    DeliveryFailure,
}

impl ChadStatus {
    /// Wire representation (matches the serde encoding).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ordered => "ORDERED",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Refunded => "REFUNDED",
            Self::CancelationRequested => "CANCELATION_REQUESTED",
            Self::OnHold => "ON_HOLD",
            Self::DeliveryException => "DELIVERY_EXCEPTION",
            Self::PaymentPending => "PAYMENT_PENDING",
            Self::DeliveryFailure => "DELIVERY_FAILURE",
        }
    }
}

impl std::fmt::Display for ChadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ChadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ORDERED" => Ok(Self::Ordered),
            "SHIPPED" => Ok(Self::Shipped),
            "DELIVERED" => Ok(Self::Delivered),
            "REFUNDED" => Ok(Self::Refunded),
            "CANCELATION_REQUESTED" => Ok(Self::CancelationRequested),
            "ON_HOLD" => Ok(Self::OnHold),
            "DELIVERY_EXCEPTION" => Ok(Self::DeliveryException),
            "PAYMENT_PENDING" => Ok(Self::PaymentPending),
            "DELIVERY_FAILURE" => Ok(Self::DeliveryFailure),
            _ => Err(format!("invalid chad status: {s}")),
        }
    }
}

/// Status persisted per order by out-of-band processes (cancellation, edit).
///
/// The store reuses one text column for both real statuses and the
/// `CANCELATION_FAILED` sentinel; the tagged variant keeps the two meanings
/// apart in code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistedStatus {
    /// A pinned status that always wins over fact-based derivation.
    Resolved(ChadStatus),
    /// Cancellation was attempted and failed; derivation starts over from
    /// facts and the order is annotated with the failure reason.
    CancelationFailed,
}

impl PersistedStatus {
    /// Sentinel string stored in the status column.
    pub const CANCELATION_FAILED: &'static str = "CANCELATION_FAILED";

    /// Decode the stored status column.
    ///
    /// # Errors
    ///
    /// Returns the offending string when it is neither the sentinel nor a
    /// valid [`ChadStatus`].
    pub fn from_stored(s: &str) -> Result<Self, String> {
        if s == Self::CANCELATION_FAILED {
            return Ok(Self::CancelationFailed);
        }
        s.parse().map(Self::Resolved)
    }
}

/// Order-level fulfillment status as reported by the Shopify Admin API
/// (`displayFulfillmentStatus`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentStatus {
    #[default]
    Unfulfilled,
    PartiallyFulfilled,
    Fulfilled,
    InProgress,
    Open,
    PendingFulfillment,
    Scheduled,
    OnHold,
    Restocked,
    /// Any value this backend does not model; classified as ORDERED.
    #[serde(other)]
    Other,
}

/// Order financial status as reported by the Shopify Admin API
/// (`displayFinancialStatus`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinancialStatus {
    #[default]
    Pending,
    Authorized,
    PartiallyPaid,
    Paid,
    PartiallyRefunded,
    Refunded,
    Voided,
    Expired,
    #[serde(other)]
    Other,
}

/// Per-fulfillment display status (`fulfillments[].displayStatus`).
///
/// Only the variants the classifier branches on are named; everything else
/// collapses into `Other` and falls through the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentDisplayStatus {
    InTransit,
    Fulfilled,
    Delivered,
    Canceled,
    #[serde(other)]
    Other,
}

/// Merchant-configurable baseline for the lateness calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LateFrom {
    /// Measure lateness from order placement (`createdAt`).
    #[default]
    Placed,
    /// Measure lateness from the shipment date; only meaningful once the
    /// order status is SHIPPED.
    Shipped,
}

impl std::str::FromStr for LateFrom {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "placed" => Ok(Self::Placed),
            "shipped" => Ok(Self::Shipped),
            _ => Err(format!("invalid late-from field: {s}")),
        }
    }
}
