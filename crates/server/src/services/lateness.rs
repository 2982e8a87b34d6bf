//! Lateness evaluation.
//!
//! Compares a per-merchant threshold against how long an order has been
//! sitting in its current phase. All arithmetic is whole UTC days; the
//! caller supplies `now` so results are reproducible in tests.

use chad_core::{ChadStatus, LateFrom};
use chrono::{DateTime, Duration, Utc};

use crate::models::merchant::OrderConfig;
use crate::models::order::OrderFacts;

/// Result of a lateness check that applies to the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatenessResult {
    pub is_late: bool,
    /// The moment the order tips into lateness: baseline plus threshold.
    pub late_threshold: DateTime<Utc>,
}

/// Whether lateness applies to this order at all.
///
/// `NotApplicable` means the enriched payload carries no lateness fields,
/// not `is_late: false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lateness {
    Applies(LatenessResult),
    NotApplicable,
}

/// Evaluate lateness for an order under the merchant's configuration.
///
/// In `Placed` mode the baseline is the order creation time and every order
/// qualifies. In `Shipped` mode only orders currently SHIPPED qualify; the
/// baseline is the first fulfillment's update time, falling back to the
/// order's own update time when no fulfillment exists yet.
pub fn evaluate(
    facts: &OrderFacts,
    status: ChadStatus,
    config: &OrderConfig,
    now: DateTime<Utc>,
) -> Lateness {
    let baseline = match config.late_from {
        LateFrom::Placed => facts.created_at,
        LateFrom::Shipped => {
            if status != ChadStatus::Shipped {
                return Lateness::NotApplicable;
            }
            facts
                .fulfillments
                .first()
                .and_then(|f| f.updated_at)
                .unwrap_or(facts.updated_at)
        }
    };

    let threshold = Duration::days(config.effective_threshold_days());
    Lateness::Applies(LatenessResult {
        is_late: now - baseline > threshold,
        late_threshold: baseline + threshold,
    })
}
