//! Tracking view models.

use chad_core::ChadStatus;
use serde::Serialize;

use crate::ship24::types::{Recipient, TrackingEvent};

/// Per-request tracking summary attached to an enriched order.
///
/// Computed from the first tracking of a Ship24 tracker result; never
/// persisted. Field names stay snake_case on the wire, matching what support
/// tooling already consumes.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingDetails {
    pub tracker_id: String,
    pub tracking_number: Option<String>,
    pub courier: String,
    pub status_code: Option<String>,
    pub status_category: Option<String>,
    pub status_milestone: Option<String>,
    /// Status derived from the milestone; overrides fact-based
    /// classification.
    pub chad_status: ChadStatus,
    pub estimated_delivery_date: Option<String>,
    pub delivered_date_time: Option<String>,
    pub recipient: Option<Recipient>,
    pub last_event: Option<TrackingEvent>,
}
