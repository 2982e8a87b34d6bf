//! Ship24 tracking API wire shapes.
//!
//! See <https://docs.ship24.com/tracking-api-reference/> for the upstream
//! schema. Everything except the tracker id is optional in practice, so the
//! types lean on `Option` heavily.

use serde::{Deserialize, Serialize};

/// Payload of both the "create tracker and track" and "get tracker results"
/// endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerResult {
    #[serde(default)]
    pub trackings: Vec<Tracking>,
}

/// A single tracking entry. The API returns a collection; only index 0 is
/// ever used.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tracking {
    pub tracker: TrackerInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipment: Option<Shipment>,
    #[serde(default)]
    pub events: Vec<TrackingEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<TrackerStatistics>,
}

/// Provider-side tracker handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerInfo {
    pub tracker_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_subscribed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Shipment-level status summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_milestone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<Delivery>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<Recipient>,
}

/// Delivery estimate details.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_delivery_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_by: Option<String>,
}

/// Recipient details as reported by the courier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdivision: Option<String>,
}

/// One scan/status event on the shipment timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence_datetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_milestone: Option<String>,
}

/// Aggregate milestone timestamps for a tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerStatistics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<Timestamps>,
}

/// First-seen timestamps per milestone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timestamps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_received_datetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_transit_datetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_for_delivery_datetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_attempt_datetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_for_pickup_datetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception_datetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_datetime: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_result_deserializes_sparse_payload() {
        let json = serde_json::json!({
            "trackings": [{
                "tracker": {"trackerId": "trk-1", "trackingNumber": "94001"},
                "shipment": {"statusMilestone": "in_transit"},
                "events": [{"eventId": "ev-1", "status": "Departed facility"}],
                "statistics": {"timestamps": {"inTransitDatetime": "2026-02-01T10:00:00Z"}}
            }]
        });

        let result: TrackerResult = serde_json::from_value(json).unwrap();
        let tracking = &result.trackings[0];
        assert_eq!(tracking.tracker.tracker_id, "trk-1");
        assert_eq!(
            tracking.shipment.as_ref().unwrap().status_milestone.as_deref(),
            Some("in_transit")
        );
        assert_eq!(tracking.events.len(), 1);
    }

    #[test]
    fn test_empty_trackings_is_valid() {
        let result: TrackerResult = serde_json::from_str(r#"{"trackings": []}"#).unwrap();
        assert!(result.trackings.is_empty());
    }
}
