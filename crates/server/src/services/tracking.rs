//! Tracking reconciliation.
//!
//! Maps courier milestones onto chad statuses and shields the enrichment
//! pipeline from provider and cache failures: every failure path collapses
//! to `None`, and the caller attaches an error message instead of details.

use std::time::Duration;

use chad_core::ChadStatus;
use moka::future::Cache;
use tracing::warn;

use crate::db::RepositoryError;
use crate::models::tracking::TrackingDetails;
use crate::ship24::types::{TrackerResult, Tracking};
use crate::ship24::Ship24Error;

/// Tracker ids are immutable once issued, so a short-lived in-process memo
/// in front of the durable store is safe.
const MEMO_CAPACITY: u64 = 10_000;
const MEMO_TTL: Duration = Duration::from_secs(60 * 60);

/// Errors from the tracking subsystem. Callers of
/// [`TrackingService::get_tracking_details`] never see these; they are
/// logged and swallowed there.
#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error(transparent)]
    Provider(#[from] Ship24Error),

    #[error(transparent)]
    Cache(#[from] RepositoryError),
}

/// External tracking provider: create trackers, poll their results.
#[allow(async_fn_in_trait)]
pub trait TrackingProvider {
    async fn initiate_tracker(
        &self,
        tracking_number: &str,
    ) -> Result<Option<TrackerResult>, TrackingError>;

    async fn get_tracker_results(
        &self,
        tracker_id: &str,
    ) -> Result<Option<TrackerResult>, TrackingError>;
}

/// Durable (courier, tracking number) to tracker id mapping.
#[allow(async_fn_in_trait)]
pub trait TrackerCacheStore {
    async fn get_tracker_id(
        &self,
        courier: &str,
        tracking_number: &str,
    ) -> Result<Option<String>, RepositoryError>;

    async fn insert_tracker_id(
        &self,
        courier: &str,
        tracking_number: &str,
        tracker_id: &str,
    ) -> Result<(), RepositoryError>;
}

/// Tracking lookups with a two-tier tracker-id cache.
#[derive(Clone)]
pub struct TrackingService<P, C> {
    provider: P,
    cache: C,
    memo: Cache<(String, String), String>,
}

impl<P: TrackingProvider, C: TrackerCacheStore> TrackingService<P, C> {
    pub fn new(provider: P, cache: C) -> Self {
        Self {
            provider,
            cache,
            memo: Cache::builder()
                .max_capacity(MEMO_CAPACITY)
                .time_to_live(MEMO_TTL)
                .build(),
        }
    }

    /// Resolve current tracking details for a shipment.
    ///
    /// Returns `None` whenever anything goes wrong (unknown courier, provider
    /// outage, cache failure, empty result). An order lookup must never fail
    /// because a courier integration is down.
    pub async fn get_tracking_details(
        &self,
        courier: &str,
        tracking_number: &str,
    ) -> Option<TrackingDetails> {
        let result = match self.fetch_tracker_result(courier, tracking_number).await {
            Ok(result) => result?,
            Err(error) => {
                warn!(%error, courier, tracking_number, "tracking lookup failed");
                return None;
            }
        };

        let tracking = result.trackings.first()?;
        Some(build_details(tracking, courier, tracking_number))
    }

    /// Known tracker id: poll results. Unknown: create a tracker, persist its
    /// id, and use the creation response directly.
    async fn fetch_tracker_result(
        &self,
        courier: &str,
        tracking_number: &str,
    ) -> Result<Option<TrackerResult>, TrackingError> {
        if let Some(tracker_id) = self.lookup_tracker_id(courier, tracking_number).await? {
            return self.provider.get_tracker_results(&tracker_id).await;
        }

        let result = self.provider.initiate_tracker(tracking_number).await?;
        if let Some(tracker_id) = result
            .as_ref()
            .and_then(|r| r.trackings.first())
            .map(|t| t.tracker.tracker_id.as_str())
        {
            self.cache
                .insert_tracker_id(courier, tracking_number, tracker_id)
                .await?;
            self.memo
                .insert(
                    (courier.to_owned(), tracking_number.to_owned()),
                    tracker_id.to_owned(),
                )
                .await;
        }
        Ok(result)
    }

    async fn lookup_tracker_id(
        &self,
        courier: &str,
        tracking_number: &str,
    ) -> Result<Option<String>, TrackingError> {
        let key = (courier.to_owned(), tracking_number.to_owned());
        if let Some(tracker_id) = self.memo.get(&key).await {
            return Ok(Some(tracker_id));
        }

        let tracker_id = self.cache.get_tracker_id(courier, tracking_number).await?;
        if let Some(tracker_id) = &tracker_id {
            self.memo.insert(key, tracker_id.clone()).await;
        }
        Ok(tracker_id)
    }
}

fn build_details(tracking: &Tracking, courier: &str, tracking_number: &str) -> TrackingDetails {
    let shipment = tracking.shipment.as_ref();
    let milestone = shipment.and_then(|s| s.status_milestone.as_deref());

    TrackingDetails {
        tracker_id: tracking.tracker.tracker_id.clone(),
        tracking_number: tracking
            .tracker
            .tracking_number
            .clone()
            .or_else(|| Some(tracking_number.to_owned())),
        courier: courier.to_owned(),
        status_code: shipment.and_then(|s| s.status_code.clone()),
        status_category: shipment.and_then(|s| s.status_category.clone()),
        status_milestone: milestone.map(str::to_owned),
        chad_status: milestone_to_chad_status(milestone),
        estimated_delivery_date: shipment
            .and_then(|s| s.delivery.as_ref())
            .and_then(|d| d.estimated_delivery_date.clone()),
        delivered_date_time: tracking
            .statistics
            .as_ref()
            .and_then(|s| s.timestamps.as_ref())
            .and_then(|t| t.delivered_datetime.clone()),
        recipient: shipment.and_then(|s| s.recipient.clone()),
        last_event: tracking.events.first().cloned(),
    }
}

/// Map a Ship24 status milestone to a chad status. Milestones we have never
/// seen default to SHIPPED, since a tracker only exists once a label does.
fn milestone_to_chad_status(milestone: Option<&str>) -> ChadStatus {
    match milestone {
        Some("pending" | "info_received" | "in_transit" | "out_for_delivery") => {
            ChadStatus::Shipped
        }
        Some("failed_attempt" | "available_for_pickup") => ChadStatus::DeliveryException,
        Some("delivered") => ChadStatus::Delivered,
        Some("exception") => ChadStatus::DeliveryFailure,
        other => {
            warn!(milestone = ?other, "unrecognized tracking milestone, defaulting to SHIPPED");
            ChadStatus::Shipped
        }
    }
}
