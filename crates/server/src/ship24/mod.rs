//! Ship24 tracking API client.
//!
//! One tracker is created per (courier, tracking number) pair; subsequent
//! polls go through the tracker id. Non-success responses are downgraded to
//! `None` so a flaky courier never fails an order lookup.

pub mod types;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::warn;

use crate::config::Ship24Config;
use crate::services::tracking::{TrackingError, TrackingProvider};
use types::TrackerResult;

/// Ship24 trackers API base URL.
const BASE_URL: &str = "https://api.ship24.com/public/v1/trackers";

/// Errors that can occur when talking to Ship24.
#[derive(Debug, Error)]
pub enum Ship24Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Successful responses wrap the payload in a `data` envelope.
#[derive(Debug, serde::Deserialize)]
struct Envelope {
    data: TrackerResult,
}

/// Client for the Ship24 tracking API.
#[derive(Clone)]
pub struct Ship24Client {
    client: reqwest::Client,
}

impl Ship24Client {
    /// Create a new Ship24 API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &Ship24Config) -> Result<Self, Ship24Error> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth_value)
                .map_err(|e| Ship24Error::Parse(format!("Invalid API key format: {e}")))?,
        );
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self { client })
    }

    /// Create a tracker and return its first tracking results.
    ///
    /// Returns `None` for non-success responses (unknown courier, quota
    /// exhausted); only transport/parse failures are errors.
    ///
    /// # Errors
    ///
    /// Returns `Ship24Error::Http` when the request itself fails.
    pub async fn initiate_tracker(
        &self,
        tracking_number: &str,
    ) -> Result<Option<TrackerResult>, Ship24Error> {
        let url = format!("{BASE_URL}/track");
        let body = serde_json::json!({ "trackingNumber": tracking_number });

        let response = self.client.post(&url).json(&body).send().await?;
        self.read_tracker_response(response, tracking_number).await
    }

    /// Fetch current results for an existing tracker.
    ///
    /// # Errors
    ///
    /// Returns `Ship24Error::Http` when the request itself fails.
    pub async fn get_tracker_results(
        &self,
        tracker_id: &str,
    ) -> Result<Option<TrackerResult>, Ship24Error> {
        let url = format!("{BASE_URL}/{tracker_id}/results");

        let response = self.client.get(&url).send().await?;
        self.read_tracker_response(response, tracker_id).await
    }

    async fn read_tracker_response(
        &self,
        response: reqwest::Response,
        subject: &str,
    ) -> Result<Option<TrackerResult>, Ship24Error> {
        let status = response.status();
        if !status.is_success() {
            warn!(%status, subject, "Ship24 returned non-success status");
            return Ok(None);
        }

        let envelope: Envelope = response
            .json()
            .await
            .map_err(|e| Ship24Error::Parse(e.to_string()))?;
        Ok(Some(envelope.data))
    }
}

impl TrackingProvider for Ship24Client {
    async fn initiate_tracker(
        &self,
        tracking_number: &str,
    ) -> Result<Option<TrackerResult>, TrackingError> {
        Self::initiate_tracker(self, tracking_number)
            .await
            .map_err(TrackingError::from)
    }

    async fn get_tracker_results(
        &self,
        tracker_id: &str,
    ) -> Result<Option<TrackerResult>, TrackingError> {
        Self::get_tracker_results(self, tracker_id)
            .await
            .map_err(TrackingError::from)
    }
}
