//! Merchant-level order configuration.

use chad_core::LateFrom;
use serde::{Deserialize, Serialize};

/// Default lateness threshold when the merchant left it unset.
pub const DEFAULT_LATENESS_THRESHOLD_DAYS: i64 = 14;

/// Per-merchant knobs for the lateness calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OrderConfig {
    /// Days after the baseline date at which an order counts as late.
    /// Zero or negative means "use the default".
    pub lateness_threshold_days: i64,
    /// Which date the threshold is measured from.
    pub late_from: LateFrom,
}

impl OrderConfig {
    /// Effective threshold in days, applying the default for unset values.
    #[must_use]
    pub const fn effective_threshold_days(&self) -> i64 {
        if self.lateness_threshold_days > 0 {
            self.lateness_threshold_days
        } else {
            DEFAULT_LATENESS_THRESHOLD_DAYS
        }
    }
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            lateness_threshold_days: DEFAULT_LATENESS_THRESHOLD_DAYS,
            late_from: LateFrom::Placed,
        }
    }
}
