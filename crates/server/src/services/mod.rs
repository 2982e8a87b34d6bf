//! Enrichment services: classification, lateness, refunds, tracking, and
//! the orchestrator that composes them.

pub mod enrichment;
pub mod lateness;
pub mod refunds;
pub mod status;
pub mod tracking;
