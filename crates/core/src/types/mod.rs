//! Core types for the Chad order-status backend.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod status;

pub use email::{Email, EmailError};
pub use id::extract_order_id;
pub use money::{Money, MoneyError, MoneySet, format_amount_2dp, round_half_up_2dp};
pub use status::*;
