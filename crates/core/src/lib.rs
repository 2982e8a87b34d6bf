//! Chad Core - Shared types library.
//!
//! This crate provides the domain vocabulary shared across the Chad
//! order-status backend:
//! - `server` - Order-status API (Shopify Admin + Ship24 enrichment)
//!
//! # Architecture
//!
//! The core crate contains only types and small pure helpers - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Status enums, money sets, order-id extraction, and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
