//! Chad order-status server library.
//!
//! This crate provides the order-status backend as a library,
//! allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod ship24;
pub mod shopify;
pub mod state;
