//! Domain models for the order-status API.

pub mod merchant;
pub mod order;
pub mod tracking;
