//! Shopify money sets and half-up decimal rounding.
//!
//! The Admin API returns amounts as decimal strings inside a
//! `{ shopMoney: { amount, currencyCode } }` envelope. Amounts stay as
//! strings on the wire and are parsed to [`Decimal`] only where arithmetic
//! happens.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors produced when working with money amounts.
#[derive(Debug, thiserror::Error)]
pub enum MoneyError {
    /// The amount string is not a valid decimal.
    #[error("invalid money amount: {0}")]
    Parse(#[from] rust_decimal::Error),
}

/// A single money value in the shop currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    /// Decimal amount as a string, e.g. `"12.50"`.
    pub amount: String,
    /// ISO 4217 currency code, e.g. `"USD"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
}

/// A Shopify `MoneyBag` (`*PriceSet` fields); only the shop-currency half is
/// carried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneySet {
    pub shop_money: Money,
}

impl MoneySet {
    /// Build a set from an already-formatted amount.
    #[must_use]
    pub const fn new(amount: String, currency_code: Option<String>) -> Self {
        Self {
            shop_money: Money {
                amount,
                currency_code,
            },
        }
    }

    /// Parse the shop-currency amount.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Parse`] when the amount string is not a valid
    /// decimal.
    pub fn amount(&self) -> Result<Decimal, MoneyError> {
        Ok(self.shop_money.amount.parse::<Decimal>()?)
    }

    /// Currency code of the shop-currency amount, if present.
    #[must_use]
    pub fn currency_code(&self) -> Option<&str> {
        self.shop_money.currency_code.as_deref()
    }
}

/// Round to two decimal places with midpoints away from zero (half-up).
#[must_use]
pub fn round_half_up_2dp(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount with exactly two decimals after half-up rounding.
#[must_use]
pub fn format_amount_2dp(value: Decimal) -> String {
    format!("{:.2}", round_half_up_2dp(value))
}
