//! Refund total aggregation.

use chad_core::{format_amount_2dp, MoneyError, MoneySet};
use rust_decimal::Decimal;

use crate::models::order::Refund;

/// Sum refund totals into one shop-currency money set.
///
/// Returns `None` when there are no refunds, so the enriched payload omits
/// the field entirely. The currency code is taken from the last refund in
/// the list, matching long-standing consumer expectations. Amounts are
/// rounded half-up to two decimals.
///
/// # Errors
///
/// Returns [`MoneyError`] when a refund amount cannot be parsed.
pub fn aggregate_refunds(refunds: &[Refund]) -> Result<Option<MoneySet>, MoneyError> {
    if refunds.is_empty() {
        return Ok(None);
    }

    let mut total = Decimal::ZERO;
    let mut currency_code = None;
    for refund in refunds {
        if let Some(set) = &refund.total_refunded_set {
            total += set.amount()?;
        }
        // Last refund wins, even one without a money set.
        currency_code = refund
            .total_refunded_set
            .as_ref()
            .and_then(MoneySet::currency_code)
            .map(str::to_owned);
    }

    Ok(Some(MoneySet::new(format_amount_2dp(total), currency_code)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn refund(amount: &str, currency: Option<&str>) -> Refund {
        let mut set = serde_json::json!({"shopMoney": {"amount": amount}});
        if let Some(code) = currency {
            set["shopMoney"]["currencyCode"] = serde_json::json!(code);
        }
        serde_json::from_value(serde_json::json!({"totalRefundedSet": set})).unwrap()
    }

    #[test]
    fn test_no_refunds_yields_none() {
        assert!(aggregate_refunds(&[]).unwrap().is_none());
    }

    #[test]
    fn test_sums_and_rounds_half_up() {
        let refunds = [refund("10.00", Some("USD")), refund("5.005", Some("USD"))];

        let set = aggregate_refunds(&refunds).unwrap().unwrap();
        assert_eq!(set.shop_money.amount, "15.01");
        assert_eq!(set.currency_code(), Some("USD"));
    }

    #[test]
    fn test_currency_comes_from_last_refund() {
        // The last entry's code wins even when it is absent.
        let refunds = [refund("1.00", Some("USD")), refund("2.00", None)];

        let set = aggregate_refunds(&refunds).unwrap().unwrap();
        assert_eq!(set.shop_money.amount, "3.00");
        assert_eq!(set.currency_code(), None);
    }

    #[test]
    fn test_single_refund_is_padded_to_two_decimals() {
        let set = aggregate_refunds(&[refund("7.5", Some("EUR"))]).unwrap().unwrap();
        assert_eq!(set.shop_money.amount, "7.50");
        assert_eq!(set.currency_code(), Some("EUR"));
    }

    #[test]
    fn test_unparseable_amount_is_an_error() {
        assert!(aggregate_refunds(&[refund("nope", Some("USD"))]).is_err());
    }
}
