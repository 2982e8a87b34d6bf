//! Shopify global-id helpers.

/// Extract the trailing numeric id from a Shopify gid.
///
/// Admin API objects carry ids like `gid://shopify/Order/5678901234`; the
/// persisted stores and the HTTP surface key on the last path segment. Inputs
/// without a `/` are returned unchanged.
///
/// # Example
///
/// ```
/// use chad_core::extract_order_id;
///
/// assert_eq!(extract_order_id("gid://shopify/Order/5678901234"), "5678901234");
/// assert_eq!(extract_order_id("5678901234"), "5678901234");
/// ```
#[must_use]
pub fn extract_order_id(full_id: &str) -> &str {
    full_id.rsplit('/').next().unwrap_or(full_id)
}
