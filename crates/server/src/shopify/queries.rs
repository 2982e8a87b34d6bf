//! GraphQL documents for the Shopify Admin API.
//!
//! The order field selection lives in `order_fields.graphql` and is spliced
//! into both order queries so they cannot drift apart.

/// Fetch one order by gid.
pub const GET_ORDER: &str = concat!(
    r"
    query GetOrder($id: ID!) {
        order(id: $id) {
            ...OrderFields
        }
    }
    ",
    include_str!("order_fields.graphql"),
);

/// Fetch only the customer email attached to an order, for permission
/// checks.
pub const GET_ORDER_CUSTOMER_EMAIL: &str = r"
    query GetOrderCustomerEmail($id: ID!) {
        order(id: $id) {
            customer {
                email
            }
        }
    }
";

/// Look up a customer by exact email.
pub const GET_CUSTOMERS_BY_EMAIL: &str = r"
    query GetCustomersByEmail($query: String!) {
        customers(first: 1, query: $query) {
            edges {
                node {
                    id
                    email
                    firstName
                    lastName
                }
            }
        }
    }
";

/// Fetch a customer's orders, newest first.
pub const GET_ORDERS_BY_CUSTOMER: &str = concat!(
    r"
    query GetOrdersByCustomer($query: String!) {
        orders(first: 50, query: $query, sortKey: CREATED_AT, reverse: true) {
            edges {
                node {
                    ...OrderFields
                }
            }
        }
    }
    ",
    include_str!("order_fields.graphql"),
);
