//! Shopify Admin GraphQL API client.
//!
//! Orders and customers are read straight from the merchant's store; this
//! backend never writes back. The endpoint is per-store, so every call
//! takes the store URL alongside its arguments.

pub mod queries;

use std::sync::Arc;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::instrument;

use crate::config::ShopifyAdminConfig;
use crate::models::order::{Connection, CustomerRecord, OrderFacts};

/// Errors from the Shopify Admin API.
#[derive(Debug, thiserror::Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned GraphQL-level errors.
    #[error("GraphQL error: {0}")]
    GraphQL(String),

    /// Throttled by the API; retry after the given number of seconds.
    #[error("rate limited, retry after {0}s")]
    RateLimited(u64),

    /// The requested entity does not exist upstream.
    #[error("not found: {0}")]
    NotFound(String),
}

/// GraphQL response wrapper.
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorResponse {
    message: String,
}

/// Shopify Admin API client.
///
/// Cheap to clone; the HTTP client and credentials are shared.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    api_version: String,
    access_token: SecretString,
}

impl AdminClient {
    /// Create a new Admin API client.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Http` if the HTTP client fails to build.
    pub fn new(config: &ShopifyAdminConfig) -> Result<Self, ShopifyError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            inner: Arc::new(AdminClientInner {
                client,
                api_version: config.api_version.clone(),
                access_token: config.access_token.clone(),
            }),
        })
    }

    fn endpoint(&self, store_url: &str) -> String {
        format!(
            "https://{store_url}/admin/api/{}/graphql.json",
            self.inner.api_version
        )
    }

    /// Execute a GraphQL query against a store.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::RateLimited` on throttling,
    /// `ShopifyError::GraphQL` when the response carries errors or no data,
    /// and `ShopifyError::Http` on network failures.
    #[instrument(skip(self, query, variables))]
    async fn execute<T: DeserializeOwned>(
        &self,
        store_url: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ShopifyError> {
        let body = serde_json::json!({
            "query": query,
            "variables": variables,
        });

        let response = self
            .inner
            .client
            .post(self.endpoint(store_url))
            .header(
                "X-Shopify-Access-Token",
                self.inner.access_token.expose_secret(),
            )
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        let graphql_response: GraphQLResponse<T> = response.json().await?;

        if let Some(errors) = graphql_response.errors
            && !errors.is_empty()
        {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(ShopifyError::GraphQL(messages.join("; ")));
        }

        graphql_response
            .data
            .ok_or_else(|| ShopifyError::GraphQL("no data in response".to_string()))
    }

    /// Fetch an order by id. Accepts either a bare numeric id or a full gid.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError` on transport, throttling, or GraphQL failures.
    pub async fn get_order_by_id(
        &self,
        store_url: &str,
        order_id: &str,
    ) -> Result<Option<OrderFacts>, ShopifyError> {
        #[derive(Deserialize)]
        struct Response {
            order: Option<OrderFacts>,
        }

        let response: Response = self
            .execute(
                store_url,
                queries::GET_ORDER,
                serde_json::json!({ "id": order_gid(order_id) }),
            )
            .await?;
        Ok(response.order)
    }

    /// Fetch only the customer email on an order, for permission checks.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError` on transport, throttling, or GraphQL failures.
    pub async fn get_customer_email_by_order_id(
        &self,
        store_url: &str,
        order_id: &str,
    ) -> Result<Option<String>, ShopifyError> {
        #[derive(Deserialize)]
        struct Response {
            order: Option<OrderNode>,
        }

        #[derive(Deserialize)]
        struct OrderNode {
            customer: Option<CustomerNode>,
        }

        #[derive(Deserialize)]
        struct CustomerNode {
            email: Option<String>,
        }

        let response: Response = self
            .execute(
                store_url,
                queries::GET_ORDER_CUSTOMER_EMAIL,
                serde_json::json!({ "id": order_gid(order_id) }),
            )
            .await?;
        Ok(response
            .order
            .and_then(|o| o.customer)
            .and_then(|c| c.email))
    }

    /// Look up customers by exact email. Shopify treats email as unique, so
    /// the connection holds at most one node.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError` on transport, throttling, or GraphQL failures.
    pub async fn get_customers_by_email(
        &self,
        store_url: &str,
        email: &str,
    ) -> Result<Connection<CustomerRecord>, ShopifyError> {
        #[derive(Deserialize)]
        struct Response {
            customers: Connection<CustomerRecord>,
        }

        let response: Response = self
            .execute(
                store_url,
                queries::GET_CUSTOMERS_BY_EMAIL,
                serde_json::json!({ "query": format!("email:{email}") }),
            )
            .await?;
        Ok(response.customers)
    }

    /// Fetch a customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError` on transport, throttling, or GraphQL failures.
    pub async fn get_orders_by_customer_id(
        &self,
        store_url: &str,
        customer_id: &str,
    ) -> Result<Connection<OrderFacts>, ShopifyError> {
        #[derive(Deserialize)]
        struct Response {
            orders: Connection<OrderFacts>,
        }

        let response: Response = self
            .execute(
                store_url,
                queries::GET_ORDERS_BY_CUSTOMER,
                serde_json::json!({
                    "query": format!("customer_id:{}", chad_core::extract_order_id(customer_id))
                }),
            )
            .await?;
        Ok(response.orders)
    }
}

/// Expand a bare numeric id into an order gid; pass full gids through.
fn order_gid(order_id: &str) -> String {
    if order_id.starts_with("gid://") {
        order_id.to_string()
    } else {
        format!("gid://shopify/Order/{order_id}")
    }
}
