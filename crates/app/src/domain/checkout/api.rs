//! Order-creation service client.

use async_trait::async_trait;
use mockall::automock;
use reqwest::{Client, Response, StatusCode};
use roastery::orders::NewOrder;
use serde::Deserialize;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::domain::checkout::errors::OrderApiError;

/// What the order service returns for a created order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrder {
    /// Server-assigned order id
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub payment_reference: Option<String>,

    #[serde(default)]
    pub shipment_reference: Option<String>,
}

#[automock]
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// Submit an order-creation request.
    async fn create_order(&self, request: &NewOrder) -> Result<CreatedOrder, OrderApiError>;
}

/// Where the order service lives and how to authenticate with it.
#[derive(Clone)]
pub struct OrderApiConfig {
    pub base_url: String,
    pub token: Option<Zeroizing<String>>,
}

impl std::fmt::Debug for OrderApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderApiConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// [`OrderApi`] over HTTP: `POST {base_url}/orders` with a JSON body.
#[derive(Debug, Clone)]
pub struct HttpOrderApi {
    client: Client,
    config: OrderApiConfig,
}

impl HttpOrderApi {
    #[must_use]
    pub fn new(config: OrderApiConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    #[must_use]
    pub fn with_client(client: Client, config: OrderApiConfig) -> Self {
        Self { client, config }
    }

    fn orders_url(&self) -> String {
        format!("{}/orders", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl OrderApi for HttpOrderApi {
    async fn create_order(&self, request: &NewOrder) -> Result<CreatedOrder, OrderApiError> {
        let url = self.orders_url();

        let mut builder = self.client.post(&url).json(request);

        if let Some(token) = &self.config.token {
            builder = builder.bearer_auth(token.as_str());
        }

        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            debug!(%status, "order created");

            return Ok(response.json().await?);
        }

        let message = error_message(response).await;

        warn!(%status, %message, "order service refused order");

        if status.is_server_error() {
            Err(OrderApiError::Unavailable { status, message })
        } else {
            Err(OrderApiError::Rejected { status, message })
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Human-readable reason from an error response.
async fn error_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|body| body.message.or(body.error))
        .or_else(|| Some(body.trim().to_string()).filter(|text| !text.is_empty()))
        .unwrap_or_else(|| default_reason(status))
}

fn default_reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map_or_else(|| status.to_string(), str::to_string)
}
