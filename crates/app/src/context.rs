//! App Context

use std::sync::Arc;

use roastery::orders::UserId;
use thiserror::Error;
use tracing::debug;

use crate::{
    config::AppConfig,
    domain::{
        carts::{CartsService, CartsServiceError, JsonFileCartStorage, StoredCartsService},
        checkout::{CheckoutService, DefaultCheckoutService, HttpOrderApi, Identity, StaticIdentity},
        orders::{InMemoryOrdersService, OrdersService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to load the stored cart")]
    Cart(#[from] CartsServiceError),
}

#[derive(Clone)]
pub struct AppContext {
    pub carts: Arc<dyn CartsService>,
    pub orders: Arc<dyn OrdersService>,
    pub checkout: Arc<dyn CheckoutService>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext").finish_non_exhaustive()
    }
}

impl AppContext {
    /// Wire the services described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error when the stored cart cannot be read.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let storage = Arc::new(JsonFileCartStorage::new(&config.cart_storage_path));

        debug!(path = %storage.path().display(), "cart storage");

        let carts: Arc<dyn CartsService> =
            Arc::new(StoredCartsService::load(storage, config.base_price).await?);

        let orders: Arc<dyn OrdersService> =
            Arc::new(InMemoryOrdersService::new(config.transition_policy()));

        let identity = StaticIdentity::new(config.user_id.as_ref().map(|user_id| Identity {
            user_id: UserId::new(user_id.as_str()),
            display_name: config.user_name.clone(),
        }));

        let checkout = DefaultCheckoutService::new(
            carts.clone(),
            orders.clone(),
            Arc::new(HttpOrderApi::new(config.order_api())),
            Arc::new(identity),
            config.checkout_timeout(),
        );

        Ok(Self {
            carts,
            orders,
            checkout: Arc::new(checkout),
        })
    }
}
