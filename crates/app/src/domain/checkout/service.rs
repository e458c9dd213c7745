//! Checkout service.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use roastery::orders::{NewOrder, Order, OrderId, PaymentMethod, ShippingAddress, UserId};
use tokio::{sync::Mutex, time::timeout};
use tracing::{error, info, instrument, warn};

use crate::domain::{
    carts::CartsService,
    checkout::{api::OrderApi, errors::CheckoutError, identity::IdentityProvider},
    orders::OrdersService,
};

/// What the shopper entered at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub payment_method: PaymentMethod,
    pub shipping_address: ShippingAddress,
}

/// Turns the cart into a placed order.
pub struct DefaultCheckoutService {
    carts: Arc<dyn CartsService>,
    orders: Arc<dyn OrdersService>,
    api: Arc<dyn OrderApi>,
    identity: Arc<dyn IdentityProvider>,
    timeout: Duration,
    in_flight: Mutex<()>,
}

impl std::fmt::Debug for DefaultCheckoutService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultCheckoutService")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl DefaultCheckoutService {
    #[must_use]
    pub fn new(
        carts: Arc<dyn CartsService>,
        orders: Arc<dyn OrdersService>,
        api: Arc<dyn OrderApi>,
        identity: Arc<dyn IdentityProvider>,
        timeout: Duration,
    ) -> Self {
        Self {
            carts,
            orders,
            api,
            identity,
            timeout,
            in_flight: Mutex::new(()),
        }
    }
}

#[async_trait]
impl CheckoutService for DefaultCheckoutService {
    #[instrument(skip_all, fields(payment = %request.payment_method))]
    async fn checkout(&self, request: CheckoutRequest) -> Result<Order, CheckoutError> {
        let CheckoutRequest {
            payment_method,
            mut shipping_address,
        } = request;

        if !payment_method.is_available() {
            warn!("payment method not available");

            return Err(CheckoutError::PaymentUnavailable(payment_method));
        }

        let identity = self.identity.current_user().await;

        if shipping_address.name.trim().is_empty() {
            if let Some(name) = identity
                .as_ref()
                .and_then(|identity| identity.display_name.clone())
            {
                shipping_address.name = name;
            }
        }

        shipping_address
            .validate()
            .inspect_err(|error| warn!(%error, "shipping address rejected"))?;

        // One checkout at a time; a second attempt sees the cart the first one left.
        let _in_flight = self.in_flight.lock().await;

        let cart = self.carts.get_cart().await;

        if cart.is_empty() {
            warn!("checkout with an empty cart");

            return Err(CheckoutError::EmptyCart);
        }

        let user_id = identity.map_or_else(UserId::guest, |identity| identity.user_id);
        let new_order = NewOrder::from_cart(user_id, &cart, shipping_address, payment_method);

        let created = match timeout(self.timeout, self.api.create_order(&new_order)).await {
            Ok(result) => {
                result.inspect_err(|error| warn!(%error, "order service refused checkout"))?
            }
            Err(_) => {
                warn!(timeout = ?self.timeout, "order service timed out");

                return Err(CheckoutError::Timeout(self.timeout));
            }
        };

        let id = created.id.map_or_else(OrderId::local, OrderId::new);

        let order = Order::new(id, new_order, Timestamp::now())
            .with_payment_reference(created.payment_reference)
            .with_shipment_reference(created.shipment_reference);

        self.orders.add_order(order.clone()).await;

        // Only the ordered quantities go; anything added while the order was
        // being created stays in the cart.
        if let Err(error) = self.carts.remove_purchased(&cart).await {
            error!(%error, order = %order.id(), "order placed but the cart could not be persisted");
        }

        info!(
            order = %order.id(),
            user = %order.user_id(),
            total = order.total_amount(),
            items = order.items().len(),
            "order placed"
        );

        Ok(order)
    }
}

#[automock]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Place an order for everything in the cart.
    ///
    /// On success the order is at the front of the history and the cart is
    /// empty. On failure neither the cart nor the history has changed.
    async fn checkout(&self, request: CheckoutRequest) -> Result<Order, CheckoutError>;
}
