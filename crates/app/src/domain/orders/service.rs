//! Orders service.

use async_trait::async_trait;
use mockall::automock;
use roastery::orders::{
    Order, OrderHistory, OrderId, OrderStatus, StatusChange, TransitionPolicy,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::orders::errors::OrdersServiceError;

#[derive(Debug, Default)]
pub struct InMemoryOrdersService {
    history: Mutex<OrderHistory>,
}

impl InMemoryOrdersService {
    #[must_use]
    pub fn new(policy: TransitionPolicy) -> Self {
        Self {
            history: Mutex::new(OrderHistory::new(policy)),
        }
    }
}

#[async_trait]
impl OrdersService for InMemoryOrdersService {
    async fn orders(&self) -> Vec<Order> {
        self.history.lock().await.orders().to_vec()
    }

    async fn get_order(&self, id: &OrderId) -> Option<Order> {
        self.history.lock().await.get(id).cloned()
    }

    async fn set_orders(&self, orders: Vec<Order>) {
        debug!(count = orders.len(), "replacing order history");

        self.history.lock().await.set_orders(orders);
    }

    async fn add_order(&self, order: Order) {
        info!(order = %order.id(), total = order.total_amount(), "order recorded");

        self.history.lock().await.add_order(order);
    }

    async fn set_current_order(&self, order: Option<Order>) {
        self.history.lock().await.set_current_order(order);
    }

    async fn current_order(&self) -> Option<Order> {
        self.history.lock().await.current_order().cloned()
    }

    async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        tracking_status: Option<String>,
    ) -> Result<StatusChange, OrdersServiceError> {
        let change = self
            .history
            .lock()
            .await
            .update_order_status(id, status, tracking_status)
            .inspect_err(|error| warn!(%error, "status update rejected"))?;

        match change {
            StatusChange::Updated { from, to } => info!(order = %id, %from, %to, "order status"),
            StatusChange::Missing => debug!(order = %id, "status update ignored, no such order"),
        }

        Ok(change)
    }

    async fn set_loading(&self, loading: bool) {
        self.history.lock().await.set_loading(loading);
    }

    async fn is_loading(&self) -> bool {
        self.history.lock().await.is_loading()
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Orders, most recent first.
    async fn orders(&self) -> Vec<Order>;

    async fn get_order(&self, id: &OrderId) -> Option<Order>;

    /// Replace the whole history.
    async fn set_orders(&self, orders: Vec<Order>);

    /// Prepend a freshly placed order.
    async fn add_order(&self, order: Order);

    async fn set_current_order(&self, order: Option<Order>);

    async fn current_order(&self) -> Option<Order>;

    /// Change an order's status; unknown ids are ignored.
    ///
    /// Tracking text is only replaced when supplied.
    async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        tracking_status: Option<String>,
    ) -> Result<StatusChange, OrdersServiceError>;

    async fn set_loading(&self, loading: bool);

    async fn is_loading(&self) -> bool;
}
