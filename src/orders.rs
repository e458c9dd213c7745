//! Orders
//!
//! Placed orders and the shopper's order history. An [`Order`] snapshots the cart
//! it was built from; after creation only its status and tracking text change.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    cart::{Cart, CartLine},
    pricing::{line_total, money},
    profiles::TasteProfileUuid,
};

/// Identifier assigned by the order service, or generated locally as a fallback.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Wrap an id returned by the order service.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a client-side id for an order the service did not name.
    pub fn local() -> Self {
        Self(format!("local-{}", Uuid::now_v7().simple()))
    }

    /// Whether this id was generated client-side.
    pub fn is_local(&self) -> bool {
        self.0.starts_with("local-")
    }

    /// The id text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// The customer an order belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Sentinel used when nobody is signed in.
    pub const GUEST: &'static str = "guest";

    /// Wrap an identity-provider user id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The guest sentinel.
    pub fn guest() -> Self {
        Self(Self::GUEST.to_string())
    }

    /// Whether this is the guest sentinel.
    pub fn is_guest(&self) -> bool {
        self.0 == Self::GUEST
    }

    /// The id text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// Errors parsing order enums from text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseOrderEnumError {
    /// Unknown order status name.
    #[error("unknown order status: {0}")]
    Status(String),

    /// Unknown payment method name.
    #[error("unknown payment method: {0}")]
    PaymentMethod(String),
}

/// Order status.
///
/// Orders move along `pending → confirmed → processing → shipped → delivered`;
/// `cancelled` is reachable from any state that is not terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Accepted by the shop, awaiting confirmation
    Pending,

    /// Confirmed
    Confirmed,

    /// Being roasted and packed
    Processing,

    /// Handed to the carrier
    Shipped,

    /// Delivered to the customer
    Delivered,

    /// Cancelled
    Cancelled,
}

impl OrderStatus {
    /// Every status, progression first.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Stable name, as serialized.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    const fn stage(self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Confirmed => Some(1),
            Self::Processing => Some(2),
            Self::Shipped => Some(3),
            Self::Delivered => Some(4),
            Self::Cancelled => None,
        }
    }

    /// The following step of the progression, if any.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Confirmed),
            Self::Confirmed => Some(Self::Processing),
            Self::Processing => Some(Self::Shipped),
            Self::Shipped => Some(Self::Delivered),
            Self::Delivered | Self::Cancelled => None,
        }
    }

    /// Whether no further transition is possible.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether moving from `self` to `to` respects the progression.
    ///
    /// Forward moves may skip steps; repeating the current status is allowed.
    pub fn can_transition_to(self, to: Self) -> bool {
        if self == to {
            return true;
        }

        if self.is_terminal() {
            return false;
        }

        match (self.stage(), to.stage()) {
            (_, None) => true,
            (Some(from), Some(to)) => to > from,
            (None, Some(_)) => false,
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ParseOrderEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseOrderEnumError::Status(s.to_string()))
    }
}

/// How an order is paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery
    Cod,

    /// Razorpay gateway
    Razorpay,

    /// Any other online payment
    Online,
}

impl PaymentMethod {
    /// Every payment method.
    pub const ALL: [Self; 3] = [Self::Cod, Self::Razorpay, Self::Online];

    /// Stable name, as serialized.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cod => "cod",
            Self::Razorpay => "razorpay",
            Self::Online => "online",
        }
    }

    /// Whether checkout currently accepts this method. Only cash on delivery is live.
    pub const fn is_available(self) -> bool {
        matches!(self, Self::Cod)
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ParseOrderEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseOrderEnumError::PaymentMethod(s.to_string()))
    }
}

/// Shipping address validation errors.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AddressError {
    /// A required field is blank.
    #[error("shipping address is missing {0}")]
    MissingField(&'static str),
}

/// Postal address an order ships to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    /// Recipient name
    pub name: String,

    /// Contact phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// First address line
    pub line1: String,

    /// Second address line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,

    /// City
    pub city: String,

    /// State or province
    pub state: String,

    /// Postal code
    pub postal_code: String,

    /// Country
    pub country: String,
}

impl ShippingAddress {
    /// Check that every required field is filled in.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::MissingField`] naming the first blank field.
    pub fn validate(&self) -> Result<(), AddressError> {
        [
            ("name", &self.name),
            ("line1", &self.line1),
            ("city", &self.city),
            ("state", &self.state),
            ("postal code", &self.postal_code),
            ("country", &self.country),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map_or(Ok(()), |(field, _)| Err(AddressError::MissingField(field)))
    }
}

/// A cart line frozen into an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Profile id at the time of purchase
    pub taste_profile_id: TasteProfileUuid,

    /// Profile name at the time of purchase
    pub taste_profile_name: String,

    /// Quantity bought
    pub quantity: u32,

    /// Unit price paid, in minor units
    pub unit_price: u64,
}

impl OrderItem {
    /// `unit_price * quantity` in minor units
    pub fn line_total(&self) -> u64 {
        line_total(self.unit_price, self.quantity)
    }
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        Self {
            taste_profile_id: line.taste_profile().id(),
            taste_profile_name: line.taste_profile().name().to_string(),
            quantity: line.quantity(),
            unit_price: line.unit_price(),
        }
    }
}

/// Item snapshots of one order.
pub type OrderItems = SmallVec<[OrderItem; 4]>;

/// Order-creation request sent to the order service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    /// Customer, or the guest sentinel
    pub user_id: UserId,

    /// Cart total at checkout, in minor units
    pub total_amount: u64,

    /// Destination
    pub shipping_address: ShippingAddress,

    /// Snapshot of the cart lines
    pub items: OrderItems,

    /// Payment method
    pub payment_method: PaymentMethod,
}

impl NewOrder {
    /// Snapshot `cart` into a creation request.
    ///
    /// The items are copies; later cart changes never reach the request.
    pub fn from_cart(
        user_id: UserId,
        cart: &Cart,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
    ) -> Self {
        Self {
            user_id,
            total_amount: cart.total_price_minor(),
            shipping_address,
            items: cart.lines().iter().map(OrderItem::from).collect(),
            payment_method,
        }
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    status: OrderStatus,
    total_amount: u64,
    payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payment_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shipment_reference: Option<String>,
    shipping_address: ShippingAddress,
    items: OrderItems,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tracking_status: Option<String>,
    created_at: Timestamp,
}

impl Order {
    /// Record an order the service accepted; it starts out `pending`.
    pub fn new(id: OrderId, request: NewOrder, created_at: Timestamp) -> Self {
        let NewOrder {
            user_id,
            total_amount,
            shipping_address,
            items,
            payment_method,
        } = request;

        Self {
            id,
            user_id,
            status: OrderStatus::Pending,
            total_amount,
            payment_method,
            payment_reference: None,
            shipment_reference: None,
            shipping_address,
            items,
            tracking_status: None,
            created_at,
        }
    }

    /// Attach the payment provider's reference.
    #[must_use]
    pub fn with_payment_reference(self, reference: Option<String>) -> Self {
        Self {
            payment_reference: reference,
            ..self
        }
    }

    /// Attach the shipment provider's reference.
    #[must_use]
    pub fn with_shipment_reference(self, reference: Option<String>) -> Self {
        Self {
            shipment_reference: reference,
            ..self
        }
    }

    /// Replace the status, and the tracking text when one is supplied.
    pub fn update_status(&mut self, status: OrderStatus, tracking_status: Option<String>) {
        self.status = status;

        if tracking_status.is_some() {
            self.tracking_status = tracking_status;
        }
    }

    /// Order id
    pub fn id(&self) -> &OrderId {
        &self.id
    }

    /// Customer
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Current status
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Total in minor units
    pub fn total_amount(&self) -> u64 {
        self.total_amount
    }

    /// Total
    pub fn total(&self) -> Money<'static, Currency> {
        money(self.total_amount)
    }

    /// Payment method
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Payment provider reference
    pub fn payment_reference(&self) -> Option<&str> {
        self.payment_reference.as_deref()
    }

    /// Shipment provider reference
    pub fn shipment_reference(&self) -> Option<&str> {
        self.shipment_reference.as_deref()
    }

    /// Destination
    pub fn shipping_address(&self) -> &ShippingAddress {
        &self.shipping_address
    }

    /// Item snapshots
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Free-text carrier status
    pub fn tracking_status(&self) -> Option<&str> {
        self.tracking_status.as_deref()
    }

    /// When the order was placed
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

/// Whether the history checks status transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// Accept any status; the order service owns transition rules.
    #[default]
    Permissive,

    /// Reject moves that break the progression.
    Strict,
}

/// Status update errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StatusUpdateError {
    /// The move breaks the status progression.
    #[error("cannot move order {order} from {from} to {to}")]
    IllegalTransition {
        /// Order id
        order: OrderId,
        /// Current status
        from: OrderStatus,
        /// Requested status
        to: OrderStatus,
    },
}

/// What [`OrderHistory::update_order_status`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// The order's status was replaced.
    Updated {
        /// Previous status
        from: OrderStatus,
        /// New status
        to: OrderStatus,
    },

    /// No order has that id.
    Missing,
}

/// The shopper's orders, most recent first.
#[derive(Debug, Clone, Default)]
pub struct OrderHistory {
    orders: Vec<Order>,
    current: Option<Order>,
    loading: bool,
    policy: TransitionPolicy,
}

impl OrderHistory {
    /// An empty history using `policy` for status updates.
    pub fn new(policy: TransitionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Replace every order, e.g. after fetching from the server.
    pub fn set_orders(&mut self, orders: Vec<Order>) {
        self.orders = orders;
    }

    /// Put a freshly placed order at the front.
    pub fn add_order(&mut self, order: Order) {
        self.orders.insert(0, order);
    }

    /// Focus an order for detail views; independent of the list.
    pub fn set_current_order(&mut self, order: Option<Order>) {
        self.current = order;
    }

    /// Apply a status change to the order with id `id`.
    ///
    /// Tracking text is only replaced when `tracking_status` is given. Unknown
    /// ids are not an error.
    ///
    /// # Errors
    ///
    /// Under [`TransitionPolicy::Strict`], returns
    /// [`StatusUpdateError::IllegalTransition`] and leaves the order untouched
    /// when the move breaks the progression.
    pub fn update_order_status(
        &mut self,
        id: &OrderId,
        status: OrderStatus,
        tracking_status: Option<String>,
    ) -> Result<StatusChange, StatusUpdateError> {
        let Some(order) = self.orders.iter_mut().find(|order| order.id == *id) else {
            return Ok(StatusChange::Missing);
        };

        let from = order.status;

        if self.policy == TransitionPolicy::Strict && !from.can_transition_to(status) {
            return Err(StatusUpdateError::IllegalTransition {
                order: id.clone(),
                from,
                to: status,
            });
        }

        order.update_status(status, tracking_status);

        Ok(StatusChange::Updated { from, to: status })
    }

    /// Set the busy flag shown while orders load.
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Busy flag
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Orders, most recent first
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Find an order by id
    pub fn get(&self, id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| order.id == *id)
    }

    /// The focused order
    pub fn current_order(&self) -> Option<&Order> {
        self.current.as_ref()
    }

    /// Transition policy in force
    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }
}
