//! Roastery prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{AddOutcome, Cart, CartLine, CartLineUuid, QuantityUpdate},
    fixtures::{FixtureError, ProfilePresets},
    orders::{
        AddressError, NewOrder, Order, OrderHistory, OrderId, OrderItem, OrderItems, OrderStatus,
        PaymentMethod, ShippingAddress, StatusChange, StatusUpdateError, TransitionPolicy, UserId,
    },
    pricing::{BASE_PRICE, CURRENCY},
    profiles::{
        Blend, GrindType, Intensity, ProfileError, RoastLevel, Sensory, TasteProfile,
        TasteProfileUuid,
    },
    receipt::{ReceiptError, write_cart, write_order},
    sku::Sku,
    uuids::TypedUuid,
};
