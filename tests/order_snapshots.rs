//! Orders keep the cart as it was when they were placed.

use jiff::Timestamp;
use testresult::TestResult;

use roastery::prelude::*;

fn address() -> ShippingAddress {
    ShippingAddress {
        name: "Asha Rao".to_string(),
        phone: None,
        line1: "12 Brigade Road".to_string(),
        line2: None,
        city: "Bengaluru".to_string(),
        state: "Karnataka".to_string(),
        postal_code: "560001".to_string(),
        country: "IN".to_string(),
    }
}

fn two_line_cart() -> TestResult<Cart> {
    let mut cart = Cart::new();

    cart.add_item(
        TasteProfile::new(
            "Morning Pour",
            Sensory::new(3, 2, 4, 3)?,
            RoastLevel::Medium,
            GrindType::PourOver,
        ),
        2,
        BASE_PRICE,
    );
    cart.add_item(
        TasteProfile::new(
            "Morning Press",
            Sensory::new(3, 2, 4, 3)?,
            RoastLevel::Medium,
            GrindType::FrenchPress,
        ),
        1,
        BASE_PRICE,
    );

    Ok(cart)
}

#[test]
fn order_items_do_not_follow_cart_changes() -> TestResult {
    let mut cart = two_line_cart()?;
    let request = NewOrder::from_cart(UserId::guest(), &cart, address(), PaymentMethod::Cod);
    let mut history = OrderHistory::default();

    history.add_order(Order::new(OrderId::new("srv-1"), request, Timestamp::now()));

    let before = history.orders().to_vec();

    let first = cart.lines().first().map(CartLine::id).ok_or("cart has lines")?;
    cart.update_quantity(first, 9);
    cart.add_item(
        TasteProfile::new(
            "Late Add",
            Sensory::new(1, 1, 1, 1)?,
            RoastLevel::Light,
            GrindType::Filter,
        ),
        1,
        BASE_PRICE,
    );
    cart.clear();

    assert_eq!(history.orders(), before.as_slice());

    let [order] = history.orders() else {
        return Err("expected one order".into());
    };

    assert_eq!(order.total_amount(), 1797_00);
    assert_eq!(order.items().len(), 2);
    assert_eq!(
        order.items().iter().map(|i| i.quantity).sum::<u32>(),
        3,
        "snapshot quantities"
    );

    Ok(())
}

#[test]
fn status_updates_touch_only_status_and_tracking() -> TestResult {
    let cart = two_line_cart()?;
    let id = OrderId::new("srv-2");
    let mut history = OrderHistory::new(TransitionPolicy::Strict);

    history.add_order(Order::new(
        id.clone(),
        NewOrder::from_cart(UserId::new("u-1"), &cart, address(), PaymentMethod::Cod),
        Timestamp::UNIX_EPOCH,
    ));

    let before = history.get(&id).cloned().ok_or("order exists")?;

    for status in [
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ] {
        history.update_order_status(&id, status, Some(format!("{status} by carrier")))?;
    }

    let after = history.get(&id).ok_or("order exists")?;

    assert_eq!(after.status(), OrderStatus::Delivered);
    assert_eq!(after.tracking_status(), Some("delivered by carrier"));
    assert_eq!(after.items(), before.items());
    assert_eq!(after.total_amount(), before.total_amount());
    assert_eq!(after.shipping_address(), before.shipping_address());
    assert_eq!(after.created_at(), before.created_at());
    assert_eq!(after.user_id(), before.user_id());

    Ok(())
}
