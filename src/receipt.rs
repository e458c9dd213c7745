//! Receipt
//!
//! Plain-text tables for a cart and for a placed order.

use std::io;

use tabled::{
    Table,
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::Cart,
    orders::{Order, ShippingAddress},
    pricing::money,
};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Writing to the output failed.
    #[error("IO error")]
    Io(#[from] io::Error),
}

/// Write the cart as a table followed by its totals.
///
/// # Errors
///
/// Returns a [`ReceiptError`] if writing to `out` fails.
pub fn write_cart(mut out: impl io::Write, cart: &Cart) -> Result<(), ReceiptError> {
    if cart.is_empty() {
        writeln!(out, "Cart is empty.")?;

        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record([
        "Line",
        "SKU",
        "Profile",
        "Blend",
        "Qty",
        "Unit Price",
        "Line Total",
    ]);

    for line in cart.lines() {
        builder.push_record([
            line.id().to_string(),
            line.sku().to_string(),
            line.taste_profile().name().to_string(),
            line.taste_profile().blend().to_string(),
            line.quantity().to_string(),
            money(line.unit_price()).to_string(),
            money(line.line_total()).to_string(),
        ]);
    }

    writeln!(out, "\n{}", styled(builder.build(), 4))?;
    writeln!(out, " Items: {}", cart.total_items())?;
    writeln!(out, " \x1b[1mTotal: {}\x1b[0m", cart.total_price())?;
    writeln!(
        out,
        " Terms accepted: {}\n",
        if cart.terms_accepted() { "yes" } else { "no" }
    )?;

    Ok(())
}

/// Write an order summary and its item snapshots.
///
/// # Errors
///
/// Returns a [`ReceiptError`] if writing to `out` fails.
pub fn write_order(mut out: impl io::Write, order: &Order) -> Result<(), ReceiptError> {
    writeln!(out, "\n Order {} ({})", order.id(), order.status())?;
    writeln!(out, " Placed: {}", order.created_at())?;
    writeln!(out, " Customer: {}", order.user_id())?;
    writeln!(out, " Payment: {}", order.payment_method())?;

    if let Some(tracking) = order.tracking_status() {
        writeln!(out, " Tracking: {tracking}")?;
    }

    writeln!(out, " Ship to: {}", one_line(order.shipping_address()))?;

    let mut builder = Builder::default();

    builder.push_record(["Profile", "Qty", "Unit Price", "Line Total"]);

    for item in order.items() {
        builder.push_record([
            item.taste_profile_name.clone(),
            item.quantity.to_string(),
            money(item.unit_price).to_string(),
            money(item.line_total()).to_string(),
        ]);
    }

    writeln!(out, "\n{}", styled(builder.build(), 1))?;
    writeln!(out, " \x1b[1mTotal: {}\x1b[0m\n", order.total())?;

    Ok(())
}

fn styled(mut table: Table, first_numeric_column: usize) -> Table {
    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(first_numeric_column..), Alignment::right());

    table
}

fn one_line(address: &ShippingAddress) -> String {
    [
        Some(address.name.as_str()),
        Some(address.line1.as_str()),
        address.line2.as_deref(),
        Some(address.city.as_str()),
        Some(address.state.as_str()),
        Some(address.postal_code.as_str()),
        Some(address.country.as_str()),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.trim().is_empty())
    .collect::<Vec<_>>()
    .join(", ")
}
