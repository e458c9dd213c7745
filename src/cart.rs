//! Cart
//!
//! The in-progress order. A cart holds at most one line per blend: adding an
//! equivalent profile grows the existing line instead of creating another.
//! Every method here is a plain state transition; persisting the result is the
//! caller's concern.

use rusty_money::{Money, iso::Currency};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{
    pricing::{line_total, money},
    profiles::{Blend, TasteProfile},
    sku::Sku,
    uuids::TypedUuid,
};

/// Cart Line UUID
pub type CartLineUuid = TypedUuid<CartLine>;

/// One blend's quantity in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    id: CartLineUuid,
    sku: Sku,
    taste_profile: TasteProfile,
    quantity: u32,
    unit_price: u64,
}

impl CartLine {
    /// Line id
    pub fn id(&self) -> CartLineUuid {
        self.id
    }

    /// Receipt SKU
    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    /// The profile this line was created for
    pub fn taste_profile(&self) -> &TasteProfile {
        &self.taste_profile
    }

    /// Quantity, always at least one while the line is in a cart
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price in minor units, fixed when the line was created
    pub fn unit_price(&self) -> u64 {
        self.unit_price
    }

    /// `unit_price * quantity` in minor units
    pub fn line_total(&self) -> u64 {
        line_total(self.unit_price, self.quantity)
    }
}

/// What [`Cart::add_item`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was created.
    Inserted(CartLineUuid),

    /// An equivalent line already existed and its quantity grew.
    Merged(CartLineUuid),

    /// Nothing to add (zero quantity).
    Ignored,
}

impl AddOutcome {
    /// The line that now carries the profile, if any.
    pub fn line(self) -> Option<CartLineUuid> {
        match self {
            Self::Inserted(line) | Self::Merged(line) => Some(line),
            Self::Ignored => None,
        }
    }
}

/// What [`Cart::update_quantity`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityUpdate {
    /// The quantity was overwritten.
    Updated,

    /// The quantity was zero or below and the line is gone.
    Removed,

    /// No line has that id.
    Missing,
}

/// Cart
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<CartLine>,
    terms_accepted: bool,
}

impl Cart {
    /// An empty cart with terms not yet accepted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.items
    }

    /// Find a line by id.
    pub fn line(&self, id: CartLineUuid) -> Option<&CartLine> {
        self.items.iter().find(|line| line.id == id)
    }

    /// Find the line holding a profile equivalent to `profile`.
    pub fn line_for(&self, profile: &TasteProfile) -> Option<&CartLine> {
        self.items
            .iter()
            .find(|line| line.taste_profile.is_equivalent(profile))
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the shopper accepted the terms of sale.
    pub fn terms_accepted(&self) -> bool {
        self.terms_accepted
    }

    /// Add `quantity` units of `profile`.
    ///
    /// An equivalent profile already in the cart has its line's quantity
    /// increased; its SKU and unit price stay as they were. Otherwise a new line
    /// is appended with a fresh id and SKU, priced at `unit_price`.
    pub fn add_item(&mut self, profile: TasteProfile, quantity: u32, unit_price: u64) -> AddOutcome {
        if quantity == 0 {
            return AddOutcome::Ignored;
        }

        if let Some(line) = self
            .items
            .iter_mut()
            .find(|line| line.taste_profile.is_equivalent(&profile))
        {
            line.quantity = line.quantity.saturating_add(quantity);

            return AddOutcome::Merged(line.id);
        }

        let id = CartLineUuid::new();

        self.items.push(CartLine {
            id,
            sku: Sku::generate(),
            taste_profile: profile,
            quantity,
            unit_price,
        });

        AddOutcome::Inserted(id)
    }

    /// Remove a line. Unknown ids are ignored; returns whether a line was removed.
    pub fn remove_item(&mut self, id: CartLineUuid) -> bool {
        let before = self.items.len();

        self.items.retain(|line| line.id != id);

        self.items.len() != before
    }

    /// Overwrite a line's quantity; zero or below removes the line.
    pub fn update_quantity(&mut self, id: CartLineUuid, quantity: i32) -> QuantityUpdate {
        let Ok(quantity) = u32::try_from(quantity) else {
            return self.removal(id);
        };

        if quantity == 0 {
            return self.removal(id);
        }

        match self.items.iter_mut().find(|line| line.id == id) {
            Some(line) => {
                line.quantity = quantity;

                QuantityUpdate::Updated
            }
            None => QuantityUpdate::Missing,
        }
    }

    fn removal(&mut self, id: CartLineUuid) -> QuantityUpdate {
        if self.remove_item(id) {
            QuantityUpdate::Removed
        } else {
            QuantityUpdate::Missing
        }
    }

    /// Empty the cart and withdraw terms acceptance.
    pub fn clear(&mut self) {
        self.items.clear();
        self.terms_accepted = false;
    }

    /// Take the lines of `purchased` out of the cart after it was ordered.
    ///
    /// Each purchased line loses the quantity that was ordered; whatever was
    /// added to it since stays, as do lines added since. Terms acceptance is
    /// withdrawn. When nothing changed in between this is [`Cart::clear`].
    pub fn remove_purchased(&mut self, purchased: &Cart) {
        for bought in &purchased.items {
            if let Some(line) = self.items.iter_mut().find(|line| line.id == bought.id) {
                line.quantity = line.quantity.saturating_sub(bought.quantity);
            }
        }

        self.items.retain(|line| line.quantity > 0);
        self.terms_accepted = false;
    }

    /// Record whether the shopper accepted the terms of sale.
    pub fn set_terms_accepted(&mut self, accepted: bool) {
        self.terms_accepted = accepted;
    }

    /// Sum of quantities over all lines.
    pub fn total_items(&self) -> u64 {
        self.items
            .iter()
            .map(|line| u64::from(line.quantity))
            .sum()
    }

    /// Sum of line totals, in minor units.
    pub fn total_price_minor(&self) -> u64 {
        self.items
            .iter()
            .fold(0, |acc: u64, line| acc.saturating_add(line.line_total()))
    }

    /// Sum of line totals.
    pub fn total_price(&self) -> Money<'static, Currency> {
        money(self.total_price_minor())
    }

    /// Restore the cart invariants on state read back from storage.
    ///
    /// Lines with a zero quantity are dropped and lines holding equivalent
    /// profiles are folded into the first of them, keeping its id, SKU and price.
    #[must_use]
    pub fn normalize(self) -> Self {
        let mut positions: FxHashMap<Blend, usize> = FxHashMap::default();
        let mut items: Vec<CartLine> = Vec::with_capacity(self.items.len());

        for line in self.items.into_iter().filter(|line| line.quantity > 0) {
            let blend = line.taste_profile.blend();

            match positions.get(&blend).and_then(|&idx| items.get_mut(idx)) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                None => {
                    positions.insert(blend, items.len());
                    items.push(line);
                }
            }
        }

        Self {
            items,
            terms_accepted: self.terms_accepted,
        }
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use crate::{
        pricing::BASE_PRICE,
        profiles::{GrindType, RoastLevel, Sensory},
    };

    use super::*;

    fn profile(grind_type: GrindType) -> TestResult<TasteProfile> {
        Ok(TasteProfile::new(
            "House",
            Sensory::new(3, 2, 4, 3)?,
            RoastLevel::Medium,
            grind_type,
        ))
    }

    #[test]
    fn first_add_inserts_line_at_given_price() -> TestResult {
        let mut cart = Cart::new();

        let outcome = cart.add_item(profile(GrindType::PourOver)?, 1, BASE_PRICE);

        let Some(line) = outcome.line().and_then(|id| cart.line(id)) else {
            return Err("line should exist after insert".into());
        };

        assert!(matches!(outcome, AddOutcome::Inserted(_)));
        assert_eq!(line.quantity(), 1);
        assert_eq!(line.unit_price(), BASE_PRICE);
        assert_eq!(cart.total_price(), Money::from_minor(599_00, iso::INR));

        Ok(())
    }

    #[test]
    fn equivalent_add_merges_without_repricing() -> TestResult {
        let mut cart = Cart::new();

        let first = cart.add_item(profile(GrindType::PourOver)?, 1, BASE_PRICE);
        let second = cart.add_item(profile(GrindType::PourOver)?, 2, 1);

        assert_eq!(second, AddOutcome::Merged(first.line().unwrap_or_default()));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price_minor(), 3 * BASE_PRICE);

        Ok(())
    }

    #[test]
    fn zero_quantity_add_is_ignored() -> TestResult {
        let mut cart = Cart::new();

        assert_eq!(
            cart.add_item(profile(GrindType::Filter)?, 0, BASE_PRICE),
            AddOutcome::Ignored
        );
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn update_quantity_to_zero_or_below_removes() -> TestResult {
        for quantity in [0, -1, i32::MIN] {
            let mut cart = Cart::new();
            let id = cart
                .add_item(profile(GrindType::Espresso)?, 2, BASE_PRICE)
                .line()
                .unwrap_or_default();

            assert_eq!(cart.update_quantity(id, quantity), QuantityUpdate::Removed);
            assert!(cart.is_empty(), "quantity {quantity} should remove the line");
        }

        Ok(())
    }

    #[test]
    fn missing_ids_are_no_ops() -> TestResult {
        let mut cart = Cart::new();
        cart.add_item(profile(GrindType::Espresso)?, 2, BASE_PRICE);
        let before = cart.clone();

        assert!(!cart.remove_item(CartLineUuid::new()));
        assert_eq!(
            cart.update_quantity(CartLineUuid::new(), 5),
            QuantityUpdate::Missing
        );
        assert_eq!(
            cart.update_quantity(CartLineUuid::new(), 0),
            QuantityUpdate::Missing
        );
        assert_eq!(cart, before);

        Ok(())
    }

    #[test]
    fn clear_resets_terms() -> TestResult {
        let mut cart = Cart::new();
        cart.add_item(profile(GrindType::MokaPot)?, 1, BASE_PRICE);
        cart.set_terms_accepted(true);

        cart.clear();

        assert!(cart.is_empty());
        assert!(!cart.terms_accepted());

        Ok(())
    }

    #[test]
    fn remove_purchased_empties_an_unchanged_cart() -> TestResult {
        let mut cart = Cart::new();
        cart.add_item(profile(GrindType::MokaPot)?, 2, BASE_PRICE);
        cart.add_item(profile(GrindType::Filter)?, 1, BASE_PRICE);
        cart.set_terms_accepted(true);

        let purchased = cart.clone();
        cart.remove_purchased(&purchased);

        assert!(cart.is_empty());
        assert!(!cart.terms_accepted());

        Ok(())
    }

    #[test]
    fn remove_purchased_keeps_what_was_added_since() -> TestResult {
        let mut cart = Cart::new();
        let line = cart
            .add_item(profile(GrindType::MokaPot)?, 2, BASE_PRICE)
            .line()
            .ok_or("line expected")?;
        cart.set_terms_accepted(true);

        let purchased = cart.clone();

        cart.add_item(profile(GrindType::MokaPot)?, 3, BASE_PRICE);
        let added = cart
            .add_item(profile(GrindType::Espresso)?, 1, BASE_PRICE)
            .line()
            .ok_or("line expected")?;

        cart.remove_purchased(&purchased);

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.line(line).map(CartLine::quantity), Some(3));
        assert_eq!(cart.line(added).map(CartLine::quantity), Some(1));
        assert!(!cart.terms_accepted());

        Ok(())
    }

    #[test]
    fn remove_purchased_ignores_lines_removed_since() -> TestResult {
        let mut cart = Cart::new();
        let line = cart
            .add_item(profile(GrindType::Filter)?, 2, BASE_PRICE)
            .line()
            .ok_or("line expected")?;

        let purchased = cart.clone();
        cart.remove_item(line);
        cart.remove_purchased(&purchased);

        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn normalize_folds_duplicates_and_drops_empty_lines() -> TestResult {
        let line = |grind_type, quantity: u32| -> TestResult<serde_json::Value> {
            let taste_profile = profile(grind_type)?;

            Ok(serde_json::json!({
                "id": CartLineUuid::new(),
                "sku": "RST-AAAAAA-000001",
                "tasteProfile": taste_profile,
                "quantity": quantity,
                "unitPrice": BASE_PRICE,
            }))
        };

        let stored = serde_json::json!({
            "items": [
                line(GrindType::Filter, 1)?,
                line(GrindType::Espresso, 0)?,
                line(GrindType::Filter, 4)?,
            ],
            "termsAccepted": true,
        });

        let cart = serde_json::from_value::<Cart>(stored)?.normalize();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_items(), 5);
        assert!(cart.terms_accepted());

        Ok(())
    }

    #[test]
    fn serializes_with_persisted_field_names() -> TestResult {
        let mut cart = Cart::new();
        cart.add_item(profile(GrindType::WholeBean)?, 1, BASE_PRICE);

        let json = serde_json::to_value(&cart)?;

        assert_eq!(json["termsAccepted"], false);
        assert_eq!(json["items"][0]["quantity"], 1);
        assert_eq!(json["items"][0]["unitPrice"], BASE_PRICE);
        assert_eq!(json["items"][0]["tasteProfile"]["grindType"], "whole-bean");

        Ok(())
    }
}
