//! Carts service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use roastery::{
    cart::{AddOutcome, Cart, CartLineUuid, QuantityUpdate},
    profiles::TasteProfile,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::carts::{errors::CartsServiceError, storage::CartStorage};

/// Cart kept in memory and written through to a [`CartStorage`].
///
/// Operations are serialized: each one applies its transition to a copy of the
/// cart, persists the copy and only then makes it current, so a failed write
/// leaves the cart as it was. Removing purchased lines is the exception, see
/// [`CartsService::remove_purchased`].
pub struct StoredCartsService {
    storage: Arc<dyn CartStorage>,
    cart: Mutex<Cart>,
    base_price: u64,
}

impl std::fmt::Debug for StoredCartsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredCartsService")
            .field("base_price", &self.base_price)
            .finish_non_exhaustive()
    }
}

impl StoredCartsService {
    /// Read the stored cart once and start serving it.
    ///
    /// # Errors
    ///
    /// Returns an error when the stored record cannot be read.
    pub async fn load(
        storage: Arc<dyn CartStorage>,
        base_price: u64,
    ) -> Result<Self, CartsServiceError> {
        let cart = storage.load().await?.unwrap_or_default().normalize();

        info!(
            lines = cart.len(),
            items = cart.total_items(),
            "loaded stored cart"
        );

        Ok(Self {
            storage,
            cart: Mutex::new(cart),
            base_price,
        })
    }

    /// Apply `transition` to a copy of the cart, persist it and commit it.
    ///
    /// `transition` returns whether it changed anything; unchanged carts are not written.
    async fn apply<T>(
        &self,
        transition: impl FnOnce(&mut Cart) -> (T, bool) + Send,
    ) -> Result<T, CartsServiceError> {
        let mut cart = self.cart.lock().await;
        let mut next = cart.clone();

        let (outcome, changed) = transition(&mut next);

        if changed {
            self.storage.save(&next).await?;
            *cart = next;
        }

        Ok(outcome)
    }
}

#[async_trait]
impl CartsService for StoredCartsService {
    async fn get_cart(&self) -> Cart {
        self.cart.lock().await.clone()
    }

    async fn add_item(
        &self,
        profile: TasteProfile,
        quantity: u32,
    ) -> Result<AddOutcome, CartsServiceError> {
        let base_price = self.base_price;

        let outcome = self
            .apply(|cart| {
                let outcome = cart.add_item(profile, quantity, base_price);
                (outcome, outcome != AddOutcome::Ignored)
            })
            .await?;

        debug!(?outcome, quantity, "add to cart");

        Ok(outcome)
    }

    async fn remove_item(&self, line: CartLineUuid) -> Result<(), CartsServiceError> {
        let removed = self
            .apply(|cart| {
                let removed = cart.remove_item(line);
                (removed, removed)
            })
            .await?;

        if !removed {
            debug!(%line, "remove ignored, no such line");
        }

        Ok(())
    }

    async fn update_quantity(
        &self,
        line: CartLineUuid,
        quantity: i32,
    ) -> Result<QuantityUpdate, CartsServiceError> {
        let update = self
            .apply(|cart| {
                let update = cart.update_quantity(line, quantity);
                (update, update != QuantityUpdate::Missing)
            })
            .await?;

        debug!(%line, quantity, ?update, "update quantity");

        Ok(update)
    }

    async fn clear_cart(&self) -> Result<(), CartsServiceError> {
        self.apply(|cart| {
            let changed = !cart.is_empty() || cart.terms_accepted();
            cart.clear();
            ((), changed)
        })
        .await
    }

    async fn remove_purchased(&self, purchased: &Cart) -> Result<(), CartsServiceError> {
        let mut cart = self.cart.lock().await;

        cart.remove_purchased(purchased);

        // Committed before the write; a failed write is reported, not rolled back.
        self.storage
            .save(&cart)
            .await
            .inspect_err(|error| warn!(%error, "purchased lines removed but not persisted"))?;

        Ok(())
    }

    async fn set_terms_accepted(&self, accepted: bool) -> Result<(), CartsServiceError> {
        self.apply(|cart| {
            let changed = cart.terms_accepted() != accepted;
            cart.set_terms_accepted(accepted);
            ((), changed)
        })
        .await
    }

    async fn total_items(&self) -> u64 {
        self.cart.lock().await.total_items()
    }

    async fn total_price(&self) -> u64 {
        self.cart.lock().await.total_price_minor()
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Snapshot of the current cart.
    async fn get_cart(&self) -> Cart;

    /// Add `quantity` units of a profile, merging into an equivalent line.
    async fn add_item(
        &self,
        profile: TasteProfile,
        quantity: u32,
    ) -> Result<AddOutcome, CartsServiceError>;

    /// Remove a line; unknown lines are ignored.
    async fn remove_item(&self, line: CartLineUuid) -> Result<(), CartsServiceError>;

    /// Overwrite a line's quantity; zero or below removes it.
    async fn update_quantity(
        &self,
        line: CartLineUuid,
        quantity: i32,
    ) -> Result<QuantityUpdate, CartsServiceError>;

    /// Empty the cart and withdraw terms acceptance.
    async fn clear_cart(&self) -> Result<(), CartsServiceError>;

    /// Take an ordered snapshot's lines out of the cart and withdraw terms acceptance.
    ///
    /// Unlike the other operations the change is kept in memory even when it
    /// cannot be persisted; the error is still returned.
    async fn remove_purchased(&self, purchased: &Cart) -> Result<(), CartsServiceError>;

    /// Record whether the shopper accepted the terms of sale.
    async fn set_terms_accepted(&self, accepted: bool) -> Result<(), CartsServiceError>;

    /// Sum of quantities.
    async fn total_items(&self) -> u64;

    /// Sum of line totals, in minor units.
    async fn total_price(&self) -> u64;
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use roastery::{
        pricing::BASE_PRICE,
        profiles::{GrindType, RoastLevel, Sensory},
    };
    use testresult::TestResult;

    use crate::domain::carts::{
        errors::CartStorageError,
        storage::{MemoryCartStorage, MockCartStorage},
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

    async fn service() -> TestResult<(StoredCartsService, Arc<MemoryCartStorage>)> {
        let storage = Arc::new(MemoryCartStorage::new());
        let service = StoredCartsService::load(storage.clone(), BASE_PRICE).await?;

        Ok((service, storage))
    }

    #[tokio::test]
    async fn add_item_persists_and_prices_at_base() -> TestResult {
        let (carts, storage) = service().await?;

        carts.add_item(profile(GrindType::PourOver)?, 1).await?;
        carts.add_item(profile(GrindType::PourOver)?, 2).await?;

        assert_eq!(carts.total_items().await, 3);
        assert_eq!(carts.total_price().await, 3 * BASE_PRICE);
        assert_eq!(storage.load().await?, Some(carts.get_cart().await));

        Ok(())
    }

    #[tokio::test]
    async fn stale_references_are_safe_no_ops() -> TestResult {
        let (carts, _storage) = service().await?;
        let line = carts
            .add_item(profile(GrindType::Filter)?, 1)
            .await?
            .line()
            .ok_or("line expected")?;

        carts.remove_item(line).await?;
        carts.remove_item(line).await?;

        assert_eq!(
            carts.update_quantity(line, 4).await?,
            QuantityUpdate::Missing
        );
        assert!(carts.get_cart().await.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn clear_cart_resets_terms() -> TestResult {
        let (carts, storage) = service().await?;
        carts.add_item(profile(GrindType::Espresso)?, 2).await?;
        carts.set_terms_accepted(true).await?;

        carts.clear_cart().await?;

        let stored = storage.load().await?.ok_or("cart should be stored")?;

        assert!(stored.is_empty());
        assert!(!stored.terms_accepted());

        Ok(())
    }

    #[tokio::test]
    async fn load_restores_previous_session() -> TestResult {
        let storage = Arc::new(MemoryCartStorage::new());

        let first = StoredCartsService::load(storage.clone(), BASE_PRICE).await?;
        first.add_item(profile(GrindType::MokaPot)?, 2).await?;
        first.set_terms_accepted(true).await?;
        drop(first);

        let second = StoredCartsService::load(storage, BASE_PRICE).await?;
        let cart = second.get_cart().await;

        assert_eq!(cart.total_items(), 2);
        assert!(cart.terms_accepted());

        Ok(())
    }

    #[tokio::test]
    async fn failed_write_leaves_cart_unchanged() -> TestResult {
        let mut storage = MockCartStorage::new();
        storage.expect_load().returning(|| Ok(None));
        storage
            .expect_save()
            .returning(|_| Err(CartStorageError::Io(io::Error::other("disk full"))));

        let carts = StoredCartsService::load(Arc::new(storage), BASE_PRICE).await?;

        let result = carts.add_item(profile(GrindType::Filter)?, 1).await;

        assert!(
            matches!(result, Err(CartsServiceError::Storage(_))),
            "expected Storage, got {result:?}"
        );
        assert!(carts.get_cart().await.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn purchased_lines_leave_the_cart_even_when_the_write_fails() -> TestResult {
        let mut storage = MockCartStorage::new();
        storage.expect_load().returning(|| Ok(None));
        let saves = AtomicUsize::new(0);
        storage.expect_save().times(3).returning(move |_| {
            if saves.fetch_add(1, Ordering::SeqCst) < 2 {
                Ok(())
            } else {
                Err(CartStorageError::Io(io::Error::other("disk full")))
            }
        });

        let carts = StoredCartsService::load(Arc::new(storage), BASE_PRICE).await?;
        carts.add_item(profile(GrindType::Filter)?, 2).await?;
        carts.set_terms_accepted(true).await?;

        let purchased = carts.get_cart().await;
        let result = carts.remove_purchased(&purchased).await;

        assert!(
            matches!(result, Err(CartsServiceError::Storage(_))),
            "expected Storage, got {result:?}"
        );

        let cart = carts.get_cart().await;

        assert!(cart.is_empty());
        assert!(!cart.terms_accepted());

        Ok(())
    }

    #[tokio::test]
    async fn no_op_transitions_are_not_written() -> TestResult {
        let mut storage = MockCartStorage::new();
        storage.expect_load().returning(|| Ok(None));
        storage.expect_save().never();

        let carts = StoredCartsService::load(Arc::new(storage), BASE_PRICE).await?;

        carts.remove_item(CartLineUuid::new()).await?;
        carts.update_quantity(CartLineUuid::new(), 0).await?;
        carts.add_item(profile(GrindType::Filter)?, 0).await?;
        carts.set_terms_accepted(false).await?;
        carts.clear_cart().await?;

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_equivalent_adds_share_one_line() -> TestResult {
        let (carts, _storage) = service().await?;
        let carts = Arc::new(carts);
        let mut tasks = Vec::new();

        for _ in 0..16 {
            let carts = carts.clone();
            let profile = profile(GrindType::PourOver)?;

            tasks.push(tokio::spawn(async move { carts.add_item(profile, 1).await }));
        }

        for task in tasks {
            task.await??;
        }

        let cart = carts.get_cart().await;

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_items(), 16);

        Ok(())
    }
}
