//! Cart Storage
//!
//! The cart survives restarts as a single JSON record: `{"items": [...], "termsAccepted": bool}`.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use mockall::automock;
use roastery::cart::Cart;
use tokio::{fs, sync::Mutex};

use crate::domain::carts::errors::CartStorageError;

/// Durable key-value slot holding the serialized cart.
#[automock]
#[async_trait]
pub trait CartStorage: Send + Sync {
    /// Read the stored cart, `None` when nothing was ever saved.
    async fn load(&self) -> Result<Option<Cart>, CartStorageError>;

    /// Replace the stored cart.
    async fn save(&self, cart: &Cart) -> Result<(), CartStorageError>;
}

/// Cart record kept in a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileCartStorage {
    path: PathBuf,
}

impl JsonFileCartStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CartStorage for JsonFileCartStorage {
    async fn load(&self) -> Result<Option<Cart>, CartStorageError> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    async fn save(&self, cart: &Cart) -> Result<(), CartStorageError> {
        if let Some(parent) = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(cart)?;

        // Write beside the record and swap it in so a crash never leaves half a file.
        let staging = self.path.with_extension("json.tmp");

        fs::write(&staging, bytes).await?;
        fs::rename(&staging, &self.path).await?;

        Ok(())
    }
}

/// Cart record kept in process memory, serialized exactly like the file record.
#[derive(Debug, Default)]
pub struct MemoryCartStorage {
    record: Mutex<Option<Vec<u8>>>,
}

impl MemoryCartStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartStorage for MemoryCartStorage {
    async fn load(&self) -> Result<Option<Cart>, CartStorageError> {
        let record = self.record.lock().await;

        record
            .as_deref()
            .map(serde_json::from_slice)
            .transpose()
            .map_err(Into::into)
    }

    async fn save(&self, cart: &Cart) -> Result<(), CartStorageError> {
        let bytes = serde_json::to_vec(cart)?;

        *self.record.lock().await = Some(bytes);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use roastery::{
        pricing::BASE_PRICE,
        profiles::{GrindType, RoastLevel, Sensory, TasteProfile},
    };
    use testresult::TestResult;

    use super::*;

    fn cart() -> TestResult<Cart> {
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
        cart.set_terms_accepted(true);

        Ok(cart)
    }

    #[tokio::test]
    async fn missing_file_loads_nothing() -> TestResult {
        let dir = tempfile::tempdir()?;
        let storage = JsonFileCartStorage::new(dir.path().join("cart.json"));

        assert!(storage.load().await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn saved_cart_is_read_back() -> TestResult {
        let dir = tempfile::tempdir()?;
        let storage = JsonFileCartStorage::new(dir.path().join("nested").join("cart.json"));
        let cart = cart()?;

        storage.save(&cart).await?;

        assert_eq!(storage.load().await?, Some(cart));
        assert!(!dir.path().join("nested").join("cart.json.tmp").exists());

        Ok(())
    }

    #[tokio::test]
    async fn record_uses_persisted_field_names() -> TestResult {
        let dir = tempfile::tempdir()?;
        let storage = JsonFileCartStorage::new(dir.path().join("cart.json"));

        storage.save(&cart()?).await?;

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(storage.path())?)?;

        assert_eq!(raw["termsAccepted"], true);
        assert_eq!(raw["items"][0]["quantity"], 2);
        assert_eq!(raw["items"][0]["tasteProfile"]["name"], "Morning Pour");

        Ok(())
    }

    #[tokio::test]
    async fn corrupt_record_is_an_error() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("cart.json");
        std::fs::write(&path, b"{ not json")?;

        let result = JsonFileCartStorage::new(path).load().await;

        assert!(
            matches!(result, Err(CartStorageError::Serialization(_))),
            "expected Serialization, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn memory_storage_round_trips() -> TestResult {
        let storage = MemoryCartStorage::new();
        let cart = cart()?;

        assert!(storage.load().await?.is_none());

        storage.save(&cart).await?;

        assert_eq!(storage.load().await?, Some(cart));

        Ok(())
    }
}
