//! Card storage backends.
//!
//! [`Storage`] is the store handed to the HTTP layer. It dispatches to either
//! the in-memory collection or the `credit_cards` table; both backends share the
//! same contract:
//!
//! - `save` assigns the identifier and returns the stored record.
//! - `list` keeps insertion order and filters by a case-insensitive holder substring.
//! - `update` replaces the record with the same id, or fails with [`StorageError::NotFound`].
//! - `delete` removes the record with the given id and is a no-op when it is absent.

pub mod memory;
pub mod postgres;

use super::model::{Card, CardRequest};
use std::sync::Arc;
use thiserror::Error;

use self::{memory::MemoryStorage, postgres::PgStorage};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("credit card not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub enum Storage {
    Memory(Arc<MemoryStorage>),
    Postgres(PgStorage),
}

impl Storage {
    /// Empty in-memory store.
    #[must_use]
    pub fn memory() -> Self {
        Self::Memory(Arc::new(MemoryStorage::new()))
    }

    /// Short name used in logs and the health report.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Postgres(_) => "postgres",
        }
    }

    /// # Errors
    /// Returns an error if the record could not be persisted.
    pub async fn save(&self, card: CardRequest) -> Result<Card, StorageError> {
        match self {
            Self::Memory(store) => Ok(store.save(card).await),
            Self::Postgres(store) => store.save(card).await,
        }
    }

    /// # Errors
    /// Returns an error if the backend could not be read.
    pub async fn list(&self, holder: &str) -> Result<Vec<Card>, StorageError> {
        match self {
            Self::Memory(store) => Ok(store.list(holder).await),
            Self::Postgres(store) => store.list(holder).await,
        }
    }

    /// # Errors
    /// Returns [`StorageError::NotFound`] if no record has `card.id`.
    pub async fn update(&self, card: Card) -> Result<Card, StorageError> {
        match self {
            Self::Memory(store) => store.update(card).await,
            Self::Postgres(store) => store.update(card).await,
        }
    }

    /// # Errors
    /// Returns an error only when the backend fails; a missing id is not an error.
    pub async fn delete(&self, id: i32) -> Result<(), StorageError> {
        match self {
            Self::Memory(store) => {
                store.delete(id).await;
                Ok(())
            }
            Self::Postgres(store) => store.delete(id).await,
        }
    }

    /// # Errors
    /// Returns an error if the backend is unreachable.
    pub async fn ping(&self) -> Result<(), StorageError> {
        match self {
            Self::Memory(_) => Ok(()),
            Self::Postgres(store) => store.ping().await,
        }
    }
}

impl From<MemoryStorage> for Storage {
    fn from(store: MemoryStorage) -> Self {
        Self::Memory(Arc::new(store))
    }
}

impl From<PgStorage> for Storage {
    fn from(store: PgStorage) -> Self {
        Self::Postgres(store)
    }
}
