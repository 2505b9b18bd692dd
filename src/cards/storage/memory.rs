use super::StorageError;
use crate::cards::model::{Card, CardRequest};
use tokio::sync::RwLock;

/// Process-local card collection.
///
/// Each read-modify-write sequence (next id then push, find then replace,
/// find then remove) runs under a single write lock acquisition.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    cards: RwLock<Vec<Card>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records, kept in the given order.
    #[must_use]
    pub fn with_cards(cards: Vec<Card>) -> Self {
        Self {
            cards: RwLock::new(cards),
        }
    }

    /// Store `card` with id `max(id) + 1`, or `1` when empty.
    pub async fn save(&self, card: CardRequest) -> Card {
        let mut cards = self.cards.write().await;
        let next_id = cards.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let card = card.into_card(next_id);
        cards.push(card.clone());
        card
    }

    pub async fn list(&self, holder: &str) -> Vec<Card> {
        let cards = self.cards.read().await;
        if holder.is_empty() {
            return cards.clone();
        }

        let needle = holder.to_lowercase();
        cards
            .iter()
            .filter(|card| card.holder.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// # Errors
    /// Returns [`StorageError::NotFound`] if no record has `card.id`.
    pub async fn update(&self, card: Card) -> Result<Card, StorageError> {
        let mut cards = self.cards.write().await;
        let slot = cards
            .iter_mut()
            .find(|c| c.id == card.id)
            .ok_or(StorageError::NotFound)?;
        *slot = card.clone();
        Ok(card)
    }

    pub async fn delete(&self, id: i32) {
        let mut cards = self.cards.write().await;
        if let Some(index) = cards.iter().position(|c| c.id == id) {
            cards.remove(index);
        }
    }

    /// Snapshot of every stored record.
    pub async fn cards(&self) -> Vec<Card> {
        self.cards.read().await.clone()
    }
}
