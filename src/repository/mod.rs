//! Persistence for restaurants and their read-only associations.
//!
//! [`RestaurantStore`] is the only place that knows how rows are laid out.
//! Two implementations exist: [`postgres::PgRestaurantStore`] for deployments
//! and [`memory::MemoryRestaurantStore`] for local runs and tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::category::RestaurantCategory;
use crate::models::product::ProductWithCategory;
use crate::models::restaurant::{NewRestaurant, Restaurant, RestaurantChanges};

pub use memory::MemoryRestaurantStore;
pub use postgres::PgRestaurantStore;

/// Failure of the underlying storage. Surfaced as-is, never retried.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("constraint violated: {0}")]
    Constraint(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantWithCategory {
    pub restaurant: Restaurant,
    pub restaurant_category: RestaurantCategory,
}

/// Everything the detail view needs, fetched with explicit joins. Products come back unordered.
#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantDetailRecord {
    pub restaurant: Restaurant,
    pub restaurant_category: RestaurantCategory,
    pub products: Vec<ProductWithCategory>,
}

/// Result of a delete, so callers can tell "removed" from "nothing to remove".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Removed,
    NoneRemoved,
}

#[async_trait]
pub trait RestaurantStore: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<Option<Restaurant>, StoreError>;

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<RestaurantWithCategory>, StoreError>;

    async fn list_all(&self) -> Result<Vec<RestaurantWithCategory>, StoreError>;

    async fn find_detail(&self, id: i64) -> Result<Option<RestaurantDetailRecord>, StoreError>;

    /// Inserts a restaurant for `owner_id`. `pinned_at` is the creation time when
    /// `new.pinned` is set, null otherwise.
    async fn create(&self, new: NewRestaurant, owner_id: i64) -> Result<Restaurant, StoreError>;

    /// General field update. Never touches `pinned_at`.
    async fn update_fields(
        &self,
        id: i64,
        changes: RestaurantChanges,
    ) -> Result<Option<Restaurant>, StoreError>;

    async fn delete(&self, id: i64) -> Result<DeleteOutcome, StoreError>;

    /// Opens a transaction. Dropping the handle without calling
    /// [`RestaurantTx::commit`] rolls it back.
    async fn begin(&self) -> Result<Box<dyn RestaurantTx>, StoreError>;

    /// Writes `pinned_at` in its own transaction. Returns `None` when `id` does not exist.
    async fn set_pinned_at(
        &self,
        id: i64,
        value: Option<DateTime<Utc>>,
    ) -> Result<Option<Restaurant>, StoreError> {
        let mut tx = self.begin().await?;
        let updated = tx.set_pinned_at(id, value).await?;
        if updated.is_some() {
            tx.commit().await?;
        }
        Ok(updated)
    }
}

#[async_trait]
pub trait RestaurantTx: Send {
    /// Reads a row and holds it against concurrent writers until the transaction ends.
    async fn get_by_id(&mut self, id: i64) -> Result<Option<Restaurant>, StoreError>;

    /// The only sanctioned way to change `pinned_at`. Returns the row as written.
    async fn set_pinned_at(
        &mut self,
        id: i64,
        value: Option<DateTime<Utc>>,
    ) -> Result<Option<Restaurant>, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
