//! Restaurant operations on top of a [`RestaurantStore`](crate::repository::RestaurantStore).
//!
//! Services hold no state of their own and do not log; failures are
//! returned to the caller as [`RestaurantError`].

pub mod pin;
pub mod view;

use thiserror::Error;

use crate::repository::StoreError;

pub use pin::PinToggleService;
pub use view::RestaurantView;

#[derive(Debug, Error)]
pub enum RestaurantError {
    #[error("restaurant {0} not found")]
    NotFound(i64),
    #[error(transparent)]
    Storage(#[from] StoreError),
    #[error("validation failed: {0}")]
    Validation(String),
}
