use thiserror::Error;

use crate::persistence::PersistenceError;

/// Errors returned by every storefront operation.
///
/// None of these are fatal: each failure leaves carts, stock and orders in
/// the state they had before the call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: u32,
        requested: u32,
        available: u32,
    },
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Product {0} is no longer available")]
    ProductUnavailable(u32),
    #[error("Cart line {index} out of range (cart has {len} lines)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Unknown shipping method: {0}")]
    UnknownShippingMethod(String),
    #[error("Username already taken: {0}")]
    DuplicateUsername(String),
    #[error("Invalid username or password")]
    AuthenticationError,
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Persistence error: {0}")]
    PersistenceError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl StoreError {
    /// True for errors caused by malformed caller input.
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::ValidationError(_) | StoreError::MissingFields(_))
    }
}

impl From<PersistenceError> for StoreError {
    fn from(e: PersistenceError) -> Self {
        StoreError::PersistenceError(e.to_string())
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
