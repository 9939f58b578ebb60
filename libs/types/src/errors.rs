//! Error taxonomy for the shared types

use thiserror::Error;

/// Errors from numeric boundary conversions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NumericError {
    #[error("price out of range: {value}")]
    PriceOutOfRange { value: String },

    #[error("invalid quantity: {value}")]
    InvalidQuantity { value: String },
}
