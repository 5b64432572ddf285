//! Errors raised while parsing fundamental types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid unit hash: {0}")]
    InvalidUnitHash(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid witness parameters: {0}")]
    InvalidWitnessParams(String),
}
