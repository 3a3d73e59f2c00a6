// src/error.rs

use thiserror::Error;

/// Fatal configuration problems. Raised before a drive starts evaluating
/// events, never from inside a control tick.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unsupported car: {0}")]
    UnsupportedCar(String),

    #[error("Invalid car params: {0}")]
    InvalidParams(String),
}
