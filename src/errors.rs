//! Unified error types and result handling for the whole crate.
//!
//! Every fallible operation returns the crate-wide [`Result`] alias. The
//! first four variants carry the domain error taxonomy (missing records,
//! uniqueness conflicts, rejected input, stock shortfalls); the remaining
//! variants wrap infrastructure failures and map to internal errors at the
//! HTTP boundary.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested record does not exist or is soft-deleted
    #[error("{message}")]
    NotFound {
        /// Human-readable description of what was not found
        message: String,
    },

    /// A uniqueness rule or dependency rule blocks the operation
    #[error("{message}")]
    Conflict {
        /// Human-readable description of the conflict
        message: String,
    },

    /// The request payload or parameters are rejected by validation
    #[error("{message}")]
    InvalidInput {
        /// Human-readable description of the rejected input
        message: String,
    },

    /// A stock mutation would leave the stock negative
    #[error("Stock insuficiente. Disponible: {disponible}, solicitado: {solicitado}")]
    InsufficientStock {
        /// Stock currently available
        disponible: i32,
        /// Quantity the operation required
        solicitado: i32,
    },

    /// Configuration loading or parsing failed
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// Database error bubbled up from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// JSON serialization or deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV writing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::NotFound`] with the given message.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::Conflict`] with the given message.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Shorthand for an [`Error::InvalidInput`] with the given message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
