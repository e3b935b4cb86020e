//! Error types for Dining Concierge Lambda functions.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Dining Concierge Lambda functions.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Search index error
    #[error("Search error: {0}")]
    Search(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A table item or attribute that should exist is missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// A slot the fulfillment contract requires was absent
    #[error("Missing required slot: {0}")]
    MissingSlot(&'static str),

    /// Conversation intent this bot does not handle
    #[error("Intent with name {0} not supported")]
    UnsupportedIntent(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
