//! Shared library for Dining Concierge Lambda functions.
//!
//! This crate provides the configuration, error type, queue wire model, and
//! suggestion cache used by both the dialog handler and the fulfillment
//! worker.

pub mod config;
pub mod error;
pub mod models;
pub mod suggestions;

pub use config::Config;
pub use error::{Error, Result};
pub use models::FulfillmentRequest;
pub use suggestions::{SuggestionRecord, SuggestionStore};
