//! Suggestion cache: the single persisted record remembering the last
//! recommendation sent.
//!
//! The dialog handler reads it to greet repeat visitors; the fulfillment
//! worker upserts it after every successful email. Concurrent writers race
//! with last-writer-wins semantics, which is acceptable for this record.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;

use crate::{Error, Result};

/// Partition key value of the one record this store keeps.
const RECORD_KEY: &str = "singleton";

/// Key attribute name in the suggestions table.
const KEY_ATTR: &str = "identity";

/// The persisted suggestion record.
#[derive(Debug, Clone)]
pub struct SuggestionRecord {
    /// True once at least one suggestion email has been sent.
    pub repeat_visitor: bool,
    /// The numbered suggestion list from the most recent email.
    pub last_suggestion: String,
}

impl SuggestionRecord {
    fn from_item(item: &HashMap<String, AttributeValue>) -> Self {
        // Absent attributes read as "no suggestion ever sent".
        let repeat_visitor = item
            .get("repeat_visitor")
            .and_then(|value| value.as_bool().ok())
            .copied()
            .unwrap_or(false);
        let last_suggestion = item
            .get("last_suggestion")
            .and_then(|value| value.as_s().ok())
            .cloned()
            .unwrap_or_default();

        Self {
            repeat_visitor,
            last_suggestion,
        }
    }
}

/// Store for the singleton suggestion record.
pub struct SuggestionStore {
    client: DynamoClient,
    table: String,
}

impl SuggestionStore {
    /// Create a new store over the given table.
    pub fn new(client: DynamoClient, table: String) -> Self {
        Self { client, table }
    }

    /// Fetch the record. A missing item means this is a first-time visitor.
    pub async fn get(&self) -> Result<Option<SuggestionRecord>> {
        let response = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(KEY_ATTR, AttributeValue::S(RECORD_KEY.to_string()))
            .send()
            .await
            .map_err(|e| Error::Aws(format!("Failed to read suggestion record: {}", e)))?;

        Ok(response.item().map(SuggestionRecord::from_item))
    }

    /// Upsert the record after a successful send.
    pub async fn put(&self, record: &SuggestionRecord) -> Result<()> {
        self.client
            .update_item()
            .table_name(&self.table)
            .key(KEY_ATTR, AttributeValue::S(RECORD_KEY.to_string()))
            .update_expression("SET repeat_visitor = :r, last_suggestion = :s")
            .expression_attribute_values(":r", AttributeValue::Bool(record.repeat_visitor))
            .expression_attribute_values(":s", AttributeValue::S(record.last_suggestion.clone()))
            .send()
            .await
            .map_err(|e| Error::Aws(format!("Failed to update suggestion record: {}", e)))?;

        Ok(())
    }
}
