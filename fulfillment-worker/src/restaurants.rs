//! Restaurant details table.
//!
//! The table maps `Business ID` to the attributes interpolated into the
//! suggestion message. This system only ever reads it.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use shared::{Error, Result};

const KEY_ATTR: &str = "Business ID";

/// Full details for one restaurant. Rating and review count stay in their
/// stored string form; they are only interpolated, never computed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restaurant {
    pub name: String,
    pub address: String,
    pub rating: String,
    pub review_count: String,
}

impl Restaurant {
    fn from_item(item: &HashMap<String, AttributeValue>) -> Result<Self> {
        Ok(Self {
            name: string_attr(item, "Name")?,
            address: string_attr(item, "Address")?,
            rating: number_attr(item, "Rating")?,
            review_count: number_attr(item, "Number of Reviews")?,
        })
    }
}

fn string_attr(item: &HashMap<String, AttributeValue>, name: &str) -> Result<String> {
    item.get(name)
        .and_then(|value| value.as_s().ok())
        .cloned()
        .ok_or_else(|| Error::NotFound(format!("Restaurant attribute {}", name)))
}

fn number_attr(item: &HashMap<String, AttributeValue>, name: &str) -> Result<String> {
    item.get(name)
        .and_then(|value| value.as_n().ok())
        .cloned()
        .ok_or_else(|| Error::NotFound(format!("Restaurant attribute {}", name)))
}

/// Read-only client for the details table.
pub struct RestaurantStore {
    client: DynamoClient,
    table: String,
}

impl RestaurantStore {
    pub fn new(client: DynamoClient, table: String) -> Self {
        Self { client, table }
    }

    /// Look up one restaurant by business identifier.
    pub async fn get(&self, business_id: &str) -> Result<Restaurant> {
        let response = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(KEY_ATTR, AttributeValue::S(business_id.to_string()))
            .send()
            .await
            .map_err(|e| Error::Aws(format!("Failed to read restaurant details: {}", e)))?;

        let item = response
            .item()
            .ok_or_else(|| Error::NotFound(format!("Restaurant {}", business_id)))?;

        Restaurant::from_item(item)
    }
}
