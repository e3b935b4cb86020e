//! Shared data models.

use serde::{Deserialize, Serialize};

/// A validated dining request, handed from the dialog handler to the
/// fulfillment worker through the request queue.
///
/// The wire shape is a flat JSON object; the field names are part of the
/// queue contract and every value is carried as the string the slot held.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FulfillmentRequest {
    pub cuisine: String,
    pub email: String,
    pub location: String,
    #[serde(rename = "noofPeople")]
    pub party_size: String,
    pub date: String,
    pub time: String,
}
