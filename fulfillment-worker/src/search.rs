//! Restaurant search index client and hit sampling.
//!
//! The index is queried twice per request: once for the total hit count for
//! a cuisine, then once per sampled index with `from`/`size=1` to resolve a
//! single business identifier.

use rand::Rng;
use serde::Deserialize;
use shared::{Error, Result};

/// How many suggestions to make when the index has enough matches.
const MAX_SUGGESTIONS: usize = 3;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Debug, Deserialize)]
struct Hits {
    total: u64,
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: HitSource,
}

#[derive(Debug, Deserialize)]
struct HitSource {
    #[serde(rename = "Business ID")]
    business_id: String,
}

/// Client for the managed search domain holding the restaurant index.
pub struct SearchClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl SearchClient {
    pub fn new(endpoint: String) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            endpoint,
        }
    }

    /// Total number of restaurants indexed for a cuisine.
    pub async fn hit_count(&self, cuisine: &str) -> Result<u64> {
        let response = self
            .query(&[("q", format!("cuisine:{}", cuisine))])
            .await?;
        Ok(response.hits.total)
    }

    /// Resolve the business identifier of the single hit at `index` in the
    /// ranked result list for a cuisine.
    pub async fn business_id_at(&self, cuisine: &str, index: u64) -> Result<String> {
        let response = self
            .query(&[
                ("from", index.to_string()),
                ("size", "1".to_string()),
                ("q", format!("cuisine:{}", cuisine)),
            ])
            .await?;

        response
            .hits
            .hits
            .into_iter()
            .next()
            .map(|hit| hit.source.business_id)
            .ok_or_else(|| {
                Error::Search(format!("No hit at index {} for cuisine {}", index, cuisine))
            })
    }

    async fn query(&self, params: &[(&str, String)]) -> Result<SearchResponse> {
        let url = format!("{}/restaurants/_search", self.endpoint);

        let response = self
            .http_client
            .get(&url)
            .query(params)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| Error::Search(format!("Search request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Search(format!(
                "Search request returned {}",
                response.status()
            )));
        }

        response
            .json::<SearchResponse>()
            .await
            .map_err(|e| Error::Search(format!("Failed to parse search response: {}", e)))
    }
}

/// Pick the result indices to suggest from a hit count: three distinct
/// indices when more than three hits exist, one when at least one exists,
/// none when the index has no match for the cuisine.
pub fn pick_indices<R: Rng + ?Sized>(total_hits: u64, rng: &mut R) -> Vec<u64> {
    let total = total_hits as usize;
    let count = match total {
        0 => return Vec::new(),
        1..=MAX_SUGGESTIONS => 1,
        _ => MAX_SUGGESTIONS,
    };

    rand::seq::index::sample(rng, total, count)
        .into_iter()
        .map(|index| index as u64)
        .collect()
}
