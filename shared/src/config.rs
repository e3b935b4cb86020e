//! Configuration management for Lambda functions.

use std::env;

use chrono::NaiveDateTime;
use chrono_tz::Tz;

use crate::{Error, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the fulfillment request queue
    pub queue_url: String,
    /// Base URL of the managed search domain holding the restaurant index
    pub search_endpoint: String,
    /// Fixed sender address for suggestion emails
    pub from_email: String,
    /// Restaurant details table name
    pub restaurants_table: String,
    /// Suggestion cache table name
    pub suggestions_table: String,
    /// Timezone the booking rules are evaluated in
    pub timezone: Tz,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let timezone = match env::var("BOT_TIMEZONE") {
            Ok(name) => name
                .parse::<Tz>()
                .map_err(|_| Error::Config(format!("Invalid BOT_TIMEZONE: {}", name)))?,
            Err(_) => chrono_tz::America::New_York,
        };

        Ok(Self {
            queue_url: require("QUEUE_URL")?,
            search_endpoint: require("SEARCH_ENDPOINT")?,
            from_email: require("FROM_EMAIL")?,
            restaurants_table: env::var("RESTAURANTS_TABLE")
                .unwrap_or_else(|_| "yelp-restaurants".to_string()),
            suggestions_table: env::var("SUGGESTIONS_TABLE")
                .unwrap_or_else(|_| "restaurantSuggestionStore".to_string()),
            timezone,
        })
    }

    /// Current wall-clock time in the bot's timezone.
    pub fn local_now(&self) -> NaiveDateTime {
        chrono::Utc::now().with_timezone(&self.timezone).naive_local()
    }
}

fn require(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("{} not set", name)))
}
