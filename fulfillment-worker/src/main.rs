//! Fulfillment Worker Lambda - Turns queued dining requests into emails.
//!
//! This Lambda runs on a schedule via EventBridge and:
//! 1. Drains pending requests from the fulfillment queue
//! 2. Samples matching restaurants from the search index
//! 3. Enriches each pick from the details table
//! 4. Emails the composed recommendation and caches it for the next greeting
//! 5. Deletes each message only after its email and cache update succeed

mod restaurants;
mod search;

use std::sync::Arc;

use aws_sdk_ses::types::{Body, Content, Destination, Message as SesMessage};
use aws_sdk_sqs::types::Message as QueueMessage;
use aws_sdk_sqs::Client as SqsClient;
use lambda_runtime::{run, service_fn, LambdaEvent};
use serde::{Deserialize, Serialize};
use shared::{Config, Error, FulfillmentRequest, Result, SuggestionRecord, SuggestionStore};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::restaurants::{Restaurant, RestaurantStore};
use crate::search::SearchClient;

const MAX_MESSAGES_PER_INVOCATION: i32 = 10;
const VISIBILITY_TIMEOUT_SECONDS: i32 = 30;
const EMAIL_SUBJECT: &str = "Your restaurant recommendations";

#[derive(Debug, Deserialize)]
struct ScheduledEvent {
    #[serde(default, rename = "detail-type")]
    detail_type: String,
}

#[derive(Debug, Serialize)]
struct WorkerResponse {
    messages_received: u32,
    suggestions_sent: u32,
    errors: u32,
}

/// Outcome of one queue message that did not error.
enum Outcome {
    /// Email sent, cache updated, message deleted.
    Sent,
    /// The index had no match for the cuisine; the message was left queued.
    NoMatches,
}

struct AppState {
    sqs_client: SqsClient,
    ses_client: aws_sdk_ses::Client,
    search: SearchClient,
    restaurants: RestaurantStore,
    suggestions: SuggestionStore,
    config: Config,
}

impl AppState {
    async fn new() -> Result<Self> {
        let config = Config::from_env()?;
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let sqs_client = SqsClient::new(&aws_config);
        let ses_client = aws_sdk_ses::Client::new(&aws_config);
        let dynamo_client = aws_sdk_dynamodb::Client::new(&aws_config);

        let search = SearchClient::new(config.search_endpoint.clone());
        let restaurants =
            RestaurantStore::new(dynamo_client.clone(), config.restaurants_table.clone());
        let suggestions = SuggestionStore::new(dynamo_client, config.suggestions_table.clone());

        Ok(Self {
            sqs_client,
            ses_client,
            search,
            restaurants,
            suggestions,
            config,
        })
    }
}

/// The numbered suggestion list and the email that wraps it. The list alone
/// is what gets cached for the next greeting.
struct Recommendation {
    email_body: String,
    suggestion_list: String,
}

fn compose_recommendation(request: &FulfillmentRequest, picks: &[Restaurant]) -> Recommendation {
    let suggestion_list = picks
        .iter()
        .enumerate()
        .map(|(index, restaurant)| {
            format!(
                "{}. {}, located at {}, Rating: {}, No. of Reviews: {}",
                index + 1,
                restaurant.name,
                restaurant.address,
                restaurant.rating,
                restaurant.review_count
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let email_body = format!(
        "Hello!\nHere are my {} Restaurant Suggestions for {} People, on {} at {}:\n{}\n\nHope you enjoy your meal!\n\nRegards,\nDining Concierge",
        request.cuisine, request.party_size, request.date, request.time, suggestion_list
    );

    Recommendation {
        email_body,
        suggestion_list,
    }
}

async fn send_plain_email(state: &AppState, to_email: &str, body: &str) -> Result<()> {
    let subject = Content::builder()
        .data(EMAIL_SUBJECT)
        .charset("UTF-8")
        .build()
        .map_err(|e| Error::Aws(format!("Failed to build subject: {}", e)))?;

    let text_content = Content::builder()
        .data(body)
        .charset("UTF-8")
        .build()
        .map_err(|e| Error::Aws(format!("Failed to build text body: {}", e)))?;

    let message = SesMessage::builder()
        .subject(subject)
        .body(Body::builder().text(text_content).build())
        .build();

    let destination = Destination::builder().to_addresses(to_email).build();

    state
        .ses_client
        .send_email()
        .source(&state.config.from_email)
        .destination(destination)
        .message(message)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to send email: {}", e)))?;

    Ok(())
}

/// Process one queued request end to end. Any error leaves the message
/// undeleted so the queue redelivers it after the visibility window.
async fn process_message(state: &AppState, message: &QueueMessage) -> Result<Outcome> {
    let receipt_handle = message
        .receipt_handle()
        .ok_or_else(|| Error::Internal("Queue message has no receipt handle".to_string()))?;
    let body = message
        .body()
        .ok_or_else(|| Error::Internal("Queue message has no body".to_string()))?;

    let request: FulfillmentRequest = serde_json::from_str(body)?;
    info!(
        cuisine = %request.cuisine,
        email = %request.email,
        "Processing fulfillment request"
    );

    let total_hits = state.search.hit_count(&request.cuisine).await?;
    let indices = search::pick_indices(total_hits, &mut rand::thread_rng());
    if indices.is_empty() {
        warn!(
            cuisine = %request.cuisine,
            "No restaurants indexed for cuisine, leaving message for retry"
        );
        return Ok(Outcome::NoMatches);
    }

    let mut picks = Vec::with_capacity(indices.len());
    for index in indices {
        let business_id = state.search.business_id_at(&request.cuisine, index).await?;
        picks.push(state.restaurants.get(&business_id).await?);
    }

    let recommendation = compose_recommendation(&request, &picks);

    send_plain_email(state, &request.email, &recommendation.email_body).await?;

    state
        .suggestions
        .put(&SuggestionRecord {
            repeat_visitor: true,
            last_suggestion: recommendation.suggestion_list,
        })
        .await?;

    state
        .sqs_client
        .delete_message()
        .queue_url(&state.config.queue_url)
        .receipt_handle(receipt_handle)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to delete queue message: {}", e)))?;

    info!(email = %request.email, "Suggestion emailed and cached");

    Ok(Outcome::Sent)
}

async fn handler(
    state: Arc<AppState>,
    event: LambdaEvent<ScheduledEvent>,
) -> std::result::Result<WorkerResponse, lambda_runtime::Error> {
    info!(
        detail_type = %event.payload.detail_type,
        "Draining fulfillment queue"
    );

    let response = state
        .sqs_client
        .receive_message()
        .queue_url(&state.config.queue_url)
        .max_number_of_messages(MAX_MESSAGES_PER_INVOCATION)
        .visibility_timeout(VISIBILITY_TIMEOUT_SECONDS)
        .wait_time_seconds(0)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to receive queue messages: {}", e)))?;

    let messages = response.messages();
    if messages.is_empty() {
        info!("Queue is empty");
        return Ok(WorkerResponse {
            messages_received: 0,
            suggestions_sent: 0,
            errors: 0,
        });
    }

    let mut suggestions_sent = 0u32;
    let mut errors = 0u32;

    for message in messages {
        match process_message(&state, message).await {
            Ok(Outcome::Sent) => suggestions_sent += 1,
            Ok(Outcome::NoMatches) => {}
            Err(e) => {
                error!(error = %e, "Failed to process queue message");
                errors += 1;
            }
        }
    }

    let response = WorkerResponse {
        messages_received: messages.len() as u32,
        suggestions_sent,
        errors,
    };

    info!(
        received = response.messages_received,
        sent = response.suggestions_sent,
        errors = response.errors,
        "Fulfillment worker complete"
    );

    Ok(response)
}

#[tokio::main]
async fn main() -> std::result::Result<(), lambda_runtime::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);
    let state_clone = state.clone();

    run(service_fn(move |event| {
        let state = state_clone.clone();
        async move { handler(state, event).await }
    }))
    .await
}
