//! Dialog Handler Lambda - Validates conversation turns and enqueues requests.
//!
//! This Lambda is invoked by the Lex bot as its code hook and:
//! 1. Routes the turn by intent name
//! 2. Greets the user, replaying the last cached suggestion to repeat visitors
//! 3. Validates dining slots during slot-filling, re-eliciting on violation
//! 4. Enqueues the validated request for the fulfillment worker

mod lex;
mod validation;

use std::sync::Arc;

use aws_sdk_sqs::Client as SqsClient;
use chrono::NaiveDateTime;
use lambda_runtime::{run, service_fn, LambdaEvent};
use shared::{Config, Error, FulfillmentRequest, Result, SuggestionStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::lex::{InvocationSource, LexEvent, LexResponse, SessionAttributes, Slots};
use crate::validation::{validate_dining_request, SlotValues};

const GREETING_INTENT: &str = "GreetingIntent";
const THANK_YOU_INTENT: &str = "ThankYouIntent";
const DINING_SUGGESTIONS_INTENT: &str = "DiningSuggestionsIntent";

struct AppState {
    sqs_client: SqsClient,
    suggestions: SuggestionStore,
    config: Config,
}

impl AppState {
    async fn new() -> Result<Self> {
        let config = Config::from_env()?;
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let sqs_client = SqsClient::new(&aws_config);
        let dynamo_client = aws_sdk_dynamodb::Client::new(&aws_config);
        let suggestions =
            SuggestionStore::new(dynamo_client, config.suggestions_table.clone());

        Ok(Self {
            sqs_client,
            suggestions,
            config,
        })
    }
}

/// Greet the user. Repeat visitors get their previous suggestions back.
async fn handle_greeting(state: &AppState) -> Result<LexResponse> {
    let record = state.suggestions.get().await?;
    Ok(lex::elicit_intent(greeting_message(record.as_ref())))
}

/// Pick the greeting: the cached suggestions for a repeat visitor, the plain
/// welcome otherwise. A missing record is a first-time visitor.
fn greeting_message(record: Option<&shared::SuggestionRecord>) -> String {
    match record {
        Some(record) if record.repeat_visitor && !record.last_suggestion.is_empty() => {
            format!(
                "Welcome back! Here are your previous suggestions! {}",
                record.last_suggestion
            )
        }
        _ => "Hi there! I hope you are doing well today! How can I help?".to_string(),
    }
}

/// Slot-filling turn: validate present slots and either re-elicit the first
/// violated one or hand control back to the framework. Pure given `now`.
fn handle_slot_filling(
    intent_name: &str,
    slots: Slots,
    session_attributes: Option<SessionAttributes>,
    now: NaiveDateTime,
) -> LexResponse {
    let values = SlotValues {
        cuisine: slot_value(&slots, lex::CUISINE),
        party_size: slot_value(&slots, lex::PARTY_SIZE),
        date: slot_value(&slots, lex::DATE),
        time: slot_value(&slots, lex::TIME),
        location: slot_value(&slots, lex::LOCATION),
        email: slot_value(&slots, lex::EMAIL),
    };

    match validate_dining_request(&values, now) {
        Err(violation) => lex::elicit_slot(
            session_attributes,
            intent_name,
            slots,
            violation.slot,
            violation.message,
        ),
        Ok(()) => lex::delegate(session_attributes, slots),
    }
}

/// Snapshot the six queue fields out of the slot mapping. The framework only
/// reaches the fulfillment hook once every slot is filled and valid, so a
/// missing slot here is a caller contract violation.
fn fulfillment_request_from_slots(slots: &Slots) -> Result<FulfillmentRequest> {
    let required = |name: &'static str| -> Result<String> {
        slot_value(slots, name)
            .map(str::to_string)
            .ok_or(Error::MissingSlot(name))
    };

    Ok(FulfillmentRequest {
        cuisine: required(lex::CUISINE)?,
        email: required(lex::EMAIL)?,
        location: required(lex::LOCATION)?,
        party_size: required(lex::PARTY_SIZE)?,
        date: required(lex::DATE)?,
        time: required(lex::TIME)?,
    })
}

/// Fulfillment turn: enqueue the request and confirm without waiting for
/// the worker.
async fn handle_fulfillment(
    state: &AppState,
    slots: &Slots,
    session_attributes: Option<SessionAttributes>,
) -> Result<LexResponse> {
    let request = fulfillment_request_from_slots(slots)?;
    let body = serde_json::to_string(&request)?;

    state
        .sqs_client
        .send_message()
        .queue_url(&state.config.queue_url)
        .message_body(body)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to send queue message: {}", e)))?;

    info!(
        cuisine = %request.cuisine,
        location = %request.location,
        "Fulfillment request enqueued"
    );

    Ok(lex::close(
        session_attributes,
        "Fulfilled",
        "Great! You will receive your suggestion shortly.",
    ))
}

async fn handle_dining_suggestion(state: &AppState, event: LexEvent) -> Result<LexResponse> {
    match event.invocation_source {
        InvocationSource::DialogCodeHook => Ok(handle_slot_filling(
            &event.current_intent.name,
            event.current_intent.slots,
            event.session_attributes,
            state.config.local_now(),
        )),
        InvocationSource::FulfillmentCodeHook => {
            handle_fulfillment(state, &event.current_intent.slots, event.session_attributes).await
        }
    }
}

/// Route the turn by intent name. An unrecognized intent fails the turn.
async fn dispatch(state: &AppState, event: LexEvent) -> Result<LexResponse> {
    info!(
        user_id = event.user_id.as_deref().unwrap_or("unknown"),
        intent = %event.current_intent.name,
        "Dispatching conversation turn"
    );

    match event.current_intent.name.as_str() {
        GREETING_INTENT => handle_greeting(state).await,
        THANK_YOU_INTENT => Ok(lex::elicit_intent("You are welcome!")),
        DINING_SUGGESTIONS_INTENT => handle_dining_suggestion(state, event).await,
        other => Err(Error::UnsupportedIntent(other.to_string())),
    }
}

fn slot_value<'a>(slots: &'a Slots, name: &str) -> Option<&'a str> {
    slots.get(name).and_then(|value| value.as_deref())
}

async fn handler(
    state: Arc<AppState>,
    event: LambdaEvent<LexEvent>,
) -> std::result::Result<LexResponse, lambda_runtime::Error> {
    if let Some(bot) = &event.payload.bot {
        info!(bot = %bot.name, "Received conversation turn");
    }

    Ok(dispatch(&state, event.payload).await?)
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use lex::DialogAction;

    fn noon() -> NaiveDateTime {
        NaiveDateTime::new(
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        )
    }

    fn filled_slots() -> Slots {
        let mut slots = Slots::new();
        slots.insert(lex::LOCATION.to_string(), Some("NYC".to_string()));
        slots.insert(lex::CUISINE.to_string(), Some("italian".to_string()));
        slots.insert(lex::PARTY_SIZE.to_string(), Some("4".to_string()));
        slots.insert(lex::DATE.to_string(), Some("2025-06-15".to_string()));
        slots.insert(lex::TIME.to_string(), Some("19:00".to_string()));
        slots.insert("PhoneNumber".to_string(), Some("5551234567".to_string()));
        slots.insert(lex::EMAIL.to_string(), Some("a@b.com".to_string()));
        slots
    }

    #[test]
    fn test_greeting_for_first_time_visitor() {
        let welcome = "Hi there! I hope you are doing well today! How can I help?";

        assert_eq!(greeting_message(None), welcome);

        let not_yet_visited = shared::SuggestionRecord {
            repeat_visitor: false,
            last_suggestion: String::new(),
        };
        assert_eq!(greeting_message(Some(&not_yet_visited)), welcome);

        // A set flag without any cached text still reads as first-time.
        let flag_only = shared::SuggestionRecord {
            repeat_visitor: true,
            last_suggestion: String::new(),
        };
        assert_eq!(greeting_message(Some(&flag_only)), welcome);
    }

    #[test]
    fn test_greeting_replays_cached_suggestions_verbatim() {
        let record = shared::SuggestionRecord {
            repeat_visitor: true,
            last_suggestion: "1. Ribalta, located at 48 E 12th St, Rating: 4.5, No. of Reviews: 1200"
                .to_string(),
        };

        assert_eq!(
            greeting_message(Some(&record)),
            "Welcome back! Here are your previous suggestions! \
             1. Ribalta, located at 48 E 12th St, Rating: 4.5, No. of Reviews: 1200"
        );
    }

    #[test]
    fn test_valid_slots_delegate() {
        let response = handle_slot_filling(DINING_SUGGESTIONS_INTENT, filled_slots(), None, noon());
        assert!(matches!(response.dialog_action, DialogAction::Delegate { .. }));
    }

    #[test]
    fn test_partial_slots_delegate_when_valid_so_far() {
        let mut slots = Slots::new();
        slots.insert(lex::LOCATION.to_string(), Some("NYC".to_string()));
        slots.insert(lex::CUISINE.to_string(), None);

        let response = handle_slot_filling(DINING_SUGGESTIONS_INTENT, slots, None, noon());
        assert!(matches!(response.dialog_action, DialogAction::Delegate { .. }));
    }

    #[test]
    fn test_violation_elicits_exactly_that_slot() {
        let mut slots = filled_slots();
        slots.insert(lex::CUISINE.to_string(), Some("klingon".to_string()));

        let response = handle_slot_filling(DINING_SUGGESTIONS_INTENT, slots, None, noon());
        match response.dialog_action {
            DialogAction::ElicitSlot {
                slot_to_elicit,
                slots,
                ..
            } => {
                assert_eq!(slot_to_elicit, lex::CUISINE);
                assert_eq!(slots.get(lex::CUISINE), Some(&None));
                assert_eq!(slots.get(lex::LOCATION), Some(&Some("NYC".to_string())));
            }
            other => panic!("expected ElicitSlot, got {:?}", other),
        }
    }

    #[test]
    fn test_fulfillment_request_snapshot() {
        let request = fulfillment_request_from_slots(&filled_slots()).unwrap();
        assert_eq!(request.cuisine, "italian");
        assert_eq!(request.email, "a@b.com");
        assert_eq!(request.location, "NYC");
        assert_eq!(request.party_size, "4");
        assert_eq!(request.date, "2025-06-15");
        assert_eq!(request.time, "19:00");
    }

    #[test]
    fn test_missing_slot_fails_fulfillment_snapshot() {
        let mut slots = filled_slots();
        slots.insert(lex::EMAIL.to_string(), None);

        let err = fulfillment_request_from_slots(&slots).unwrap_err();
        assert!(matches!(err, Error::MissingSlot(lex::EMAIL)));
    }

    #[test]
    fn test_empty_location_is_re_elicited() {
        let mut slots = filled_slots();
        slots.insert(lex::LOCATION.to_string(), Some(String::new()));

        let response = handle_slot_filling(DINING_SUGGESTIONS_INTENT, slots, None, noon());
        match response.dialog_action {
            DialogAction::ElicitSlot { slot_to_elicit, .. } => {
                assert_eq!(slot_to_elicit, lex::LOCATION);
            }
            other => panic!("expected ElicitSlot, got {:?}", other),
        }
    }
}
