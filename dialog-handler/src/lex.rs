//! Wire types for the bot framework's code-hook contract.
//!
//! The event shape is what the framework delivers to the dialog code hook;
//! the response is the fixed dialog-action vocabulary it interprets. Field
//! names on both sides are part of the contract.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Slot names declared on the dining suggestion intent.
pub const CUISINE: &str = "Cuisine";
pub const PARTY_SIZE: &str = "NoofPeople";
pub const DATE: &str = "Date";
pub const TIME: &str = "Time";
pub const LOCATION: &str = "Location";
pub const EMAIL: &str = "Email";

/// Slot mapping as the framework sends it: declared slots are present,
/// unfilled ones as null.
pub type Slots = HashMap<String, Option<String>>;

/// Session attribute mapping, echoed back on most actions.
pub type SessionAttributes = HashMap<String, String>;

/// One conversation turn as delivered by the bot framework.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexEvent {
    #[serde(default)]
    pub bot: Option<BotIdentity>,
    #[serde(default)]
    pub user_id: Option<String>,
    pub invocation_source: InvocationSource,
    pub current_intent: CurrentIntent,
    #[serde(default)]
    pub session_attributes: Option<SessionAttributes>,
}

/// Identity of the bot the framework invoked us for.
#[derive(Debug, Deserialize)]
pub struct BotIdentity {
    pub name: String,
}

/// Whether the framework is still collecting slots or wants the final
/// action. Anything outside this vocabulary fails the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum InvocationSource {
    DialogCodeHook,
    FulfillmentCodeHook,
}

/// The intent under discussion and its current slot values.
#[derive(Debug, Deserialize)]
pub struct CurrentIntent {
    pub name: String,
    #[serde(default)]
    pub slots: Slots,
}

/// Reply to one conversation turn.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LexResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_attributes: Option<SessionAttributes>,
    pub dialog_action: DialogAction,
}

/// The fixed action vocabulary the bot framework interprets.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum DialogAction {
    ElicitSlot {
        intent_name: String,
        slots: Slots,
        slot_to_elicit: String,
        message: Message,
    },
    ElicitIntent {
        message: Message,
    },
    Delegate {
        slots: Slots,
    },
    Close {
        fulfillment_state: String,
        message: Message,
    },
}

/// Plain-text message content.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub content_type: String,
    pub content: String,
}

impl Message {
    fn plain(content: impl Into<String>) -> Self {
        Self {
            content_type: "PlainText".to_string(),
            content: content.into(),
        }
    }
}

/// Ask the user to correct one slot. The violated slot is cleared in the
/// echoed mapping so the framework re-collects it.
pub fn elicit_slot(
    session_attributes: Option<SessionAttributes>,
    intent_name: &str,
    mut slots: Slots,
    slot_to_elicit: &str,
    message: impl Into<String>,
) -> LexResponse {
    slots.insert(slot_to_elicit.to_string(), None);

    LexResponse {
        session_attributes: Some(session_attributes.unwrap_or_default()),
        dialog_action: DialogAction::ElicitSlot {
            intent_name: intent_name.to_string(),
            slots,
            slot_to_elicit: slot_to_elicit.to_string(),
            message: Message::plain(message),
        },
    }
}

/// Prompt for a fresh intent with a plain message.
pub fn elicit_intent(message: impl Into<String>) -> LexResponse {
    LexResponse {
        session_attributes: None,
        dialog_action: DialogAction::ElicitIntent {
            message: Message::plain(message),
        },
    }
}

/// Hand control back to the framework to keep collecting slots.
pub fn delegate(session_attributes: Option<SessionAttributes>, slots: Slots) -> LexResponse {
    LexResponse {
        session_attributes: Some(session_attributes.unwrap_or_default()),
        dialog_action: DialogAction::Delegate { slots },
    }
}

/// End the intent with a fulfillment state and a closing message.
pub fn close(
    session_attributes: Option<SessionAttributes>,
    fulfillment_state: &str,
    message: impl Into<String>,
) -> LexResponse {
    LexResponse {
        session_attributes: Some(session_attributes.unwrap_or_default()),
        dialog_action: DialogAction::Close {
            fulfillment_state: fulfillment_state.to_string(),
            message: Message::plain(message),
        },
    }
}
