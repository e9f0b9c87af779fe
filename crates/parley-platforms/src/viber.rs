//! Viber REST bot callbacks.
//!
//! Viber delivers every callback kind in one envelope; which fields are set
//! depends on `event`.

use std::any::Any;

use parley_core::{Event, ResolveError, ResolveResult, entity_id};
use serde::Deserialize;

use crate::expect_event;

pub const PLATFORM: &str = "viber";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub country: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Message {
    /// `text`, `picture`, `contact`, `location`, ...
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<String>,
    pub media: Option<String>,
    pub tracking_data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Callback {
    pub event: String,
    pub timestamp: i64,
    pub message_token: Option<i64>,
    /// Set for `message`.
    pub sender: Option<User>,
    pub message: Option<Message>,
    /// Set for `subscribed` and `conversation_started`.
    pub user: Option<User>,
    /// Set for `unsubscribed` and `failed`.
    pub user_id: Option<String>,
    pub context: Option<String>,
    pub subscribed: Option<bool>,
}

impl Callback {
    /// Id of the user the callback is about.
    pub fn sender_id(&self) -> Option<&str> {
        self.sender
            .as_ref()
            .or(self.user.as_ref())
            .map(|u| u.id.as_str())
            .or(self.user_id.as_deref())
    }

    /// Text of a `message` callback.
    pub fn text(&self) -> Option<&str> {
        self.message.as_ref().and_then(|m| m.text.as_deref())
    }
}

impl Event for Callback {
    fn event_name(&self) -> &'static str {
        match self.event.as_str() {
            "message" => "viber.message",
            "subscribed" => "viber.subscribed",
            "unsubscribed" => "viber.unsubscribed",
            "conversation_started" => "viber.conversation_started",
            "delivered" => "viber.delivered",
            "seen" => "viber.seen",
            "failed" => "viber.failed",
            _ => "viber.other",
        }
    }

    fn platform(&self) -> &'static str {
        PLATFORM
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Resolves `viber_<user id>` from a [`Callback`].
pub fn resolve_entity_id(event: &dyn Event) -> ResolveResult<String> {
    let callback = expect_event::<Callback>(event, PLATFORM)?;
    let sender = callback
        .sender_id()
        .ok_or(ResolveError::MissingSender { platform: PLATFORM })?;
    Ok(entity_id(PLATFORM, sender))
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use tokio_test::{assert_err, assert_ok};

    use super::*;

    fn callback(value: Value) -> Callback {
        assert_ok!(serde_json::from_value(value))
    }

    #[test]
    fn test_sender_precedence() {
        let message = callback(json!({
            "event": "message",
            "timestamp": 1,
            "message_token": 9,
            "sender": {"id": "abc=", "name": "Ann"},
            "message": {"type": "text", "text": "hi"}
        }));
        let subscribed = callback(json!({
            "event": "subscribed",
            "timestamp": 1,
            "user": {"id": "abc=", "name": "Ann"}
        }));
        let unsubscribed = callback(json!({
            "event": "unsubscribed",
            "timestamp": 1,
            "user_id": "abc="
        }));

        for event in [&message, &subscribed, &unsubscribed] {
            assert_eq!(assert_ok!(resolve_entity_id(event)), "viber_abc=");
        }
        assert_eq!(message.text(), Some("hi"));
        assert_eq!(unsubscribed.event_name(), "viber.unsubscribed");
    }

    #[test]
    fn test_delivery_receipt_has_no_sender() {
        let seen = callback(json!({"event": "seen", "timestamp": 1, "message_token": 3}));
        assert_eq!(
            assert_err!(resolve_entity_id(&seen)),
            ResolveError::MissingSender { platform: "viber" }
        );
    }
}
