//! Messenger Platform webhooks.

use std::any::Any;

use parley_core::{Event, ResolveError, ResolveResult, entity_id};
use serde::Deserialize;
use tracing::debug;

use crate::expect_event;

pub const PLATFORM: &str = "facebook";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Participant {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuickReply {
    pub payload: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Message {
    pub mid: String,
    pub text: Option<String>,
    pub quick_reply: Option<QuickReply>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Postback {
    pub title: Option<String>,
    pub payload: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Messaging {
    /// The sender's page-scoped id (PSID).
    pub sender: Participant,
    pub recipient: Participant,
    pub timestamp: i64,
    pub message: Option<Message>,
    pub postback: Option<Postback>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Entry {
    pub id: String,
    pub time: i64,
    #[serde(default)]
    pub messaging: Vec<Messaging>,
}

/// One webhook delivery.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Webhook {
    pub object: String,
    pub entry: Vec<Entry>,
}

impl Webhook {
    /// The first messaging item, which is the one Parley dispatches on.
    ///
    /// Messenger may batch several items (possibly from different senders)
    /// into one delivery. Only the first is seen here; callers that need the
    /// rest should split [`entry`](Self::entry) into one `Webhook` per item
    /// before dispatching.
    pub fn messaging(&self) -> Option<&Messaging> {
        self.entry.first().and_then(|e| e.messaging.first())
    }

    /// Number of messaging items across all entries.
    pub fn messaging_count(&self) -> usize {
        self.entry.iter().map(|e| e.messaging.len()).sum()
    }

    /// Text of the message.
    pub fn text(&self) -> Option<&str> {
        self.messaging()
            .and_then(|m| m.message.as_ref())
            .and_then(|m| m.text.as_deref())
    }

    /// Quick reply or postback payload.
    pub fn payload(&self) -> Option<&str> {
        let messaging = self.messaging()?;
        messaging
            .message
            .as_ref()
            .and_then(|m| m.quick_reply.as_ref())
            .map(|q| q.payload.as_str())
            .or_else(|| messaging.postback.as_ref().map(|p| p.payload.as_str()))
    }
}

impl Event for Webhook {
    fn event_name(&self) -> &'static str {
        match self.messaging() {
            Some(m) if m.postback.is_some() => "facebook.postback",
            Some(m) if m.message.is_some() => "facebook.message",
            _ => "facebook.other",
        }
    }

    fn platform(&self) -> &'static str {
        PLATFORM
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Resolves `facebook_<psid>` from a [`Webhook`].
pub fn resolve_entity_id(event: &dyn Event) -> ResolveResult<String> {
    let webhook = expect_event::<Webhook>(event, PLATFORM)?;
    let messaging = webhook
        .messaging()
        .ok_or(ResolveError::MissingSender { platform: PLATFORM })?;
    let batched = webhook.messaging_count();
    if batched > 1 {
        debug!(
            items = batched,
            "Batched delivery, resolving from the first messaging item only"
        );
    }
    Ok(entity_id(PLATFORM, &messaging.sender.id))
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use tokio_test::{assert_err, assert_ok};

    use super::*;

    fn webhook(messaging: Value) -> Webhook {
        assert_ok!(serde_json::from_value(json!({
            "object": "page",
            "entry": [{"id": "page-1", "time": 1, "messaging": messaging}]
        })))
    }

    #[test]
    fn test_message_and_postback() {
        let message = webhook(json!([{
            "sender": {"id": "psid-9"},
            "recipient": {"id": "page-1"},
            "timestamp": 1,
            "message": {"mid": "m.1", "text": "yes", "quick_reply": {"payload": "ANSWER_YES"}}
        }]));
        let postback = webhook(json!([{
            "sender": {"id": "psid-9"},
            "recipient": {"id": "page-1"},
            "timestamp": 2,
            "postback": {"title": "Start", "payload": "GET_STARTED"}
        }]));

        assert_eq!(assert_ok!(resolve_entity_id(&message)), "facebook_psid-9");
        assert_eq!(assert_ok!(resolve_entity_id(&postback)), "facebook_psid-9");
        assert_eq!(message.payload(), Some("ANSWER_YES"));
        assert_eq!(postback.payload(), Some("GET_STARTED"));
        assert_eq!(postback.event_name(), "facebook.postback");
    }

    #[test]
    fn test_batched_delivery_uses_first_item() {
        let batched = webhook(json!([
            {"sender": {"id": "psid-1"}, "recipient": {"id": "page-1"}, "timestamp": 1,
             "message": {"mid": "m.1", "text": "first"}},
            {"sender": {"id": "psid-2"}, "recipient": {"id": "page-1"}, "timestamp": 2,
             "message": {"mid": "m.2", "text": "second"}}
        ]));

        assert_eq!(batched.messaging_count(), 2);
        assert_eq!(assert_ok!(resolve_entity_id(&batched)), "facebook_psid-1");
        assert_eq!(batched.text(), Some("first"));
    }

    #[test]
    fn test_empty_messaging() {
        let empty = webhook(json!([]));
        assert_eq!(
            assert_err!(resolve_entity_id(&empty)),
            ResolveError::MissingSender { platform: "facebook" }
        );
    }
}
