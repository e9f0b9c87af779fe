//! VK Callback API events.

use std::any::Any;

use parley_core::{Event, ResolveError, ResolveResult, entity_id};
use serde::Deserialize;
use serde_json::Value;

use crate::{UserId, expect_event};

pub const PLATFORM: &str = "vkontakte";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Message {
    pub id: i64,
    pub from_id: UserId,
    pub peer_id: UserId,
    pub date: Option<i64>,
    #[serde(default)]
    pub text: String,
    /// JSON-encoded keyboard button payload.
    pub payload: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Object {
    /// Set for `message_new` and similar events.
    pub message: Option<Message>,
    /// Set for `message_event` (callback button press).
    pub user_id: Option<UserId>,
    pub peer_id: Option<UserId>,
    pub event_id: Option<String>,
    pub payload: Option<Value>,
}

/// One Callback API notification.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Callback {
    #[serde(rename = "type")]
    pub kind: String,
    pub group_id: i64,
    pub object: Option<Object>,
}

impl Callback {
    /// The user who caused the event.
    pub fn sender(&self) -> Option<&UserId> {
        let object = self.object.as_ref()?;
        object
            .message
            .as_ref()
            .map(|m| &m.from_id)
            .or(object.user_id.as_ref())
    }

    /// Text of the message, if this is a message event.
    pub fn text(&self) -> Option<&str> {
        self.object
            .as_ref()
            .and_then(|o| o.message.as_ref())
            .map(|m| m.text.as_str())
    }

    /// Button payload, decoded from the message or taken from a
    /// `message_event` object.
    pub fn payload(&self) -> Option<Value> {
        let object = self.object.as_ref()?;
        if let Some(payload) = &object.payload {
            return Some(payload.clone());
        }
        let raw = object.message.as_ref()?.payload.as_deref()?;
        serde_json::from_str(raw).ok()
    }
}

impl Event for Callback {
    fn event_name(&self) -> &'static str {
        match self.kind.as_str() {
            "message_new" => "vkontakte.message_new",
            "message_event" => "vkontakte.message_event",
            "message_reply" => "vkontakte.message_reply",
            "message_edit" => "vkontakte.message_edit",
            _ => "vkontakte.other",
        }
    }

    fn platform(&self) -> &'static str {
        PLATFORM
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Resolves `vkontakte_<user id>` from a [`Callback`].
pub fn resolve_entity_id(event: &dyn Event) -> ResolveResult<String> {
    let callback = expect_event::<Callback>(event, PLATFORM)?;
    let sender = callback
        .sender()
        .ok_or(ResolveError::MissingSender { platform: PLATFORM })?;
    Ok(entity_id(PLATFORM, sender))
}
