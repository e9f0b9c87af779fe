//! Telegram Bot API updates.
//!
//! Only the fields the dispatcher and typical predicates need are modelled;
//! everything else in the update is ignored on decode.

use std::any::Any;

use parley_core::{Event, ResolveError, ResolveResult, entity_id};
use serde::Deserialize;

use crate::expect_event;

pub const PLATFORM: &str = "telegram";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub language_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub date: Option<i64>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

/// One incoming update.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub edited_message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

impl Update {
    /// The user who caused the update.
    ///
    /// A callback query's sender wins over the message it is attached to.
    pub fn sender(&self) -> Option<&User> {
        if let Some(query) = &self.callback_query {
            return Some(&query.from);
        }
        self.message
            .as_ref()
            .and_then(|m| m.from.as_ref())
            .or_else(|| self.edited_message.as_ref().and_then(|m| m.from.as_ref()))
    }

    /// Text of the (possibly edited) message.
    pub fn text(&self) -> Option<&str> {
        self.message
            .as_ref()
            .or(self.edited_message.as_ref())
            .and_then(|m| m.text.as_deref())
    }

    /// Data attached to the pressed inline button.
    pub fn callback_data(&self) -> Option<&str> {
        self.callback_query.as_ref().and_then(|q| q.data.as_deref())
    }

    /// Returns `true` for a message whose text is `/<command>`, optionally
    /// followed by arguments or a `@botname` suffix.
    pub fn is_command(&self, command: &str) -> bool {
        let Some(first) = self.text().and_then(|t| t.split_whitespace().next()) else {
            return false;
        };
        let Some(name) = first.strip_prefix('/') else {
            return false;
        };
        name.split('@').next() == Some(command)
    }
}

impl Event for Update {
    fn event_name(&self) -> &'static str {
        if self.callback_query.is_some() {
            "telegram.callback_query"
        } else if self.edited_message.is_some() {
            "telegram.edited_message"
        } else {
            "telegram.message"
        }
    }

    fn platform(&self) -> &'static str {
        PLATFORM
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Resolves `telegram_<user id>` from an [`Update`].
pub fn resolve_entity_id(event: &dyn Event) -> ResolveResult<String> {
    let update = expect_event::<Update>(event, PLATFORM)?;
    let sender = update
        .sender()
        .ok_or(ResolveError::MissingSender { platform: PLATFORM })?;
    Ok(entity_id(PLATFORM, sender.id))
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use tokio_test::{assert_err, assert_ok};

    use super::*;

    fn update(value: Value) -> Update {
        assert_ok!(serde_json::from_value(value))
    }

    fn message(from: i64, text: &str) -> Value {
        json!({
            "message_id": 10,
            "from": {"id": from, "is_bot": false, "first_name": "Ann"},
            "chat": {"id": from, "type": "private"},
            "date": 1_700_000_000,
            "text": text
        })
    }

    #[test]
    fn test_message_and_callback_resolve_to_same_id() {
        let msg = update(json!({"update_id": 1, "message": message(77, "hello")}));
        let click = update(json!({
            "update_id": 2,
            "callback_query": {
                "id": "cb",
                "from": {"id": 77, "first_name": "Ann"},
                "message": message(1, "pick one"),
                "data": "yes"
            }
        }));

        assert_eq!(assert_ok!(resolve_entity_id(&msg)), "telegram_77");
        assert_eq!(assert_ok!(resolve_entity_id(&click)), "telegram_77");
        assert_eq!(click.callback_data(), Some("yes"));
        assert_eq!(click.event_name(), "telegram.callback_query");
    }

    #[test]
    fn test_edited_message_sender() {
        let edited = update(json!({"update_id": 3, "edited_message": message(5, "fixed")}));
        assert_eq!(assert_ok!(resolve_entity_id(&edited)), "telegram_5");
        assert_eq!(edited.text(), Some("fixed"));
    }

    #[test]
    fn test_update_without_sender() {
        let channel_post = update(json!({"update_id": 4}));
        assert_eq!(
            assert_err!(resolve_entity_id(&channel_post)),
            ResolveError::MissingSender { platform: "telegram" }
        );
    }

    #[test]
    fn test_is_command() {
        let start = update(json!({"update_id": 1, "message": message(1, "/start ref42")}));
        let addressed = update(json!({"update_id": 1, "message": message(1, "/help@parley_bot")}));
        let plain = update(json!({"update_id": 1, "message": message(1, "start")}));

        assert!(start.is_command("start"));
        assert!(!start.is_command("stop"));
        assert!(addressed.is_command("help"));
        assert!(!plain.is_command("start"));
    }
}
