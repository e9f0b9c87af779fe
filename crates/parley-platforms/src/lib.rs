//! # Parley Platforms
//!
//! Typed inbound events for the messaging platforms Parley supports, and the
//! rules for turning each of them into an entity id.
//!
//! | Platform  | Event type               | Entity id          |
//! |-----------|--------------------------|--------------------|
//! | Telegram  | [`telegram::Update`]     | `telegram_<id>`    |
//! | VKontakte | [`vkontakte::Callback`]  | `vkontakte_<id>`   |
//! | Viber     | [`viber::Callback`]      | `viber_<id>`       |
//! | Facebook  | [`facebook::Webhook`]    | `facebook_<psid>`  |
//!
//! Webhook bodies are decoded with [`decode`] and handed to the dispatcher:
//!
//! ```rust,ignore
//! let event = parley_platforms::decode(telegram::PLATFORM, &body)?;
//! dispatcher.dispatch(event).await?;
//! ```

use std::fmt;

use parley_core::{BoxedEvent, EntityIdResolver, Event, ResolveError, ResolveResult};
use serde::Deserialize;
use thiserror::Error;

pub mod facebook;
pub mod telegram;
pub mod viber;
pub mod vkontakte;

/// Builds a resolver that knows every platform in this crate.
pub fn default_resolver() -> EntityIdResolver {
    EntityIdResolver::new()
        .with(telegram::PLATFORM, telegram::resolve_entity_id)
        .with(vkontakte::PLATFORM, vkontakte::resolve_entity_id)
        .with(viber::PLATFORM, viber::resolve_entity_id)
        .with(facebook::PLATFORM, facebook::resolve_entity_id)
}

/// A webhook body could not be turned into an event.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// No event type is known for the platform tag.
    #[error("unknown platform: {0}")]
    UnknownPlatform(String),

    /// The body is not a valid event for the platform.
    #[error("invalid {platform} payload: {source}")]
    Json {
        platform: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Decodes a JSON webhook body into the platform's event type.
pub fn decode(platform: &str, body: &[u8]) -> Result<BoxedEvent, DecodeError> {
    match platform {
        telegram::PLATFORM => parse::<telegram::Update>(telegram::PLATFORM, body),
        vkontakte::PLATFORM => parse::<vkontakte::Callback>(vkontakte::PLATFORM, body),
        viber::PLATFORM => parse::<viber::Callback>(viber::PLATFORM, body),
        facebook::PLATFORM => parse::<facebook::Webhook>(facebook::PLATFORM, body),
        other => Err(DecodeError::UnknownPlatform(other.to_string())),
    }
}

fn parse<E>(platform: &'static str, body: &[u8]) -> Result<BoxedEvent, DecodeError>
where
    E: Event + for<'de> Deserialize<'de>,
{
    serde_json::from_slice::<E>(body)
        .map(BoxedEvent::new)
        .map_err(|source| DecodeError::Json { platform, source })
}

/// Downcasts `event` to the platform's own event type.
pub(crate) fn expect_event<'a, E: Event>(
    event: &'a dyn Event,
    platform: &'static str,
) -> ResolveResult<&'a E> {
    event
        .as_any()
        .downcast_ref::<E>()
        .ok_or(ResolveError::UnexpectedEvent {
            platform,
            event: event.event_name(),
        })
}

/// A user id some platforms send as a number and others as a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Number(i64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}
