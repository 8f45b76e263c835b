use std::{borrow::Cow, sync::Arc};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

/// A published message.
///
/// Immutable once appended; `offset` is its 0-based position in the topic
/// log, so for a given topic the offset alone identifies the message.
/// Cloning is cheap (`Arc<str>` + `Bytes`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Topic the message was published to.
    pub topic: Arc<str>,
    /// Position in the topic log.
    pub offset: usize,
    /// Opaque payload.
    pub payload: Bytes,
    /// Time the message was appended to the log.
    pub published_at: DateTime<Utc>,
}

impl Message {
    pub(crate) fn new(
        topic: Arc<str>,
        offset: usize,
        payload: Bytes,
    ) -> Self {
        Self {
            topic,
            offset,
            payload,
            published_at: Utc::now(),
        }
    }

    /// Payload as text, with invalid UTF-8 replaced.
    pub fn payload_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }

    /// Decodes a JSON payload.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}
