use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;

use super::Message;

/// Append-only, ordered message log of a single topic.
///
/// Offsets are assigned under the write lock, so index order is publish
/// order. Readers take snapshots and never hold the lock while delivering.
#[derive(Debug)]
pub struct MessageLog {
    topic: Arc<str>,
    entries: RwLock<Vec<Message>>,
}

impl MessageLog {
    pub fn new(topic: Arc<str>) -> Self {
        Self {
            topic,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Appends a payload and returns the stored message with its offset.
    pub fn append(
        &self,
        payload: Bytes,
    ) -> Message {
        let mut entries = self.entries.write();
        let message = Message::new(Arc::clone(&self.topic), entries.len(), payload);
        entries.push(message.clone());
        message
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn get(
        &self,
        offset: usize,
    ) -> Option<Message> {
        self.entries.read().get(offset).cloned()
    }

    /// Messages at `[offset, len)`. Empty when `offset >= len`.
    pub fn read_from(
        &self,
        offset: usize,
    ) -> Vec<Message> {
        let entries = self.entries.read();
        entries.get(offset..).map(<[Message]>::to_vec).unwrap_or_default()
    }

    /// Snapshot of the whole log.
    pub fn snapshot(&self) -> Vec<Message> {
        self.read_from(0)
    }
}
