mod tracing_layer;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub use crate::tracing_layer::BufferLayer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Debug = 0,
    Detail = 1,
    Info = 2,
    Warning = 3,
    Error = 4,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogMessage {
    pub id: u32,
    pub kind: LogLevel,
    pub time: DateTime<Utc>,
    pub text: String,
    pub nzb_id: Option<u32>,
}

/// Bounded ring of recent log messages, oldest evicted first.
#[derive(Debug)]
pub struct LogBuffer {
    messages: Mutex<VecDeque<LogMessage>>,
    capacity: usize,
    next_id: AtomicU32,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            next_id: AtomicU32::new(1),
        }
    }

    pub fn push(&self, mut message: LogMessage) {
        message.id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut messages = self.messages.lock().expect("log buffer lock");
        if messages.len() >= self.capacity {
            messages.pop_front();
        }
        messages.push_back(message);
    }

    pub fn clear(&self) {
        let mut messages = self.messages.lock().expect("log buffer lock");
        messages.clear();
    }

    pub fn messages_since(&self, since_id: u32) -> Vec<LogMessage> {
        let messages = self.messages.lock().expect("log buffer lock");
        messages
            .iter()
            .filter(|message| message.id > since_id)
            .cloned()
            .collect()
    }

    pub fn messages_for_nzb(&self, nzb_id: u32) -> Vec<LogMessage> {
        let messages = self.messages.lock().expect("log buffer lock");
        messages
            .iter()
            .filter(|message| message.nzb_id == Some(nzb_id))
            .cloned()
            .collect()
    }
}

pub fn init_tracing(log_level: &str) -> Arc<LogBuffer> {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let buffer = Arc::new(LogBuffer::new(1000));
    let buffer_layer = BufferLayer::new(buffer.clone());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(buffer_layer)
        .init();
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(text: &str, nzb_id: Option<u32>) -> LogMessage {
        LogMessage {
            id: 0,
            kind: LogLevel::Info,
            time: Utc::now(),
            text: text.to_string(),
            nzb_id,
        }
    }

    #[test]
    fn log_buffer_tracks_recent_messages() {
        let buffer = LogBuffer::new(2);
        buffer.push(message("first", None));
        buffer.push(message("second", None));
        buffer.push(message("third", None));

        let messages = buffer.messages_since(0);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].text, "second");
        assert_eq!(messages[1].text, "third");
    }

    #[test]
    fn log_buffer_filters_by_nzb() {
        let buffer = LogBuffer::new(10);
        buffer.push(message("global", None));
        buffer.push(message("nzb one", Some(1)));
        buffer.push(message("nzb two", Some(2)));

        let messages = buffer.messages_for_nzb(1);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "nzb one");
    }

    #[test]
    fn log_buffer_clear_keeps_ids_increasing() {
        let buffer = LogBuffer::new(10);
        buffer.push(message("a", None));
        buffer.clear();
        buffer.push(message("b", None));

        let messages = buffer.messages_since(0);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, 2);
    }
}
