use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

use crate::{LogBuffer, LogLevel, LogMessage};

/// Mirrors tracing events into a [`LogBuffer`].
///
/// Events carrying an `nzb_id` field are attributed to that collection.
pub struct BufferLayer {
    buffer: Arc<LogBuffer>,
}

impl BufferLayer {
    pub fn new(buffer: Arc<LogBuffer>) -> Self {
        Self { buffer }
    }
}

fn log_level(level: &Level) -> LogLevel {
    match *level {
        Level::ERROR => LogLevel::Error,
        Level::WARN => LogLevel::Warning,
        Level::INFO => LogLevel::Info,
        Level::DEBUG => LogLevel::Detail,
        Level::TRACE => LogLevel::Debug,
    }
}

impl<S: Subscriber> Layer<S> for BufferLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = EventFields::default();
        event.record(&mut fields);
        self.buffer.push(LogMessage {
            id: 0,
            kind: log_level(event.metadata().level()),
            time: chrono::Utc::now(),
            text: fields.message,
            nzb_id: fields.nzb_id,
        });
    }
}

/// Only the message text and the owning collection are kept; other
/// structured fields stay with the fmt output.
#[derive(Default)]
struct EventFields {
    message: String,
    nzb_id: Option<u32>,
}

impl Visit for EventFields {
    fn record_u64(&mut self, field: &Field, value: u64) {
        if field.name() == "nzb_id" {
            self.nzb_id = u32::try_from(value).ok();
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }
}
