//! Transport lifecycle events for the SSE harness.
//!
//! This crate sits between the streaming transport (which turns an HTTP body
//! into lifecycle events) and whatever reacts to them (the list renderer),
//! so neither side depends on the other.
//!
//! # Architecture
//!
//! - **TransportEvent**: Enum representing everything a transport can report:
//!   the stream opened, a message arrived, the transport failed, or the
//!   stream was closed explicitly.
//! - **EventHandler**: Trait for reacting to transport events. Handling is
//!   synchronous so that a fatal error surfaces in the very call that
//!   delivered the offending event.

use std::fmt;

/// The default event type of an SSE event that carries no `event:` field.
pub const DEFAULT_EVENT_TYPE: &str = "message";

/// Named event the fixture feed sends last. Clients treat it as an explicit
/// close of the stream.
pub const CLOSE_EVENT_TYPE: &str = "close";

/// Lifecycle events a streaming transport reports, in delivery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The stream was established. Carries the auxiliary details the transport
    /// knows about the connection.
    Open(OpenDetails),
    /// One dispatched event with a text payload.
    Message(MessageEvent),
    /// A transport-level failure. Never fatal to the handler by itself.
    Error(TransportError),
    /// The stream was closed explicitly; nothing follows.
    Closed,
}

/// What the transport knows about an established stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenDetails {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
}

/// A dispatched message with its payload kept as opaque text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    pub data: String,
    pub event_type: String,
    pub last_event_id: String,
}

impl MessageEvent {
    /// A `message`-typed event with no id, the shape of an unnamed SSE event.
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            event_type: DEFAULT_EVENT_TYPE.to_string(),
            last_event_id: String::new(),
        }
    }

    pub fn with_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn with_last_event_id(mut self, last_event_id: impl Into<String>) -> Self {
        self.last_event_id = last_event_id.into();
        self
    }

    /// Whether this event would reach a plain `onmessage` listener.
    pub fn is_default_type(&self) -> bool {
        self.event_type == DEFAULT_EVENT_TYPE
    }
}

/// Transport failures, reported through `TransportEvent::Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request could not be sent or the connection could not be made.
    Network(String),
    /// The server answered with something other than `200 OK`.
    Status(u16),
    /// The server answered with a content type other than `text/event-stream`.
    ContentType(Option<String>),
    /// Reading the body failed part way through.
    Stream(String),
    /// The server ended the stream.
    Ended,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Network(msg) => write!(f, "network error: {msg}"),
            TransportError::Status(status) => write!(f, "unexpected HTTP status {status}"),
            TransportError::ContentType(Some(content_type)) => {
                write!(f, "unexpected content type {content_type}")
            }
            TransportError::ContentType(None) => write!(f, "missing content type"),
            TransportError::Stream(msg) => write!(f, "stream error: {msg}"),
            TransportError::Ended => write!(f, "stream ended by server"),
        }
    }
}

impl std::error::Error for TransportError {}

/// Trait for reacting to transport events.
/// Implementations may fail; the transport stops delivering events and hands
/// the error back to its caller.
pub trait EventHandler {
    type Error;

    fn handle(&mut self, event: TransportEvent) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_event_defaults() {
        let ev = MessageEvent::new("payload");
        assert_eq!(ev.event_type, "message");
        assert!(ev.last_event_id.is_empty());
        assert!(ev.is_default_type());
    }

    #[test]
    fn test_named_message_event_is_not_default_type() {
        let ev = MessageEvent::new("").with_event_type("close");
        assert!(!ev.is_default_type());
    }

    #[test]
    fn test_transport_error_display() {
        assert_eq!(
            TransportError::Status(503).to_string(),
            "unexpected HTTP status 503"
        );
        assert_eq!(
            TransportError::ContentType(Some("text/html".to_string())).to_string(),
            "unexpected content type text/html"
        );
        assert_eq!(TransportError::Ended.to_string(), "stream ended by server");
    }
}
