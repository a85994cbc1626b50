//! Server-Sent Events (SSE) wire format.
//!
//! This crate owns the `text/event-stream` representation shared by the
//! fixture server (which encodes events) and the test client (which decodes
//! them from a chunked HTTP body).
//!
//! # Architecture
//!
//! - **Borrowing event model**: `ServerSentEvent<'a>` stores every field as a
//!   `Cow<'a, str>`, so events parsed from a complete body borrow from it and
//!   only multi-line `data` values allocate.
//! - **Encoder**: the `Display` impl writes the canonical wire form, splitting
//!   multi-line values into one field line per segment.
//! - **Parser**: `Parser` walks a complete `&str` body event by event.
//! - **Decoder**: `EventDecoder` buffers a byte stream across arbitrary chunk
//!   boundaries and yields owned events as soon as their terminating blank
//!   line arrives.
//!
//! # Example: encoding then parsing
//!
//! ```rust
//! use sse::{Parser, ServerSentEvent};
//!
//! let encoded = ServerSentEvent::builder()
//!     .id("0")
//!     .data("hello")
//!     .build()
//!     .to_string();
//! assert_eq!(encoded, "id:0\ndata:hello\n\n");
//!
//! let mut parser = Parser::new(&encoded);
//! let event = parser.next_event().unwrap();
//! assert_eq!(event.data.as_deref(), Some("hello"));
//! assert!(parser.next_event().is_none());
//! ```
//!
//! # Modules
//!
//! - `message`: `ServerSentEvent`, its builder and the encoder
//! - `parser`: line-oriented parser over a complete body
//! - `decoder`: incremental decoder over byte chunks

pub mod decoder;
pub mod message;
pub mod parser;

pub use decoder::EventDecoder;
pub use message::{ServerSentEvent, SseBuilder};
pub use parser::Parser;
