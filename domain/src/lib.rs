//! The streaming list renderer and the document model it renders into.
//!
//! A `StreamingListRenderer` turns transport lifecycle events into DOM
//! mutations: `open` creates a `<ul id="list">` under the page's main region,
//! every default-typed message appends one `<li id="message-N">` carrying the
//! payload text, and transport errors are logged without touching the page.
//!
//! The document is injected at construction through the `Dom` trait, so the
//! renderer has no hidden coupling to a global page. `Document` is the
//! in-memory implementation the harness and tests use.

pub mod diagnostics;
pub mod document;
pub mod error;
pub mod payload;
pub mod renderer;

pub use diagnostics::{Diagnostic, DiagnosticLog};
pub use document::{Document, Dom, NodeId};
pub use error::Error;
pub use renderer::{
    message_element_id, Connecting, MessageRecord, Open, RendererState, StreamingListRenderer,
    LIST_ID, MAIN_REGION_ID,
};
