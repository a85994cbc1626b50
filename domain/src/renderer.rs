//! Bridge from a push-based event stream to an appendable list.
//!
//! The renderer's lifecycle is an explicit state machine. Messages can only be
//! rendered through `Open::append`, and the only way to obtain an `Open` is
//! `Connecting::open`, which creates the list. `StreamingListRenderer` drives
//! those transitions from `TransportEvent`s and turns a message that arrives
//! in any other phase into a protocol violation.
use crate::diagnostics::DiagnosticLog;
use crate::document::Dom;
use crate::error::{DocumentErrorKind, Error, ProtocolErrorKind};
use events::{EventHandler, MessageEvent, OpenDetails, TransportError, TransportEvent};

/// Id of the page region the list is attached under.
pub const MAIN_REGION_ID: &str = "main";
/// Id of the list container created on open.
pub const LIST_ID: &str = "list";

/// Element id of the list item rendered for message number `sequence`.
pub fn message_element_id(sequence: u64) -> String {
    format!("message-{sequence}")
}

/// One received message, numbered in arrival order from zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub sequence: u64,
    pub payload: String,
}

impl MessageRecord {
    pub fn element_id(&self) -> String {
        message_element_id(self.sequence)
    }
}

/// Observable lifecycle state of a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererState {
    /// A transition failed part way; the renderer no longer renders.
    Uninitialized,
    Connecting,
    Open,
    /// The most recent event was a transport error.
    Errored,
    Closed,
}

/// Waiting for the stream to open. Holds the region the list will go under.
#[derive(Debug)]
pub struct Connecting<N> {
    main: N,
}

impl<N: Copy> Connecting<N> {
    pub fn new(main: N) -> Self {
        Self { main }
    }

    /// Create `<ul id="list">` under the main region.
    pub fn open<D: Dom<Node = N>>(self, dom: &mut D) -> Result<Open<N>, Error> {
        let list = dom.create_element("ul");
        dom.set_id(list, LIST_ID)?;
        dom.append_child(self.main, list)?;
        Ok(Open {
            list,
            next_sequence: 0,
        })
    }
}

/// The stream is open and the list exists.
#[derive(Debug)]
pub struct Open<N> {
    list: N,
    next_sequence: u64,
}

impl<N: Copy> Open<N> {
    /// Render `payload` as the next list item.
    pub fn append<D: Dom<Node = N>>(
        &mut self,
        dom: &mut D,
        payload: &str,
    ) -> Result<MessageRecord, Error> {
        let record = MessageRecord {
            sequence: self.next_sequence,
            payload: payload.to_string(),
        };
        let item = dom.create_element("li");
        dom.set_text_content(item, payload)?;
        dom.set_id(item, &record.element_id())?;
        dom.append_child(self.list, item)?;
        self.next_sequence += 1;
        Ok(record)
    }

    pub fn list(&self) -> N {
        self.list
    }

    pub fn rendered_count(&self) -> u64 {
        self.next_sequence
    }
}

#[derive(Debug)]
enum Phase<N> {
    Uninitialized,
    Connecting(Connecting<N>),
    Open(Open<N>),
    Closed { rendered: u64 },
}

/// Renders every message of one connection into a list under the main region.
#[derive(Debug)]
pub struct StreamingListRenderer<D: Dom> {
    dom: D,
    phase: Phase<D::Node>,
    errored: bool,
    diagnostics: DiagnosticLog,
}

impl<D: Dom> StreamingListRenderer<D> {
    /// Start connecting with an explicit handle to the main region.
    pub fn new(dom: D, main: D::Node) -> Result<Self, Error> {
        if !dom.contains(main) {
            return Err(Error::document(DocumentErrorKind::NodeNotFound));
        }
        Ok(Self {
            dom,
            phase: Phase::Connecting(Connecting::new(main)),
            errored: false,
            diagnostics: DiagnosticLog::new(),
        })
    }

    /// Start connecting, locating the main region by its `main` id.
    pub fn for_main_region(dom: D) -> Result<Self, Error> {
        let main = dom
            .get_element_by_id(MAIN_REGION_ID)
            .ok_or_else(|| Error::document(DocumentErrorKind::MainRegionMissing))?;
        Self::new(dom, main)
    }

    pub fn state(&self) -> RendererState {
        match self.phase {
            Phase::Uninitialized => RendererState::Uninitialized,
            Phase::Closed { .. } => RendererState::Closed,
            _ if self.errored => RendererState::Errored,
            Phase::Connecting(_) => RendererState::Connecting,
            Phase::Open(_) => RendererState::Open,
        }
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn into_dom(self) -> D {
        self.dom
    }

    pub fn diagnostics(&self) -> &DiagnosticLog {
        &self.diagnostics
    }

    /// Number of messages rendered so far.
    pub fn rendered_count(&self) -> u64 {
        match &self.phase {
            Phase::Open(open) => open.rendered_count(),
            Phase::Closed { rendered } => *rendered,
            Phase::Uninitialized | Phase::Connecting(_) => 0,
        }
    }

    pub fn on_open(&mut self, details: &OpenDetails) -> Result<(), Error> {
        self.diagnostics.info(format!("open {details:?}"));
        self.errored = false;

        let phase = std::mem::replace(&mut self.phase, Phase::Uninitialized);
        self.phase = match phase {
            Phase::Connecting(connecting) => Phase::Open(connecting.open(&mut self.dom)?),
            Phase::Open(open) => {
                self.diagnostics.warn(format!(
                    "open while already open, continuing at message {}",
                    open.rendered_count()
                ));
                Phase::Open(open)
            }
            other => {
                self.diagnostics.warn("ignoring open after the renderer stopped");
                other
            }
        };
        Ok(())
    }

    /// Render one message. Returns `None` for named events, which a plain
    /// message listener never sees.
    pub fn on_message(&mut self, message: &MessageEvent) -> Result<Option<MessageRecord>, Error> {
        self.diagnostics.info(format!("message {message:?}"));

        if !message.is_default_type() {
            self.diagnostics
                .debug(format!("not rendering `{}` event", message.event_type));
            return Ok(None);
        }

        match &mut self.phase {
            Phase::Open(open) => {
                let record = open.append(&mut self.dom, &message.data)?;
                self.errored = false;
                Ok(Some(record))
            }
            Phase::Closed { .. } => Err(Error::protocol(ProtocolErrorKind::MessageAfterClose)),
            Phase::Connecting(_) | Phase::Uninitialized => {
                Err(Error::protocol(ProtocolErrorKind::MessageBeforeOpen))
            }
        }
    }

    pub fn on_error(&mut self, error: &TransportError) {
        self.diagnostics.error(format!("error {error}"));
        if matches!(self.phase, Phase::Connecting(_) | Phase::Open(_)) {
            self.errored = true;
        }
    }

    pub fn close(&mut self) {
        let rendered = self.rendered_count();
        self.diagnostics
            .info(format!("closed after {rendered} message(s)"));
        self.phase = Phase::Closed { rendered };
        self.errored = false;
    }
}

impl<D: Dom> EventHandler for StreamingListRenderer<D> {
    type Error = Error;

    fn handle(&mut self, event: TransportEvent) -> Result<(), Error> {
        match event {
            TransportEvent::Open(details) => self.on_open(&details),
            TransportEvent::Message(message) => self.on_message(&message).map(|_| ()),
            TransportEvent::Error(error) => {
                self.on_error(&error);
                Ok(())
            }
            TransportEvent::Closed => {
                self.close();
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, NodeId};
    use crate::error::DomainErrorKind;
    use log::Level;

    fn open_details() -> OpenDetails {
        OpenDetails {
            url: "http://127.0.0.1:4000/sse".to_string(),
            status: 200,
            content_type: Some("text/event-stream".to_string()),
        }
    }

    fn renderer() -> StreamingListRenderer<Document> {
        env_logger::builder().is_test(true).try_init().ok();
        StreamingListRenderer::for_main_region(Document::with_main()).unwrap()
    }

    fn items(renderer: &StreamingListRenderer<Document>) -> Vec<(String, String)> {
        let doc = renderer.dom();
        let list = doc.get_element_by_id(LIST_ID).unwrap();
        doc.children(list)
            .iter()
            .map(|item| {
                (
                    doc.element_id(*item).unwrap_or_default().to_string(),
                    doc.text_content(*item).unwrap_or_default().to_string(),
                )
            })
            .collect()
    }

    #[test]
    fn test_messages_render_in_arrival_order() {
        let mut renderer = renderer();
        renderer
            .handle(TransportEvent::Open(open_details()))
            .unwrap();
        for payload in ["a", "b", "c"] {
            renderer
                .handle(TransportEvent::Message(MessageEvent::new(payload)))
                .unwrap();
        }

        assert_eq!(
            items(&renderer),
            [
                ("message-0".to_string(), "a".to_string()),
                ("message-1".to_string(), "b".to_string()),
                ("message-2".to_string(), "c".to_string()),
            ]
        );
        assert_eq!(renderer.rendered_count(), 3);
        assert_eq!(renderer.state(), RendererState::Open);
    }

    #[test]
    fn test_nth_message_gets_nth_id() {
        let mut renderer = renderer();
        renderer.on_open(&open_details()).unwrap();
        for n in 0..50u64 {
            let record = renderer
                .on_message(&MessageEvent::new(format!("payload {n}")))
                .unwrap()
                .unwrap();
            assert_eq!(record.sequence, n);
            assert_eq!(record.element_id(), message_element_id(n));

            let doc = renderer.dom();
            let item = doc.get_element_by_id(&message_element_id(n)).unwrap();
            assert_eq!(doc.text_content(item), Some(format!("payload {n}").as_str()));
            let list = doc.get_element_by_id(LIST_ID).unwrap();
            assert_eq!(doc.children(list).len() as u64, n + 1);
        }
    }

    #[test]
    fn test_list_created_exactly_once_and_only_after_open() {
        let mut renderer = renderer();
        assert_eq!(renderer.state(), RendererState::Connecting);
        assert!(renderer.dom().get_element_by_id(LIST_ID).is_none());

        renderer.on_open(&open_details()).unwrap();
        let doc = renderer.dom();
        let list = doc.get_element_by_id(LIST_ID).unwrap();
        assert_eq!(doc.count_by_id(LIST_ID), 1);
        assert_eq!(doc.tag_name(list), Some("ul"));
        assert_eq!(doc.parent(list), doc.get_element_by_id(MAIN_REGION_ID));
    }

    #[test]
    fn test_message_before_open_is_fatal_and_appends_nothing() {
        let mut renderer = renderer();
        let err = renderer
            .handle(TransportEvent::Message(MessageEvent::new("early")))
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Protocol(ProtocolErrorKind::MessageBeforeOpen)
        );
        assert_eq!(err.to_string(), "protocol violation: message before open");
        assert!(renderer.dom().get_element_by_id(LIST_ID).is_none());
        assert!(renderer.dom().get_element_by_id("message-0").is_none());
        assert_eq!(renderer.rendered_count(), 0);
    }

    #[test]
    fn test_message_after_error_before_open_is_still_fatal() {
        let mut renderer = renderer();
        renderer.on_error(&TransportError::Network("refused".to_string()));
        assert_eq!(renderer.state(), RendererState::Errored);

        let err = renderer.on_message(&MessageEvent::new("x")).unwrap_err();
        assert!(err.is_protocol_violation());
    }

    #[test]
    fn test_transport_error_logs_once_and_leaves_document_alone() {
        let mut renderer = renderer();
        renderer.on_open(&open_details()).unwrap();
        let before = renderer.dom().to_string();
        let errors_before = renderer.diagnostics().count(Level::Error);

        renderer
            .handle(TransportEvent::Error(TransportError::Ended))
            .unwrap();

        assert_eq!(renderer.dom().to_string(), before);
        assert_eq!(renderer.diagnostics().count(Level::Error), errors_before + 1);
        let last = renderer.diagnostics().entries().last().unwrap();
        assert_eq!(last.message, "error stream ended by server");
        assert_eq!(renderer.state(), RendererState::Errored);
    }

    #[test]
    fn test_messages_after_error_continue_numbering() {
        let mut renderer = renderer();
        renderer.on_open(&open_details()).unwrap();
        renderer.on_message(&MessageEvent::new("a")).unwrap();
        renderer.on_error(&TransportError::Stream("reset".to_string()));
        let record = renderer
            .on_message(&MessageEvent::new("b"))
            .unwrap()
            .unwrap();

        assert_eq!(record.sequence, 1);
        assert_eq!(renderer.state(), RendererState::Open);
    }

    #[test]
    fn test_zero_messages_leaves_empty_list() {
        let mut renderer = renderer();
        renderer.on_open(&open_details()).unwrap();

        let doc = renderer.dom();
        let list = doc.get_element_by_id(LIST_ID).unwrap();
        assert!(doc.children(list).is_empty());
        assert!(doc.get_element_by_id("message-0").is_none());
    }

    #[test]
    fn test_repeated_open_keeps_list_and_sequence() {
        let mut renderer = renderer();
        renderer.on_open(&open_details()).unwrap();
        renderer.on_message(&MessageEvent::new("a")).unwrap();
        renderer.on_open(&open_details()).unwrap();
        let record = renderer
            .on_message(&MessageEvent::new("b"))
            .unwrap()
            .unwrap();

        assert_eq!(record.sequence, 1);
        assert_eq!(renderer.dom().count_by_id(LIST_ID), 1);
        assert_eq!(renderer.diagnostics().count(Level::Warn), 1);
    }

    #[test]
    fn test_named_events_are_not_rendered() {
        let mut renderer = renderer();
        renderer.on_open(&open_details()).unwrap();
        let rendered = renderer
            .on_message(&MessageEvent::new("bye").with_event_type("close"))
            .unwrap();

        assert!(rendered.is_none());
        assert_eq!(renderer.rendered_count(), 0);
    }

    #[test]
    fn test_message_after_close_is_fatal() {
        let mut renderer = renderer();
        renderer.on_open(&open_details()).unwrap();
        renderer.on_message(&MessageEvent::new("a")).unwrap();
        renderer.handle(TransportEvent::Closed).unwrap();
        assert_eq!(renderer.state(), RendererState::Closed);
        assert_eq!(renderer.rendered_count(), 1);

        let err = renderer.on_message(&MessageEvent::new("late")).unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Protocol(ProtocolErrorKind::MessageAfterClose)
        );
        assert_eq!(items(&renderer).len(), 1);
    }

    #[test]
    fn test_open_and_message_are_logged_at_info() {
        let mut renderer = renderer();
        renderer.on_open(&open_details()).unwrap();
        renderer.on_message(&MessageEvent::new("a")).unwrap();

        let entries = renderer.diagnostics().entries();
        assert!(entries[0].message.starts_with("open "));
        assert!(entries[0].message.contains("text/event-stream"));
        assert!(entries[1].message.starts_with("message "));
        assert_eq!(renderer.diagnostics().count(Level::Info), 2);
    }

    #[test]
    fn test_missing_main_region_fails_fast() {
        let err = StreamingListRenderer::for_main_region(Document::new()).unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Document(DocumentErrorKind::MainRegionMissing)
        );
    }

    #[test]
    fn test_explicit_main_handle_must_exist() {
        let mut other = Document::new();
        for _ in 0..5 {
            other.create_element("div");
        }
        let foreign: NodeId = other.create_element("main");
        let err = StreamingListRenderer::new(Document::new(), foreign).unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Document(DocumentErrorKind::NodeNotFound)
        );
    }

    #[test]
    fn test_explicit_main_handle_is_used() {
        let mut doc = Document::new();
        let region = doc.create_element("section");
        let body = doc.body();
        doc.append_child(body, region).unwrap();

        let mut renderer = StreamingListRenderer::new(doc, region).unwrap();
        renderer.on_open(&open_details()).unwrap();

        let doc = renderer.into_dom();
        let list = doc.get_element_by_id(LIST_ID).unwrap();
        assert_eq!(doc.parent(list), Some(region));
    }

    #[test]
    fn test_typed_states_render_directly() {
        let mut doc = Document::with_main();
        let main = doc.get_element_by_id(MAIN_REGION_ID).unwrap();
        let mut open = Connecting::new(main).open(&mut doc).unwrap();
        open.append(&mut doc, "direct").unwrap();

        assert_eq!(open.rendered_count(), 1);
        assert_eq!(doc.children(open.list()).len(), 1);
    }
}
