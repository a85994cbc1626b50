use events::{
    EventHandler, MessageEvent, OpenDetails, TransportError, TransportEvent, CLOSE_EVENT_TYPE,
    DEFAULT_EVENT_TYPE,
};
use futures_util::stream::StreamExt;
use log::*;
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::StatusCode;
use sse::{EventDecoder, ServerSentEvent};

const EVENT_STREAM: &str = "text/event-stream";

/// How a run of the connection ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The close event arrived and the stream was closed explicitly.
    Closed,
    /// The transport failed or the server ended the stream.
    Failed(TransportError),
}

/// One SSE connection to `<base_url>/sse`.
///
/// `run` plays the part of the browser's streaming primitive: it opens the
/// stream, applies the event dispatch rules, and reports every lifecycle event
/// to a handler. It never reconnects.
pub struct Connection {
    client: reqwest::Client,
    url: String,
    close_event: Option<String>,
    last_event_id: String,
    retry_millis: Option<u64>,
}

impl Connection {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            url: format!("{}/sse", base_url.trim_end_matches('/')),
            close_event: Some(CLOSE_EVENT_TYPE.to_string()),
            last_event_id: String::new(),
            retry_millis: None,
        }
    }

    /// Named event that closes the stream, or `None` to read until the server
    /// ends it.
    pub fn close_on(mut self, event_type: Option<String>) -> Self {
        self.close_event = event_type;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn last_event_id(&self) -> &str {
        &self.last_event_id
    }

    /// The most recent reconnection hint the server sent.
    pub fn retry_millis(&self) -> Option<u64> {
        self.retry_millis
    }

    /// Stream events into `handler` until the stream closes or fails.
    ///
    /// A handler error stops the run immediately and is returned as is.
    pub async fn run<H: EventHandler>(&mut self, handler: &mut H) -> Result<RunOutcome, H::Error> {
        debug!("Connecting to {}", self.url);

        let response = match self
            .client
            .get(&self.url)
            .header(ACCEPT, EVENT_STREAM)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return fail(handler, TransportError::Network(e.to_string())),
        };

        let status = response.status();
        if status != StatusCode::OK {
            return fail(handler, TransportError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        if !is_event_stream(content_type.as_deref()) {
            return fail(handler, TransportError::ContentType(content_type));
        }

        handler.handle(TransportEvent::Open(OpenDetails {
            url: self.url.clone(),
            status: status.as_u16(),
            content_type,
        }))?;

        let mut decoder = EventDecoder::new();
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => return fail(handler, TransportError::Stream(e.to_string())),
            };
            for event in decoder.push(&chunk) {
                if let Some(outcome) = self.dispatch(handler, event)? {
                    return Ok(outcome);
                }
            }
        }

        // An event cut off by the end of the stream is never dispatched.
        if let Some(event) = decoder.finish() {
            debug!("Discarding unterminated event at end of stream: {event:?}");
        }
        fail(handler, TransportError::Ended)
    }

    fn dispatch<H: EventHandler>(
        &mut self,
        handler: &mut H,
        event: ServerSentEvent<'static>,
    ) -> Result<Option<RunOutcome>, H::Error> {
        if let Some(id) = event.id.as_deref() {
            if !id.contains('\0') {
                self.last_event_id = id.to_string();
            }
        }
        if event.retry.is_some() {
            if let Some(retry) = event.retry_millis() {
                debug!("Server reconnection hint: {retry}ms");
                self.retry_millis = Some(retry);
            }
        }

        let event_type = event
            .event
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_EVENT_TYPE);

        if self.close_event.as_deref() == Some(event_type) {
            info!("Received `{event_type}` event, closing {}", self.url);
            handler.handle(TransportEvent::Closed)?;
            return Ok(Some(RunOutcome::Closed));
        }

        let Some(data) = event.data.as_deref() else {
            trace!("Skipping `{event_type}` event without data");
            return Ok(None);
        };

        let message = MessageEvent::new(data)
            .with_event_type(event_type)
            .with_last_event_id(self.last_event_id.clone());

        handler.handle(TransportEvent::Message(message))?;
        Ok(None)
    }
}

fn fail<H: EventHandler>(handler: &mut H, error: TransportError) -> Result<RunOutcome, H::Error> {
    warn!("SSE transport error: {error}");
    handler.handle(TransportEvent::Error(error.clone()))?;
    Ok(RunOutcome::Failed(error))
}

fn is_event_stream(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(EVENT_STREAM))
}
