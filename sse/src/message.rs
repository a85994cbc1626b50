use log::*;
use std::borrow::Cow;
use std::fmt;

/// One event of a `text/event-stream` body.
///
/// Field values are the text after `name:` with at most one leading space
/// removed, so any value survives encoding and parsing unchanged. Defaulting
/// the event type is left to the consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerSentEvent<'a> {
    pub comment: Option<Cow<'a, str>>,
    pub event: Option<Cow<'a, str>>,
    pub id: Option<Cow<'a, str>>,
    pub data: Option<Cow<'a, str>>,
    pub retry: Option<Cow<'a, str>>,
}

impl<'a> ServerSentEvent<'a> {
    pub fn builder() -> SseBuilder<'a> {
        SseBuilder {
            inner: Self::default(),
        }
    }

    /// Detach the event from the buffer it was parsed from.
    pub fn into_owned(self) -> ServerSentEvent<'static> {
        ServerSentEvent {
            comment: owned(self.comment),
            event: owned(self.event),
            id: owned(self.id),
            data: owned(self.data),
            retry: owned(self.retry),
        }
    }

    /// The reconnection hint in milliseconds. Values that are not made of
    /// ASCII digits only are ignored.
    pub fn retry_millis(&self) -> Option<u64> {
        self.retry
            .as_deref()
            .filter(|r| !r.is_empty() && r.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|r| r.parse().ok())
    }

    pub fn is_empty(&self) -> bool {
        self.comment.is_none()
            && self.event.is_none()
            && self.id.is_none()
            && self.data.is_none()
            && self.retry.is_none()
    }
}

fn owned(field: Option<Cow<'_, str>>) -> Option<Cow<'static, str>> {
    field.map(|value| Cow::Owned(value.into_owned()))
}

pub struct SseBuilder<'a> {
    inner: ServerSentEvent<'a>,
}

impl<'a> SseBuilder<'a> {
    pub fn comment(mut self, comment: impl Into<Cow<'a, str>>) -> Self {
        set_field(&mut self.inner.comment, "comment", comment.into());
        self
    }

    pub fn event(mut self, event: impl Into<Cow<'a, str>>) -> Self {
        set_field(&mut self.inner.event, "event", event.into());
        self
    }

    pub fn id(mut self, id: impl Into<Cow<'a, str>>) -> Self {
        set_field(&mut self.inner.id, "id", id.into());
        self
    }

    pub fn data(mut self, data: impl Into<Cow<'a, str>>) -> Self {
        set_field(&mut self.inner.data, "data", data.into());
        self
    }

    pub fn retry(mut self, retry: impl Into<Cow<'a, str>>) -> Self {
        set_field(&mut self.inner.retry, "retry", retry.into());
        self
    }

    pub fn build(self) -> ServerSentEvent<'a> {
        self.inner
    }
}

fn set_field<'a>(slot: &mut Option<Cow<'a, str>>, name: &str, value: Cow<'a, str>) {
    if let Some(old) = slot.replace(value) {
        warn!("overwriting {name}: {old:?} with {:?}", slot.as_deref());
    }
}

/// Split a field value on every line terminator the wire format recognizes.
/// An empty value yields a single empty segment.
pub(crate) fn split_lines(value: &str) -> impl Iterator<Item = &str> {
    value
        .split("\r\n")
        .flat_map(|segment| segment.split(['\r', '\n']))
}

fn write_field(f: &mut fmt::Formatter<'_>, name: &str, value: Option<&str>) -> fmt::Result {
    if let Some(value) = value {
        for line in split_lines(value) {
            // Parsers drop one space after the colon; write an extra one so a
            // leading space in the value survives.
            if line.starts_with(' ') {
                writeln!(f, "{name}: {line}")?;
            } else {
                writeln!(f, "{name}:{line}")?;
            }
        }
    }
    Ok(())
}

impl fmt::Display for ServerSentEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // An empty field name is how the wire format spells a comment.
        write_field(f, "", self.comment.as_deref())?;
        write_field(f, "event", self.event.as_deref())?;
        write_field(f, "id", self.id.as_deref())?;
        write_field(f, "retry", self.retry.as_deref())?;
        write_field(f, "data", self.data.as_deref())?;
        writeln!(f)
    }
}
