use crate::message::ServerSentEvent;
use log::*;
use std::borrow::Cow;

/// Walks a complete `text/event-stream` body, yielding one event per call.
///
/// Field values are borrowed from the input; only events that repeat the
/// `data` field allocate to join the lines.
pub struct Parser<'a> {
    rest: &'a str,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::without_byte_order_mark(input.strip_prefix('\u{FEFF}').unwrap_or(input))
    }

    /// Parse a slice taken from the middle of a stream, where a leading
    /// U+FEFF is ordinary text rather than a byte-order mark.
    pub(crate) fn without_byte_order_mark(input: &'a str) -> Self {
        Self {
            rest: input.trim_start_matches(['\r', '\n']),
        }
    }

    /// Returns the next event, or `None` once the input is exhausted.
    ///
    /// An event is terminated by a blank line; a trailing event without one is
    /// still returned at end of input.
    pub fn next_event(&mut self) -> Option<ServerSentEvent<'a>> {
        let mut pending = ServerSentEvent::default();
        let mut saw_field = false;

        while let Some(line) = self.next_line() {
            if line.is_empty() {
                if saw_field {
                    return Some(pending);
                }
                continue;
            }
            saw_field = true;
            apply_line(&mut pending, line);
        }

        saw_field.then_some(pending)
    }

    /// Consume one line, accepting `\r\n`, `\r` or `\n` as its terminator.
    fn next_line(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        match self.rest.find(['\r', '\n']) {
            Some(pos) => {
                let line = &self.rest[..pos];
                let tail = &self.rest[pos..];
                let terminator_len = if tail.starts_with("\r\n") { 2 } else { 1 };
                self.rest = &tail[terminator_len..];
                Some(line)
            }
            None => {
                let line = self.rest;
                self.rest = "";
                Some(line)
            }
        }
    }
}

impl<'a> Iterator for Parser<'a> {
    type Item = ServerSentEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event()
    }
}

fn apply_line<'a>(pending: &mut ServerSentEvent<'a>, line: &'a str) {
    // A line without a colon names a field with an empty value.
    let (name, value) = line.split_once(':').unwrap_or((line, ""));
    let value = value.strip_prefix(' ').unwrap_or(value);
    let field = Field::from(name);
    trace!("field {field:?} with value {value:?}");

    match field {
        Field::Data => {
            pending.data = Some(match pending.data.take() {
                None => Cow::Borrowed(value),
                Some(previous) => Cow::Owned(format!("{previous}\n{value}")),
            });
        }
        Field::Event => pending.event = Some(Cow::Borrowed(value)),
        Field::Id => pending.id = Some(Cow::Borrowed(value)),
        Field::Retry => pending.retry = Some(Cow::Borrowed(value)),
        Field::Comment => pending.comment = Some(Cow::Borrowed(value)),
        Field::Unknown(name) => {
            warn!("dropping unknown field {name}:{value}");
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Field<'a> {
    Data,
    Event,
    Id,
    Retry,
    Comment,
    Unknown(&'a str),
}

impl<'a> From<&'a str> for Field<'a> {
    fn from(name: &'a str) -> Self {
        match name {
            "data" => Self::Data,
            "event" => Self::Event,
            "id" => Self::Id,
            "retry" => Self::Retry,
            "" => Self::Comment,
            _ => Self::Unknown(name),
        }
    }
}
