use crate::message::ServerSentEvent;
use crate::parser::Parser;
use log::*;

const BYTE_ORDER_MARK: &[u8] = b"\xEF\xBB\xBF";

/// Incremental decoder for a chunked `text/event-stream` body.
///
/// Chunks may split lines, `\r\n` pairs or multi-byte characters anywhere;
/// bytes are held back until the blank line that terminates an event arrives.
/// Pending bytes are scanned once, however many chunks they arrive in.
#[derive(Debug, Default)]
pub struct EventDecoder {
    buffer: Vec<u8>,
    bom_checked: bool,
    scanned: usize,
    mid_line: bool,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next chunk, returning every event it completes, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<ServerSentEvent<'static>> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        if !self.strip_byte_order_mark() {
            return events;
        }

        while let Some(end) = self.event_boundary() {
            let block: Vec<u8> = self.buffer.drain(..end).collect();
            events.extend(parse_block(&block));
        }

        trace!(
            "decoded {} event(s), {} byte(s) pending",
            events.len(),
            self.buffer.len()
        );
        events
    }

    /// Flush whatever is left once the stream has ended.
    pub fn finish(&mut self) -> Option<ServerSentEvent<'static>> {
        let block = std::mem::take(&mut self.buffer);
        self.bom_checked = false;
        self.scanned = 0;
        self.mid_line = false;
        parse_block(&block).into_iter().next()
    }

    /// Number of buffered bytes not yet part of a complete event.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `false` while the buffer is still a strict prefix of the mark.
    fn strip_byte_order_mark(&mut self) -> bool {
        if self.bom_checked {
            return true;
        }
        if self.buffer.len() < BYTE_ORDER_MARK.len() && BYTE_ORDER_MARK.starts_with(&self.buffer) {
            return false;
        }
        if self.buffer.starts_with(BYTE_ORDER_MARK) {
            self.buffer.drain(..BYTE_ORDER_MARK.len());
        }
        self.bom_checked = true;
        true
    }

    /// Offset just past the first blank line in the buffer, if any.
    ///
    /// Resumes where the previous call stopped. A trailing `\r` that ends a
    /// non-blank line is left unscanned, since a `\n` may still follow it.
    fn event_boundary(&mut self) -> Option<usize> {
        let buf = &self.buffer;
        let mut i = self.scanned;
        let mut mid_line = self.mid_line;
        while i < buf.len() {
            match buf[i] {
                b'\r' if mid_line && i + 1 == buf.len() => break,
                b'\r' | b'\n' => {
                    let len = if buf[i] == b'\r' && buf.get(i + 1) == Some(&b'\n') {
                        2
                    } else {
                        1
                    };
                    if !mid_line {
                        self.scanned = 0;
                        self.mid_line = false;
                        return Some(i + len);
                    }
                    mid_line = false;
                    i += len;
                }
                _ => {
                    mid_line = true;
                    i += 1;
                }
            }
        }
        self.scanned = i;
        self.mid_line = mid_line;
        None
    }
}

fn parse_block(block: &[u8]) -> Vec<ServerSentEvent<'static>> {
    let text = String::from_utf8_lossy(block);
    Parser::without_byte_order_mark(&text)
        .map(ServerSentEvent::into_owned)
        .collect()
}
