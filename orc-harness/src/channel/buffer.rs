//! Output buffer with optional tail-window searching.
//!
//! Output accumulates here until an `expect` consumes it. Searching can be
//! limited to the last N bytes, which keeps prompt detection cheap when a
//! command produces a lot of output.

use std::fmt;

use bytes::{Bytes, BytesMut};

use super::patterns::{PatternMatch, PatternSet};

/// Buffer for accumulating process output and searching it for patterns.
///
/// Escape sequences are removed as output arrives. The parser keeps its state
/// between chunks, so a sequence or UTF-8 character split across two reads
/// is still handled as one.
#[derive(Default)]
pub struct PatternBuffer {
    /// Output not yet consumed by a match.
    buffer: BytesMut,

    /// Terminal parser shared by every chunk of the session.
    parser: vte::Parser,
}

/// Keeps printable text plus `\n`, `\r` and `\t`; drops CSI, OSC, DCS and ESC sequences.
struct Printable<'a>(&'a mut BytesMut);

impl vte::Perform for Printable<'_> {
    fn print(&mut self, c: char) {
        let mut utf8 = [0u8; 4];
        self.0.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
    }

    fn execute(&mut self, byte: u8) {
        if matches!(byte, b'\n' | b'\r' | b'\t') {
            self.0.extend_from_slice(&[byte]);
        }
    }
}

impl fmt::Debug for PatternBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternBuffer")
            .field("buffer", &self.buffer)
            .finish_non_exhaustive()
    }
}

impl PatternBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            parser: vte::Parser::new(),
        }
    }

    /// Extend the buffer with new data, stripping ANSI escape codes.
    pub fn extend(&mut self, data: &[u8]) {
        self.parser.advance(&mut Printable(&mut self.buffer), data);
    }

    /// Search for the earliest match of any pattern in the set.
    ///
    /// With `window = Some(n)` only the last `n` bytes are searched. The
    /// returned range is always relative to the start of the whole buffer.
    pub fn search(&self, patterns: &PatternSet, window: Option<usize>) -> Option<PatternMatch> {
        let start = window.map_or(0, |n| self.buffer.len().saturating_sub(n));
        patterns.find(&self.buffer[start..]).map(|m| PatternMatch {
            index: m.index,
            range: m.range.start + start..m.range.end + start,
        })
    }

    /// Remove everything up to the end of `m`.
    ///
    /// Returns the text before the match and the matched text.
    pub fn consume(&mut self, m: &PatternMatch) -> (Bytes, Bytes) {
        let before = self.buffer.split_to(m.range.start).freeze();
        let matched = self.buffer.split_to(m.range.end - m.range.start).freeze();
        (before, matched)
    }

    /// Take ownership of the buffer contents and reset.
    pub fn take(&mut self) -> Bytes {
        self.buffer.split().freeze()
    }

    /// Get a reference to the buffer contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the buffer contents as a string (lossy UTF-8 conversion).
    pub fn as_str_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.buffer)
    }

    /// Get the current buffer length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
