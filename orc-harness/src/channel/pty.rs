//! Expect-style channel over an interactive process transport.

use std::io::Write;
use std::time::Duration;

use log::{debug, trace, warn};
use tokio::time::Instant;

use super::buffer::PatternBuffer;
use super::outcome::{ExpectOutcome, Match, TimedOut};
use super::patterns::PatternSet;
use crate::error::{ChannelError, Result};
use crate::transport::Transport;

/// Default wait for `expect` when no timeout is given.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Channel-wide defaults for expect operations.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Default timeout for `expect`.
    pub timeout: Duration,

    /// Default search window in bytes; `None` searches the whole buffer.
    pub search_window: Option<usize>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            search_window: None,
        }
    }
}

/// Per-call overrides for `expect`. `None` falls back to the channel default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpectOptions {
    /// How long to wait.
    pub timeout: Option<Duration>,

    /// Only search the last N bytes of buffered output.
    pub search_window: Option<usize>,
}

impl ExpectOptions {
    /// Use the channel defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the search window.
    pub fn with_search_window(mut self, bytes: usize) -> Self {
        self.search_window = Some(bytes);
        self
    }
}

/// An interactive process with a pattern buffer in front of its output.
///
/// Every byte sent or received is also copied to the optional transcript
/// sink, unmodified.
pub struct PtyChannel<T: Transport> {
    /// The process transport.
    transport: T,

    /// Channel defaults.
    config: ChannelConfig,

    /// Output not yet consumed by a match.
    buffer: PatternBuffer,

    /// Set once the transport reported end of output.
    eof: bool,

    /// Raw transcript of the session.
    log_sink: Option<Box<dyn Write + Send>>,
}

impl<T: Transport> PtyChannel<T> {
    /// Wrap a transport.
    pub fn new(transport: T, config: ChannelConfig) -> Self {
        Self {
            transport,
            config,
            buffer: PatternBuffer::new(),
            eof: false,
            log_sink: None,
        }
    }

    /// Copy all session traffic to `sink`.
    pub fn set_log_sink(&mut self, sink: Box<dyn Write + Send>) {
        self.log_sink = Some(sink);
    }

    /// Write `text` followed by a newline.
    pub fn send_line(&mut self, text: &str) -> Result<()> {
        let mut data = Vec::with_capacity(text.len() + 1);
        data.extend_from_slice(text.as_bytes());
        data.push(b'\n');
        self.send(&data)
    }

    /// Write raw bytes.
    pub fn send(&mut self, data: &[u8]) -> Result<()> {
        if self.transport.is_closed() {
            return Err(ChannelError::Closed.into());
        }
        self.record(data);
        self.transport.write_all(data)
    }

    /// Wait until one of `patterns` matches, the output ends, or the timeout elapses.
    pub async fn expect(
        &mut self,
        patterns: &PatternSet,
        options: ExpectOptions,
    ) -> Result<ExpectOutcome> {
        if self.transport.is_closed() {
            return Err(ChannelError::Closed.into());
        }

        let timeout = options.timeout.unwrap_or(self.config.timeout);
        let window = options.search_window.or(self.config.search_window);
        let start = Instant::now();
        let deadline = start + timeout;

        loop {
            if let Some(m) = self.buffer.search(patterns, window) {
                let (before, matched) = self.buffer.consume(&m);
                debug!("pattern {} matched after {:?}", m.index, start.elapsed());
                return Ok(ExpectOutcome::Matched(Match {
                    index: m.index,
                    before: String::from_utf8_lossy(&before).into_owned(),
                    matched: String::from_utf8_lossy(&matched).into_owned(),
                    elapsed: start.elapsed(),
                }));
            }

            if self.eof {
                let buffered = String::from_utf8_lossy(&self.buffer.take()).into_owned();
                return match patterns.eof_index() {
                    Some(index) => Ok(ExpectOutcome::Matched(Match {
                        index,
                        before: buffered,
                        matched: String::new(),
                        elapsed: start.elapsed(),
                    })),
                    None => Err(ChannelError::Eof { buffered }.into()),
                };
            }

            match tokio::time::timeout_at(deadline, self.transport.read_chunk()).await {
                Ok(Some(chunk)) => {
                    trace!("read {} bytes, buffer: {} bytes", chunk.len(), self.buffer.len());
                    self.record(&chunk);
                    self.buffer.extend(&chunk);
                }
                Ok(None) => {
                    debug!("end of stream");
                    self.eof = true;
                }
                Err(_) => {
                    debug!("no match for '{}' within {:?}", patterns, timeout);
                    return Ok(ExpectOutcome::TimedOut(TimedOut {
                        before: self.buffer.as_str_lossy().into_owned(),
                        timeout,
                    }));
                }
            }
        }
    }

    /// Close the underlying transport. Safe to call more than once.
    pub fn close(&mut self) -> Result<()> {
        if let Some(sink) = self.log_sink.as_mut() {
            let _ = sink.flush();
        }
        self.transport.close()
    }

    /// Whether the channel has been closed.
    pub fn is_closed(&self) -> bool {
        self.transport.is_closed()
    }

    /// Whether the process output has ended.
    pub fn at_eof(&self) -> bool {
        self.eof
    }

    /// Output buffered but not yet consumed.
    pub fn buffered(&self) -> std::borrow::Cow<'_, str> {
        self.buffer.as_str_lossy()
    }

    /// Get the configuration.
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Set the default timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.config.timeout = timeout;
    }

    /// Get a reference to the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn record(&mut self, data: &[u8]) {
        if let Some(sink) = self.log_sink.as_mut() {
            if let Err(e) = sink.write_all(data) {
                warn!("transcript write failed: {}", e);
            }
        }
    }
}
