//! The control connection to a switch shell.

use std::time::Duration;

use log::debug;

use super::ping::{DEFAULT_PING_TARGET, PingOptions};
use super::trace::Tracer;
use crate::channel::{ExpectOptions, ExpectOutcome, Pattern, PatternSet, PtyChannel};
use crate::error::{ChannelError, Result};
use crate::transport::{ProcessTransport, Transport};

/// Text echoed by [`SwitchControl::test_channel`].
pub const ECHO_TEST_STRING: &str = "ORC IS GREAT";

/// Control connection to one switch, either a local shell or an SSH session.
///
/// Created by [`SwitchBuilder`](super::SwitchBuilder). The child process
/// lives until [`close`](Self::close) is called or the controller is
/// dropped.
///
/// # Example
///
/// ```rust,no_run
/// use orc_harness::SwitchBuilder;
///
/// # async fn example() -> Result<(), orc_harness::Error> {
/// let mut switch = SwitchBuilder::new().verbose(true).spawn()?;
/// assert!(switch.test_channel().await?);
/// let reachable = switch.ping("10.234.0.1").await?;
/// switch.close()?;
/// # Ok(())
/// # }
/// ```
pub struct SwitchControl<T: Transport = ProcessTransport> {
    /// Remote host, `None` for a local shell.
    host: Option<String>,

    /// User the session runs as.
    user: String,

    /// Expect channel over the child process.
    channel: PtyChannel<T>,

    /// Trace line writer.
    tracer: Tracer,

    /// Defaults for `ping`.
    ping_options: PingOptions,
}

impl<T: Transport> SwitchControl<T> {
    pub(crate) fn new(
        host: Option<String>,
        user: String,
        channel: PtyChannel<T>,
        tracer: Tracer,
        ping_options: PingOptions,
    ) -> Self {
        Self {
            host,
            user,
            channel,
            tracer,
            ping_options,
        }
    }

    /// Display name: `"local"` or the host.
    pub fn name(&self) -> &str {
        self.tracer.name()
    }

    /// Remote host, if any.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// User the session runs as.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Whether this is a local shell.
    pub fn is_local(&self) -> bool {
        self.host.is_none()
    }

    /// Whether verbose trace lines are written.
    pub fn is_verbose(&self) -> bool {
        self.tracer.is_verbose()
    }

    /// Turn verbose trace lines on or off.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.tracer.set_verbose(verbose);
    }

    /// Set the default expect timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.channel.set_timeout(timeout);
    }

    /// Get the underlying channel.
    pub fn channel(&self) -> &PtyChannel<T> {
        &self.channel
    }

    /// Send a line to the switch.
    pub fn send_line(&mut self, text: &str) -> Result<()> {
        if self.channel.is_closed() {
            return Err(ChannelError::Closed.into());
        }
        self.tracer.sent(text);
        self.channel.send_line(text)
    }

    /// Wait for one of `patterns` in the switch output.
    ///
    /// Returns the index of the pattern that matched, or a timeout. Hitting
    /// end of stream is an error unless [`Pattern::EndOfStream`] is listed.
    pub async fn expect(
        &mut self,
        patterns: &[Pattern],
        options: ExpectOptions,
    ) -> Result<ExpectOutcome> {
        if self.channel.is_closed() {
            return Err(ChannelError::Closed.into());
        }
        let set = PatternSet::new(patterns).map_err(ChannelError::InvalidPattern)?;
        self.tracer.waiting(&set);

        let result = self.channel.expect(&set, options).await;
        match &result {
            Ok(outcome) => self.tracer.observed(&outcome.observed()),
            Err(crate::Error::Channel(ChannelError::Eof { buffered })) => {
                self.tracer.observed(buffered)
            }
            Err(_) => {}
        }
        result
    }

    /// Ping `ip` with the default options. `true` if a reply arrived.
    pub async fn ping(&mut self, ip: &str) -> Result<bool> {
        let options = self.ping_options.clone();
        self.ping_with(ip, &options).await
    }

    /// Ping [`DEFAULT_PING_TARGET`].
    pub async fn ping_default(&mut self) -> Result<bool> {
        self.ping(DEFAULT_PING_TARGET).await
    }

    /// Ping `ip` and report whether a reply arrived within `options.timeout`.
    ///
    /// A timeout or the session ending both count as unreachable.
    pub async fn ping_with(&mut self, ip: &str, options: &PingOptions) -> Result<bool> {
        self.send_line(&options.command(ip))?;
        let outcome = self
            .expect(
                &PingOptions::patterns(ip),
                ExpectOptions::new().with_timeout(options.timeout),
            )
            .await?;
        let reachable = outcome.matched(0);
        debug!("{}: ping {} -> {}", self.name(), ip, reachable);
        Ok(reachable)
    }

    /// Echo a known string and wait for it to come back.
    ///
    /// The terminal's echo of the command is consumed first, so only the
    /// command's output counts. A prompt may be drawn between the two.
    pub async fn test_channel(&mut self) -> Result<bool> {
        let command = format!("echo {}", ECHO_TEST_STRING);
        self.send_line(&command)?;
        for expected in [command.as_str(), ECHO_TEST_STRING] {
            match self.expect(&[Pattern::literal(expected)], ExpectOptions::new()).await? {
                ExpectOutcome::Matched(_) => {}
                ExpectOutcome::TimedOut(t) => {
                    return Err(ChannelError::PatternTimeout(t.timeout).into());
                }
            }
        }
        Ok(true)
    }

    /// Write a line to the trace output.
    pub fn log(&mut self, text: &str) {
        self.tracer.log(text);
    }

    /// Terminate the session. Safe to call more than once.
    pub fn close(&mut self) -> Result<()> {
        if !self.channel.is_closed() {
            debug!("{}: closing", self.name());
        }
        self.channel.close()
    }

    /// Whether the session has been closed.
    pub fn is_closed(&self) -> bool {
        self.channel.is_closed()
    }
}
