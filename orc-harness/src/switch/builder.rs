//! Builder for switch control connections.

use std::io::Write;
use std::time::Duration;

use super::control::SwitchControl;
use super::ping::PingOptions;
use super::trace::Tracer;
use crate::channel::{ChannelConfig, PtyChannel};
use crate::error::{HarnessError, Result};
use crate::transport::config::DEFAULT_LOGIN_COMMAND;
use crate::transport::{ProcessTransport, SpawnConfig, SpawnTarget, Transport};

/// Display name of a local switch.
pub const LOCAL_NAME: &str = "local";

/// Builder for constructing [`SwitchControl`] connections.
///
/// Without a host the connection is a local shell. With a host it is a
/// remote-login session as `user@host`; the user must be given explicitly.
///
/// # Example
///
/// ```rust,no_run
/// use orc_harness::SwitchBuilder;
///
/// # fn example() -> Result<(), orc_harness::Error> {
/// let switch = SwitchBuilder::new()
///     .host("sbs3.example.net")
///     .user("admin")
///     .verbose(true)
///     .spawn()?;
/// # Ok(())
/// # }
/// ```
pub struct SwitchBuilder {
    host: Option<String>,
    user: Option<String>,
    port: Option<u16>,
    login_command: String,
    shell: Option<String>,
    verbose: bool,
    log_sink: Option<Box<dyn Write + Send>>,
    trace: Option<Box<dyn Write + Send>>,
    channel_config: ChannelConfig,
    ping_options: PingOptions,
}

impl Default for SwitchBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SwitchBuilder {
    /// Create a builder for a local shell.
    pub fn new() -> Self {
        Self {
            host: None,
            user: None,
            port: None,
            login_command: DEFAULT_LOGIN_COMMAND.to_string(),
            shell: None,
            verbose: false,
            log_sink: None,
            trace: None,
            channel_config: ChannelConfig::default(),
            ping_options: PingOptions::default(),
        }
    }

    /// Connect to a remote host instead of a local shell.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the user to log in as.
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Set the remote-login port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the remote-login program (default: `ssh`).
    pub fn login_command(mut self, command: impl Into<String>) -> Self {
        self.login_command = command.into();
        self
    }

    /// Set the local shell program (default: `/bin/sh`).
    pub fn shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = Some(shell.into());
        self
    }

    /// Write `<<`, `!!` and `>>` trace lines.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Copy all raw session traffic to `sink`.
    pub fn log_sink(mut self, sink: Box<dyn Write + Send>) -> Self {
        self.log_sink = Some(sink);
        self
    }

    /// Write trace lines to `out` instead of standard error.
    pub fn trace_to(mut self, out: Box<dyn Write + Send>) -> Self {
        self.trace = Some(out);
        self
    }

    /// Set the default expect timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.channel_config.timeout = timeout;
        self
    }

    /// Limit expect searches to the last `bytes` of output.
    pub fn search_window(mut self, bytes: usize) -> Self {
        self.channel_config.search_window = Some(bytes);
        self
    }

    /// Set the defaults used by `ping`.
    pub fn ping_options(mut self, options: PingOptions) -> Self {
        self.ping_options = options;
        self
    }

    /// Work out what to spawn.
    pub fn target(&self) -> Result<SpawnTarget> {
        match &self.host {
            None => Ok(match &self.shell {
                Some(shell) => SpawnTarget::Local {
                    shell: shell.clone(),
                },
                None => SpawnTarget::local(),
            }),
            Some(host) if host.trim().is_empty() => Err(HarnessError::InvalidConfig {
                message: "host must not be empty".to_string(),
            }
            .into()),
            Some(host) => {
                let user = self.user.clone().ok_or_else(|| HarnessError::InvalidConfig {
                    message: format!("user is required to log in to {}", host),
                })?;
                Ok(SpawnTarget::Remote {
                    host: host.clone(),
                    user,
                    port: self.port,
                    login_command: self.login_command.clone(),
                })
            }
        }
    }

    /// Spawn the process and return the connected switch.
    pub fn spawn(mut self) -> Result<SwitchControl> {
        let target = self.target()?;
        let config = SpawnConfig::new(target.clone());

        let mut tracer = self.tracer();
        if !target.is_local() {
            tracer.log(&format!("Spawning '{}'...", target.command_line()));
        }

        let transport = ProcessTransport::spawn(&config)?;
        Ok(self.finish(transport, tracer))
    }

    /// Build a switch over an already-connected transport.
    pub fn attach<T: Transport>(mut self, transport: T) -> Result<SwitchControl<T>> {
        self.target()?;
        let tracer = self.tracer();
        Ok(self.finish(transport, tracer))
    }

    fn tracer(&mut self) -> Tracer {
        let name = self.host.clone().unwrap_or_else(|| LOCAL_NAME.to_string());
        match self.trace.take() {
            Some(out) => Tracer::new(name, self.verbose, out),
            None => Tracer::stderr(name, self.verbose),
        }
    }

    fn finish<T: Transport>(self, transport: T, tracer: Tracer) -> SwitchControl<T> {
        let mut channel = PtyChannel::new(transport, self.channel_config);
        if let Some(sink) = self.log_sink {
            channel.set_log_sink(sink);
        }
        SwitchControl::new(
            self.host,
            self.user.unwrap_or_default(),
            channel,
            tracer,
            self.ping_options,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, SharedBuffer};

    #[test]
    fn test_local_target() {
        let target = SwitchBuilder::new().target().unwrap();
        assert_eq!(target, SpawnTarget::local());

        let target = SwitchBuilder::new().shell("bash").target().unwrap();
        assert_eq!(target.command_line(), "bash");
    }

    #[test]
    fn test_remote_target() {
        let target = SwitchBuilder::new()
            .host("sbs3.example.net")
            .user("admin")
            .port(2222)
            .target()
            .unwrap();
        assert_eq!(target.command_line(), "ssh -p 2222 admin@sbs3.example.net");
    }

    #[test]
    fn test_remote_requires_user() {
        let err = SwitchBuilder::new().host("sbs3").target().unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Harness(HarnessError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_empty_host_rejected() {
        assert!(SwitchBuilder::new().host(" ").user("admin").target().is_err());
    }

    #[test]
    fn test_attach_names_and_flags() {
        let (transport, _handle) = testing::scripted();
        let switch = SwitchBuilder::new().user("ops").attach(transport).unwrap();
        assert_eq!(switch.name(), "local");
        assert!(switch.is_local());
        assert_eq!(switch.user(), "ops");
        assert!(!switch.is_verbose());

        let (transport, _handle) = testing::scripted();
        let switch = SwitchBuilder::new()
            .host("sbs3")
            .user("admin")
            .verbose(true)
            .attach(transport)
            .unwrap();
        assert_eq!(switch.name(), "sbs3");
        assert_eq!(switch.host(), Some("sbs3"));
        assert!(!switch.is_local());
        assert!(switch.is_verbose());
    }

    #[test]
    fn test_timeout_reaches_channel() {
        let (transport, _handle) = testing::scripted();
        let switch = SwitchBuilder::new()
            .timeout(Duration::from_secs(7))
            .search_window(512)
            .attach(transport)
            .unwrap();
        assert_eq!(switch.channel().config().timeout, Duration::from_secs(7));
        assert_eq!(switch.channel().config().search_window, Some(512));
    }

    #[test]
    fn test_spawn_failure_names_login_command() {
        let trace = SharedBuffer::default();
        let result = SwitchBuilder::new()
            .host("sbs3")
            .user("admin")
            .login_command("/nonexistent/orc-ssh")
            .trace_to(Box::new(trace.clone()))
            .spawn();
        assert!(matches!(
            result,
            Err(crate::Error::Transport(
                crate::error::TransportError::Spawn { .. }
            ))
        ));
        assert_eq!(
            trace.contents(),
            "Spawning '/nonexistent/orc-ssh admin@sbs3'...\n"
        );
    }
}
