//! Ping command construction.

use std::time::Duration;

use crate::channel::Pattern;

/// Address pinged when none is given.
pub const DEFAULT_PING_TARGET: &str = "8.8.8.8";

/// Options for a reachability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingOptions {
    /// How long to wait for the first reply.
    pub timeout: Duration,

    /// Echo requests to send (`-c`).
    pub count: u32,

    /// Source interface (`-I`).
    pub iface: Option<String>,
}

impl Default for PingOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            count: 1,
            iface: None,
        }
    }
}

impl PingOptions {
    /// Override the reply timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the request count.
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// Ping out of a specific interface.
    pub fn with_iface(mut self, iface: impl Into<String>) -> Self {
        self.iface = Some(iface.into());
        self
    }

    /// Shell command for pinging `ip`. `-n` keeps replies numeric so the
    /// success line carries the literal address.
    pub fn command(&self, ip: &str) -> String {
        let mut cmd = format!("ping -n -c {}", self.count);
        if let Some(iface) = &self.iface {
            cmd.push_str(" -I ");
            cmd.push_str(iface);
        }
        cmd.push(' ');
        cmd.push_str(ip);
        cmd
    }

    /// Patterns to wait for: a reply from `ip` at index 0, then end of stream.
    pub fn patterns(ip: &str) -> [Pattern; 2] {
        [
            Pattern::literal(format!("64 bytes from {}", ip)),
            Pattern::EndOfStream,
        ]
    }
}
