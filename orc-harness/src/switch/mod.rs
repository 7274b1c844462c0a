//! Switch control connections.
//!
//! A [`SwitchControl`] owns one interactive session, either a local shell or
//! a remote login, and offers the handful of operations the harness needs:
//! send a line, expect output, ping, echo-check and close.

mod builder;
mod control;
mod ping;
mod trace;

pub use builder::{LOCAL_NAME, SwitchBuilder};
pub use control::{ECHO_TEST_STRING, SwitchControl};
pub use ping::{DEFAULT_PING_TARGET, PingOptions};
pub use trace::Tracer;
