//! # orc-harness
//!
//! Test harness for Open Route Cache routing checks.
//!
//! The harness drives switch shells, either locally or over a remote login,
//! by sending command lines and waiting for expected output, much like
//! Python's pexpect. On top of that it offers a ping reachability check and
//! a small self-test suite.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use orc_harness::{ExpectOptions, Pattern, SwitchBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), orc_harness::Error> {
//!     let mut switch = SwitchBuilder::new().verbose(true).spawn()?;
//!
//!     switch.send_line("echo ORC IS GREAT")?;
//!     let outcome = switch
//!         .expect(&[Pattern::literal("ORC IS GREAT")], ExpectOptions::new())
//!         .await?;
//!     assert_eq!(outcome.index(), Some(0));
//!
//!     println!("reachable: {}", switch.ping("8.8.8.8").await?);
//!     switch.close()?;
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod error;
pub mod selftest;
pub mod switch;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types for convenience
pub use channel::{ExpectOptions, ExpectOutcome, Match, Pattern, TimedOut};
pub use error::{Error, Result};
pub use selftest::{SelfTestCase, SelfTestSuite, SuiteReport};
pub use switch::{PingOptions, SwitchBuilder, SwitchControl};
pub use transport::{ProcessTransport, SpawnTarget, Transport};
