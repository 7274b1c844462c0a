//! Process transport layer.
//!
//! This module owns the spawned child process (local shell or remote-login
//! command) and moves raw bytes in and out of its pseudo-terminal.

pub mod config;
mod process;

pub use config::{SpawnConfig, SpawnTarget};
pub use process::ProcessTransport;

use std::future::Future;

use crate::error::Result;

/// Byte-level access to an interactive process.
///
/// [`ProcessTransport`] is the real implementation; the channel layer only
/// depends on this trait.
pub trait Transport: Send {
    /// Write all bytes to the process input.
    fn write_all(&mut self, data: &[u8]) -> Result<()>;

    /// Wait for the next chunk of process output.
    ///
    /// Returns `None` once the output stream has ended. Must be cancel-safe:
    /// the channel races it against a deadline.
    fn read_chunk(&mut self) -> impl Future<Output = Option<Vec<u8>>> + Send;

    /// Terminate the process. Calling this more than once is a no-op.
    fn close(&mut self) -> Result<()>;

    /// Whether `close()` has been called.
    fn is_closed(&self) -> bool;
}
