//! Error types for orc-harness.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Main error type for harness operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Process spawn and PTY errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Harness configuration errors
    #[error("Harness error: {0}")]
    Harness(#[from] HarnessError),
}

/// Transport layer errors (process spawn, PTY plumbing).
#[derive(Error, Debug)]
pub enum TransportError {
    /// The shell or remote-login command could not be started
    #[error("Failed to spawn '{command}': {message}")]
    Spawn { command: String, message: String },

    /// PTY allocation or handle error
    #[error("PTY error: {0}")]
    Pty(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Channel layer errors (pattern matching, reads and writes).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// The channel was closed and must not be used again
    #[error("Channel closed")]
    Closed,

    /// The process output ended while no end-of-stream pattern was expected
    #[error("End of stream reached ({} bytes left unmatched)", buffered.len())]
    Eof { buffered: String },

    /// Pattern matching timed out
    #[error("Pattern not found within {0:?}")]
    PatternTimeout(Duration),

    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Writing to the process failed
    #[error("Channel I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Harness configuration errors.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Invalid configuration in the switch builder
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Result type alias using the harness Error.
pub type Result<T> = std::result::Result<T, Error>;
