//! Channel layer for pattern matching over an interactive process.
//!
//! This module handles output buffering, ANSI stripping, and the
//! expect loop with its timeout and end-of-stream rules.

mod buffer;
mod outcome;
mod patterns;
mod pty;

pub use buffer::PatternBuffer;
pub use outcome::{ExpectOutcome, Match, TimedOut};
pub use patterns::{Pattern, PatternMatch, PatternSet};
pub use pty::{ChannelConfig, DEFAULT_TIMEOUT, ExpectOptions, PtyChannel};
