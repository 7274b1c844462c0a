//! Outcome of an `expect` call.

use std::time::Duration;

/// A successful pattern match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Index of the matched pattern in the list passed to `expect`.
    pub index: usize,

    /// Output consumed before the match.
    pub before: String,

    /// The matched text (empty for an end-of-stream match).
    pub matched: String,

    /// Time spent waiting.
    pub elapsed: Duration,
}

impl Match {
    /// Everything consumed by this match: `before` followed by `matched`.
    pub fn text(&self) -> String {
        let mut text = String::with_capacity(self.before.len() + self.matched.len());
        text.push_str(&self.before);
        text.push_str(&self.matched);
        text
    }
}

/// No pattern matched before the deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedOut {
    /// Output buffered so far. It stays in the channel buffer.
    pub before: String,

    /// The timeout that elapsed.
    pub timeout: Duration,
}

/// Result of waiting for a set of patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectOutcome {
    /// One of the patterns matched.
    Matched(Match),

    /// The timeout elapsed first.
    TimedOut(TimedOut),
}

impl ExpectOutcome {
    /// Index of the matched pattern, or `None` on timeout.
    pub fn index(&self) -> Option<usize> {
        match self {
            ExpectOutcome::Matched(m) => Some(m.index),
            ExpectOutcome::TimedOut(_) => None,
        }
    }

    /// Whether the pattern at `index` matched.
    pub fn matched(&self, index: usize) -> bool {
        self.index() == Some(index)
    }

    /// Whether the wait timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ExpectOutcome::TimedOut(_))
    }

    /// All output this wait observed, for transcript logging.
    pub fn observed(&self) -> String {
        match self {
            ExpectOutcome::Matched(m) => m.text(),
            ExpectOutcome::TimedOut(t) => t.before.clone(),
        }
    }
}
