//! Expect patterns and earliest-match selection.

use std::fmt;
use std::ops::Range;

use regex::bytes::Regex;

/// Something `expect` can wait for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// Exact text.
    Literal(String),

    /// A byte regex.
    Regex(String),

    /// The process output ended.
    EndOfStream,
}

impl Pattern {
    /// Exact text pattern.
    pub fn literal(text: impl Into<String>) -> Self {
        Pattern::Literal(text.into())
    }

    /// Regex pattern.
    pub fn regex(pattern: impl Into<String>) -> Self {
        Pattern::Regex(pattern.into())
    }

    /// Compile to a regex, or `None` for [`Pattern::EndOfStream`].
    fn compile(&self) -> Result<Option<Regex>, regex::Error> {
        match self {
            Pattern::Literal(text) => Regex::new(&regex::escape(text)).map(Some),
            Pattern::Regex(pattern) => Regex::new(pattern).map(Some),
            Pattern::EndOfStream => Ok(None),
        }
    }
}

impl From<&str> for Pattern {
    fn from(text: &str) -> Self {
        Pattern::literal(text)
    }
}

impl From<String> for Pattern {
    fn from(text: String) -> Self {
        Pattern::Literal(text)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Literal(text) => write!(f, "{}", text),
            Pattern::Regex(pattern) => write!(f, "/{}/", pattern),
            Pattern::EndOfStream => write!(f, "<EOF>"),
        }
    }
}

/// Location of a pattern match within searched data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    /// Index of the pattern in its set.
    pub index: usize,

    /// Byte range of the match.
    pub range: Range<usize>,
}

/// An ordered, compiled list of candidate patterns.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
    compiled: Vec<Option<Regex>>,
}

impl PatternSet {
    /// Compile a list of patterns.
    pub fn new(patterns: &[Pattern]) -> Result<Self, regex::Error> {
        let compiled = patterns
            .iter()
            .map(Pattern::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            patterns: patterns.to_vec(),
            compiled,
        })
    }

    /// Find the match that starts earliest in `data`.
    ///
    /// When two patterns match at the same offset the lower index wins.
    pub fn find(&self, data: &[u8]) -> Option<PatternMatch> {
        let mut best: Option<PatternMatch> = None;
        for (index, regex) in self.compiled.iter().enumerate() {
            let Some(regex) = regex else { continue };
            if let Some(m) = regex.find(data) {
                let better = best
                    .as_ref()
                    .is_none_or(|b| m.start() < b.range.start);
                if better {
                    best = Some(PatternMatch {
                        index,
                        range: m.range(),
                    });
                }
            }
        }
        best
    }

    /// Index of the first [`Pattern::EndOfStream`] entry, if any.
    pub fn eof_index(&self) -> Option<usize> {
        self.patterns
            .iter()
            .position(|p| matches!(p, Pattern::EndOfStream))
    }

    /// The patterns in order.
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Number of patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl fmt::Display for PatternSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, pattern) in self.patterns.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{}", pattern)?;
        }
        Ok(())
    }
}
