//! This module contains the compiled pattern, the entry point of the crate.

use log::trace;
use std::time::Instant;

use crate::{
    parser::parse_tokens,
    token::{tokenize, Token},
    Dfa, Result,
};

/// Compile a pattern into a [`Regex`].
/// # Errors
/// See [`Regex::new`].
pub fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
}

/// A compiled pattern.
/// The pattern is matched against whole strings, it is anchored at both ends. A compiled pattern
/// is never mutated by matching, so it can be shared between threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Regex {
    /// The source pattern, `None` for results of automaton operations.
    pattern: Option<String>,
    /// The minimized automaton.
    dfa: Dfa,
}

impl Regex {
    /// Compile a pattern.
    /// The pattern is tokenized, parsed, built into a DFA and minimized. A pattern that does not
    /// end with the `$` anchor gets one.
    /// # Errors
    /// * [`crate::RegDfaErrorKind::LexError`] for a pattern that can't be tokenized.
    /// * [`crate::RegDfaErrorKind::ParseError`] for a syntactically invalid pattern.
    /// * [`crate::RegDfaErrorKind::InvalidBounds`] for a repetition with `min > max`.
    pub fn new(pattern: &str) -> Result<Self> {
        let now = Instant::now();
        let mut tokens = tokenize(pattern)?;
        if tokens.last() != Some(&Token::End) {
            tokens.push(Token::End);
        }
        let tree = parse_tokens(&tokens)?;
        let mut dfa = Dfa::try_from(&tree)?;
        dfa.minimize();
        let elapsed_time = now.elapsed();
        trace!(
            "Compiling {:?} took {} milliseconds.",
            pattern,
            elapsed_time.as_millis()
        );
        Ok(Regex {
            pattern: Some(pattern.to_string()),
            dfa,
        })
    }

    /// The source pattern, if the regex was compiled from one.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    /// The minimized automaton.
    pub fn dfa(&self) -> &Dfa {
        &self.dfa
    }

    /// Returns true if the regex matches the whole text.
    pub fn is_match(&self, text: &str) -> bool {
        self.dfa.is_match(text)
    }

    /// Create a pattern that matches the same language.
    /// # Errors
    /// See [`Dfa::to_regex`].
    pub fn to_regex(&self) -> Result<String> {
        self.dfa.to_regex()
    }

    /// The regex that matches exactly the strings over the alphabet this one doesn't match.
    pub fn complement(&self) -> Result<Regex> {
        Ok(Regex::from(self.dfa.complement()?))
    }

    /// The regex that matches the strings both regexes match.
    pub fn intersect(&self, other: &Regex) -> Result<Regex> {
        Ok(Regex::from(self.dfa.intersect(&other.dfa)?))
    }

    /// The regex that matches the strings this regex matches but the other one doesn't.
    pub fn difference(&self, other: &Regex) -> Result<Regex> {
        Ok(Regex::from(self.dfa.difference(&other.dfa)?))
    }

    /// Returns true if every string this regex matches is matched by the other one.
    pub fn is_subset_of(&self, other: &Regex) -> Result<bool> {
        Ok(self.dfa.difference(&other.dfa)?.accepts_nothing())
    }

    /// Returns true if both regexes match the same strings.
    pub fn is_equivalent_to(&self, other: &Regex) -> Result<bool> {
        Ok(self.is_subset_of(other)? && other.is_subset_of(self)?)
    }
}

impl From<Dfa> for Regex {
    /// The automaton is minimized.
    fn from(mut dfa: Dfa) -> Self {
        dfa.minimize();
        Regex { pattern: None, dfa }
    }
}
