#![forbid(missing_docs)]
//! The `regdfa` crate compiles regular patterns directly into deterministic finite automata.
//! The automata can be matched against whole strings, combined by complement, intersection and
//! difference, and converted back into patterns.
//!
//! ```
//! let regex = regdfa::compile("(a|b)*abb").unwrap();
//! assert!(regex.is_match("ababb"));
//! assert!(!regex.is_match("abba"));
//! ```

/// Module with error definitions
mod errors;
pub use errors::{ConversionError, LexError, ParseError, RegDfaError, RegDfaErrorKind, Result};

/// Module that provides types for integer ids that can also be used to index into slices.
mod ids;
pub use ids::StateID;
pub(crate) use ids::BlockID;

/// The token module contains the tokenizer of the pattern syntax.
mod token;
pub use token::{tokenize, Token};

/// The module containing the abstract syntax tree of a pattern.
mod ast;
pub use ast::{Node, Repeat, RegexTree};

/// The parser module contains the pattern syntax parser.
mod parser;
pub use parser::{parse_regex_syntax, parse_tokens};

/// The dfa module contains the DFA implementation and the matcher.
mod dfa;
pub use dfa::{Dfa, DfaState, Transition, ALPHABET_END, ALPHABET_START, ESCAPE_MARKER};

/// The module containing the conversion from a syntax tree to a DFA.
mod builder;

/// The module containing the minimization of DFAs.
mod minimizer;

/// The module containing complement, intersection and difference of DFAs.
mod algebra;

/// The module containing the conversion from a DFA back to a pattern.
mod to_regex;
pub use to_regex::REGEX_LENGTH_LIMIT;

/// The module containing the compiled pattern.
mod regex;
pub use regex::{compile, Regex};

/// Module with conversion to graphviz dot format
#[cfg(feature = "dot")]
mod dot;
#[cfg(feature = "dot")]
pub use dot::dfa_render;
