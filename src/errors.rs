use thiserror::Error;

use crate::token::Token;

/// The result type for the `regdfa` crate.
pub type Result<T> = std::result::Result<T, RegDfaError>;

/// The error type for the `regdfa` crate.
#[derive(Error, Debug)]
pub struct RegDfaError {
    /// The source of the error.
    pub source: Box<RegDfaErrorKind>,
}

impl RegDfaError {
    /// Create a new `RegDfaError`.
    pub fn new(kind: RegDfaErrorKind) -> Self {
        RegDfaError {
            source: Box::new(kind),
        }
    }

    /// Get the kind of the error.
    pub fn kind(&self) -> &RegDfaErrorKind {
        &self.source
    }
}

impl std::fmt::Display for RegDfaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// The error kind type.
#[derive(Error, Debug)]
pub enum RegDfaErrorKind {
    /// The pattern could not be split into tokens.
    #[error(transparent)]
    LexError(#[from] LexError),

    /// The token sequence does not form a valid pattern.
    #[error(transparent)]
    ParseError(#[from] ParseError),

    /// A repetition whose lower bound exceeds its upper bound.
    #[error("Invalid repeat bounds: min {min} is greater than max {max}")]
    InvalidBounds {
        /// The lower bound.
        min: usize,
        /// The upper bound.
        max: usize,
    },

    /// The automaton builder was handed a tree without a root node.
    #[error("Regex tree is empty")]
    EmptyTree,

    /// An operation was applied to an automaton that has no usable start state.
    #[error("Invalid automaton state: {0}")]
    RuntimeState(String),

    /// The automaton could not be converted back into a pattern.
    #[error(transparent)]
    ConversionError(#[from] ConversionError),
}

/// Errors raised while tokenizing a pattern.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// The escape marker is the last character of the pattern.
    #[error("Dangling escape marker at position {position}")]
    DanglingEscape {
        /// Byte offset of the escape marker.
        position: usize,
    },

    /// The end anchor appears before the end of the pattern.
    #[error("End anchor '$' at position {position} is not the last character")]
    MisplacedAnchor {
        /// Byte offset of the anchor.
        position: usize,
    },

    /// The content of a `{...}` group is not one of the supported bound forms.
    #[error("Malformed repeat bounds '{{{content}}}' at position {position}")]
    MalformedBounds {
        /// Byte offset of the opening brace.
        position: usize,
        /// The text between the braces.
        content: String,
    },

    /// A `{` without a closing `}`.
    #[error("Missing '}}' for repeat bounds opened at position {position}")]
    UnclosedBounds {
        /// Byte offset of the opening brace.
        position: usize,
    },

    /// A character outside the printable ASCII alphabet.
    #[error("Character {character:?} at position {position} is outside the alphabet")]
    UnsupportedCharacter {
        /// Byte offset of the character.
        position: usize,
        /// The offending character.
        character: char,
    },
}

/// Errors raised while parsing a token sequence.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A concatenation without any element, e.g. `()` or `a|`.
    #[error("Empty concatenation")]
    EmptyConcatenation,

    /// A group opened with `(` is not closed.
    #[error("Expected closing ')'")]
    UnclosedGroup,

    /// A `)` without a matching `(`.
    #[error("Unmatched ')'")]
    UnmatchedCloseParen,

    /// A token that cannot start an atom.
    #[error("Unexpected token {token:?}")]
    UnexpectedToken {
        /// The token found.
        token: Token,
    },

    /// The token sequence ended where an atom was expected.
    #[error("Unexpected end of pattern")]
    UnexpectedEnd,

    /// A `{...}` token group that does not describe a repetition.
    #[error("Malformed repeat operator")]
    MalformedRepeat,
}

/// Errors raised while converting an automaton back into a pattern.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// An intermediate expression grew beyond the length limit.
    #[error("Regex exceeds the length limit of {limit} characters")]
    TooLong {
        /// The length limit.
        limit: usize,
    },

    /// The automaton accepts no string, which has no pattern representation.
    #[error("The automaton accepts no string")]
    EmptyLanguage,
}

impl From<LexError> for RegDfaError {
    fn from(error: LexError) -> Self {
        RegDfaError::new(RegDfaErrorKind::LexError(error))
    }
}

impl From<ParseError> for RegDfaError {
    fn from(error: ParseError) -> Self {
        RegDfaError::new(RegDfaErrorKind::ParseError(error))
    }
}

impl From<ConversionError> for RegDfaError {
    fn from(error: ConversionError) -> Self {
        RegDfaError::new(RegDfaErrorKind::ConversionError(error))
    }
}
