//! This module contains the abstract syntax tree (AST) of a pattern.

use crate::{dfa::ESCAPE_MARKER, RegDfaError, RegDfaErrorKind, Result};

/// A node of the abstract syntax tree.
/// Every node is owned by exactly one parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Matches exactly one character.
    Literal(char),
    /// Matches any character of the alphabet.
    Wildcard,
    /// Sequential composition of the children.
    Concat(Vec<Node>),
    /// Choice between the children.
    Alternation(Vec<Node>),
    /// Bounded or unbounded repetition.
    Repeat(Repeat),
    /// The input must end here.
    End,
    /// Matches the empty string. Never produced by the parser.
    Epsilon,
    /// Matches nothing. Never produced by the parser.
    EmptySet,
}

/// A repetition of a child node between `min` and `max` times.
/// A missing `max` means the repetition is unbounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repeat {
    min: usize,
    max: Option<usize>,
    child: Box<Node>,
}

impl Repeat {
    /// Create a new repetition.
    /// # Errors
    /// [`RegDfaErrorKind::InvalidBounds`] if `min` is greater than `max`.
    pub fn new(min: usize, max: Option<usize>, child: Node) -> Result<Self> {
        if let Some(max) = max {
            if min > max {
                return Err(RegDfaError::new(RegDfaErrorKind::InvalidBounds { min, max }));
            }
        }
        Ok(Repeat {
            min,
            max,
            child: Box::new(child),
        })
    }

    /// The minimum number of repetitions.
    pub fn min(&self) -> usize {
        self.min
    }

    /// The maximum number of repetitions, `None` if unbounded.
    pub fn max(&self) -> Option<usize> {
        self.max
    }

    /// The repeated node.
    pub fn child(&self) -> &Node {
        &self.child
    }
}

impl Node {
    /// Create a repeat node.
    /// # Errors
    /// [`RegDfaErrorKind::InvalidBounds`] if `min` is greater than `max`.
    pub fn repeat(min: usize, max: Option<usize>, child: Node) -> Result<Node> {
        Ok(Node::Repeat(Repeat::new(min, max, child)?))
    }

    /// The direct children of the node.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Concat(children) | Node::Alternation(children) => children,
            Node::Repeat(repeat) => std::slice::from_ref(repeat.child.as_ref()),
            _ => &[],
        }
    }
}

/// Write a character, escaped if it has a syntactic role.
pub(crate) fn write_literal(f: &mut impl std::fmt::Write, c: char) -> std::fmt::Result {
    if needs_escape(c) {
        f.write_char(ESCAPE_MARKER)?;
    }
    f.write_char(c)
}

/// Append a literal to a pattern under construction.
pub(crate) fn push_literal(text: &mut String, c: char) {
    if needs_escape(c) {
        text.push(ESCAPE_MARKER);
    }
    text.push(c);
}

#[inline]
fn needs_escape(c: char) -> bool {
    "|.+*?{}()$".contains(c) || c == ESCAPE_MARKER
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Literal(c) => write_literal(f, *c),
            Node::Wildcard => write!(f, "."),
            Node::Concat(children) => children.iter().try_for_each(|child| write!(f, "{}", child)),
            Node::Alternation(children) => {
                write!(f, "(")?;
                for (index, child) in children.iter().enumerate() {
                    if index > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, ")")
            }
            Node::Repeat(repeat) => {
                write!(f, "({})", repeat.child)?;
                match (repeat.min, repeat.max) {
                    (0, None) => write!(f, "*"),
                    (1, None) => write!(f, "+"),
                    (0, Some(1)) => write!(f, "?"),
                    (min, None) => write!(f, "{{{},}}", min),
                    (min, Some(max)) if min == max => write!(f, "{{{}}}", min),
                    (min, Some(max)) => write!(f, "{{{},{}}}", min, max),
                }
            }
            Node::End => write!(f, "$"),
            Node::Epsilon => Ok(()),
            Node::EmptySet => write!(f, "<empty>"),
        }
    }
}

/// The syntax tree of a pattern.
/// A tree without a root cannot be turned into an automaton.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegexTree {
    root: Option<Node>,
}

impl RegexTree {
    /// Create a tree with the given root.
    pub fn new(root: Node) -> Self {
        RegexTree { root: Some(root) }
    }

    /// The root node, if any.
    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }
}

impl From<Node> for RegexTree {
    fn from(root: Node) -> Self {
        RegexTree::new(root)
    }
}
