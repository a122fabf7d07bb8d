//! This module contains the parser for the pattern syntax.
//! The parser is a recursive-descent parser that turns the tokens of a pattern into an abstract
//! syntax tree (AST).
//!
//! Grammar, from lowest to highest precedence:
//! ```text
//! Alternation := Concat ('|' Concat)*
//! Concat      := Repeat+
//! Repeat      := Atom ('+' | '*' | '?' | '{' bounds '}')?
//! Atom        := Literal | Escape | '.' | '(' Alternation ')'
//! ```

use log::trace;
use std::time::Instant;

use crate::{
    ast::{Node, RegexTree},
    errors::ParseError,
    token::{tokenize, Token},
    Result,
};

/// Parse the pattern into an abstract syntax tree (AST).
/// # Arguments
/// * `input` - A string slice that holds the pattern.
/// # Returns
/// A `RegexTree` that represents the abstract syntax tree of the pattern.
/// # Errors
/// An error is returned if the pattern can't be tokenized or parsed.
pub fn parse_regex_syntax(input: &str) -> Result<RegexTree> {
    let now = Instant::now();
    let tokens = tokenize(input)?;
    let tree = parse_tokens(&tokens)?;
    let elapsed_time = now.elapsed();
    trace!("Parsing took {} milliseconds.", elapsed_time.as_millis());
    Ok(tree)
}

/// Parse a token sequence into an abstract syntax tree (AST).
/// An `End` token is attached to the top level of the tree, so that it applies to every branch
/// of a top-level alternation.
/// # Errors
/// A [`ParseError`] for syntax errors and [`crate::RegDfaErrorKind::InvalidBounds`] for a
/// repetition whose lower bound exceeds its upper bound.
pub fn parse_tokens(tokens: &[Token]) -> Result<RegexTree> {
    let mut parser = Parser { tokens, position: 0 };
    let root = parser.parse_alternation()?;
    let root = match parser.advance() {
        None => root,
        Some(Token::End) => match root {
            Node::Concat(mut children) => {
                children.push(Node::End);
                Node::Concat(children)
            }
            other => Node::Concat(vec![other, Node::End]),
        },
        Some(Token::RParen) => return Err(ParseError::UnmatchedCloseParen.into()),
        Some(token) => return Err(ParseError::UnexpectedToken { token }.into()),
    };
    trace!("Parsed tree: {}", root);
    Ok(RegexTree::new(root))
}

struct Parser<'t> {
    tokens: &'t [Token],
    position: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.position).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Chained alternatives are folded into nested binary nodes, left to right.
    fn parse_alternation(&mut self) -> Result<Node> {
        let mut left = self.parse_concat()?;
        while self.peek() == Some(Token::Pipe) {
            self.advance();
            let right = self.parse_concat()?;
            left = Node::Alternation(vec![left, right]);
        }
        Ok(left)
    }

    fn parse_concat(&mut self) -> Result<Node> {
        let mut nodes = Vec::new();
        while let Some(token) = self.peek() {
            if matches!(token, Token::Pipe | Token::RParen | Token::End) {
                break;
            }
            nodes.push(self.parse_repeat()?);
        }
        if nodes.is_empty() {
            return Err(ParseError::EmptyConcatenation.into());
        }
        Ok(Node::Concat(nodes))
    }

    fn parse_repeat(&mut self) -> Result<Node> {
        let atom = self.parse_atom()?;
        let (min, max) = match self.peek() {
            Some(Token::Plus) => (1, None),
            Some(Token::Star) => (0, None),
            Some(Token::Question) => (0, Some(1)),
            Some(Token::LCurly) => {
                self.advance();
                let (min, max) = self.parse_bounds()?;
                return Node::repeat(min, max, atom);
            }
            _ => return Ok(atom),
        };
        self.advance();
        Node::repeat(min, max, atom)
    }

    /// Parses the content of a bound group after the `{` including the closing `}`.
    fn parse_bounds(&mut self) -> Result<(usize, Option<usize>)> {
        let bounds = match (self.advance(), self.peek()) {
            (Some(Token::Comma), Some(Token::Number(max))) => {
                self.advance();
                (0, Some(max))
            }
            (Some(Token::Number(min)), Some(Token::Comma)) => {
                self.advance();
                match self.peek() {
                    Some(Token::Number(max)) => {
                        self.advance();
                        (min, Some(max))
                    }
                    _ => (min, None),
                }
            }
            (Some(Token::Number(min)), _) => (min, Some(min)),
            _ => return Err(ParseError::MalformedRepeat.into()),
        };
        match self.advance() {
            Some(Token::RCurly) => Ok(bounds),
            _ => Err(ParseError::MalformedRepeat.into()),
        }
    }

    fn parse_atom(&mut self) -> Result<Node> {
        match self.advance() {
            Some(Token::Literal(c)) | Some(Token::Escape(c)) => Ok(Node::Literal(c)),
            Some(Token::Dot) => Ok(Node::Wildcard),
            Some(Token::LParen) => {
                let inner = self.parse_alternation()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(ParseError::UnclosedGroup.into()),
                }
            }
            Some(token) => Err(ParseError::UnexpectedToken { token }.into()),
            None => Err(ParseError::UnexpectedEnd.into()),
        }
    }
}
