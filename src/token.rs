//! This module contains the tokenizer for the pattern syntax.
//! The tokenizer splits a pattern string into the tokens consumed by the parser.

use log::trace;

use crate::{
    dfa::{is_in_alphabet, ESCAPE_MARKER},
    errors::LexError,
    Result,
};

/// A token of the pattern syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// A plain character.
    Literal(char),
    /// A character preceded by the escape marker, always taken literally.
    Escape(char),
    /// `|`
    Pipe,
    /// `.`
    Dot,
    /// `+`
    Plus,
    /// `*`
    Star,
    /// `?`
    Question,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LCurly,
    /// `}`
    RCurly,
    /// `,` inside a bound group.
    Comma,
    /// A decimal number inside a bound group.
    Number(usize),
    /// `$` as the last character of the pattern.
    End,
}

/// Split the pattern into tokens.
/// # Arguments
/// * `pattern` - The pattern string.
/// # Returns
/// The tokens of the pattern in source order.
/// # Errors
/// A [`LexError`] is returned for a dangling escape marker, an end anchor that is not the last
/// character, a malformed or unclosed bound group, or a character outside the alphabet.
pub fn tokenize(pattern: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::with_capacity(pattern.len());
    let mut chars = pattern.char_indices().peekable();
    while let Some((position, c)) = chars.next() {
        match c {
            ESCAPE_MARKER => {
                let (escaped_position, escaped) = chars
                    .next()
                    .ok_or(LexError::DanglingEscape { position })?;
                check_alphabet(escaped_position, escaped)?;
                tokens.push(Token::Escape(escaped));
            }
            '|' => tokens.push(Token::Pipe),
            '.' => tokens.push(Token::Dot),
            '+' => tokens.push(Token::Plus),
            '*' => tokens.push(Token::Star),
            '?' => tokens.push(Token::Question),
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            '$' => {
                if chars.peek().is_some() {
                    return Err(LexError::MisplacedAnchor { position }.into());
                }
                tokens.push(Token::End);
            }
            '{' => {
                let end = pattern[position..]
                    .find('}')
                    .map(|offset| position + offset)
                    .ok_or(LexError::UnclosedBounds { position })?;
                tokenize_bounds(position, &pattern[position + 1..end], &mut tokens)?;
                // Skip the group content and the closing brace.
                while chars.next_if(|(i, _)| *i <= end).is_some() {}
            }
            _ => {
                check_alphabet(position, c)?;
                tokens.push(Token::Literal(c));
            }
        }
    }
    trace!("Tokenized {:?} into {} tokens", pattern, tokens.len());
    Ok(tokens)
}

fn check_alphabet(position: usize, character: char) -> Result<()> {
    if is_in_alphabet(character) {
        Ok(())
    } else {
        Err(LexError::UnsupportedCharacter {
            position,
            character,
        }
        .into())
    }
}

/// Emit the tokens of one of the forms `{x}`, `{x,}`, `{,y}` and `{x,y}`.
/// `content` is the text between the braces.
fn tokenize_bounds(position: usize, content: &str, tokens: &mut Vec<Token>) -> Result<()> {
    let malformed = || LexError::MalformedBounds {
        position,
        content: content.to_string(),
    };
    let parse_number = |text: &str| -> std::result::Result<usize, LexError> {
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        text.parse::<usize>().map_err(|_| malformed())
    };

    tokens.push(Token::LCurly);
    match content.split_once(',') {
        None => tokens.push(Token::Number(parse_number(content)?)),
        Some(("", "")) => return Err(malformed().into()),
        Some(("", upper)) => {
            tokens.push(Token::Comma);
            tokens.push(Token::Number(parse_number(upper)?));
        }
        Some((lower, "")) => {
            tokens.push(Token::Number(parse_number(lower)?));
            tokens.push(Token::Comma);
        }
        Some((lower, upper)) => {
            tokens.push(Token::Number(parse_number(lower)?));
            tokens.push(Token::Comma);
            tokens.push(Token::Number(parse_number(upper)?));
        }
    }
    tokens.push(Token::RCurly);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RegDfaErrorKind;

    fn lex_error(pattern: &str) -> LexError {
        match tokenize(pattern).unwrap_err().kind() {
            RegDfaErrorKind::LexError(e) => e.clone(),
            other => panic!("Expected a lex error for {:?}, got {:?}", pattern, other),
        }
    }

    #[test]
    fn test_basic_symbols() {
        let tokens = tokenize("a+*?|().$").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Literal('a'),
                Token::Plus,
                Token::Star,
                Token::Question,
                Token::Pipe,
                Token::LParen,
                Token::RParen,
                Token::Dot,
                Token::End,
            ]
        );
    }

    #[test]
    fn test_escaped_characters() {
        let tokens = tokenize("a&+&*&?&|&.&&&$").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Literal('a'),
                Token::Escape('+'),
                Token::Escape('*'),
                Token::Escape('?'),
                Token::Escape('|'),
                Token::Escape('.'),
                Token::Escape('&'),
                Token::Escape('$'),
            ]
        );
    }

    #[test]
    fn test_curly_repeat_forms() {
        assert_eq!(
            tokenize("a{3}").unwrap(),
            vec![
                Token::Literal('a'),
                Token::LCurly,
                Token::Number(3),
                Token::RCurly
            ]
        );
        assert_eq!(tokenize("a{1,3}").unwrap().len(), 6);
        assert_eq!(
            tokenize("a{2,}").unwrap(),
            vec![
                Token::Literal('a'),
                Token::LCurly,
                Token::Number(2),
                Token::Comma,
                Token::RCurly
            ]
        );
        assert_eq!(
            tokenize("a{,4}b").unwrap(),
            vec![
                Token::Literal('a'),
                Token::LCurly,
                Token::Comma,
                Token::Number(4),
                Token::RCurly,
                Token::Literal('b'),
            ]
        );
    }

    #[test]
    fn test_stray_closing_brace_and_comma_are_literals() {
        assert_eq!(
            tokenize("},").unwrap(),
            vec![Token::Literal('}'), Token::Literal(',')]
        );
    }

    #[test]
    fn test_dangling_escape() {
        assert_eq!(lex_error("ab&"), LexError::DanglingEscape { position: 2 });
    }

    #[test]
    fn test_misplaced_anchor() {
        assert_eq!(lex_error("a$b"), LexError::MisplacedAnchor { position: 1 });
        assert!(tokenize("a&$b").is_ok());
    }

    #[test]
    fn test_malformed_bounds() {
        for pattern in ["a{}", "a{,}", "a{x}", "a{1,y}", "a{ 1}", "a{1,2,3}"] {
            assert!(
                matches!(lex_error(pattern), LexError::MalformedBounds { position: 1, .. }),
                "{}",
                pattern
            );
        }
        assert!(matches!(
            lex_error("a{99999999999999999999999}"),
            LexError::MalformedBounds { .. }
        ));
    }

    #[test]
    fn test_unclosed_bounds() {
        assert_eq!(lex_error("a{2,3"), LexError::UnclosedBounds { position: 1 });
    }

    #[test]
    fn test_characters_outside_alphabet() {
        assert_eq!(
            lex_error("a\tb"),
            LexError::UnsupportedCharacter {
                position: 1,
                character: '\t'
            }
        );
        assert_eq!(
            lex_error("&ä"),
            LexError::UnsupportedCharacter {
                position: 1,
                character: 'ä'
            }
        );
    }

    #[test]
    fn test_empty_pattern() {
        assert!(tokenize("").unwrap().is_empty());
    }
}
