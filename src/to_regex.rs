//! This module converts a DFA back into a pattern by state elimination.
//!
//! The labels of the elimination table are kept apart from their rendering: the empty language
//! and the empty string are their own cases, so that neither of them leaks into concatenations.

use log::trace;

use crate::{
    ast::push_literal,
    dfa::{Transition, ALPHABET_END, ALPHABET_START},
    errors::ConversionError,
    Dfa, Result,
};

/// The maximal length of a pattern produced by [`Dfa::to_regex`].
/// Longer intermediate expressions abort the conversion.
pub const REGEX_LENGTH_LIMIT: usize = 2048;

/// The rendering of the language that only contains the empty string.
const EPSILON_PATTERN: &str = ".{0}";

/// The language of all paths between two states.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Label {
    /// No path.
    Empty,
    /// Only the empty path.
    Epsilon,
    Expr {
        text: String,
        // Can take a repetition operator without parentheses.
        atomic: bool,
        // Matches the empty string.
        nullable: bool,
    },
}

impl Label {
    fn expr(text: String, atomic: bool, nullable: bool) -> Result<Label> {
        if text.len() > REGEX_LENGTH_LIMIT {
            return Err(ConversionError::TooLong {
                limit: REGEX_LENGTH_LIMIT,
            }
            .into());
        }
        Ok(Label::Expr {
            text,
            atomic,
            nullable,
        })
    }

    fn range(transition: &Transition) -> Result<Label> {
        let (from_char, to_char) = (transition.from_char(), transition.to_char());
        let mut text = String::new();
        if from_char == ALPHABET_START && to_char == ALPHABET_END {
            text.push('.');
        } else if from_char == to_char {
            push_literal(&mut text, from_char);
        } else {
            text.push('(');
            for (index, c) in (from_char..=to_char).enumerate() {
                if index > 0 {
                    text.push('|');
                }
                push_literal(&mut text, c);
            }
            text.push(')');
        }
        Label::expr(text, true, false)
    }

    fn alt(self, other: Label) -> Result<Label> {
        match (self, other) {
            (Label::Empty, label) | (label, Label::Empty) => Ok(label),
            (Label::Epsilon, Label::Epsilon) => Ok(Label::Epsilon),
            (Label::Epsilon, label) | (label, Label::Epsilon) => label.optional(),
            (
                Label::Expr {
                    text: left,
                    nullable: left_nullable,
                    ..
                },
                Label::Expr {
                    text: right,
                    nullable: right_nullable,
                    ..
                },
            ) => {
                if left == right {
                    Label::expr(left, true, left_nullable)
                } else {
                    Label::expr(
                        format!("({}|{})", left, right),
                        true,
                        left_nullable || right_nullable,
                    )
                }
            }
        }
    }

    fn optional(self) -> Result<Label> {
        match self {
            Label::Expr { nullable: true, .. } | Label::Epsilon => Ok(self),
            Label::Empty => Ok(Label::Epsilon),
            Label::Expr { text, atomic, .. } => {
                Label::expr(Self::postfix(&text, atomic, '?'), false, true)
            }
        }
    }

    fn star(&self) -> Result<Label> {
        match self {
            Label::Empty | Label::Epsilon => Ok(Label::Epsilon),
            Label::Expr { text, atomic, .. } => {
                Label::expr(Self::postfix(text, *atomic, '*'), false, true)
            }
        }
    }

    fn concat(&self, other: &Label) -> Result<Label> {
        match (self, other) {
            (Label::Empty, _) | (_, Label::Empty) => Ok(Label::Empty),
            (Label::Epsilon, label) | (label, Label::Epsilon) => Ok(label.clone()),
            (
                Label::Expr {
                    text: left,
                    nullable: left_nullable,
                    ..
                },
                Label::Expr {
                    text: right,
                    nullable: right_nullable,
                    ..
                },
            ) => Label::expr(
                format!("{}{}", left, right),
                false,
                *left_nullable && *right_nullable,
            ),
        }
    }

    fn postfix(text: &str, atomic: bool, operator: char) -> String {
        if atomic {
            format!("{}{}", text, operator)
        } else {
            format!("({}){}", text, operator)
        }
    }
}

impl Dfa {
    /// Create a pattern that matches the language of the DFA.
    /// The DFA is restricted to its reachable states and minimized before the states are
    /// eliminated one after another. The language that contains only the empty string yields
    /// `.{0}`.
    /// # Errors
    /// * [`crate::RegDfaErrorKind::RuntimeState`] if the DFA has no valid start state.
    /// * [`ConversionError::EmptyLanguage`] if the DFA accepts no string.
    /// * [`ConversionError::TooLong`] if an expression grows beyond [`REGEX_LENGTH_LIMIT`].
    pub fn to_regex(&self) -> Result<String> {
        let mut dfa = self.reachable_only()?;
        dfa.minimize();
        let state_count = dfa.states().len();

        let mut table = vec![vec![Label::Empty; state_count]; state_count];
        for (from, state) in dfa.states().iter().enumerate() {
            for transition in state.transitions() {
                let to = transition.target_state().as_usize();
                let label = std::mem::replace(&mut table[from][to], Label::Empty);
                table[from][to] = label.alt(Label::range(transition)?)?;
            }
        }

        for k in 0..state_count {
            let row = table[k].clone();
            let column = table.iter().map(|row| row[k].clone()).collect::<Vec<_>>();
            let loop_label = row[k].star()?;
            for i in (0..state_count).filter(|i| column[*i] != Label::Empty) {
                for j in (0..state_count).filter(|j| row[*j] != Label::Empty) {
                    table[i][j] = match (i == k, j == k) {
                        (true, true) => loop_label.clone(),
                        (true, false) => loop_label.concat(&row[j])?,
                        (false, true) => column[i].concat(&loop_label)?,
                        (false, false) => {
                            let path = column[i].concat(&loop_label)?.concat(&row[j])?;
                            std::mem::replace(&mut table[i][j], Label::Empty).alt(path)?
                        }
                    };
                }
            }
            trace!("Eliminated state {}", k);
        }

        let start = dfa.start_state().as_usize();
        let mut result = Label::Empty;
        for accepting in dfa.accepting_states().map(|state_id| state_id.as_usize()) {
            let paths = if accepting == start {
                table[start][start].clone().optional()?
            } else {
                table[start][accepting].clone()
            };
            result = result.alt(paths)?;
        }
        match result {
            Label::Empty => Err(ConversionError::EmptyLanguage.into()),
            Label::Epsilon => Ok(EPSILON_PATTERN.to_string()),
            Label::Expr { text, .. } => Ok(text),
        }
    }
}
