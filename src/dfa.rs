//! This module contains the DFA data model and the matcher.
//! Transitions are labelled with inclusive character ranges over a fixed alphabet, the
//! printable ASCII characters from [`ALPHABET_START`] to [`ALPHABET_END`].

use itertools::Itertools;
use std::collections::VecDeque;

use crate::{RegDfaError, RegDfaErrorKind, Result, StateID};

/// The first character of the alphabet.
pub const ALPHABET_START: char = ' ';

/// The last character of the alphabet.
pub const ALPHABET_END: char = '~';

/// The character that makes the following character a literal.
pub const ESCAPE_MARKER: char = '&';

/// Returns true if the character is part of the alphabet.
#[inline]
pub(crate) fn is_in_alphabet(c: char) -> bool {
    (ALPHABET_START..=ALPHABET_END).contains(&c)
}

/// Sort the transitions by their ranges and merge adjacent ranges that lead to the same state.
/// The input must not contain overlapping ranges.
pub(crate) fn coalesce_ranges(mut transitions: Vec<Transition>) -> Vec<Transition> {
    transitions.sort_unstable();
    transitions
        .into_iter()
        .coalesce(|a, b| {
            if a.target_state == b.target_state
                && u32::from(a.to_char) + 1 >= u32::from(b.from_char)
            {
                Ok(Transition::new(a.from_char, a.to_char.max(b.to_char), a.target_state))
            } else {
                Err((a, b))
            }
        })
        .collect()
}

/// A transition over an inclusive character range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Transition {
    from_char: char,
    to_char: char,
    target_state: StateID,
}

impl Transition {
    /// Create a new transition on the characters `from_char..=to_char`.
    pub fn new(from_char: char, to_char: char, target_state: StateID) -> Self {
        debug_assert!(from_char <= to_char);
        Transition {
            from_char,
            to_char,
            target_state,
        }
    }

    /// The first character of the range.
    pub fn from_char(&self) -> char {
        self.from_char
    }

    /// The last character of the range.
    pub fn to_char(&self) -> char {
        self.to_char
    }

    /// The state this transition leads to.
    pub fn target_state(&self) -> StateID {
        self.target_state
    }

    /// Returns true if the range contains the character.
    #[inline]
    pub fn contains(&self, c: char) -> bool {
        self.from_char <= c && c <= self.to_char
    }

    /// Returns the common part of both ranges, if any.
    pub(crate) fn overlap(&self, other: &Transition) -> Option<(char, char)> {
        let from = self.from_char.max(other.from_char);
        let to = self.to_char.min(other.to_char);
        (from <= to).then_some((from, to))
    }

    pub(crate) fn retarget(&self, target_state: StateID) -> Self {
        Transition {
            target_state,
            ..*self
        }
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.from_char == self.to_char {
            write!(f, "'{}'", self.from_char)?;
        } else {
            write!(f, "'{}'-'{}'", self.from_char, self.to_char)?;
        }
        write!(f, " -> {}", self.target_state)
    }
}

/// A state of the DFA.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DfaState {
    // The outgoing transitions in the order they were added.
    transitions: Vec<Transition>,
    is_final: bool,
}

impl DfaState {
    /// Create a new state without transitions.
    pub fn new(is_final: bool) -> Self {
        DfaState {
            transitions: Vec::new(),
            is_final,
        }
    }

    /// The outgoing transitions of the state.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Returns true if the state is accepting.
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// Mark the state as accepting or not.
    pub fn set_final(&mut self, is_final: bool) {
        self.is_final = is_final;
    }

    /// Returns the target of the transition whose range contains the character.
    #[inline]
    pub fn next_state(&self, c: char) -> Option<StateID> {
        self.transitions
            .iter()
            .find(|transition| transition.contains(c))
            .map(Transition::target_state)
    }

    /// Returns true if two transitions share a character.
    pub(crate) fn has_overlaps(&self) -> bool {
        let mut ranges = self.transitions.clone();
        ranges.sort_unstable();
        ranges
            .iter()
            .tuple_windows()
            .any(|(a, b)| a.overlap(b).is_some())
    }

    pub(crate) fn push_transition(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }

    pub(crate) fn set_transitions(&mut self, transitions: Vec<Transition>) {
        self.transitions = transitions;
    }
}

/// The DFA implementation.
/// The states are stored in a dense table and addressed by [`StateID`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dfa {
    states: Vec<DfaState>,
    start_state: StateID,
}

impl Dfa {
    /// Create a DFA without any state.
    pub fn new() -> Self {
        Dfa::default()
    }

    /// Get the states of the DFA.
    pub fn states(&self) -> &[DfaState] {
        &self.states
    }

    /// Get a single state.
    pub fn state(&self, state_id: StateID) -> Option<&DfaState> {
        self.states.get(state_id.as_usize())
    }

    /// Get the start state of the DFA.
    pub fn start_state(&self) -> StateID {
        self.start_state
    }

    /// Set the start state of the DFA.
    pub fn set_start_state(&mut self, state_id: StateID) {
        self.start_state = state_id;
    }

    /// Add a new state and return its id.
    pub fn add_state(&mut self, is_final: bool) -> StateID {
        let state_id = StateID::new(self.states.len());
        self.states.push(DfaState::new(is_final));
        state_id
    }

    /// Add a transition on the characters `from_char..=to_char`.
    pub fn add_transition(&mut self, from: StateID, from_char: char, to_char: char, to: StateID) {
        self.states[from].push_transition(Transition::new(from_char, to_char, to));
    }

    /// Iterate over the ids of the accepting states.
    pub fn accepting_states(&self) -> impl Iterator<Item = StateID> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, state)| state.is_final())
            .map(|(index, _)| StateID::new(index))
    }

    pub(crate) fn state_mut(&mut self, state_id: StateID) -> &mut DfaState {
        &mut self.states[state_id]
    }

    pub(crate) fn from_parts(states: Vec<DfaState>, start_state: StateID) -> Self {
        Dfa {
            states,
            start_state,
        }
    }

    /// Fails if the start state does not exist, i.e. the automaton was never built.
    pub(crate) fn check_start_state(&self) -> Result<()> {
        if self.start_state.as_usize() < self.states.len() {
            Ok(())
        } else {
            Err(RegDfaError::new(RegDfaErrorKind::RuntimeState(format!(
                "start state {} does not exist in an automaton with {} states",
                self.start_state,
                self.states.len()
            ))))
        }
    }

    /// Returns true if the DFA accepts the whole text.
    /// The walk stops at the first character without a transition, which rejects the text.
    pub fn is_match(&self, text: &str) -> bool {
        let Some(mut current) = self.state(self.start_state) else {
            return false;
        };
        for c in text.chars() {
            match current.next_state(c) {
                Some(next) => current = &self.states[next],
                None => return false,
            }
        }
        current.is_final()
    }

    /// The states reachable from the start state, flagged by index.
    pub(crate) fn reachable(&self) -> Vec<bool> {
        let mut reachable = vec![false; self.states.len()];
        if self.check_start_state().is_err() {
            return reachable;
        }
        let mut queue = VecDeque::from([self.start_state]);
        reachable[self.start_state] = true;
        while let Some(state_id) = queue.pop_front() {
            for transition in self.states[state_id].transitions() {
                let target = transition.target_state();
                if !reachable[target] {
                    reachable[target] = true;
                    queue.push_back(target);
                }
            }
        }
        reachable
    }

    /// Create a copy that only contains the states reachable from the start state.
    /// The relative order of the remaining states is kept.
    pub fn reachable_only(&self) -> Result<Dfa> {
        self.check_start_state()?;
        let reachable = self.reachable();
        let mut renumbered = vec![None; self.states.len()];
        let mut next_id = 0;
        for (index, flag) in reachable.iter().enumerate() {
            if *flag {
                renumbered[index] = Some(StateID::new(next_id));
                next_id += 1;
            }
        }
        let states = self
            .states
            .iter()
            .zip(reachable)
            .filter(|(_, flag)| *flag)
            .map(|(state, _)| {
                let mut state = state.clone();
                let transitions = state
                    .transitions()
                    .iter()
                    .filter_map(|t| renumbered[t.target_state()].map(|target| t.retarget(target)))
                    .collect();
                state.set_transitions(transitions);
                state
            })
            .collect();
        let start_state = renumbered[self.start_state].unwrap_or_default();
        Ok(Dfa::from_parts(states, start_state))
    }
}

impl std::fmt::Display for Dfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "DFA")?;
        writeln!(f, "Start state: {}", self.start_state)?;
        for (index, state) in self.states.iter().enumerate() {
            write!(f, "{}{}:", index, if state.is_final() { "*" } else { "" })?;
            for transition in state.transitions() {
                write!(f, " {}", transition)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Hand-built automaton for "ab*"
    fn ab_star() -> Dfa {
        let mut dfa = Dfa::new();
        let s0 = dfa.add_state(false);
        let s1 = dfa.add_state(true);
        dfa.add_transition(s0, 'a', 'a', s1);
        dfa.add_transition(s1, 'b', 'b', s1);
        dfa
    }

    #[test]
    fn test_match_walks_transitions() {
        let dfa = ab_star();
        assert!(dfa.is_match("a"));
        assert!(dfa.is_match("abbb"));
        assert!(!dfa.is_match(""));
        assert!(!dfa.is_match("ba"));
        assert!(!dfa.is_match("abc"));
    }

    #[test]
    fn test_match_on_ranges() {
        let mut dfa = Dfa::new();
        let s0 = dfa.add_state(false);
        let s1 = dfa.add_state(true);
        dfa.add_transition(s0, '0', '9', s1);
        assert!(dfa.is_match("0"));
        assert!(dfa.is_match("7"));
        assert!(!dfa.is_match("a"));
        assert!(!dfa.is_match("77"));
    }

    #[test]
    fn test_empty_dfa_rejects_everything() {
        let dfa = Dfa::new();
        assert!(!dfa.is_match(""));
        assert!(!dfa.is_match("a"));
        assert!(dfa.check_start_state().is_err());
    }

    #[test]
    fn test_characters_outside_alphabet_are_rejected() {
        let mut dfa = Dfa::new();
        let s0 = dfa.add_state(true);
        dfa.add_transition(s0, ALPHABET_START, ALPHABET_END, s0);
        assert!(dfa.is_match("any printable text ~"));
        assert!(!dfa.is_match("tab\there"));
    }

    #[test]
    fn test_reachable_only() {
        let mut dfa = ab_star();
        let orphan = dfa.add_state(true);
        dfa.add_transition(orphan, 'c', 'c', StateID::new(0));
        let trimmed = dfa.reachable_only().unwrap();
        assert_eq!(trimmed.states().len(), 2);
        assert!(trimmed.is_match("ab"));
        assert_eq!(trimmed.accepting_states().count(), 1);
    }

    #[test]
    fn test_coalesce_ranges() {
        let s1 = StateID::new(1);
        let s2 = StateID::new(2);
        let coalesced = coalesce_ranges(vec![
            Transition::new('d', 'f', s1),
            Transition::new('a', 'c', s1),
            Transition::new('g', 'g', s2),
            Transition::new('h', 'k', s1),
        ]);
        assert_eq!(
            coalesced,
            vec![
                Transition::new('a', 'f', s1),
                Transition::new('g', 'g', s2),
                Transition::new('h', 'k', s1),
            ]
        );
    }

    #[test]
    fn test_overlap_detection() {
        let mut state = DfaState::new(false);
        state.push_transition(Transition::new('a', 'c', StateID::new(1)));
        state.push_transition(Transition::new('d', 'd', StateID::new(2)));
        assert!(!state.has_overlaps());
        state.push_transition(Transition::new('c', 'e', StateID::new(3)));
        assert!(state.has_overlaps());
    }

    #[test]
    fn test_display() {
        let text = ab_star().to_string();
        assert!(text.contains("0: 'a' -> 1"));
        assert!(text.contains("1*: 'b' -> 1"));
    }
}
