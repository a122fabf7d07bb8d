//! This module contains the language operations on DFAs.
//! Completion, complement, intersection and difference are defined over the alphabet from
//! [`ALPHABET_START`] to [`ALPHABET_END`].

use log::debug;
use std::collections::{BTreeMap, VecDeque};

use crate::{
    dfa::{coalesce_ranges, Transition, ALPHABET_END, ALPHABET_START},
    Dfa, Result, StateID,
};

impl Dfa {
    /// Make the DFA total.
    /// A new non-accepting sink state with a self-loop over the whole alphabet is added, and every
    /// character a state does not handle leads to the sink. Exactly one state is added.
    pub fn complete(&mut self) -> StateID {
        let sink = self.add_state(false);
        self.add_transition(sink, ALPHABET_START, ALPHABET_END, sink);
        for state_id in (0..sink.as_usize()).map(StateID::new) {
            let state = self.state_mut(state_id);
            let mut transitions = state.transitions().to_vec();
            transitions.extend(
                uncovered_ranges(state.transitions())
                    .into_iter()
                    .map(|(from_char, to_char)| Transition::new(from_char, to_char, sink)),
            );
            state.set_transitions(coalesce_ranges(transitions));
        }
        sink
    }

    /// The DFA that accepts exactly the strings over the alphabet this one rejects.
    /// # Errors
    /// [`crate::RegDfaErrorKind::RuntimeState`] if the DFA has no valid start state.
    pub fn complement(&self) -> Result<Dfa> {
        self.check_start_state()?;
        let mut complement = self.clone();
        complement.complete();
        for state_id in (0..complement.states().len()).map(StateID::new) {
            let state = complement.state_mut(state_id);
            state.set_final(!state.is_final());
        }
        debug!("Complement has {} states", complement.states().len());
        Ok(complement)
    }

    /// The DFA that accepts the strings accepted by both automata.
    /// Only the state pairs reachable from the pair of start states are built.
    /// # Errors
    /// [`crate::RegDfaErrorKind::RuntimeState`] if one of the DFAs has no valid start state.
    pub fn intersect(&self, other: &Dfa) -> Result<Dfa> {
        self.check_start_state()?;
        other.check_start_state()?;
        let mut product = ProductBuilder {
            left: self,
            right: other,
            dfa: Dfa::new(),
            pairs: BTreeMap::new(),
            work_list: VecDeque::new(),
        };
        let start_state = product.add_pair_if_new((self.start_state(), other.start_state()));
        product.dfa.set_start_state(start_state);

        while let Some(((left, right), state_id)) = product.work_list.pop_front() {
            let mut transitions = Vec::new();
            for left_transition in self.states()[left].transitions() {
                for right_transition in other.states()[right].transitions() {
                    if let Some((from_char, to_char)) = left_transition.overlap(right_transition) {
                        let target = product.add_pair_if_new((
                            left_transition.target_state(),
                            right_transition.target_state(),
                        ));
                        transitions.push(Transition::new(from_char, to_char, target));
                    }
                }
            }
            product
                .dfa
                .state_mut(state_id)
                .set_transitions(coalesce_ranges(transitions));
        }

        debug!(
            "Intersection of {} and {} states has {} states",
            self.states().len(),
            other.states().len(),
            product.dfa.states().len()
        );
        Ok(product.dfa)
    }

    /// The DFA that accepts the strings accepted by this automaton but not by the other one.
    /// # Errors
    /// [`crate::RegDfaErrorKind::RuntimeState`] if one of the DFAs has no valid start state.
    pub fn difference(&self, other: &Dfa) -> Result<Dfa> {
        self.intersect(&other.complement()?)
    }

    /// Returns true if no accepting state is reachable from the start state.
    pub fn accepts_nothing(&self) -> bool {
        !self
            .reachable()
            .iter()
            .zip(self.states())
            .any(|(reachable, state)| *reachable && state.is_final())
    }
}

impl std::ops::Sub for &Dfa {
    type Output = Result<Dfa>;

    fn sub(self, other: &Dfa) -> Self::Output {
        self.difference(other)
    }
}

struct ProductBuilder<'a> {
    left: &'a Dfa,
    right: &'a Dfa,
    dfa: Dfa,
    pairs: BTreeMap<(StateID, StateID), StateID>,
    work_list: VecDeque<((StateID, StateID), StateID)>,
}

impl ProductBuilder<'_> {
    /// A pair is accepting if both of its states are accepting.
    fn add_pair_if_new(&mut self, pair: (StateID, StateID)) -> StateID {
        if let Some(state_id) = self.pairs.get(&pair) {
            return *state_id;
        }
        let is_final =
            self.left.states()[pair.0].is_final() && self.right.states()[pair.1].is_final();
        let state_id = self.dfa.add_state(is_final);
        self.pairs.insert(pair, state_id);
        self.work_list.push_back((pair, state_id));
        state_id
    }
}

/// The ranges of the alphabet that no transition covers.
fn uncovered_ranges(transitions: &[Transition]) -> Vec<(char, char)> {
    let mut ranges = transitions
        .iter()
        .map(|t| (u32::from(t.from_char()), u32::from(t.to_char())))
        .collect::<Vec<_>>();
    ranges.sort_unstable();
    let alphabet_end = u32::from(ALPHABET_END);
    let mut gaps = Vec::new();
    let mut next = u32::from(ALPHABET_START);
    for (from, to) in ranges {
        if from > next && next <= alphabet_end {
            gaps.push((next, (from - 1).min(alphabet_end)));
        }
        next = next.max(to + 1);
    }
    if next <= alphabet_end {
        gaps.push((next, alphabet_end));
    }
    gaps.into_iter()
        .filter_map(|(from, to)| Some((char::from_u32(from)?, char::from_u32(to)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parser::parse_regex_syntax, RegDfaErrorKind};

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn build(pattern: &str) -> Dfa {
        let mut dfa = Dfa::try_from(&parse_regex_syntax(pattern).unwrap()).unwrap();
        dfa.minimize();
        dfa
    }

    const SAMPLES: &[&str] = &["", "a", "aa", "aaa", "aaaa", "b", "ab", "ba", "abc", "~", " "];

    #[test]
    fn test_complete_adds_one_sink() {
        init();
        let mut dfa = build("a(b|c)$");
        let state_count = dfa.states().len();
        let sink = dfa.complete();
        assert_eq!(dfa.states().len(), state_count + 1);
        assert!(!dfa.states()[sink].is_final());
        for state in dfa.states() {
            for c in ALPHABET_START..=ALPHABET_END {
                assert!(state.next_state(c).is_some(), "{:?} is not covered", c);
            }
            assert!(!state.has_overlaps());
        }
        assert!(dfa.is_match("ab"));
        assert!(!dfa.is_match("ad"));
    }

    #[test]
    fn test_complete_fills_gaps_with_ranges() {
        let s = StateID::new(0);
        assert_eq!(
            uncovered_ranges(&[Transition::new('b', 'c', s), Transition::new('x', 'x', s)]),
            vec![(' ', 'a'), ('d', 'w'), ('y', '~')]
        );
        assert!(uncovered_ranges(&[Transition::new(' ', '~', s)]).is_empty());
        assert_eq!(uncovered_ranges(&[]), vec![(' ', '~')]);
    }

    #[test]
    fn test_complement_law() {
        init();
        for pattern in ["a+$", "(ab|c)*$", "h.t$", "a{2,3}$"] {
            let dfa = build(pattern);
            let complement = dfa.complement().unwrap();
            for input in SAMPLES.iter().chain(["hat", "abab", "cab"].iter()) {
                assert_ne!(
                    dfa.is_match(input),
                    complement.is_match(input),
                    "{} on {:?}",
                    pattern,
                    input
                );
            }
        }
    }

    #[test]
    fn test_complement_leaves_operand_untouched() {
        init();
        let dfa = build("ab$");
        let before = dfa.clone();
        let _ = dfa.complement().unwrap();
        assert_eq!(dfa, before);
    }

    #[test]
    fn test_intersect() {
        init();
        let product = build("a+$").intersect(&build("aa$")).unwrap();
        assert!(product.is_match("aa"));
        assert!(!product.is_match("a"));
        assert!(!product.is_match("aaa"));
        assert!(!product.is_match(""));
    }

    #[test]
    fn test_intersect_ranges() {
        init();
        let product = build("h.t$").intersect(&build("(a|h)(o|u)t*$")).unwrap();
        assert!(product.is_match("hot"));
        assert!(product.is_match("hut"));
        assert!(!product.is_match("hat"));
        assert!(!product.is_match("aot"));
        assert!(!product.is_match("ho"));
    }

    #[test]
    fn test_difference() {
        init();
        let difference = build("a+$").difference(&build("aa$")).unwrap();
        assert!(difference.is_match("a"));
        assert!(difference.is_match("aaa"));
        assert!(!difference.is_match("aa"));
        assert!(!difference.is_match(""));
    }

    #[test]
    fn test_sub_operator() {
        init();
        let a = build("a*$");
        let b = build("a+$");
        let difference = (&a - &b).unwrap();
        assert!(difference.is_match(""));
        assert!(!difference.is_match("a"));
    }

    #[test]
    fn test_accepts_nothing() {
        init();
        assert!(build("a$").intersect(&build("b$")).unwrap().accepts_nothing());
        assert!(!build("a|b$").intersect(&build("b$")).unwrap().accepts_nothing());
        assert!((&build("a$") - &build("a|b$")).unwrap().accepts_nothing());
        assert!(Dfa::new().accepts_nothing());
    }

    #[test]
    fn test_operations_need_a_start_state() {
        let empty = Dfa::new();
        let dfa = build("a$");
        for result in [
            empty.complement(),
            empty.intersect(&dfa),
            dfa.intersect(&empty),
            dfa.difference(&empty),
        ] {
            assert!(matches!(
                result.unwrap_err().kind(),
                RegDfaErrorKind::RuntimeState(_)
            ));
        }
    }
}
