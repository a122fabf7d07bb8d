//! This module contains the minimization of a DFA by partition refinement.

use log::{debug, trace};
use std::collections::{BTreeMap, BTreeSet};

use crate::{
    dfa::{coalesce_ranges, DfaState},
    BlockID, Dfa, StateID,
};

/// A group of states that are not yet known to be distinguishable.
pub(crate) type StateGroup = BTreeSet<StateID>;

/// The groups of a partition, indexed by [`BlockID`].
pub(crate) type Partition = Vec<StateGroup>;

/// The block each outgoing character leads to, `None` if the state has no transition on it.
type Signature = Vec<Option<BlockID>>;

impl Dfa {
    /// Minimize the DFA in place.
    /// The states are refined starting from the partition into accepting and non-accepting
    /// states until no group splits anymore. Each group is replaced by one state.
    /// The automaton must be deterministic, which holds for every automaton built from a
    /// pattern.
    pub fn minimize(&mut self) {
        if self.states().len() <= 1 {
            return;
        }
        let state_count = self.states().len();
        let alphabet = self.alphabet();
        let mut partition_old = self.calculate_initial_partition();
        Self::trace_partition("initial", &partition_old);
        loop {
            let partition_new = self.calculate_new_partition(&partition_old, &alphabet);
            Self::trace_partition("new", &partition_new);
            if partition_new == partition_old {
                break;
            }
            partition_old = partition_new;
        }
        *self = self.create_from_partition(&partition_old);
        debug!(
            "Minimized DFA from {} to {} states",
            state_count,
            self.states().len()
        );
    }

    /// Every character that appears on any transition.
    fn alphabet(&self) -> Vec<char> {
        self.states()
            .iter()
            .flat_map(DfaState::transitions)
            .flat_map(|transition| transition.from_char()..=transition.to_char())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// The accepting states form one group and the non-accepting states another.
    /// Empty groups are omitted.
    fn calculate_initial_partition(&self) -> Partition {
        let (accepting, non_accepting): (StateGroup, StateGroup) = (0..self.states().len())
            .map(StateID::new)
            .partition(|state_id| self.states()[*state_id].is_final());
        [accepting, non_accepting]
            .into_iter()
            .filter(|group| !group.is_empty())
            .collect()
    }

    /// Split every group of the partition into the states that behave the same on every
    /// character with regard to the groups of the old partition.
    fn calculate_new_partition(&self, partition: &[StateGroup], alphabet: &[char]) -> Partition {
        let block_of = Self::block_map(self.states().len(), partition);
        partition
            .iter()
            .flat_map(|group| self.split_group(group, &block_of, alphabet))
            .collect()
    }

    fn split_group(
        &self,
        group: &StateGroup,
        block_of: &[BlockID],
        alphabet: &[char],
    ) -> Partition {
        // If the group contains only one state, the group can't be split further.
        if group.len() == 1 {
            return vec![group.clone()];
        }
        let mut signature_to_states: BTreeMap<Signature, StateGroup> = BTreeMap::new();
        for state_id in group {
            signature_to_states
                .entry(self.signature(*state_id, block_of, alphabet))
                .or_default()
                .insert(*state_id);
        }
        signature_to_states.into_values().collect()
    }

    fn signature(&self, state_id: StateID, block_of: &[BlockID], alphabet: &[char]) -> Signature {
        let state = &self.states()[state_id];
        alphabet
            .iter()
            .map(|c| state.next_state(*c).map(|target| block_of[target]))
            .collect()
    }

    /// Map each state to the index of its group.
    fn block_map(state_count: usize, partition: &[StateGroup]) -> Vec<BlockID> {
        let mut block_of = vec![BlockID::default(); state_count];
        for (index, group) in partition.iter().enumerate() {
            for state_id in group {
                block_of[*state_id] = BlockID::new(index);
            }
        }
        block_of
    }

    /// Create a DFA with one state per group.
    /// The first state of each group is its representative. Its transitions are retargeted to
    /// the groups.
    fn create_from_partition(&self, partition: &[StateGroup]) -> Dfa {
        let block_of = Self::block_map(self.states().len(), partition);
        let state_of_block = |block: BlockID| StateID::new(block.as_usize());
        let states = partition
            .iter()
            .filter_map(|group| group.first())
            .map(|representative| {
                let representative = &self.states()[*representative];
                let mut state = DfaState::new(representative.is_final());
                state.set_transitions(coalesce_ranges(
                    representative
                        .transitions()
                        .iter()
                        .map(|transition| {
                            transition.retarget(state_of_block(block_of[transition.target_state()]))
                        })
                        .collect(),
                ));
                state
            })
            .collect();
        let start_state = state_of_block(block_of[self.start_state()]);
        Dfa::from_parts(states, start_state)
    }

    /// Trace out a partition of the DFA.
    fn trace_partition(context: &str, partition: &[StateGroup]) {
        trace!("Partition {} with {} groups:", context, partition.len());
        for (i, group) in partition.iter().enumerate() {
            trace!("Group {}: {:?}", i, group);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_regex_syntax;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn build(pattern: &str) -> Dfa {
        Dfa::try_from(&parse_regex_syntax(pattern).unwrap()).unwrap()
    }

    struct TestData {
        pattern: &'static str,
        minimized_states: usize,
        inputs: &'static [&'static str],
    }

    const TEST_DATA: &[TestData] = &[
        TestData {
            pattern: "(ab|cb)$",
            minimized_states: 3,
            inputs: &["ab", "cb", "a", "b", "abb", ""],
        },
        TestData {
            pattern: "(a|b)*$",
            minimized_states: 1,
            inputs: &["", "a", "abba", "c"],
        },
        TestData {
            pattern: "(a|a|a)(b|b)$",
            minimized_states: 3,
            inputs: &["ab", "a", "b", "abb"],
        },
        TestData {
            pattern: "a{2,3}$",
            minimized_states: 4,
            inputs: &["", "a", "aa", "aaa", "aaaa"],
        },
        TestData {
            pattern: "(ab)*b*$",
            minimized_states: 3,
            inputs: &["", "ab", "abab", "b", "abbb", "abbab", "ba", "a"],
        },
        TestData {
            pattern: "(M+(e+)?p+|(h+)?i)$",
            minimized_states: 6,
            inputs: &["Mp", "MMMepp", "MMeep", "Mpe", "Meei", "i", "hi", "hhi", "hp", "Mi"],
        },
    ];

    #[test]
    fn test_minimize_preserves_language() {
        init();
        for test in TEST_DATA {
            let raw = build(test.pattern);
            let mut minimized = raw.clone();
            minimized.minimize();
            assert_eq!(
                minimized.states().len(),
                test.minimized_states,
                "{}:\n{}",
                test.pattern,
                minimized
            );
            for input in test.inputs {
                assert_eq!(
                    raw.is_match(input),
                    minimized.is_match(input),
                    "{} on {:?}",
                    test.pattern,
                    input
                );
            }
        }
    }

    #[test]
    fn test_minimize_reduces_state_count() {
        init();
        let raw = build("(ab|cb)$");
        let mut minimized = raw.clone();
        minimized.minimize();
        assert!(minimized.states().len() < raw.states().len());
    }

    #[test]
    fn test_minimize_is_idempotent() {
        init();
        let mut dfa = build("(a|b)c*d$");
        dfa.minimize();
        let once = dfa.clone();
        dfa.minimize();
        assert_eq!(dfa.states().len(), once.states().len());
        for input in ["ad", "bccd", "cd", "a", "abd"] {
            assert_eq!(dfa.is_match(input), once.is_match(input), "{:?}", input);
        }
    }

    #[test]
    fn test_minimize_trivial_automata() {
        init();
        let mut empty = Dfa::new();
        empty.minimize();
        assert!(empty.states().is_empty());

        let mut single = Dfa::new();
        let s0 = single.add_state(true);
        single.add_transition(s0, 'a', 'a', s0);
        let before = single.clone();
        single.minimize();
        assert_eq!(single, before);
    }

    #[test]
    fn test_minimize_coalesces_ranges() {
        init();
        // The two branches lead to equivalent states, so the ranges merge into one.
        let mut dfa = build("(a|b|c)$");
        dfa.minimize();
        assert_eq!(dfa.states().len(), 2);
        let start = &dfa.states()[dfa.start_state()];
        assert_eq!(start.transitions().len(), 1);
        assert_eq!(start.transitions()[0].from_char(), 'a');
        assert_eq!(start.transitions()[0].to_char(), 'c');
    }

    #[test]
    fn test_start_state_is_remapped() {
        init();
        let mut dfa = Dfa::new();
        let dead = dfa.add_state(false);
        let start = dfa.add_state(false);
        let accept = dfa.add_state(true);
        dfa.add_transition(start, 'x', 'x', accept);
        dfa.add_transition(dead, 'y', 'y', dead);
        dfa.set_start_state(start);
        dfa.minimize();
        assert!(dfa.is_match("x"));
        assert!(!dfa.is_match("y"));
    }
}
