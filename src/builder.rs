//! This module builds a DFA directly from the syntax tree of a pattern.
//!
//! The construction folds the tree from left to right while maintaining a frontier, the set of
//! states that represent the input consumed so far. No NFA is materialized. The result is not
//! minimal and is handed to the minimizer afterwards.

use itertools::Itertools;
use log::{debug, trace};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::{
    ast::{Node, Repeat, RegexTree},
    dfa::{coalesce_ranges, Transition, ALPHABET_END, ALPHABET_START},
    Dfa, RegDfaError, RegDfaErrorKind, Result, StateID,
};

/// The states that continue the input consumed so far.
type Frontier = BTreeSet<StateID>;

impl TryFrom<&RegexTree> for Dfa {
    type Error = RegDfaError;

    /// Build a DFA from a syntax tree.
    /// # Errors
    /// [`RegDfaErrorKind::EmptyTree`] if the tree has no root.
    fn try_from(tree: &RegexTree) -> Result<Self> {
        let root = tree
            .root()
            .ok_or_else(|| RegDfaError::new(RegDfaErrorKind::EmptyTree))?;
        Dfa::try_from(root)
    }
}

impl TryFrom<&Node> for Dfa {
    type Error = RegDfaError;

    /// Build a DFA from a syntax tree node.
    fn try_from(node: &Node) -> Result<Self> {
        let mut builder = Builder { dfa: Dfa::new() };
        let start_state = builder.dfa.add_state(false);
        builder.dfa.set_start_state(start_state);
        let frontier = builder.apply(node, Frontier::from([start_state]));
        trace!(
            "Frontier construction created {} states, last frontier {:?}",
            builder.dfa.states().len(),
            frontier
        );
        Ok(resolve_overlaps(builder.dfa))
    }
}

struct Builder {
    dfa: Dfa,
}

impl Builder {
    /// Apply a node to the frontier and return the frontier after the node.
    fn apply(&mut self, node: &Node, frontier: Frontier) -> Frontier {
        match node {
            Node::Literal(c) => self.step(&frontier, *c, *c),
            Node::Wildcard => self.step(&frontier, ALPHABET_START, ALPHABET_END),
            Node::Concat(children) => children
                .iter()
                .fold(frontier, |frontier, child| self.apply(child, frontier)),
            Node::Alternation(children) => children.iter().fold(Frontier::new(), |mut acc, child| {
                acc.extend(self.apply(child, frontier.clone()));
                acc
            }),
            Node::Repeat(repeat) => self.apply_repeat(repeat, frontier),
            Node::End => {
                for state_id in &frontier {
                    self.dfa.state_mut(*state_id).set_final(true);
                }
                frontier
            }
            Node::Epsilon => frontier,
            Node::EmptySet => Frontier::new(),
        }
    }

    /// Every frontier state gets its own fresh successor on the given range.
    fn step(&mut self, frontier: &Frontier, from_char: char, to_char: char) -> Frontier {
        frontier
            .iter()
            .map(|state_id| {
                let target = self.dfa.add_state(false);
                self.dfa.add_transition(*state_id, from_char, to_char, target);
                target
            })
            .collect()
    }

    fn apply_repeat(&mut self, repeat: &Repeat, frontier: Frontier) -> Frontier {
        let child = repeat.child();
        let entry = (0..repeat.min()).fold(frontier, |frontier, _| self.apply(child, frontier));
        match repeat.max() {
            Some(max) if max == repeat.min() => entry,
            Some(max) => {
                let mut result = entry.clone();
                let mut current = entry;
                for _ in repeat.min()..max {
                    current = self.apply(child, current);
                    result.extend(current.iter().copied());
                }
                result
            }
            None => {
                // Remember where the transitions of the entry states end, so that only the
                // transitions of this pass are copied onto the exits.
                let marks = entry
                    .iter()
                    .map(|state_id| (*state_id, self.dfa.states()[*state_id].transitions().len()))
                    .collect::<Vec<_>>();
                let exits = self.apply(child, entry.clone());
                let loop_transitions = marks
                    .iter()
                    .flat_map(|(state_id, mark)| {
                        self.dfa.states()[*state_id].transitions()[*mark..].to_vec()
                    })
                    .collect::<Vec<_>>();
                // Nested unbounded repeats multiply the transitions of the exits, so the
                // construction grows quickly for patterns like `(b*){12}`.
                for exit in &exits {
                    let state = self.dfa.state_mut(*exit);
                    let mut present = state.transitions().iter().copied().collect::<BTreeSet<_>>();
                    for transition in &loop_transitions {
                        if present.insert(*transition) {
                            state.push_transition(*transition);
                        }
                    }
                }
                exits.union(&entry).copied().collect()
            }
        }
    }
}

/// Resolve states with overlapping transitions by merging their targets.
/// The merge runs a subset construction over disjoint sub-ranges. An automaton without overlaps
/// is returned unchanged.
fn resolve_overlaps(dfa: Dfa) -> Dfa {
    if !dfa.states().iter().any(|state| state.has_overlaps()) {
        return dfa;
    }
    debug!(
        "Resolving overlapping transitions in an automaton with {} states",
        dfa.states().len()
    );

    let mut resolved = Dfa::new();
    let mut subsets: BTreeMap<BTreeSet<StateID>, StateID> = BTreeMap::new();
    let mut work_list = VecDeque::new();

    let start_set = BTreeSet::from([dfa.start_state()]);
    let start_state =
        add_subset_if_new(&dfa, &mut resolved, &mut subsets, &mut work_list, start_set);
    resolved.set_start_state(start_state);

    while let Some((subset, source)) = work_list.pop_front() {
        let transitions = subset
            .iter()
            .flat_map(|state_id| dfa.states()[*state_id].transitions().iter().copied())
            .collect::<Vec<_>>();
        let mut merged = Vec::new();
        for (from_char, to_char) in elementary_ranges(&transitions) {
            let targets = transitions
                .iter()
                .filter(|transition| transition.contains(from_char))
                .map(Transition::target_state)
                .collect::<BTreeSet<_>>();
            if targets.is_empty() {
                continue;
            }
            let target =
                add_subset_if_new(&dfa, &mut resolved, &mut subsets, &mut work_list, targets);
            merged.push(Transition::new(from_char, to_char, target));
        }
        resolved
            .state_mut(source)
            .set_transitions(coalesce_ranges(merged));
    }

    debug!("Resolved automaton has {} states", resolved.states().len());
    resolved
}

/// Add a state for the subset if it does not already exist.
/// The state is accepting if any state of the subset is accepting.
fn add_subset_if_new(
    dfa: &Dfa,
    resolved: &mut Dfa,
    subsets: &mut BTreeMap<BTreeSet<StateID>, StateID>,
    work_list: &mut VecDeque<(BTreeSet<StateID>, StateID)>,
    subset: BTreeSet<StateID>,
) -> StateID {
    if let Some(state_id) = subsets.get(&subset) {
        return *state_id;
    }
    let is_final = subset.iter().any(|state_id| dfa.states()[*state_id].is_final());
    let state_id = resolved.add_state(is_final);
    subsets.insert(subset.clone(), state_id);
    work_list.push_back((subset, state_id));
    state_id
}

/// Split the ranges of the transitions at every range boundary.
/// Each returned range is either covered completely by a transition or not at all.
fn elementary_ranges(transitions: &[Transition]) -> Vec<(char, char)> {
    transitions
        .iter()
        .flat_map(|transition| {
            [
                u32::from(transition.from_char()),
                u32::from(transition.to_char()) + 1,
            ]
        })
        .sorted_unstable()
        .dedup()
        .tuple_windows()
        .filter_map(|(start, end)| Some((char::from_u32(start)?, char::from_u32(end - 1)?)))
        .collect()
}
