//! The `dot` module contains the conversion from a DFA to a graphviz dot format.
//! The functions in this module are used for testing and debugging purposes.

use std::io::Write;

use dot_writer::{Attributes, DotWriter, RankDirection};

use crate::Dfa;

/// Render a DFA to a graphviz dot format.
/// The start state is drawn blue and the accepting states red. The edges are labelled with the
/// character ranges of the transitions.
pub fn dfa_render<W: Write>(dfa: &Dfa, label: &str, output: &mut W) {
    let mut writer = DotWriter::from(output);
    writer.set_pretty_print(true);
    let mut digraph = writer.digraph();
    digraph
        .set_label(label)
        .set_rank_direction(RankDirection::LeftRight);
    // Render the states of the DFA
    for (state_id, state) in dfa.states().iter().enumerate() {
        let mut source_node = digraph.node_auto();
        source_node.set_label(&state_id.to_string());
        if state_id == dfa.start_state().as_usize() {
            source_node
                .set_shape(dot_writer::Shape::Circle)
                .set_color(dot_writer::Color::Blue)
                .set_pen_width(3.0);
        }
        if state.is_final() {
            source_node
                .set_color(dot_writer::Color::Red)
                .set_pen_width(3.0);
        }
    }
    // Render the transitions of the DFA
    for (source_id, state) in dfa.states().iter().enumerate() {
        for transition in state.transitions() {
            let range = if transition.from_char() == transition.to_char() {
                transition.from_char().to_string()
            } else {
                format!("{}-{}", transition.from_char(), transition.to_char())
            };
            digraph
                .edge(
                    &format!("node_{}", source_id),
                    &format!("node_{}", transition.target_state().as_usize()),
                )
                .attributes()
                .set_label(&range.escape_default().to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_regex_syntax;

    #[test]
    fn test_dfa_render() {
        let mut dfa = Dfa::try_from(&parse_regex_syntax("a(b|c)d*$").unwrap()).unwrap();
        dfa.minimize();
        let mut output = Vec::new();
        dfa_render(&dfa, "a(b|c)d*", &mut output);
        let dot = String::from_utf8(output).unwrap();
        assert!(dot.contains("digraph"));
        assert!(dot.contains("LR"));
        assert!(dot.contains("b-c"));
        assert!(dot.contains("red"));
        assert!(dot.contains("blue"));
        assert!(dot.matches("node_").count() >= dfa.states().len());
    }
}
