//! Human-readable listing of the generated automaton.

use crate::{automaton::Automaton, grammar::Grammar, item::ItemID, util::display_fn, Output};
use std::fmt;

/// Render the grammar, every state with its items and actions, and the
/// diagnostics.
pub fn listing<'a>(g: &'a Grammar, output: &'a Output) -> impl fmt::Display + 'a {
    display_fn(move |f| {
        writeln!(f, "{}", g)?;

        let automaton = &output.automaton;
        for state in automaton.states() {
            writeln!(f, "#### State {}", state.id())?;
            writeln!(f, "## items")?;
            for id in state.kernel() {
                write_item(f, g, automaton, "- ", *id)?;
            }
            for id in state.closure() {
                write_item(f, g, automaton, "+ ", *id)?;
            }
            if let Some(row) = output.table.states.get(&state.id()) {
                write!(f, "{}", row.display(g))?;
            }
            writeln!(f)?;
        }

        writeln!(f, "## diagnostics")?;
        if output.diagnostics.is_empty() {
            writeln!(f, "(none)")?;
        }
        for diagnostic in &output.diagnostics {
            writeln!(f, "{}", diagnostic.display(g))?;
        }
        Ok(())
    })
}

// Lookaheads are only meaningful on reduction items.
fn write_item(
    f: &mut fmt::Formatter<'_>,
    g: &Grammar,
    automaton: &Automaton,
    prefix: &str,
    id: ItemID,
) -> fmt::Result {
    let item = automaton.item(id);
    write!(f, "{}{}", prefix, item.core.display(g))?;
    if item.is_reduction(g) {
        write!(f, "  {}", item.lookaheads.display(g))?;
    }
    writeln!(f)
}
