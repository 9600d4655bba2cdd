//! Non-fatal findings about a grammar.

use crate::{
    automaton::Automaton,
    grammar::{Grammar, ProductionID, SymbolID, TerminalID, TerminalSet},
    table::{ConflictRecord, ParseTable},
    types::{Map, Set},
    util::display_fn,
};
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Note,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Note => f.write_str("note"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Diagnostic {
    /// A conflict between parse actions and how it was decided.
    Conflict(ConflictRecord),

    /// A production that can never be reduced.
    DeadProduction(ProductionID),

    /// A terminal that no production refers to.
    UnusedTerminal(TerminalID),
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Self::Conflict(conflict) if !conflict.is_unresolved() => Severity::Note,
            _ => Severity::Warning,
        }
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            write!(f, "{}: ", self.severity())?;
            match self {
                Self::Conflict(conflict) => write!(f, "{}", conflict.display(g)),
                Self::DeadProduction(p) => write!(
                    f,
                    "production #{} is never reduced: {}",
                    p,
                    g.production(*p).display(g)
                ),
                Self::UnusedTerminal(t) => {
                    write!(f, "terminal `{}' is never used", g.terminals[t])
                }
            }
        })
    }
}

/// Collect the diagnostics in their reporting order: conflicts, then dead
/// productions by number, then unused terminals by declaration.
pub fn collect(g: &Grammar, automaton: &Automaton, table: &ParseTable) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = table
        .conflicts
        .iter()
        .cloned()
        .map(Diagnostic::Conflict)
        .collect();

    let mut reduced: Map<ProductionID, TerminalSet> = Map::default();
    for state in automaton.states() {
        for &id in state.items() {
            let item = automaton.item(id);
            if item.is_reduction(g) {
                reduced
                    .entry(item.core.production)
                    .or_default()
                    .union_with(&item.lookaheads);
            }
        }
    }
    for id in g.productions.keys() {
        if *id == ProductionID::ACCEPT {
            continue;
        }
        if reduced.get(id).map_or(true, TerminalSet::is_empty) {
            tracing::debug!("dead production: {}", g.production(*id).display(g));
            diagnostics.push(Diagnostic::DeadProduction(*id));
        }
    }

    let used: Set<TerminalID> = g
        .productions
        .values()
        .flat_map(|p| p.right().iter())
        .filter_map(|symbol| match symbol {
            SymbolID::T(t) => Some(*t),
            SymbolID::N(..) => None,
        })
        .collect();
    for id in g.terminals.keys() {
        if !used.contains(id) {
            diagnostics.push(Diagnostic::UnusedTerminal(*id));
        }
    }

    diagnostics
}
