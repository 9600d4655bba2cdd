//! LALR(1) parser table generator.

pub mod automaton;
pub mod diagnostics;
pub mod first_sets;
pub mod grammar;
pub mod item;
pub mod lookahead;
pub mod report;
pub mod runtime;
pub mod samples;
pub mod state;
pub mod table;
pub mod types;
pub mod util;

use crate::{
    automaton::Automaton,
    diagnostics::Diagnostic,
    first_sets::FirstSets,
    grammar::Grammar,
    lookahead::PropagationStats,
    table::{ConflictRecord, ParseTable},
};

/// Options for the table generation.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) default_reductions: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub const fn new() -> Self {
        Self {
            default_reductions: true,
        }
    }

    /// Whether to let a state reduce on any lookahead when its only
    /// action is a single reduction. Enabled by default.
    pub fn default_reductions(mut self, enabled: bool) -> Self {
        self.default_reductions = enabled;
        self
    }

    /// Run the whole pipeline on `g`.
    #[tracing::instrument(skip_all)]
    pub fn generate(&self, g: &Grammar) -> Output {
        let first_sets = FirstSets::new(g);
        let mut automaton = Automaton::build(g);
        let stats = lookahead::propagate(g, &mut automaton, &first_sets);
        let table = table::generate(g, &automaton, self);
        let diagnostics = diagnostics::collect(g, &automaton, &table);
        tracing::info!(
            "generated {} states with {} diagnostics",
            automaton.num_states(),
            diagnostics.len()
        );
        Output {
            automaton,
            table,
            diagnostics,
            stats,
        }
    }
}

/// Generate the parse table with the default configuration.
pub fn generate(g: &Grammar) -> Output {
    Config::new().generate(g)
}

/// Everything produced for one grammar.
#[derive(Debug)]
#[non_exhaustive]
pub struct Output {
    /// The LR(0) automaton with LALR(1) lookaheads on its items.
    pub automaton: Automaton,
    pub table: ParseTable,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: PropagationStats,
}

impl Output {
    /// Conflicts decided by a default rather than by precedence.
    pub fn unresolved_conflicts(&self) -> impl Iterator<Item = &ConflictRecord> + '_ {
        self.table.conflicts.iter().filter(|c| c.is_unresolved())
    }
}
