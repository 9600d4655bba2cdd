//! Calculation of the LALR(1) parse table with conflict resolution.

use crate::{
    automaton::Automaton,
    grammar::{Assoc, Grammar, NonterminalID, ProductionID, TerminalID},
    state::StateID,
    types::Map,
    util::display_fn,
    Config,
};
use std::{cmp::Ordering, fmt};

#[derive(Debug)]
pub struct ParseTable {
    pub states: Map<StateID, ParseTableRow>,
    /// All conflicts met while filling the table, ordered by state and
    /// then by terminal.
    pub conflicts: Vec<ConflictRecord>,
}

impl ParseTable {
    /// Look up the action of `state` on the lookahead `t`.
    pub fn action(&self, state: StateID, t: TerminalID) -> Action {
        self.states
            .get(&state)
            .map_or(Action::Error, |row| row.action(t))
    }

    pub fn goto(&self, state: StateID, n: NonterminalID) -> Option<StateID> {
        self.states.get(&state)?.gotos.get(&n).copied()
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            for (i, (id, row)) in self.states.iter().enumerate() {
                if i > 0 {
                    writeln!(f)?;
                }
                writeln!(f, "#### State {}", id)?;
                write!(f, "{}", row.display(g))?;
            }
            Ok(())
        })
    }
}

#[derive(Debug, Default)]
#[non_exhaustive]
pub struct ParseTableRow {
    pub actions: Map<TerminalID, Action>,
    pub gotos: Map<NonterminalID, StateID>,
    /// The reduction performed on any lookahead without an explicit action.
    pub default_reduction: Option<ProductionID>,
}

impl ParseTableRow {
    pub fn action(&self, t: TerminalID) -> Action {
        match (self.actions.get(&t), self.default_reduction) {
            (Some(action), _) => *action,
            (None, Some(p)) => Action::Reduce(p),
            (None, None) => Action::Error,
        }
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            if !self.actions.is_empty() {
                writeln!(f, "## actions")?;
                for (t, action) in &self.actions {
                    writeln!(f, "- {} => {}", g.terminals[t], action.display(g))?;
                }
            }
            if let Some(p) = self.default_reduction {
                writeln!(f, "## default")?;
                writeln!(f, "- reduce({})", g.production(p).display(g))?;
            }
            if !self.gotos.is_empty() {
                writeln!(f, "## gotos")?;
                for (n, to) in &self.gotos {
                    writeln!(f, "- {} => goto({})", g.nonterminals[n], to)?;
                }
            }
            Ok(())
        })
    }
}

/// The action that the LR automaton in a state performs on a particular
/// lookahead symbol.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    /// Read a lookahead symbol and transition to the specified state.
    Shift(StateID),

    /// Reduce to the specified production.
    Reduce(ProductionID),

    Accept,

    Error,
}

impl Action {
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| match self {
            Self::Shift(to) => write!(f, "shift({})", to),
            Self::Reduce(p) => write!(f, "reduce({})", g.production(*p).display(g)),
            Self::Accept => f.write_str("accept"),
            Self::Error => f.write_str("error"),
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShiftReduce => f.write_str("shift/reduce"),
            Self::ReduceReduce => f.write_str("reduce/reduce"),
        }
    }
}

/// The rule that decided a conflict.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Justification {
    /// The lookahead binds tighter than the production.
    ShiftHigherPrecedence,
    /// The production binds tighter than the lookahead.
    ReduceHigherPrecedence,
    LeftAssociative,
    RightAssociative,
    /// Same level, declared non-associative; shifted anyway.
    NonAssociative,
    /// The lookahead or the production has no precedence; shifted.
    MissingPrecedence,
    /// The production declared first has been chosen.
    FirstDeclaredProduction,
}

impl Justification {
    /// Whether the conflict was decided by a default rather than by
    /// a precedence declaration.
    pub fn is_unresolved(self) -> bool {
        matches!(
            self,
            Self::NonAssociative | Self::MissingPrecedence | Self::FirstDeclaredProduction
        )
    }
}

impl fmt::Display for Justification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ShiftHigherPrecedence => "lookahead has higher precedence",
            Self::ReduceHigherPrecedence => "production has higher precedence",
            Self::LeftAssociative => "left associative",
            Self::RightAssociative => "right associative",
            Self::NonAssociative => "non-associative, shift chosen",
            Self::MissingPrecedence => "no precedence, shift chosen",
            Self::FirstDeclaredProduction => "first declared production chosen",
        })
    }
}

/// A conflict between actions of one state on one lookahead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictRecord {
    pub state: StateID,
    pub lookahead: TerminalID,
    pub kind: ConflictKind,
    /// The competing actions, the shift first and reductions by number.
    pub actions: Vec<Action>,
    pub resolution: Action,
    pub justification: Justification,
}

impl ConflictRecord {
    pub fn is_unresolved(&self) -> bool {
        self.justification.is_unresolved()
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            write!(
                f,
                "{} conflict in state {} on {}: ",
                self.kind, self.state, g.terminals[&self.lookahead]
            )?;
            for (i, action) in self.actions.iter().enumerate() {
                if i > 0 {
                    f.write_str(" vs ")?;
                }
                write!(f, "{}", action.display(g))?;
            }
            write!(
                f,
                "; chose {} ({})",
                self.resolution.display(g),
                self.justification
            )
        })
    }
}

/// Fill the action and goto tables from an automaton with lookaheads.
#[tracing::instrument(skip_all)]
pub fn generate(g: &Grammar, automaton: &Automaton, config: &Config) -> ParseTable {
    let accepting = automaton.accepting_state(g);

    let mut states = Map::default();
    let mut conflicts = vec![];
    for state in automaton.states() {
        #[derive(Default)]
        struct PendingAction {
            shift: Option<Action>,
            reduces: Vec<ProductionID>,
        }
        let mut pending = Map::<TerminalID, PendingAction>::default();

        for (t, to) in state.shifts() {
            pending.entry(t).or_default().shift = Some(Action::Shift(to));
        }
        if accepting == Some(state.id()) {
            pending.entry(TerminalID::EOI).or_default().shift = Some(Action::Accept);
        }
        for &id in state.items() {
            let item = automaton.item(id);
            if !item.is_reduction(g) {
                continue;
            }
            for t in item.lookaheads.iter() {
                pending.entry(t).or_default().reduces.push(item.core.production);
            }
        }

        // terminal order, so that the rows and the conflicts are stable.
        pending.sort_keys();

        let mut row = ParseTableRow::default();
        for (t, mut action) in pending {
            action.reduces.sort();
            action.reduces.dedup();

            let reduce = match action.reduces[..] {
                [] => None,
                [p] => Some(p),
                [p, ..] => {
                    conflicts.push(ConflictRecord {
                        state: state.id(),
                        lookahead: t,
                        kind: ConflictKind::ReduceReduce,
                        actions: action.reduces.iter().map(|p| Action::Reduce(*p)).collect(),
                        resolution: Action::Reduce(p),
                        justification: Justification::FirstDeclaredProduction,
                    });
                    Some(p)
                }
            };

            let resolved = match (action.shift, reduce) {
                (Some(shift), None) => shift,
                (None, Some(p)) => Action::Reduce(p),
                (Some(shift), Some(p)) => {
                    let (resolved, justification) = resolve_shift_reduce(g, t, shift, p);
                    conflicts.push(ConflictRecord {
                        state: state.id(),
                        lookahead: t,
                        kind: ConflictKind::ShiftReduce,
                        actions: vec![shift, Action::Reduce(p)],
                        resolution: resolved,
                        justification,
                    });
                    resolved
                }
                (None, None) => continue,
            };
            row.actions.insert(t, resolved);
        }

        for (n, to) in state.gotos() {
            row.gotos.insert(n, to);
        }

        if config.default_reductions {
            row.default_reduction = single_reduction(&row.actions);
        }

        states.insert(state.id(), row);
    }

    for conflict in &conflicts {
        tracing::trace!("{}", conflict.display(g));
    }
    tracing::debug!(
        "generated parse table: {} states, {} conflicts ({} unresolved)",
        states.len(),
        conflicts.len(),
        conflicts.iter().filter(|c| c.is_unresolved()).count()
    );

    ParseTable { states, conflicts }
}

/// Decide between a shift (or accept) and a reduction on the lookahead `t`.
fn resolve_shift_reduce(
    g: &Grammar,
    t: TerminalID,
    shift: Action,
    reduce: ProductionID,
) -> (Action, Justification) {
    let shift_prec = g.terminals[&t].precedence();
    let reduce_prec = g.production(reduce).precedence(g);

    match (shift_prec, reduce_prec) {
        (Some(sp), Some(rp)) => match sp.level.cmp(&rp.level) {
            Ordering::Greater => (shift, Justification::ShiftHigherPrecedence),
            Ordering::Less => (Action::Reduce(reduce), Justification::ReduceHigherPrecedence),
            Ordering::Equal => match sp.assoc {
                Assoc::Left => (Action::Reduce(reduce), Justification::LeftAssociative),
                Assoc::Right => (shift, Justification::RightAssociative),
                Assoc::Nonassoc => (shift, Justification::NonAssociative),
            },
        },
        _ => (shift, Justification::MissingPrecedence),
    }
}

fn single_reduction(actions: &Map<TerminalID, Action>) -> Option<ProductionID> {
    let mut found = None;
    for action in actions.values() {
        match (action, found) {
            (Action::Reduce(p), None) => found = Some(*p),
            (Action::Reduce(p), Some(q)) if *p == q => (),
            _ => return None,
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{first_sets::FirstSets, lookahead};

    fn table(g: &Grammar, config: &Config) -> ParseTable {
        let mut automaton = Automaton::build(g);
        let first_sets = FirstSets::new(g);
        lookahead::propagate(g, &mut automaton, &first_sets);
        generate(g, &automaton, config)
    }

    fn expr(assoc: Assoc) -> Grammar {
        Grammar::define(|g| {
            g.terminal("+")?;
            g.terminal("id")?;
            g.nonterminal("E")?;
            g.precedence(assoc, &["+"])?;
            g.rule("E", &["E", "+", "E"])?;
            g.rule("E", &["id"])?;
            Ok(())
        })
        .unwrap()
    }

    fn single_conflict(g: &Grammar) -> ConflictRecord {
        let table = table(g, &Config::new());
        assert_eq!(table.conflicts.len(), 1);
        table.conflicts[0].clone()
    }

    #[test]
    fn equal_precedence_uses_associativity() {
        let g = expr(Assoc::Left);
        let conflict = single_conflict(&g);
        assert_eq!(conflict.kind, ConflictKind::ShiftReduce);
        assert_eq!(conflict.justification, Justification::LeftAssociative);
        assert_eq!(conflict.resolution, Action::Reduce(ProductionID::from_raw(1)));
        assert!(!conflict.is_unresolved());

        let g = expr(Assoc::Right);
        let conflict = single_conflict(&g);
        assert_eq!(conflict.justification, Justification::RightAssociative);
        assert!(matches!(conflict.resolution, Action::Shift(..)));

        let g = expr(Assoc::Nonassoc);
        let conflict = single_conflict(&g);
        assert_eq!(conflict.justification, Justification::NonAssociative);
        assert!(matches!(conflict.resolution, Action::Shift(..)));
        assert!(conflict.is_unresolved());
    }

    #[test]
    fn missing_precedence_shifts() {
        let g = Grammar::define(|g| {
            g.terminal("+")?;
            g.terminal("id")?;
            g.nonterminal("E")?;
            g.rule("E", &["E", "+", "E"])?;
            g.rule("E", &["id"])?;
            Ok(())
        })
        .unwrap();
        let conflict = single_conflict(&g);
        assert_eq!(conflict.justification, Justification::MissingPrecedence);
        assert!(matches!(
            conflict.actions[..],
            [Action::Shift(..), Action::Reduce(p)] if p == ProductionID::from_raw(1)
        ));
        assert!(conflict.is_unresolved());
    }

    #[test]
    fn first_declared_reduction_wins() {
        // S -> A | B ; A -> x ; B -> x
        let g = Grammar::define(|g| {
            g.terminal("x")?;
            g.nonterminal("S")?;
            g.nonterminal("A")?;
            g.nonterminal("B")?;
            g.rule("S", &["A"])?;
            g.rule("S", &["B"])?;
            g.rule("B", &["x"])?;
            g.rule("A", &["x"])?;
            Ok(())
        })
        .unwrap();
        let conflict = single_conflict(&g);
        assert_eq!(conflict.kind, ConflictKind::ReduceReduce);
        assert_eq!(conflict.lookahead, TerminalID::EOI);
        assert_eq!(
            conflict.actions,
            [
                Action::Reduce(ProductionID::from_raw(3)),
                Action::Reduce(ProductionID::from_raw(4)),
            ]
        );
        assert_eq!(conflict.resolution, Action::Reduce(ProductionID::from_raw(3)));
        assert!(conflict.is_unresolved());
    }

    #[test]
    fn accept_on_end_of_input() {
        let g = expr(Assoc::Left);
        let table = table(&g, &Config::new());
        let accepting = StateID::from_raw(1);
        assert_eq!(table.action(accepting, TerminalID::EOI), Action::Accept);
        assert_eq!(
            table.goto(StateID::INITIAL, g.start_symbol),
            Some(accepting)
        );
        assert_eq!(table.action(StateID::INITIAL, TerminalID::EOI), Action::Error);
    }

    #[test]
    fn default_reductions_can_be_disabled() {
        let g = expr(Assoc::Left);
        let id = g.terminal_by_name("id").unwrap();
        let reduce_id = Action::Reduce(ProductionID::from_raw(2));

        // the state after `id` only reduces `E -> id`
        let with = table(&g, &Config::new());
        let after_id = with.states[&StateID::INITIAL].actions[&id];
        let after_id = match after_id {
            Action::Shift(to) => to,
            _ => unreachable!(),
        };
        assert_eq!(
            with.states[&after_id].default_reduction,
            Some(ProductionID::from_raw(2))
        );
        assert_eq!(with.action(after_id, id), reduce_id);

        let without = table(&g, &Config::new().default_reductions(false));
        assert_eq!(without.states[&after_id].default_reduction, None);
        assert_eq!(without.action(after_id, id), Action::Error);
        assert_eq!(without.action(after_id, TerminalID::EOI), reduce_id);
    }
}
