//! LALR(1) lookahead computation by item-based propagation.

use crate::{
    automaton::Automaton,
    first_sets::FirstSets,
    grammar::{Grammar, ProductionID, SymbolID, TerminalID},
    item::{ItemCore, ItemID},
    state::StateID,
    types::Map,
};

/// Summary of a lookahead propagation run.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PropagationStats {
    /// The number of full relaxation passes, including the last one
    /// that changed nothing.
    pub passes: usize,
    /// The number of propagation edges.
    pub edges: usize,
    /// The number of items that received spontaneous lookaheads.
    pub spontaneous: usize,
}

/// Attach LALR(1) lookaheads to the items of `automaton`.
pub fn propagate(g: &Grammar, automaton: &mut Automaton, first_sets: &FirstSets) -> PropagationStats {
    propagate_with(g, automaton, first_sets, |_| ())
}

/// Same as `propagate`, calling `on_pass` after each relaxation pass.
#[tracing::instrument(skip_all)]
pub fn propagate_with<F>(
    g: &Grammar,
    automaton: &mut Automaton,
    first_sets: &FirstSets,
    mut on_pass: F,
) -> PropagationStats
where
    F: FnMut(&Automaton),
{
    let index: Map<(StateID, ItemCore), ItemID> = automaton
        .states()
        .flat_map(|state| {
            state
                .items()
                .iter()
                .map(move |id| (state.id(), *id))
        })
        .map(|(state, id)| ((state, automaton.item(id).core), id))
        .collect();

    let mut edges: Vec<(ItemID, ItemID)> = vec![];
    let mut spontaneous = vec![];
    for state in automaton.states() {
        for &id in state.items() {
            let core = automaton.item(id).core;
            let symbol = match core.next_symbol(g) {
                Some(symbol) => symbol,
                None => continue,
            };

            // [A -> alpha . B beta] gives [B -> . gamma] the lookaheads
            // First(beta), and its own ones if beta is nullable.
            if let SymbolID::N(n) = symbol {
                let (first, nullable) = first_sets.of_sequence(core.rest(g));
                for production in g.alternatives(n) {
                    let child = index[&(state.id(), ItemCore::new(*production, 0))];
                    if !first.is_empty() {
                        spontaneous.push((child, first.clone()));
                    }
                    if nullable {
                        edges.push((id, child));
                    }
                }
            }

            if symbol == SymbolID::T(TerminalID::EOI) {
                continue;
            }
            if let Some(target) = state.transition(symbol) {
                edges.push((id, index[&(target, core.advance())]));
            }
        }
    }

    let start = index[&(StateID::INITIAL, ItemCore::new(ProductionID::ACCEPT, 0))];
    automaton.item_mut(start).lookaheads.insert(TerminalID::EOI);

    let mut seeded = 0;
    for (child, first) in &spontaneous {
        if automaton.item_mut(*child).lookaheads.union_with(first) {
            seeded += 1;
        }
    }

    let mut passes = 0;
    loop {
        passes += 1;
        let mut changed = false;
        for &(from, to) in &edges {
            changed |= automaton.union_lookaheads(from, to);
        }
        on_pass(automaton);
        tracing::trace!("pass {}: changed = {}", passes, changed);
        if !changed {
            break;
        }
    }

    let stats = PropagationStats {
        passes,
        edges: edges.len(),
        spontaneous: seeded,
    };
    tracing::debug!(
        "propagated lookaheads: {} passes over {} edges ({} spontaneous)",
        stats.passes,
        stats.edges,
        stats.spontaneous
    );
    stats
}

impl Automaton {
    /// Add the lookaheads of `from` into `to`, returning whether `to` has grown.
    fn union_lookaheads(&mut self, from: ItemID, to: ItemID) -> bool {
        if from == to {
            return false;
        }
        let source = std::mem::take(&mut self.item_mut(from).lookaheads);
        let changed = self.item_mut(to).lookaheads.union_with(&source);
        self.item_mut(from).lookaheads = source;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::TerminalSet;

    fn lookaheads_of(g: &Grammar, automaton: &Automaton, production: u16) -> Vec<Vec<String>> {
        let production = ProductionID::from_raw(production);
        automaton
            .states()
            .flat_map(|state| state.items().iter())
            .map(|id| automaton.item(*id))
            .filter(|item| item.core.production == production && item.is_reduction(g))
            .map(|item| {
                item.lookaheads
                    .iter()
                    .map(|t| g.terminals[&t].name().to_owned())
                    .collect()
            })
            .collect()
    }

    // The classic non-SLR grammar:
    //   S -> L = R | R ; L -> * R | id ; R -> L
    fn pointer_grammar() -> Grammar {
        Grammar::define(|g| {
            g.terminal("=")?;
            g.terminal("*")?;
            g.terminal("id")?;
            g.nonterminal("S")?;
            g.nonterminal("L")?;
            g.nonterminal("R")?;
            g.rule("S", &["L", "=", "R"])?;
            g.rule("S", &["R"])?;
            g.rule("L", &["*", "R"])?;
            g.rule("L", &["id"])?;
            g.rule("R", &["L"])?;
            Ok(())
        })
        .unwrap()
    }

    #[test]
    fn lalr_lookaheads_of_pointer_grammar() {
        let g = pointer_grammar();
        let first_sets = FirstSets::new(&g);
        let mut automaton = Automaton::build(&g);
        let stats = propagate(&g, &mut automaton, &first_sets);
        assert!(stats.passes >= 1);

        // S -> R . only on $end
        assert_eq!(lookaheads_of(&g, &automaton, 2), [vec!["$end"]]);
        // L -> id . on = and $end
        assert_eq!(lookaheads_of(&g, &automaton, 4), [vec!["$end", "="]]);
        // R -> L . : the state after L from state 0 only needs $end
        // (no S/R conflict with `=`), the merged one needs both.
        let r = lookaheads_of(&g, &automaton, 5);
        assert!(r.contains(&vec!["$end".to_owned()]));
        assert!(r.contains(&vec!["$end".to_owned(), "=".to_owned()]));
    }

    #[test]
    fn lookaheads_only_grow() {
        let g = pointer_grammar();
        let first_sets = FirstSets::new(&g);
        let mut automaton = Automaton::build(&g);

        let mut snapshots: Vec<Vec<TerminalSet>> = vec![];
        propagate_with(&g, &mut automaton, &first_sets, |automaton| {
            let n = automaton.num_items();
            snapshots.push(
                (0..n)
                    .map(|i| automaton.item(ItemID::from_index(i)).lookaheads.clone())
                    .collect(),
            );
        });

        for pair in snapshots.windows(2) {
            for (before, after) in pair[0].iter().zip(&pair[1]) {
                assert!(after.is_superset(before));
            }
        }
        // the last pass changes nothing
        if let [.., prev, last] = &snapshots[..] {
            assert_eq!(prev, last);
        }
    }

    #[test]
    fn nullable_tail_propagates() {
        // S -> A B ; A -> a ; B -> b | ε
        let g = Grammar::define(|g| {
            g.terminal("a")?;
            g.terminal("b")?;
            g.nonterminal("S")?;
            g.nonterminal("A")?;
            g.nonterminal("B")?;
            g.rule("S", &["A", "B"])?;
            g.rule("A", &["a"])?;
            g.rule("B", &["b"])?;
            g.rule("B", &[])?;
            Ok(())
        })
        .unwrap();
        let first_sets = FirstSets::new(&g);
        let mut automaton = Automaton::build(&g);
        propagate(&g, &mut automaton, &first_sets);

        assert_eq!(lookaheads_of(&g, &automaton, 2), [vec!["$end", "b"]]);
        assert_eq!(lookaheads_of(&g, &automaton, 4), [vec!["$end"]]);
    }
}
