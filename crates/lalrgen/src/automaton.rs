//! Construction of the canonical LR(0) collection.

use crate::{
    grammar::{Grammar, NonterminalID, ProductionID, SymbolID, TerminalID},
    item::{Item, ItemCore, ItemID},
    state::{State, StateID},
    types::{Map, Queue, Set},
    util::display_fn,
};
use std::fmt;

/// Saturate `kernel` by expanding every nonterminal found just after a marker.
///
/// The result starts with `kernel` as given, followed by the added items.
/// Each nonterminal is expanded at most once, with its productions in
/// declaration order, so the result is canonical for a canonical kernel.
pub fn closure(g: &Grammar, kernel: &[ItemCore]) -> Vec<ItemCore> {
    let mut items = kernel.to_vec();
    let mut expanded: Set<NonterminalID> = Set::default();

    let mut i = 0;
    while i < items.len() {
        if let Some(SymbolID::N(n)) = items[i].next_symbol(g) {
            if expanded.insert(n) {
                items.extend(
                    g.alternatives(n)
                        .iter()
                        .map(|production| ItemCore::new(*production, 0)),
                );
            }
        }
        i += 1;
    }

    items
}

/// Compute the kernel reached from `items` by moving across `symbol`.
///
/// The kernel is sorted by item core.
pub fn goto(g: &Grammar, items: &[ItemCore], symbol: SymbolID) -> Vec<ItemCore> {
    let mut kernel: Vec<ItemCore> = items
        .iter()
        .filter(|core| core.next_symbol(g) == Some(symbol))
        .map(ItemCore::advance)
        .collect();
    kernel.sort();
    kernel.dedup();
    kernel
}

/// The LR(0) automaton, owning the items of all its states.
#[derive(Debug)]
pub struct Automaton {
    items: Vec<Item>,
    states: Vec<State>,
}

impl Automaton {
    /// Discover all the states reachable from the augmented start item.
    ///
    /// States are numbered in the order of discovery: the worklist is
    /// processed by ascending state number, and the successors of a state
    /// are visited in the order their symbols first appear after a marker.
    #[tracing::instrument(skip_all)]
    pub fn build(g: &Grammar) -> Self {
        let mut builder = Builder {
            g,
            automaton: Automaton {
                items: vec![],
                states: vec![],
            },
            kernels: Map::default(),
            queue: Queue::default(),
        };

        builder.intern(vec![ItemCore::new(ProductionID::ACCEPT, 0)]);
        while let Some(id) = builder.queue.pop() {
            builder.expand(id);
        }

        let automaton = builder.automaton;
        tracing::debug!(
            "built LR(0) automaton: {} states, {} items",
            automaton.states.len(),
            automaton.items.len()
        );
        automaton
    }

    pub fn state(&self, id: StateID) -> &State {
        &self.states[id.into_raw() as usize]
    }

    pub fn states(&self) -> impl Iterator<Item = &State> + '_ {
        self.states.iter()
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn item(&self, id: ItemID) -> &Item {
        &self.items[id.index()]
    }

    pub(crate) fn item_mut(&mut self, id: ItemID) -> &mut Item {
        &mut self.items[id.index()]
    }

    pub fn num_items(&self) -> usize {
        self.items.len()
    }

    /// The cores of the kernel items of `state`.
    pub fn kernel_cores(&self, state: StateID) -> Vec<ItemCore> {
        self.state(state)
            .kernel()
            .iter()
            .map(|id| self.item(*id).core)
            .collect()
    }

    /// The state that contains `$start -> S . $end`, where `$end` is accepted.
    pub fn accepting_state(&self, g: &Grammar) -> Option<StateID> {
        self.state(StateID::INITIAL)
            .transition(SymbolID::N(g.start_symbol))
    }

    pub fn display<'a>(&'a self, g: &'a Grammar) -> impl fmt::Display + 'a {
        display_fn(move |f| {
            for state in &self.states {
                writeln!(f, "#### State {}", state.id)?;
                for id in state.kernel() {
                    writeln!(f, "  {}", self.item(*id).display(g))?;
                }
                for id in state.closure() {
                    writeln!(f, "  + {}", self.item(*id).display(g))?;
                }
                for (symbol, to) in state.transitions() {
                    writeln!(f, "  {} => {}", g.symbol(*symbol), to)?;
                }
            }
            Ok(())
        })
    }
}

struct Builder<'g> {
    g: &'g Grammar,
    automaton: Automaton,
    kernels: Map<Vec<ItemCore>, StateID>,
    queue: Queue<StateID>,
}

impl Builder<'_> {
    /// Return the state whose kernel is `kernel`, creating it if it is new.
    fn intern(&mut self, kernel: Vec<ItemCore>) -> StateID {
        if let Some(id) = self.kernels.get(&kernel) {
            return *id;
        }

        // states and items live in memory, so their count stays below u32::MAX
        let id = StateID::from_raw(self.automaton.states.len() as u32);
        let cores = closure(self.g, &kernel);
        let items = cores
            .into_iter()
            .map(|core| {
                let item = ItemID::from_index(self.automaton.items.len());
                self.automaton.items.push(Item::new(core));
                item
            })
            .collect();
        self.automaton.states.push(State {
            id,
            items,
            kernel_len: kernel.len(),
            transitions: Map::default(),
        });
        tracing::trace!("new state {:?} with {} kernel items", id, kernel.len());

        self.kernels.insert(kernel, id);
        self.queue.push(id);
        id
    }

    fn expand(&mut self, id: StateID) {
        let cores: Vec<ItemCore> = self
            .automaton
            .state(id)
            .items()
            .iter()
            .map(|item| self.automaton.item(*item).core)
            .collect();

        // Consuming `$end` is the accept action; no state is built for it.
        let symbols: Set<SymbolID> = cores
            .iter()
            .filter_map(|core| core.next_symbol(self.g))
            .filter(|symbol| *symbol != SymbolID::T(TerminalID::EOI))
            .collect();

        for symbol in symbols {
            let target = self.intern(goto(self.g, &cores, symbol));
            self.automaton.states[id.into_raw() as usize]
                .transitions
                .insert(symbol, target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // E -> E + T | T ; T -> id
    fn grammar() -> Grammar {
        Grammar::define(|g| {
            g.terminal("+")?;
            g.terminal("id")?;
            g.nonterminal("E")?;
            g.nonterminal("T")?;
            g.rule("E", &["E", "+", "T"])?;
            g.rule("E", &["T"])?;
            g.rule("T", &["id"])?;
            Ok(())
        })
        .unwrap()
    }

    #[test]
    fn closure_expands_in_declaration_order() {
        let g = grammar();
        let items = closure(&g, &[ItemCore::new(ProductionID::ACCEPT, 0)]);
        let items: Vec<_> = items.iter().map(|i| i.display(&g).to_string()).collect();
        assert_eq!(
            items,
            [
                "$start -> . E $end",
                "E -> . E + T",
                "E -> . T",
                "T -> . id",
            ]
        );
    }

    #[test]
    fn goto_sorts_kernel() {
        let g = grammar();
        let items = closure(&g, &[ItemCore::new(ProductionID::ACCEPT, 0)]);
        let e = g.nonterminal_by_name("E").unwrap();
        let kernel = goto(&g, &items, SymbolID::N(e));
        assert_eq!(
            kernel,
            [
                ItemCore::new(ProductionID::ACCEPT, 1),
                ItemCore::new(ProductionID::from_raw(1), 1),
            ]
        );
    }

    #[test]
    fn states_are_numbered_by_discovery() {
        let g = grammar();
        let automaton = Automaton::build(&g);
        assert_eq!(automaton.num_states(), 6);

        let e = g.nonterminal_by_name("E").unwrap();
        let t = g.nonterminal_by_name("T").unwrap();
        let plus = g.terminal_by_name("+").unwrap();
        let id = g.terminal_by_name("id").unwrap();

        let initial = automaton.state(StateID::INITIAL);
        let transitions: Vec<_> = initial.transitions().iter().map(|(s, to)| (*s, *to)).collect();
        assert_eq!(
            transitions,
            [
                (SymbolID::N(e), StateID::from_raw(1)),
                (SymbolID::N(t), StateID::from_raw(2)),
                (SymbolID::T(id), StateID::from_raw(3)),
            ]
        );
        assert_eq!(automaton.accepting_state(&g), Some(StateID::from_raw(1)));

        // no transition on `$end`
        let accepting = automaton.state(StateID::from_raw(1));
        assert_eq!(accepting.transition(SymbolID::T(TerminalID::EOI)), None);
        assert_eq!(
            accepting.transition(SymbolID::T(plus)),
            Some(StateID::from_raw(4))
        );

        // `T -> . id` in state 4 reuses state 3
        let after_plus = automaton.state(StateID::from_raw(4));
        assert_eq!(
            after_plus.transition(SymbolID::T(id)),
            Some(StateID::from_raw(3))
        );
        assert_eq!(
            after_plus.transition(SymbolID::N(t)),
            Some(StateID::from_raw(5))
        );
    }

    #[test]
    fn kernels_are_unique() {
        let g = grammar();
        let automaton = Automaton::build(&g);
        let mut seen = Set::default();
        for state in automaton.states() {
            assert!(seen.insert(automaton.kernel_cores(state.id())));
        }
    }
}
