//! Nullable nonterminals and FIRST sets.

use crate::{
    grammar::{Grammar, NonterminalID, SymbolID, TerminalSet},
    types::{Map, Set},
};

#[derive(Debug)]
pub struct FirstSets {
    nulls: Set<NonterminalID>,
    map: Map<NonterminalID, TerminalSet>,
}

impl FirstSets {
    pub fn new(grammar: &Grammar) -> Self {
        let nulls = nulls_set(grammar);

        let mut map: Map<NonterminalID, TerminalSet> = grammar
            .nonterminals
            .keys()
            .map(|n| (*n, TerminalSet::default()))
            .collect();

        // For `X -> Y1 Y2 ... Yn`, First(X) includes First(Yi) for every
        // leading Yi up to and including the first non-nullable one.
        let mut constraints = vec![];
        for production in grammar.productions.values() {
            for symbol in production.right() {
                if *symbol != SymbolID::N(production.left()) {
                    constraints.push((production.left(), *symbol));
                }
                if !matches!(symbol, SymbolID::N(n) if nulls.contains(n)) {
                    break;
                }
            }
        }

        let mut changed = true;
        while changed {
            changed = false;
            for (sup, sub) in &constraints {
                match sub {
                    SymbolID::T(t) => changed |= map[sup].insert(*t),
                    SymbolID::N(n) => {
                        let subset = map[n].clone();
                        changed |= map[sup].union_with(&subset);
                    }
                }
            }
        }

        Self { nulls, map }
    }

    pub fn is_nullable(&self, n: NonterminalID) -> bool {
        self.nulls.contains(&n)
    }

    /// Return `First(n)`.
    pub fn first(&self, n: NonterminalID) -> &TerminalSet {
        &self.map[&n]
    }

    /// Return `First(symbols)` and whether `symbols` derives the empty string.
    pub fn of_sequence(&self, symbols: &[SymbolID]) -> (TerminalSet, bool) {
        let mut res = TerminalSet::default();
        for symbol in symbols {
            match symbol {
                SymbolID::T(t) => {
                    res.insert(*t);
                    return (res, false);
                }
                SymbolID::N(n) => {
                    res.union_with(&self.map[n]);
                    if !self.nulls.contains(n) {
                        return (res, false);
                    }
                }
            }
        }
        (res, true)
    }
}

/// Calculate the set of nullable symbols in this grammar.
fn nulls_set(grammar: &Grammar) -> Set<NonterminalID> {
    let mut nulls: Set<NonterminalID> = grammar
        .productions
        .values()
        .filter_map(|p| p.right().is_empty().then(|| p.left()))
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        for production in grammar.productions.values() {
            if nulls.contains(&production.left()) {
                continue;
            }
            let is_rhs_nullable = production
                .right()
                .iter()
                .all(|symbol| matches!(symbol, SymbolID::N(n) if nulls.contains(n)));
            if is_rhs_nullable {
                changed = true;
                nulls.insert(production.left());
            }
        }
    }

    nulls
}
