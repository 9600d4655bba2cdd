//! Automaton states.

use crate::{
    grammar::{NonterminalID, SymbolID, TerminalID},
    item::ItemID,
    types::Map,
};
use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct StateID {
    raw: u32,
}

impl StateID {
    /// The state containing the closure of the augmented start item.
    pub const INITIAL: Self = Self::from_raw(0);

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self { raw }
    }

    #[inline]
    pub const fn into_raw(self) -> u32 {
        self.raw
    }
}

impl fmt::Debug for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S#{:03}", self.raw)
    }
}

impl fmt::Display for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.raw, f)
    }
}

/// An item set in the LR(0) automaton.
#[derive(Debug, Clone)]
pub struct State {
    pub(crate) id: StateID,
    pub(crate) items: Vec<ItemID>,
    pub(crate) kernel_len: usize,
    pub(crate) transitions: Map<SymbolID, StateID>,
}

impl State {
    pub fn id(&self) -> StateID {
        self.id
    }

    /// The kernel items, sorted by their cores.
    pub fn kernel(&self) -> &[ItemID] {
        &self.items[..self.kernel_len]
    }

    /// The items added by the closure, in discovery order.
    pub fn closure(&self) -> &[ItemID] {
        &self.items[self.kernel_len..]
    }

    /// All items of this state, kernel first.
    pub fn items(&self) -> &[ItemID] {
        &self.items[..]
    }

    /// Outgoing transitions, in the order they were discovered.
    pub fn transitions(&self) -> &Map<SymbolID, StateID> {
        &self.transitions
    }

    pub fn transition(&self, symbol: SymbolID) -> Option<StateID> {
        self.transitions.get(&symbol).copied()
    }

    pub fn shifts(&self) -> impl Iterator<Item = (TerminalID, StateID)> + '_ {
        self.transitions.iter().filter_map(|(symbol, to)| match symbol {
            SymbolID::T(t) => Some((*t, *to)),
            SymbolID::N(..) => None,
        })
    }

    pub fn gotos(&self) -> impl Iterator<Item = (NonterminalID, StateID)> + '_ {
        self.transitions.iter().filter_map(|(symbol, to)| match symbol {
            SymbolID::N(n) => Some((*n, *to)),
            SymbolID::T(..) => None,
        })
    }
}
