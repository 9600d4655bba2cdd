//! Dotted productions.

use crate::{
    grammar::{Grammar, ProductionID, SymbolID, TerminalSet},
    util::display_fn,
};
use std::fmt;

/// The LR(0) core of an item, i.e. a production with a marker position.
///
/// Cores are ordered by production number and then by marker position;
/// kernels are kept sorted in this order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemCore {
    pub production: ProductionID,
    pub dot: u16,
}

impl ItemCore {
    pub const fn new(production: ProductionID, dot: u16) -> Self {
        Self { production, dot }
    }

    /// The symbol just after the marker, if any.
    pub fn next_symbol(&self, g: &Grammar) -> Option<SymbolID> {
        g.production(self.production)
            .right()
            .get(self.dot as usize)
            .copied()
    }

    /// The symbols following the one just after the marker.
    pub fn rest<'g>(&self, g: &'g Grammar) -> &'g [SymbolID] {
        let right = g.production(self.production).right();
        right.get(self.dot as usize + 1..).unwrap_or(&[])
    }

    pub fn is_reduction(&self, g: &Grammar) -> bool {
        self.dot as usize == g.production(self.production).right().len()
    }

    pub fn advance(&self) -> Self {
        Self {
            production: self.production,
            dot: self.dot + 1,
        }
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            let production = g.production(self.production);
            write!(f, "{} ->", g.nonterminals[&production.left()])?;
            for (i, symbol) in production.right().iter().enumerate() {
                if i == self.dot as usize {
                    f.write_str(" .")?;
                }
                write!(f, " {}", g.symbol(*symbol))?;
            }
            if self.dot as usize == production.right().len() {
                f.write_str(" .")?;
            }
            Ok(())
        })
    }
}

/// The index of an item in the automaton's item arena.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ItemID {
    raw: u32,
}

impl ItemID {
    #[inline]
    pub(crate) const fn from_index(index: usize) -> Self {
        Self { raw: index as u32 }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.raw as usize
    }
}

impl fmt::Debug for ItemID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I#{:04}", self.raw)
    }
}

/// An item owned by one state: an LR(0) core with its lookahead set.
///
/// Equality ignores the lookaheads.
#[derive(Debug, Clone)]
pub struct Item {
    pub core: ItemCore,
    pub lookaheads: TerminalSet,
}

impl Item {
    pub(crate) fn new(core: ItemCore) -> Self {
        Self {
            core,
            lookaheads: TerminalSet::default(),
        }
    }

    pub fn is_reduction(&self, g: &Grammar) -> bool {
        self.core.is_reduction(g)
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            write!(f, "{}", self.core.display(g))?;
            if !self.lookaheads.is_empty() {
                write!(f, "  {}", self.lookaheads.display(g))?;
            }
            Ok(())
        })
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.core == other.core
    }
}

impl Eq for Item {}

impl std::hash::Hash for Item {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.core.hash(state);
    }
}
