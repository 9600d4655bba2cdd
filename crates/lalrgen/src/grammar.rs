//! Grammar model.

use crate::{types::Map, util::display_fn};
use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TerminalID {
    raw: u16,
}

impl TerminalID {
    /// Reserved symbol used as a terminal symbol that means the end of input.
    pub const EOI: Self = Self::from_raw(0);

    const OFFSET: u16 = 1;

    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        Self { raw }
    }

    #[inline]
    pub const fn into_raw(self) -> u16 {
        self.raw
    }
}

impl fmt::Debug for TerminalID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::EOI => write!(f, "T#End"),
            _ => write!(f, "T#{:03}", self.raw),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NonterminalID {
    raw: u16,
}

impl NonterminalID {
    /// The left-hand side of the augmented start production.
    pub const START: Self = Self::from_raw(0);

    const OFFSET: u16 = 1;

    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        Self { raw }
    }

    #[inline]
    pub const fn into_raw(self) -> u16 {
        self.raw
    }
}

impl fmt::Debug for NonterminalID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::START => write!(f, "N#Start"),
            _ => write!(f, "N#{:03}", self.raw),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub enum SymbolID {
    T(TerminalID),
    N(NonterminalID),
}

impl fmt::Debug for SymbolID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::T(t) => fmt::Debug::fmt(t, f),
            Self::N(n) => fmt::Debug::fmt(n, f),
        }
    }
}

/// The production number, assigned in declaration order.
///
/// The augmented start production is always numbered zero, so the order
/// of `ProductionID`s is the order in which the productions were declared.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ProductionID {
    raw: u16,
}

impl ProductionID {
    pub const ACCEPT: Self = Self::from_raw(0);

    const OFFSET: u16 = 1;

    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        Self { raw }
    }

    #[inline]
    pub const fn into_raw(self) -> u16 {
        self.raw
    }
}

impl fmt::Debug for ProductionID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ACCEPT => write!(f, "P#Accept"),
            _ => write!(f, "P#{:03}", self.raw),
        }
    }
}

impl fmt::Display for ProductionID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.raw, f)
    }
}

/// A set of terminal symbols, used for lookahead and FIRST sets.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TerminalSet {
    inner: bit_set::BitSet,
}

impl TerminalSet {
    pub fn contains(&self, id: TerminalID) -> bool {
        self.inner.contains(id.into_raw().into())
    }

    pub fn insert(&mut self, id: TerminalID) -> bool {
        self.inner.insert(id.into_raw().into())
    }

    /// Add all elements of `other`, returning whether this set has grown.
    pub fn union_with(&mut self, other: &Self) -> bool {
        if self.inner.is_superset(&other.inner) {
            return false;
        }
        self.inner.union_with(&other.inner);
        true
    }

    pub fn is_superset(&self, other: &Self) -> bool {
        self.inner.is_superset(&other.inner)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = TerminalID> + '_ {
        self.inner.iter().map(|raw| TerminalID::from_raw(raw as u16))
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            f.write_str("[")?;
            crate::util::write_joined(f, self.iter().map(|t| &g.terminals[&t]), " ")?;
            f.write_str("]")
        })
    }
}

impl FromIterator<TerminalID> for TerminalSet {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = TerminalID>,
    {
        Self {
            inner: iter.into_iter().map(|t| t.into_raw().into()).collect(),
        }
    }
}

#[derive(Debug)]
pub struct Terminal {
    id: TerminalID,
    name: String,
    precedence: Option<Precedence>,
    value_type: Option<String>,
}

impl Terminal {
    pub fn id(&self) -> TerminalID {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn precedence(&self) -> Option<Precedence> {
        self.precedence
    }

    pub fn value_type(&self) -> Option<&str> {
        self.value_type.as_deref()
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug)]
pub struct Nonterminal {
    id: NonterminalID,
    name: String,
    value_type: Option<String>,
}

impl Nonterminal {
    pub fn id(&self) -> NonterminalID {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> Option<&str> {
        self.value_type.as_deref()
    }
}

impl fmt::Display for Nonterminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A production rule in the grammar.
#[derive(Debug)]
pub struct Production {
    id: ProductionID,
    left: NonterminalID,
    right: Vec<SymbolID>,
    // `Some` when the rule names its precedence terminal explicitly, even if
    // that terminal has no precedence of its own.
    precedence: Option<Option<Precedence>>,
}

impl Production {
    pub fn id(&self) -> ProductionID {
        self.id
    }

    /// Return the left-hand side of this production.
    pub fn left(&self) -> NonterminalID {
        self.left
    }

    /// Return the right-hand side of this production.
    pub fn right(&self) -> &[SymbolID] {
        &self.right[..]
    }

    /// The effective precedence used for shift/reduce resolution.
    ///
    /// An explicit override wins, even when the terminal it names has no
    /// precedence; otherwise the precedence of the rightmost terminal on the
    /// right-hand side is used.
    pub fn precedence(&self, g: &Grammar) -> Option<Precedence> {
        if let Some(prec) = self.precedence {
            return prec;
        }
        self.right.iter().rev().find_map(|symbol| match symbol {
            SymbolID::T(t) => Some(g.terminals[t].precedence()),
            SymbolID::N(..) => None,
        })?
    }

    // `"LHS -> R1 R2 R3"`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            write!(f, "{} ->", g.nonterminals[&self.left])?;
            if self.right.is_empty() {
                return f.write_str(" ε");
            }
            for symbol in &self.right {
                write!(f, " {}", g.symbol(*symbol))?;
            }
            Ok(())
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Precedence {
    /// Binding strength; a larger level binds tighter.
    pub level: u16,
    pub assoc: Assoc,
}

impl Precedence {
    pub const fn new(level: u16, assoc: Assoc) -> Self {
        Self { level, assoc }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
    Nonassoc,
}

impl fmt::Display for Assoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
            Self::Nonassoc => f.write_str("nonassoc"),
        }
    }
}

/// The validated grammar used to derive the parser tables.
#[derive(Debug)]
#[non_exhaustive]
pub struct Grammar {
    pub terminals: Map<TerminalID, Terminal>,
    pub nonterminals: Map<NonterminalID, Nonterminal>,
    pub productions: Map<ProductionID, Production>,
    pub start_symbol: NonterminalID,
    alternatives: Map<NonterminalID, Vec<ProductionID>>,
}

impl Grammar {
    /// Define a grammar using the specified function.
    ///
    /// Symbols are referenced by name and resolved once the function
    /// returns, so declarations and productions may appear in any order.
    pub fn define<F>(f: F) -> Result<Self, GrammarError>
    where
        F: FnOnce(&mut GrammarDef) -> Result<(), GrammarError>,
    {
        let mut def = GrammarDef::default();
        f(&mut def)?;
        def.end()
    }

    pub fn production(&self, id: ProductionID) -> &Production {
        &self.productions[&id]
    }

    /// Productions whose left-hand side is `n`, in declaration order.
    pub fn alternatives(&self, n: NonterminalID) -> &[ProductionID] {
        self.alternatives.get(&n).map_or(&[], |ps| &ps[..])
    }

    pub fn terminal_by_name(&self, name: &str) -> Option<TerminalID> {
        self.terminals
            .values()
            .find(|t| t.name == name)
            .map(|t| t.id)
    }

    pub fn nonterminal_by_name(&self, name: &str) -> Option<NonterminalID> {
        self.nonterminals
            .values()
            .find(|n| n.name == name)
            .map(|n| n.id)
    }

    pub fn symbol(&self, symbol: SymbolID) -> &str {
        match symbol {
            SymbolID::T(t) => &self.terminals[&t].name,
            SymbolID::N(n) => &self.nonterminals[&n].name,
        }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## terminals:")?;
        for terminal in self.terminals.values() {
            write!(f, "{}", terminal)?;
            if let Some(ty) = terminal.value_type() {
                write!(f, " <{}>", ty)?;
            }
            if let Some(prec) = terminal.precedence() {
                write!(f, " (level={}, assoc={})", prec.level, prec.assoc)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "\n## nonterminals:")?;
        for nonterminal in self.nonterminals.values() {
            write!(f, "{}", nonterminal)?;
            if let Some(ty) = nonterminal.value_type() {
                write!(f, " <{}>", ty)?;
            }
            if nonterminal.id() == self.start_symbol {
                write!(f, " (start)")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "\n## productions:")?;
        for production in self.productions.values() {
            write!(f, "{:>3}: {}", production.id, production.display(self))?;
            if let Some(Some(prec)) = &production.precedence {
                write!(f, " (level={}, assoc={})", prec.level, prec.assoc)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[derive(Debug)]
struct RuleDesc {
    id: ProductionID,
    left: String,
    right: Vec<String>,
    prec: Option<String>,
}

/// The contextual values for building a `Grammar`.
#[derive(Debug)]
pub struct GrammarDef {
    symbols: Map<String, SymbolID>,
    terminals: Map<TerminalID, Terminal>,
    nonterminals: Map<NonterminalID, Nonterminal>,
    precedences: Map<String, Precedence>,
    value_types: Map<String, String>,
    rules: Vec<RuleDesc>,
    rule_ids: Map<(String, Vec<String>), ProductionID>,
    start: Option<String>,
    num_levels: usize,
}

impl Default for GrammarDef {
    fn default() -> Self {
        let mut def = Self {
            symbols: Map::default(),
            terminals: Map::default(),
            nonterminals: Map::default(),
            precedences: Map::default(),
            value_types: Map::default(),
            rules: vec![],
            rule_ids: Map::default(),
            start: None,
            num_levels: 0,
        };

        def.terminals.insert(
            TerminalID::EOI,
            Terminal {
                id: TerminalID::EOI,
                name: "$end".into(),
                precedence: None,
                value_type: None,
            },
        );
        def.nonterminals.insert(
            NonterminalID::START,
            Nonterminal {
                id: NonterminalID::START,
                name: "$start".into(),
                value_type: None,
            },
        );

        def
    }
}

impl GrammarDef {
    /// Declare a terminal symbol used in this grammar.
    pub fn terminal(&mut self, name: &str) -> Result<TerminalID, GrammarError> {
        self.check_new_name(name)?;
        // `$end` occupies the slot before the first user terminal.
        let raw = raw_id(TerminalID::OFFSET, self.terminals.len() - 1)
            .ok_or_else(|| GrammarError::TooManySymbols { name: name.into() })?;
        let id = TerminalID::from_raw(raw);
        self.symbols.insert(name.to_owned(), SymbolID::T(id));
        self.terminals.insert(
            id,
            Terminal {
                id,
                name: name.to_owned(),
                precedence: None,
                value_type: None,
            },
        );
        Ok(id)
    }

    /// Declare a nonterminal symbol used in this grammar.
    pub fn nonterminal(&mut self, name: &str) -> Result<NonterminalID, GrammarError> {
        self.check_new_name(name)?;
        let raw = raw_id(NonterminalID::OFFSET, self.nonterminals.len() - 1)
            .ok_or_else(|| GrammarError::TooManySymbols { name: name.into() })?;
        let id = NonterminalID::from_raw(raw);
        self.symbols.insert(name.to_owned(), SymbolID::N(id));
        self.nonterminals.insert(
            id,
            Nonterminal {
                id,
                name: name.to_owned(),
                value_type: None,
            },
        );
        Ok(id)
    }

    /// Declare one precedence level shared by the named terminals.
    ///
    /// Each call binds tighter than all previous calls.
    pub fn precedence(&mut self, assoc: Assoc, terminals: &[&str]) -> Result<(), GrammarError> {
        let level =
            u16::try_from(self.num_levels).map_err(|_| GrammarError::TooManyPrecedenceLevels)?;
        self.num_levels += 1;
        let prec = Precedence::new(level, assoc);
        for &name in terminals {
            if self.precedences.insert(name.to_owned(), prec).is_some() {
                return Err(GrammarError::DuplicatePrecedence { name: name.into() });
            }
        }
        Ok(())
    }

    /// Attach a semantic value type tag to a symbol.
    ///
    /// The symbol may be declared later; an unknown name is reported when
    /// the definition ends. Each symbol takes at most one tag.
    pub fn value_type(&mut self, symbol: &str, tag: &str) -> Result<(), GrammarError> {
        if self.value_types.contains_key(symbol) {
            return Err(GrammarError::DuplicateValueType {
                name: symbol.into(),
            });
        }
        self.value_types.insert(symbol.to_owned(), tag.to_owned());
        Ok(())
    }

    /// Specify a production rule in this grammar.
    pub fn rule(&mut self, left: &str, right: &[&str]) -> Result<ProductionID, GrammarError> {
        self.push_rule(left, right, None)
    }

    /// Specify a production rule whose precedence is borrowed from the
    /// terminal `prec`.
    pub fn rule_with_prec(
        &mut self,
        left: &str,
        right: &[&str],
        prec: &str,
    ) -> Result<ProductionID, GrammarError> {
        self.push_rule(left, right, Some(prec))
    }

    /// Specify the start symbol for this grammar.
    ///
    /// The first declared nonterminal is used when not specified, and a later
    /// call replaces an earlier one. The name is resolved when the definition
    /// ends, failing with `UndefinedStartSymbol` if it is not a nonterminal.
    pub fn start_symbol(&mut self, name: &str) -> Result<(), GrammarError> {
        self.start.replace(name.to_owned());
        Ok(())
    }

    fn check_new_name(&self, name: &str) -> Result<(), GrammarError> {
        if name.chars().any(char::is_whitespace) {
            return Err(GrammarError::InvalidName { name: name.into() });
        }
        if name.is_empty() || name.starts_with('$') {
            return Err(GrammarError::ReservedName { name: name.into() });
        }
        if self.symbols.contains_key(name) {
            return Err(GrammarError::DuplicateSymbol { name: name.into() });
        }
        Ok(())
    }

    fn push_rule(
        &mut self,
        left: &str,
        right: &[&str],
        prec: Option<&str>,
    ) -> Result<ProductionID, GrammarError> {
        let id = raw_id(ProductionID::OFFSET, self.rules.len())
            .map(ProductionID::from_raw)
            .ok_or(GrammarError::TooManyProductions)?;
        // the dot position of an item must fit alongside the production
        if u16::try_from(right.len()).is_err() {
            return Err(GrammarError::ProductionTooLong { production: id });
        }

        let key = (
            left.to_owned(),
            right.iter().map(|s| (*s).to_owned()).collect::<Vec<_>>(),
        );
        if let Some(previous) = self.rule_ids.get(&key) {
            return Err(GrammarError::DuplicateProduction {
                production: id,
                previous: *previous,
            });
        }
        self.rules.push(RuleDesc {
            id,
            left: key.0.clone(),
            right: key.1.clone(),
            prec: prec.map(ToOwned::to_owned),
        });
        self.rule_ids.insert(key, id);
        Ok(id)
    }

    fn end(mut self) -> Result<Grammar, GrammarError> {
        let start = match self.start.take() {
            Some(name) => match self.symbols.get(&name) {
                Some(SymbolID::N(n)) => *n,
                _ => return Err(GrammarError::UndefinedStartSymbol { name }),
            },
            None => self
                .nonterminals
                .keys()
                .find(|id| **id != NonterminalID::START)
                .copied()
                .ok_or(GrammarError::MissingStartSymbol)?,
        };

        for (name, prec) in &self.precedences {
            match self.symbols.get(name) {
                Some(SymbolID::T(t)) => self.terminals[t].precedence = Some(*prec),
                _ => return Err(GrammarError::UnknownPrecedenceSymbol { name: name.clone() }),
            }
        }

        for (name, tag) in &self.value_types {
            match self.symbols.get(name) {
                Some(SymbolID::T(t)) => self.terminals[t].value_type = Some(tag.clone()),
                Some(SymbolID::N(n)) => self.nonterminals[n].value_type = Some(tag.clone()),
                None => return Err(GrammarError::UnknownSymbol { name: name.clone() }),
            }
        }

        let mut productions = Map::default();
        productions.insert(
            ProductionID::ACCEPT,
            Production {
                id: ProductionID::ACCEPT,
                left: NonterminalID::START,
                right: vec![SymbolID::N(start), SymbolID::T(TerminalID::EOI)],
                precedence: None,
            },
        );

        for rule in &self.rules {
            let id = rule.id;
            let left = match self.symbols.get(&rule.left) {
                Some(SymbolID::N(n)) => *n,
                Some(SymbolID::T(..)) => {
                    return Err(GrammarError::TerminalOnLeft {
                        name: rule.left.clone(),
                        production: id,
                    })
                }
                None => {
                    return Err(GrammarError::UndeclaredLeft {
                        name: rule.left.clone(),
                        production: id,
                    })
                }
            };

            let mut right = Vec::with_capacity(rule.right.len());
            for name in &rule.right {
                let symbol = self.symbols.get(name).copied().ok_or_else(|| {
                    GrammarError::UndeclaredSymbol {
                        name: name.clone(),
                        production: id,
                    }
                })?;
                right.push(symbol);
            }

            let precedence = match &rule.prec {
                Some(name) => match self.symbols.get(name) {
                    Some(SymbolID::T(t)) => Some(self.terminals[t].precedence),
                    _ => return Err(GrammarError::UnknownPrecedenceSymbol { name: name.clone() }),
                },
                None => None,
            };

            productions.insert(
                id,
                Production {
                    id,
                    left,
                    right,
                    precedence,
                },
            );
        }

        let mut alternatives = Map::<NonterminalID, Vec<ProductionID>>::default();
        for production in productions.values() {
            alternatives
                .entry(production.left)
                .or_default()
                .push(production.id);
        }

        if let Some(empty) = self
            .nonterminals
            .values()
            .find(|n| !alternatives.contains_key(&n.id))
        {
            return Err(GrammarError::NoProductions {
                name: empty.name.clone(),
            });
        }

        Ok(Grammar {
            terminals: self.terminals,
            nonterminals: self.nonterminals,
            productions,
            start_symbol: start,
            alternatives,
        })
    }
}

/// Errors detected while loading a grammar. All of them are fatal.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GrammarError {
    #[error("undeclared symbol `{name}' in production #{production}")]
    UndeclaredSymbol {
        name: String,
        production: ProductionID,
    },

    #[error("undeclared left-hand side `{name}' in production #{production}")]
    UndeclaredLeft {
        name: String,
        production: ProductionID,
    },

    #[error("the terminal `{name}' cannot be the left-hand side of production #{production}")]
    TerminalOnLeft {
        name: String,
        production: ProductionID,
    },

    #[error("the grammar has no nonterminal to start from")]
    MissingStartSymbol,

    #[error("the start symbol `{name}' is not a declared nonterminal")]
    UndefinedStartSymbol { name: String },

    #[error("the nonterminal `{name}' has no productions")]
    NoProductions { name: String },

    #[error("the symbol `{name}' has already been declared")]
    DuplicateSymbol { name: String },

    #[error("production #{production} duplicates production #{previous}")]
    DuplicateProduction {
        production: ProductionID,
        previous: ProductionID,
    },

    #[error("the symbol name `{name}' is reserved")]
    ReservedName { name: String },

    #[error("invalid symbol name: {name:?}")]
    InvalidName { name: String },

    #[error("the precedence of `{name}' is declared twice")]
    DuplicatePrecedence { name: String },

    #[error("precedence refers to `{name}', which is not a declared terminal")]
    UnknownPrecedenceSymbol { name: String },

    #[error("unknown symbol `{name}'")]
    UnknownSymbol { name: String },

    #[error("the value type of `{name}' is declared twice")]
    DuplicateValueType { name: String },

    #[error("too many symbols: cannot declare `{name}'")]
    TooManySymbols { name: String },

    #[error("too many productions")]
    TooManyProductions,

    #[error("the right-hand side of production #{production} is too long")]
    ProductionTooLong { production: ProductionID },

    #[error("too many precedence levels")]
    TooManyPrecedenceLevels,
}

/// The raw ID of the `index`-th user-defined entry, numbered after `offset`
/// reserved ones.
fn raw_id(offset: u16, index: usize) -> Option<u16> {
    u16::try_from(index).ok()?.checked_add(offset)
}
