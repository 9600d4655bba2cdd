//! Parse table abstraction.

/// The trait for abstracting an LR(1) parse table.
pub trait ParseTable {
    /// The number to identify the state of LR(1) automaton.
    type State: Copy;

    /// The number to identify the terminal/nonterminal symbols.
    type Symbol: Copy;

    /// The context value corresponding to the matched production rule.
    type Reduce: Copy;

    /// Return the initial state number.
    fn initial_state(&self) -> Self::State;

    /// Return the action corresponding to the specified state number and
    /// lookahead symbol.
    ///
    /// A `None` is passed as the end of input. Nonterminal symbols are passed
    /// right after a reduction, and the table answers with the goto target
    /// as a `Shift`.
    fn action(
        &self,
        current: Self::State,
        lookahead: Option<Self::Symbol>,
    ) -> ParseAction<Self::State, Self::Symbol, Self::Reduce>;

    /// Return the terminal symbols that have an explicit action in the state.
    fn expected(&self, current: Self::State) -> Vec<Self::Symbol>;
}

#[derive(Debug, Copy, Clone, PartialEq)]
#[non_exhaustive]
pub enum ParseAction<TState, TSymbol, TReduce> {
    /// Push the lookahead symbol and move to the state.
    Shift(TState),
    /// Pop `n` items, then push the left-hand symbol.
    Reduce(TReduce, TSymbol, usize),
    Accept,
    Error(ParseActionError),
}

#[derive(Debug, Copy, Clone, PartialEq, thiserror::Error)]
pub enum ParseActionError {
    #[error("incorrect state")]
    IncorrectState,

    #[error("unexpected symbol")]
    UnexpectedSymbol,
}
