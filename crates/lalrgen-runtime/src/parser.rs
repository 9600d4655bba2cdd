//! Parser.

use crate::definition::{ParseAction, ParseActionError, ParseTable};
use std::fmt;

/// A trait for abstracting token symbols.
pub trait Token<TSym> {
    fn as_symbol(&self) -> TSym;
}

/// The parser driven by a parse table.
#[derive(Debug)]
pub struct Parser<TDef, TTok>
where
    TDef: ParseTable,
    TTok: Token<TDef::Symbol>,
{
    definition: TDef,
    state_stack: Vec<TDef::State>,
    item_stack: Vec<ParseItem<TTok, TDef::Symbol>>,
    parser_state: ParserState,
    peeked_token: Option<TTok>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum ParserState {
    Reading,
    PendingGoto,
    Accepted,
}

impl<TDef, TTok> Parser<TDef, TTok>
where
    TDef: ParseTable,
    TTok: Token<TDef::Symbol>,
{
    /// Create an instance of `Parser` using the specified parse table.
    pub fn new(definition: TDef) -> Self {
        let initial_state = definition.initial_state();
        Self {
            definition,
            state_stack: vec![initial_state],
            item_stack: vec![],
            parser_state: ParserState::Reading,
            peeked_token: None,
        }
    }

    /// Return the current state on top of the state stack.
    pub fn current_state(&self) -> Option<TDef::State> {
        self.state_stack.last().copied()
    }

    /// Return the terminal symbols acceptable in the current state.
    pub fn expected(&self) -> Vec<TDef::Symbol> {
        self.current_state()
            .map_or_else(Vec::new, |current| self.definition.expected(current))
    }

    /// Consume some tokens and drive the state machine
    /// until it matches a certain production rule.
    ///
    /// On `ParseEvent::Reduce`, `args` holds the right-hand side items of the
    /// reduced production. On `ParseEvent::Accept`, it holds the single
    /// item of the start symbol.
    pub fn next_event<I, E>(
        &mut self,
        tokens: &mut I,
        args: &mut Vec<ParseItem<TTok, TDef::Symbol>>,
    ) -> Result<ParseEvent<TDef>, ParseError<E>>
    where
        I: Iterator<Item = Result<TTok, E>>,
        E: fmt::Display,
    {
        if self.parser_state == ParserState::Accepted {
            return Err(ParseError::AlreadyAccepted);
        }

        loop {
            let current = *self
                .state_stack
                .last()
                .ok_or_else(|| ParseError::EmptyStateStack)?;

            let input = match self.parser_state {
                ParserState::PendingGoto => match self
                    .item_stack
                    .last()
                    .ok_or_else(|| ParseError::EmptyItemStack)?
                {
                    ParseItem::N(s) => Some(*s),
                    ParseItem::T(t) => Some(t.as_symbol()),
                },
                _ => {
                    if self.peeked_token.is_none() {
                        self.peeked_token = tokens.next().transpose().map_err(ParseError::Lexer)?;
                    }
                    self.peeked_token.as_ref().map(|t| t.as_symbol())
                }
            };

            match self.definition.action(current, input) {
                ParseAction::Shift(next) => {
                    if self.parser_state != ParserState::PendingGoto {
                        let t = self
                            .peeked_token
                            .take()
                            .ok_or_else(|| ParseError::UnexpectedEOI)?;
                        self.item_stack.push(ParseItem::T(t));
                    }
                    self.parser_state = ParserState::Reading;
                    self.state_stack.push(next);
                }

                ParseAction::Reduce(reduce, lhs, n) => {
                    if self.item_stack.len() < n || self.state_stack.len() <= n {
                        return Err(ParseError::EmptyItemStack);
                    }
                    args.clear();
                    args.extend(self.item_stack.drain(self.item_stack.len() - n..));
                    self.state_stack.truncate(self.state_stack.len() - n);

                    self.item_stack.push(ParseItem::N(lhs));
                    self.parser_state = ParserState::PendingGoto;

                    return Ok(ParseEvent::Reduce(reduce));
                }

                ParseAction::Accept => {
                    let arg = self
                        .item_stack
                        .pop()
                        .ok_or_else(|| ParseError::EmptyItemStack)?;
                    args.clear();
                    args.push(arg);

                    self.parser_state = ParserState::Accepted;
                    return Ok(ParseEvent::Accept);
                }

                ParseAction::Error(err) => return Err(ParseError::Syntax(err)),
            }
        }
    }
}

#[derive(Debug)]
#[non_exhaustive]
pub enum ParseItem<TTok, TSym> {
    T(TTok),
    N(TSym),
}

#[derive(Debug)]
pub enum ParseEvent<TDef>
where
    TDef: ParseTable,
{
    Reduce(TDef::Reduce),
    Accept,
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError<L: fmt::Display> {
    #[error("from lexer: {}", _0)]
    Lexer(L),

    #[error("syntax error: {}", _0)]
    Syntax(ParseActionError),

    #[error("unexpected end of input")]
    UnexpectedEOI,

    #[error("the input has already been accepted")]
    AlreadyAccepted,

    #[error("empty state stack")]
    EmptyStateStack,

    #[error("empty item stack")]
    EmptyItemStack,
}
