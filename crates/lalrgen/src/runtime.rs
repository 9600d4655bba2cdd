//! Driving `lalrgen_runtime` with a generated table.

use crate::{
    grammar::{Grammar, ProductionID, SymbolID, TerminalID},
    state::StateID,
    table::{Action, ParseTable},
};
use lalrgen_runtime::definition::{self, ParseAction, ParseActionError};

/// A generated table, paired with its grammar so that reductions can
/// report their left-hand side and length.
#[derive(Debug, Copy, Clone)]
pub struct TableDef<'a> {
    grammar: &'a Grammar,
    table: &'a ParseTable,
}

impl<'a> TableDef<'a> {
    pub fn new(grammar: &'a Grammar, table: &'a ParseTable) -> Self {
        Self { grammar, table }
    }
}

impl definition::ParseTable for TableDef<'_> {
    type State = StateID;
    type Symbol = SymbolID;
    type Reduce = ProductionID;

    fn initial_state(&self) -> StateID {
        StateID::INITIAL
    }

    fn action(
        &self,
        current: StateID,
        lookahead: Option<SymbolID>,
    ) -> ParseAction<StateID, SymbolID, ProductionID> {
        let row = match self.table.states.get(&current) {
            Some(row) => row,
            None => return ParseAction::Error(ParseActionError::IncorrectState),
        };

        let t = match lookahead {
            Some(SymbolID::T(t)) => t,
            None => TerminalID::EOI,
            Some(SymbolID::N(n)) => {
                return match row.gotos.get(&n) {
                    Some(to) => ParseAction::Shift(*to),
                    None => ParseAction::Error(ParseActionError::UnexpectedSymbol),
                };
            }
        };

        match row.action(t) {
            Action::Shift(to) => ParseAction::Shift(to),
            Action::Reduce(p) => {
                let production = self.grammar.production(p);
                ParseAction::Reduce(
                    p,
                    SymbolID::N(production.left()),
                    production.right().len(),
                )
            }
            Action::Accept => ParseAction::Accept,
            Action::Error => ParseAction::Error(ParseActionError::UnexpectedSymbol),
        }
    }

    fn expected(&self, current: StateID) -> Vec<SymbolID> {
        self.table
            .states
            .get(&current)
            .map(|row| {
                row.actions
                    .iter()
                    .filter(|(_, action)| **action != Action::Error)
                    .map(|(t, _)| SymbolID::T(*t))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{generate, samples, Config};
    use lalrgen_runtime::parser::{ParseError, ParseEvent, ParseItem, Parser, Token};
    use std::convert::Infallible;

    #[derive(Debug)]
    struct Tok {
        symbol: SymbolID,
        text: String,
    }

    impl Token<SymbolID> for Tok {
        fn as_symbol(&self) -> SymbolID {
            self.symbol
        }
    }

    fn lex(g: &Grammar, input: &str) -> Vec<Tok> {
        input
            .split_whitespace()
            .map(|word| {
                let name = if word.parse::<i64>().is_ok() { "NUM" } else { word };
                Tok {
                    symbol: SymbolID::T(g.terminal_by_name(name).unwrap()),
                    text: word.to_owned(),
                }
            })
            .collect()
    }

    /// Parse `input` and render the tree with explicit parentheses.
    fn parse(g: &Grammar, table: &ParseTable, input: &str) -> Result<String, ParseError<Infallible>> {
        let mut parser = Parser::new(TableDef::new(g, table));
        let mut tokens = lex(g, input).into_iter().map(Ok);
        let mut args = vec![];
        let mut nodes: Vec<String> = vec![];
        loop {
            match parser.next_event(&mut tokens, &mut args)? {
                ParseEvent::Reduce(_) => {
                    let n = args.iter().filter(|a| matches!(a, ParseItem::N(..))).count();
                    let mut children = nodes.split_off(nodes.len() - n).into_iter();
                    let parts: Vec<String> = args
                        .iter()
                        .map(|arg| match arg {
                            ParseItem::T(tok) => tok.text.clone(),
                            _ => children.next().unwrap(),
                        })
                        .collect();
                    nodes.push(match &parts[..] {
                        [single] => single.clone(),
                        parts => format!("({})", parts.join(" ")),
                    });
                }
                ParseEvent::Accept => return Ok(nodes.pop().unwrap()),
            }
        }
    }

    #[test]
    fn precedence_shapes_the_tree() {
        let g = Grammar::define(samples::arithmetic_prec).unwrap();
        let output = generate(&g);
        let table = &output.table;

        assert_eq!(parse(&g, table, "1 + 2 * 3").unwrap(), "(1 + (2 * 3))");
        assert_eq!(parse(&g, table, "1 * 2 + 3").unwrap(), "((1 * 2) + 3)");
        assert_eq!(parse(&g, table, "1 + 2 + 3").unwrap(), "((1 + 2) + 3)");
        assert_eq!(parse(&g, table, "- 1 * 2").unwrap(), "((- 1) * 2)");
    }

    #[test]
    fn syntax_errors_are_reported() {
        let g = Grammar::define(samples::arithmetic_prec).unwrap();
        let output = generate(&g);
        assert!(matches!(
            parse(&g, &output.table, "1 + + 2"),
            Err(ParseError::Syntax(ParseActionError::UnexpectedSymbol))
        ));
    }

    #[test]
    fn works_without_default_reductions() {
        let g = Grammar::define(samples::arithmetic).unwrap();
        let output = Config::new().default_reductions(false).generate(&g);
        assert_eq!(
            parse(&g, &output.table, "1 - 2 - 3").unwrap(),
            "((1 - 2) - 3)"
        );
    }
}
