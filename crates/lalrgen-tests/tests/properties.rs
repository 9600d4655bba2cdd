use lalrgen::{
    automaton::{self, Automaton},
    diagnostics::Diagnostic,
    first_sets::FirstSets,
    grammar::{Grammar, GrammarDef, GrammarError, ProductionID, SymbolID, TerminalID, TerminalSet},
    item::ItemCore,
    lookahead,
    report,
    runtime::TableDef,
    state::StateID,
    table::{Action, ConflictKind, Justification},
    types::Set,
    Config,
};
use lalrgen_runtime::parser::{ParseEvent, ParseItem, Parser, Token};
use lalrgen_tests::grammars;
use std::convert::Infallible;

type Def = fn(&mut GrammarDef) -> Result<(), GrammarError>;

const ALL: &[Def] = &[
    grammars::g_simple1,
    grammars::g_simple2,
    grammars::g1,
    grammars::g2,
    grammars::g4,
    grammars::ambiguous_expr,
    grammars::unreachable_rule,
    grammars::reduce_reduce,
    grammars::min_caml,
];

fn define(f: Def) -> Grammar {
    Grammar::define(f).unwrap()
}

#[test]
fn generation_is_deterministic() {
    for f in ALL {
        let g1 = define(*f);
        let g2 = define(*f);
        let out1 = lalrgen::generate(&g1);
        let out2 = lalrgen::generate(&g2);
        assert_eq!(
            report::listing(&g1, &out1).to_string(),
            report::listing(&g2, &out2).to_string()
        );
        assert_eq!(out1.table.conflicts, out2.table.conflicts);
        assert_eq!(out1.diagnostics, out2.diagnostics);
    }
}

#[test]
fn states_are_bounded_by_distinct_kernels() {
    for f in ALL {
        let g = define(*f);
        let automaton = Automaton::build(&g);

        let kernels: Set<Vec<ItemCore>> = automaton
            .states()
            .map(|s| automaton.kernel_cores(s.id()))
            .collect();
        assert_eq!(kernels.len(), automaton.num_states());

        // every state but the initial one is the target of a transition
        let mut reached: Set<StateID> = Set::default();
        reached.insert(StateID::INITIAL);
        for state in automaton.states() {
            reached.extend(state.transitions().values().copied());
        }
        assert_eq!(reached.len(), automaton.num_states());
    }
}

#[test]
fn closure_is_sound() {
    for f in ALL {
        let g = define(*f);
        let automaton = Automaton::build(&g);
        for state in automaton.states() {
            let cores: Vec<ItemCore> = state
                .items()
                .iter()
                .map(|id| automaton.item(*id).core)
                .collect();
            for core in &cores {
                if let Some(SymbolID::N(n)) = core.next_symbol(&g) {
                    for p in g.alternatives(n) {
                        assert!(
                            cores.contains(&ItemCore::new(*p, 0)),
                            "state {} lacks {}",
                            state.id(),
                            ItemCore::new(*p, 0).display(&g)
                        );
                    }
                }
            }
            // closure of the kernel reproduces the whole item list
            assert_eq!(
                automaton::closure(&g, &automaton.kernel_cores(state.id())),
                cores
            );
        }
    }
}

#[test]
fn propagation_is_monotone_and_bounded() {
    for f in ALL {
        let g = define(*f);
        let first_sets = FirstSets::new(&g);
        let mut automaton = Automaton::build(&g);

        let mut previous: Option<Vec<TerminalSet>> = None;
        let stats = lookahead::propagate_with(&g, &mut automaton, &first_sets, |automaton| {
            let current: Vec<TerminalSet> = automaton
                .states()
                .flat_map(|s| s.items().iter())
                .map(|id| automaton.item(*id).lookaheads.clone())
                .collect();
            if let Some(previous) = &previous {
                for (before, after) in previous.iter().zip(&current) {
                    assert!(after.is_superset(before));
                }
            }
            previous = Some(current);
        });

        assert!(stats.passes <= automaton.num_items() * g.terminals.len() + 1);
    }
}

#[test]
fn state_ids_past_u16_stay_distinct() {
    // 700 chains of 101 states each, well beyond 65,536 states
    let g = Grammar::define(|g| {
        g.terminal("b")?;
        g.nonterminal("S")?;
        let tail = vec!["b"; 100];
        for i in 0..700 {
            let a = format!("a{}", i);
            g.terminal(&a)?;
            let mut right = vec![a.as_str()];
            right.extend_from_slice(&tail);
            g.rule("S", &right)?;
        }
        Ok(())
    })
    .unwrap();

    let automaton = Automaton::build(&g);
    assert_eq!(automaton.num_states(), 2 + 700 * 101);
    for (index, state) in automaton.states().enumerate() {
        assert_eq!(state.id().into_raw() as usize, index);
    }

    let kernels: Set<Vec<ItemCore>> = automaton
        .states()
        .map(|s| automaton.kernel_cores(s.id()))
        .collect();
    assert_eq!(kernels.len(), automaton.num_states());
}

#[derive(Debug)]
struct Tok(SymbolID, String);

impl Token<SymbolID> for Tok {
    fn as_symbol(&self) -> SymbolID {
        self.0
    }
}

fn parse_tree(g: &Grammar, config: &Config, input: &str) -> String {
    let output = config.generate(g);
    let mut parser = Parser::new(TableDef::new(g, &output.table));
    let mut tokens = input.split_whitespace().map(|w| {
        let t = g.terminal_by_name(w).unwrap();
        Ok::<_, Infallible>(Tok(SymbolID::T(t), w.to_owned()))
    });

    let mut args = vec![];
    let mut nodes: Vec<String> = vec![];
    loop {
        match parser.next_event(&mut tokens, &mut args).unwrap() {
            ParseEvent::Reduce(_) => {
                let n = args
                    .iter()
                    .filter(|a| matches!(a, ParseItem::N(..)))
                    .count();
                let mut children = nodes.split_off(nodes.len() - n).into_iter();
                let parts: Vec<String> = args
                    .iter()
                    .map(|a| match a {
                        ParseItem::T(Tok(_, text)) => text.clone(),
                        _ => children.next().unwrap(),
                    })
                    .collect();
                nodes.push(if parts.len() == 1 {
                    parts[0].clone()
                } else {
                    format!("({})", parts.join(" "))
                });
            }
            ParseEvent::Accept => return nodes.pop().unwrap(),
        }
    }
}

#[test]
fn precedence_resolves_expression_trees() {
    let g = define(grammars::ambiguous_expr);
    for config in [Config::new(), Config::new().default_reductions(false)] {
        assert_eq!(parse_tree(&g, &config, "id + id * id"), "(id + (id * id))");
        assert_eq!(parse_tree(&g, &config, "id * id + id"), "((id * id) + id)");
        assert_eq!(parse_tree(&g, &config, "id + id + id"), "((id + id) + id)");
    }

    let output = lalrgen::generate(&g);
    assert!(output.unresolved_conflicts().next().is_none());
    let star = g.terminal_by_name("*").unwrap();
    assert!(output.table.conflicts.iter().any(|c| {
        c.lookahead == star
            && c.actions.contains(&Action::Reduce(ProductionID::from_raw(1)))
            && c.justification == Justification::ShiftHigherPrecedence
    }));
}

#[test]
fn first_declared_reduction_wins() {
    let g = define(grammars::reduce_reduce);
    let output = lalrgen::generate(&g);

    let conflicts: Vec<_> = output.unresolved_conflicts().collect();
    assert_eq!(conflicts.len(), 1);
    let conflict = conflicts[0];
    assert_eq!(conflict.kind, ConflictKind::ReduceReduce);
    assert_eq!(conflict.lookahead, TerminalID::EOI);
    assert_eq!(
        conflict.actions,
        [
            Action::Reduce(ProductionID::from_raw(3)),
            Action::Reduce(ProductionID::from_raw(4)),
        ]
    );
    assert_eq!(
        output.table.action(conflict.state, TerminalID::EOI),
        Action::Reduce(ProductionID::from_raw(3))
    );
    assert!(matches!(output.diagnostics[0], Diagnostic::Conflict(..)));
}

#[test]
fn unreachable_rule_is_dead() {
    let g = define(grammars::unreachable_rule);
    let output = lalrgen::generate(&g);

    let dead: Vec<_> = output
        .diagnostics
        .iter()
        .filter_map(|d| match d {
            Diagnostic::DeadProduction(p) => Some(p.into_raw()),
            _ => None,
        })
        .collect();
    assert_eq!(dead, [3, 4]);

    // `b` only occurs in the dead productions, so it is still "used".
    assert!(!output
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::UnusedTerminal(..))));
}
