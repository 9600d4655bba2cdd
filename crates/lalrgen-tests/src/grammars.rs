//! Grammar definitions for integration tests and benchmarks.

use lalrgen::grammar::{Assoc, GrammarDef, GrammarError};

type Result = std::result::Result<(), GrammarError>;

fn terminals(g: &mut GrammarDef, names: &[&str]) -> Result {
    for name in names {
        g.terminal(name)?;
    }
    Ok(())
}

fn nonterminals(g: &mut GrammarDef, names: &[&str]) -> Result {
    for name in names {
        g.nonterminal(name)?;
    }
    Ok(())
}

/// Add one production per alternative.
fn rules(g: &mut GrammarDef, left: &str, alternatives: &[&[&str]]) -> Result {
    for right in alternatives {
        g.rule(left, right)?;
    }
    Ok(())
}

pub fn g_simple1(g: &mut GrammarDef) -> Result {
    terminals(g, &["EQUAL", "PLUS", "ID", "NUM"])?;
    nonterminals(g, &["A", "E", "T"])?;

    rules(g, "A", &[&["E", "EQUAL", "E"], &["ID"]])?;
    rules(g, "E", &[&["E", "PLUS", "T"], &["T"]])?;
    rules(g, "T", &[&["NUM"], &["ID"]])?;
    Ok(())
}

pub fn g_simple2(g: &mut GrammarDef) -> Result {
    terminals(g, &["LPAREN", "RPAREN", "PLUS", "MINUS", "STAR", "SLASH", "NUM"])?;
    nonterminals(g, &["EXPR", "FACTOR", "TERM"])?;

    rules(
        g,
        "EXPR",
        &[
            &["EXPR", "PLUS", "FACTOR"],  // expr '+' factor
            &["EXPR", "MINUS", "FACTOR"], // expr '-' factor
            &["FACTOR"],
        ],
    )?;
    rules(
        g,
        "FACTOR",
        &[
            &["FACTOR", "STAR", "TERM"],
            &["FACTOR", "SLASH", "TERM"],
            &["TERM"],
        ],
    )?;
    rules(g, "TERM", &[&["NUM"], &["LPAREN", "EXPR", "RPAREN"]])?;
    Ok(())
}

pub fn g1(g: &mut GrammarDef) -> Result {
    terminals(g, &["PLUS", "STAR", "A"])?;
    nonterminals(g, &["E", "T"])?;

    rules(g, "E", &[&["E", "PLUS", "T"], &["T"]])?;
    rules(g, "T", &[&["T", "STAR", "A"], &["A"]])?;
    Ok(())
}

pub fn g2(g: &mut GrammarDef) -> Result {
    terminals(g, &["COMMA", "COLON", "ID"])?;
    nonterminals(
        g,
        &["DEF", "PARAM_SPEC", "RETURN_SPEC", "TYPE", "NAME", "NAME_LIST"],
    )?;

    rules(g, "DEF", &[&["PARAM_SPEC", "RETURN_SPEC", "COMMA"]])?;
    rules(g, "PARAM_SPEC", &[&["TYPE"], &["NAME_LIST", "COLON", "TYPE"]])?;
    rules(g, "RETURN_SPEC", &[&["TYPE"], &["NAME", "COLON", "TYPE"]])?;
    rules(g, "TYPE", &[&["ID"]])?;
    rules(g, "NAME", &[&["ID"]])?;
    rules(g, "NAME_LIST", &[&["NAME"], &["NAME", "COMMA", "NAME_LIST"]])?;
    Ok(())
}

pub fn g4(g: &mut GrammarDef) -> Result {
    // E → E + T | T
    // T → ( E ) | n
    terminals(g, &["PLUS", "LPAREN", "RPAREN", "NUM"])?;
    nonterminals(g, &["E", "T"])?;

    rules(g, "E", &[&["E", "PLUS", "T"], &["T"]])?;
    rules(g, "T", &[&["LPAREN", "E", "RPAREN"], &["NUM"]])?;
    Ok(())
}

/// `E → E + E | E * E | id` with `*` binding tighter, both left-associative.
pub fn ambiguous_expr(g: &mut GrammarDef) -> Result {
    terminals(g, &["+", "*", "id"])?;
    nonterminals(g, &["E"])?;

    g.precedence(Assoc::Left, &["+"])?;
    g.precedence(Assoc::Left, &["*"])?;

    rules(g, "E", &[&["E", "+", "E"], &["E", "*", "E"], &["id"]])?;
    Ok(())
}

/// `U` is declared and defined but never referenced.
pub fn unreachable_rule(g: &mut GrammarDef) -> Result {
    terminals(g, &["a", "b"])?;
    nonterminals(g, &["S", "U"])?;

    rules(g, "S", &[&["a"], &["S", "a"]])?;
    rules(g, "U", &[&["b"], &["U", "b"]])?;
    Ok(())
}

/// `A → x` and `B → x` are both reducible on `$end`.
pub fn reduce_reduce(g: &mut GrammarDef) -> Result {
    terminals(g, &["x"])?;
    nonterminals(g, &["S", "A", "B"])?;

    rules(g, "S", &[&["A"], &["B"]])?;
    rules(g, "A", &[&["x"]])?;
    rules(g, "B", &[&["x"]])?;
    Ok(())
}

pub fn min_caml(g: &mut GrammarDef) -> Result {
    terminals(
        g,
        &[
            "LPAREN",
            "RPAREN",
            "TRUE",
            "FALSE",
            "INTEGER",
            "FLOAT",
            "IDENT",
            "NOT",
            "PLUS",
            "PLUS_DOT",
            "MINUS",
            "MINUS_DOT",
            "STAR_DOT",
            "SLASH_DOT",
            "EQUAL",
            "LESS_GREATER",
            "LESS",
            "GREATER",
            "LESS_EQUAL",
            "GREATER_EQUAL",
            "LESS_MINUS",
            "COMMA",
            "SEMICOLON",
            "IF",
            "THEN",
            "ELSE",
            "LET",
            "REC",
            "IN",
            "ARRAY_MAKE",
            "DOT",
        ],
    )?;
    nonterminals(
        g,
        &[
            "SIMPLE_EXP",
            "APP_EXP",
            "NEG_EXP",
            "MULT_EXP",
            "ADD_EXP",
            "REL_EXP",
            "TUPLE_EXP",
            "PUT_EXP",
            "IF_EXP",
            "LET_EXP",
            "EXPR",
            "FORMAL_ARGS",
            "ACTUAL_ARGS",
            "TUPLE_EXP_REST",
            "FUNDEF",
            "PAT",
        ],
    )?;
    g.start_symbol("EXPR")?;

    rules(
        g,
        "SIMPLE_EXP",
        &[
            &["LPAREN", "EXPR", "RPAREN"],
            &["LPAREN", "RPAREN"],
            &["TRUE"],
            &["FALSE"],
            &["INTEGER"],
            &["FLOAT"],
            &["IDENT"],
            &["SIMPLE_EXP", "DOT", "LPAREN", "EXPR", "RPAREN"],
        ],
    )?;
    rules(
        g,
        "APP_EXP",
        &[
            &["SIMPLE_EXP"],
            &["SIMPLE_EXP", "ACTUAL_ARGS"],
            &["ARRAY_MAKE", "SIMPLE_EXP", "SIMPLE_EXP"],
            &["NOT", "APP_EXP"],
        ],
    )?;
    rules(
        g,
        "NEG_EXP",
        &[
            &["APP_EXP"],
            &["MINUS", "NEG_EXP"],
            &["MINUS_DOT", "NEG_EXP"],
        ],
    )?;
    rules(
        g,
        "MULT_EXP",
        &[
            &["NEG_EXP"],
            &["MULT_EXP", "STAR_DOT", "NEG_EXP"],
            &["MULT_EXP", "SLASH_DOT", "NEG_EXP"],
        ],
    )?;
    rules(
        g,
        "ADD_EXP",
        &[
            &["MULT_EXP"],
            &["ADD_EXP", "PLUS", "MULT_EXP"],
            &["ADD_EXP", "MINUS", "MULT_EXP"],
            &["ADD_EXP", "PLUS_DOT", "MULT_EXP"],
            &["ADD_EXP", "MINUS_DOT", "MULT_EXP"],
        ],
    )?;
    rules(
        g,
        "REL_EXP",
        &[
            &["ADD_EXP"],
            &["REL_EXP", "EQUAL", "ADD_EXP"],
            &["REL_EXP", "LESS_GREATER", "ADD_EXP"],
            &["REL_EXP", "LESS", "ADD_EXP"],
            &["REL_EXP", "GREATER", "ADD_EXP"],
            &["REL_EXP", "LESS_EQUAL", "ADD_EXP"],
            &["REL_EXP", "GREATER_EQUAL", "ADD_EXP"],
        ],
    )?;
    rules(
        g,
        "TUPLE_EXP",
        &[&["REL_EXP"], &["REL_EXP", "COMMA", "TUPLE_EXP_REST"]],
    )?;
    rules(
        g,
        "TUPLE_EXP_REST",
        &[&["REL_EXP"], &["REL_EXP", "COMMA", "TUPLE_EXP_REST"]],
    )?;
    rules(
        g,
        "PUT_EXP",
        &[
            &["TUPLE_EXP"],
            &["SIMPLE_EXP", "DOT", "LPAREN", "EXPR", "RPAREN", "LESS_MINUS", "EXPR"],
        ],
    )?;
    rules(
        g,
        "IF_EXP",
        &[
            &["PUT_EXP"],
            &["IF", "EXPR", "THEN", "EXPR", "ELSE", "EXPR"],
        ],
    )?;
    rules(
        g,
        "LET_EXP",
        &[
            &["LET", "IDENT", "EQUAL", "EXPR", "IN", "EXPR"],
            &["LET", "REC", "FUNDEF", "IN", "EXPR"],
            &["LET", "LPAREN", "PAT", "RPAREN", "EQUAL", "EXPR", "IN", "EXPR"],
        ],
    )?;
    rules(g, "FUNDEF", &[&["IDENT", "FORMAL_ARGS", "EQUAL", "EXPR"]])?;
    rules(g, "FORMAL_ARGS", &[&["IDENT", "FORMAL_ARGS"], &["IDENT"]])?;
    rules(g, "ACTUAL_ARGS", &[&["ACTUAL_ARGS", "SIMPLE_EXP"], &["SIMPLE_EXP"]])?;
    rules(g, "PAT", &[&["PAT", "COMMA", "IDENT"], &["IDENT", "COMMA", "IDENT"]])?;
    rules(
        g,
        "EXPR",
        &[&["IF_EXP"], &["IF_EXP", "SEMICOLON", "EXPR"], &["LET_EXP"]],
    )?;
    Ok(())
}
