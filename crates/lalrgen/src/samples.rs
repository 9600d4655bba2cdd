//! Ready-made grammars, usable with `Grammar::define`.

use crate::grammar::{Assoc, GrammarDef, GrammarError};

pub type Sample = fn(&mut GrammarDef) -> Result<(), GrammarError>;

/// All samples, by name.
pub const ALL: &[(&str, Sample)] = &[
    ("arithmetic", arithmetic),
    ("arithmetic_prec", arithmetic_prec),
    ("with_nullable", with_nullable),
    ("pointer", pointer),
    ("dangling_else", dangling_else),
    ("reduce_reduce", reduce_reduce),
];

pub fn lookup(name: &str) -> Option<Sample> {
    ALL.iter().find(|(n, _)| *n == name).map(|(_, f)| *f)
}

/// Unambiguous expressions, layered by binding strength.
pub fn arithmetic(g: &mut GrammarDef) -> Result<(), GrammarError> {
    for t in ["(", ")", "+", "-", "*", "/", "NUM"] {
        g.terminal(t)?;
    }
    for n in ["expr", "term", "factor", "atom"] {
        g.nonterminal(n)?;
    }

    g.rule("expr", &["expr", "+", "term"])?;
    g.rule("expr", &["expr", "-", "term"])?;
    g.rule("expr", &["term"])?;

    g.rule("term", &["term", "*", "factor"])?;
    g.rule("term", &["term", "/", "factor"])?;
    g.rule("term", &["factor"])?;

    g.rule("factor", &["-", "factor"])?;
    g.rule("factor", &["atom"])?;

    g.rule("atom", &["NUM"])?;
    g.rule("atom", &["(", "expr", ")"])?;
    Ok(())
}

/// Ambiguous expressions disambiguated by precedence declarations.
pub fn arithmetic_prec(g: &mut GrammarDef) -> Result<(), GrammarError> {
    for t in ["(", ")", "+", "-", "*", "/", "NUM", "UMINUS"] {
        g.terminal(t)?;
    }
    g.nonterminal("expr")?;
    g.value_type("NUM", "i64")?;
    g.value_type("expr", "i64")?;

    g.precedence(Assoc::Left, &["+", "-"])?;
    g.precedence(Assoc::Left, &["*", "/"])?;
    g.precedence(Assoc::Right, &["UMINUS"])?;

    g.rule("expr", &["expr", "+", "expr"])?;
    g.rule("expr", &["expr", "-", "expr"])?;
    g.rule("expr", &["expr", "*", "expr"])?;
    g.rule("expr", &["expr", "/", "expr"])?;
    g.rule_with_prec("expr", &["-", "expr"], "UMINUS")?;
    g.rule("expr", &["NUM"])?;
    g.rule("expr", &["(", "expr", ")"])?;
    Ok(())
}

pub fn with_nullable(g: &mut GrammarDef) -> Result<(), GrammarError> {
    // E → E + T n | T
    // T → a | ( E n ) | n a
    // n → ϵ | num
    for t in ["(", ")", "+", "a", "NUM"] {
        g.terminal(t)?;
    }
    for n in ["expr", "term", "nullable"] {
        g.nonterminal(n)?;
    }

    g.rule("expr", &["expr", "+", "term", "nullable"])?;
    g.rule("expr", &["term"])?;

    g.rule("term", &["a"])?;
    g.rule("term", &["(", "expr", "nullable", ")"])?;
    g.rule("term", &["nullable", "a"])?;

    g.rule("nullable", &[])?;
    g.rule("nullable", &["NUM"])?;
    Ok(())
}

/// LALR(1) but not SLR(1).
pub fn pointer(g: &mut GrammarDef) -> Result<(), GrammarError> {
    // S → L = R | R
    // L → * R | id
    // R → L
    for t in ["=", "*", "id"] {
        g.terminal(t)?;
    }
    for n in ["S", "L", "R"] {
        g.nonterminal(n)?;
    }

    g.rule("S", &["L", "=", "R"])?;
    g.rule("S", &["R"])?;
    g.rule("L", &["*", "R"])?;
    g.rule("L", &["id"])?;
    g.rule("R", &["L"])?;
    Ok(())
}

pub fn dangling_else(g: &mut GrammarDef) -> Result<(), GrammarError> {
    for t in ["if", "then", "else", "cond", "other"] {
        g.terminal(t)?;
    }
    g.nonterminal("stmt")?;
    g.nonterminal("expr")?;

    g.rule("stmt", &["if", "expr", "then", "stmt"])?;
    g.rule("stmt", &["if", "expr", "then", "stmt", "else", "stmt"])?;
    g.rule("stmt", &["other"])?;
    g.rule("expr", &["cond"])?;
    Ok(())
}

pub fn reduce_reduce(g: &mut GrammarDef) -> Result<(), GrammarError> {
    // S → A | B
    // A → x
    // B → x
    g.terminal("x")?;
    for n in ["S", "A", "B"] {
        g.nonterminal(n)?;
    }

    g.rule("S", &["A"])?;
    g.rule("S", &["B"])?;
    g.rule("A", &["x"])?;
    g.rule("B", &["x"])?;
    Ok(())
}
