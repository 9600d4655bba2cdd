use anyhow::Context as _;
use clap::Parser;
use lalrgen::{diagnostics::Severity, grammar::Grammar, report, samples, Config};
use std::{fs, path::PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The name of a built-in grammar.
    grammar: String,

    /// Write the listing to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Keep explicit error entries in states that only reduce.
    #[arg(long)]
    no_default_reductions: bool,

    /// Fail when a conflict was not decided by precedence.
    #[arg(long)]
    deny_conflicts: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::trace!("CLI args = {:?}", args);

    let sample = samples::lookup(&args.grammar).with_context(|| {
        let names: Vec<_> = samples::ALL.iter().map(|(name, _)| *name).collect();
        format!(
            "unknown grammar `{}' (available: {})",
            args.grammar,
            names.join(", ")
        )
    })?;
    let grammar = Grammar::define(sample)
        .with_context(|| format!("invalid grammar `{}'", args.grammar))?;

    let config = Config::new().default_reductions(!args.no_default_reductions);
    let output = config.generate(&grammar);

    for diagnostic in &output.diagnostics {
        if diagnostic.severity() >= Severity::Warning {
            println!("{}", diagnostic.display(&grammar));
        }
    }

    let listing = report::listing(&grammar, &output).to_string();
    match &args.output {
        Some(path) => fs::write(path, &listing)
            .with_context(|| format!("failed to write the listing to {}", path.display()))?,
        None => print!("{}", listing),
    }

    let unresolved = output.unresolved_conflicts().count();
    if args.deny_conflicts && unresolved > 0 {
        let suffix = if unresolved == 1 { "" } else { "s" };
        anyhow::bail!("the grammar has {} unresolved conflict{}", unresolved, suffix);
    }

    Ok(())
}
