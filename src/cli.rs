//! A small `clap`-derived binary wiring loader → pipeline → tokeniser →
//! executor → tree → renderer, generalising the teacher's hardcoded
//! `main` demonstration into a real command-line tool (§4.9).

use clap::{Parser, Subcommand};

use crate::dpda::Dpda;
use crate::error::Result;
use crate::first_follow::{compute_first_sets, compute_follow_sets};
use crate::loader::load_grammar;
use crate::render::{TextRenderer, TreeRenderer};
use crate::symbol::Symbol;
use crate::table::ParsingTable;
use crate::tokenizer::Tokenizer;

#[derive(Parser, Debug)]
#[command(name = "ll1dpda", about = "Builds and runs an LL(1)-to-DPDA predictive parser")]
pub struct Cli {
    /// Path to the grammar source file (§6.1 format).
    pub grammar: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print FIRST and FOLLOW sets for every grammar symbol.
    Sets,
    /// Print the LL(1) predictive parsing table.
    Table,
    /// Tokenise, run the DPDA against `input`, and print the trace plus
    /// (on acceptance) the reconstructed parse tree.
    Parse { input: String },
}

/// Runs the CLI. The only place a `ParseReject`/`StepBudgetExceeded`
/// becomes an `Err`, matching the error handling policy's `?`-ergonomics
/// carve-out.
pub fn run(cli: Cli) -> Result<()> {
    let grammar = load_grammar(&cli.grammar)?;
    log::info!("grammar loaded from {}", cli.grammar);

    match cli.command {
        Command::Sets => {
            let first_sets = compute_first_sets(&grammar);
            let follow_sets = compute_follow_sets(&grammar, &first_sets);

            let mut non_terminals: Vec<&Symbol> = grammar.non_terminals().iter().collect();
            non_terminals.sort();

            println!("FIRST sets:");
            for nt in &non_terminals {
                let mut set: Vec<String> = first_sets
                    .get(*nt)
                    .map(|s| s.iter().map(Symbol::to_string).collect())
                    .unwrap_or_default();
                set.sort();
                println!("  FIRST({nt}) = {{{}}}", set.join(", "));
            }

            println!("FOLLOW sets:");
            for nt in &non_terminals {
                let mut set: Vec<String> = follow_sets
                    .get(*nt)
                    .map(|s| s.iter().map(Symbol::to_string).collect())
                    .unwrap_or_default();
                set.sort();
                println!("  FOLLOW({nt}) = {{{}}}", set.join(", "));
            }
        }
        Command::Table => {
            let table = ParsingTable::build(&grammar)?;
            println!("{table}");
        }
        Command::Parse { input } => {
            let table = ParsingTable::build(&grammar)?;
            let dpda = Dpda::synthesize(&grammar, &table, Symbol::non_terminal("Z0"))?;

            let tokenizer = Tokenizer::new(&grammar)?;
            let tokens = tokenizer.tokenize(&input)?;
            let symbols: Vec<Symbol> = tokens.iter().map(|t| t.terminal.clone()).collect();
            let lexemes: Vec<String> = tokens.iter().map(|t| t.lexeme.clone()).collect();

            let trace = dpda.parse(&symbols)?;
            println!("{trace}");

            let tree = dpda.reconstruct_tree(&symbols, &lexemes)?;
            let rendered = TextRenderer
                .render(&tree)
                .expect("the text renderer never fails");
            println!("{rendered}");
        }
    }

    Ok(())
}
