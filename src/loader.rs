//! Reads the `KEY = VALUE` / `LHS -> RHS` grammar source format into a
//! [`Grammar`] (§6.1), grounded on the original `Grammar.load_grammar`.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::warn;

use crate::error::{Ll1Error, Result};
use crate::grammar::{Grammar, GrammarBuilder};
use crate::symbol::Symbol;

enum Line<'a> {
    Comment,
    Directive { key: &'a str, value: &'a str },
    Rule { lhs: &'a str, rhs: &'a str },
    Unrecognised,
}

fn classify(line: &str) -> Line<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Line::Comment;
    }
    // "->" is checked before "=", matching the original parser's order, so a
    // terminal pattern rule like `EQ -> /=/` isn't mis-split on its own `=`.
    if let Some((lhs, rhs)) = trimmed.split_once("->") {
        return Line::Rule {
            lhs: lhs.trim(),
            rhs: rhs.trim(),
        };
    }
    if let Some((key, value)) = trimmed.split_once('=') {
        return Line::Directive {
            key: key.trim(),
            value: value.trim(),
        };
    }
    Line::Unrecognised
}

fn unwrap_slash_format(pattern: &str) -> &str {
    if pattern.len() >= 2 && pattern.starts_with('/') && pattern.ends_with('/') {
        &pattern[1..pattern.len() - 1]
    } else {
        pattern
    }
}

/// Loads a grammar from `path`, in the directive/rule text format described
/// in the grammar source format section.
pub fn load_grammar(path: impl AsRef<Path>) -> Result<Grammar> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    load_grammar_str(&text)
}

/// Parses a grammar already read into memory; [`load_grammar`] is a thin
/// file-reading wrapper around this.
pub fn load_grammar_str(text: &str) -> Result<Grammar> {
    let mut start: Option<String> = None;
    let mut non_terminals: HashSet<String> = HashSet::new();
    // Kept in declaration order (the TERMINALS directive's comma order),
    // since the tokeniser breaks longest-match ties by that order.
    let mut terminals: Vec<String> = Vec::new();
    let mut rule_lines: Vec<(usize, &str, &str)> = Vec::new();

    for (line_num, line) in text.lines().enumerate() {
        match classify(line) {
            Line::Comment => continue,
            Line::Unrecognised => {
                warn!("grammar source line {} has an unrecognised format", line_num + 1);
                continue;
            }
            Line::Directive { key, value } => match key {
                "START" => start = Some(value.to_string()),
                "NON_TERMINALS" => {
                    non_terminals = value.split(',').map(|s| s.trim().to_string()).collect();
                }
                "TERMINALS" => {
                    terminals = value.split(',').map(|s| s.trim().to_string()).collect();
                }
                _ => warn!("grammar source line {} has an unknown directive '{key}'", line_num + 1),
            },
            Line::Rule { lhs, rhs } => rule_lines.push((line_num, lhs, rhs)),
        }
    }

    let start = start.ok_or_else(|| Ll1Error::MalformedGrammar {
        reason: "the START directive is missing from the grammar source".to_string(),
    })?;
    if non_terminals.is_empty() {
        return Err(Ll1Error::MalformedGrammar {
            reason: "the NON_TERMINALS directive is missing or empty".to_string(),
        });
    }
    if terminals.is_empty() {
        return Err(Ll1Error::MalformedGrammar {
            reason: "the TERMINALS directive is missing or empty".to_string(),
        });
    }

    let mut builder = GrammarBuilder::new().start_symbol(start);
    for nt in &non_terminals {
        builder = builder.declare_non_terminal(nt.clone());
    }
    for t in &terminals {
        builder = builder.declare_terminal(t.clone());
    }

    let mut undefined_symbols: HashSet<String> = HashSet::new();

    for (line_num, lhs, rhs) in rule_lines {
        if non_terminals.contains(lhs) {
            for alternative in rhs.split('|') {
                let symbols: Vec<Symbol> = alternative
                    .split_whitespace()
                    .map(|token| {
                        if token == "eps" || token == "ε" {
                            Symbol::Epsilon
                        } else if non_terminals.contains(token) {
                            Symbol::non_terminal(token)
                        } else {
                            if !terminals.iter().any(|t| t == token) {
                                undefined_symbols.insert(token.to_string());
                            }
                            Symbol::terminal(token)
                        }
                    })
                    .collect();
                if !symbols.is_empty() {
                    builder = builder.add_production(lhs, symbols);
                }
            }
        } else if terminals.iter().any(|t| t == lhs) {
            let pattern = unwrap_slash_format(rhs);
            builder = builder.terminal_pattern(lhs, pattern);
        } else {
            warn!(
                "grammar source line {}: symbol '{lhs}' is in neither terminals nor non-terminals",
                line_num + 1
            );
        }
    }

    if !undefined_symbols.is_empty() {
        let mut sorted: Vec<&String> = undefined_symbols.iter().collect();
        sorted.sort();
        warn!(
            "the following symbols are used on the right-hand side of rules but aren't declared \
             in TERMINALS or NON_TERMINALS: {sorted:?}"
        );
        // Matches the original's warn-and-continue handling: an undeclared
        // RHS symbol is let through as an implicitly declared terminal
        // rather than aborting construction.
        for symbol in undefined_symbols {
            builder = builder.declare_terminal(symbol);
        }
    }

    builder.build()
}
