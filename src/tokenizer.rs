//! Longest-match tokenisation of a raw input string against a grammar's
//! declared terminal patterns (§4.7/§6.2).

use regex::Regex;

use crate::error::{Ll1Error, Result};
use crate::grammar::Grammar;
use crate::symbol::Symbol;

/// A single recognised token: the terminal it matched plus the exact
/// surface text, which the tree reconstructor uses to label leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub terminal: Symbol,
    pub lexeme: String,
}

struct CompiledTerminal {
    terminal: Symbol,
    pattern: Regex,
}

/// Compiles every terminal's regex once, up front, so a single [`tokenize`]
/// call doesn't repeatedly recompile patterns for a long input.
pub struct Tokenizer {
    patterns: Vec<CompiledTerminal>,
}

impl Tokenizer {
    /// Builds a tokenizer from `grammar`'s terminal-pattern map. Terminals
    /// without a declared pattern are skipped — only the ones used for
    /// tokenisation need one (a pure-syntax sketch could still be
    /// constructed for table/DPDA inspection without ever tokenising
    /// input).
    ///
    /// Tie-breaking among equal-length matches is by terminal declaration
    /// order, per §4.7/§6.2.
    pub fn new(grammar: &Grammar) -> Result<Self> {
        let mut patterns = Vec::new();
        for terminal in grammar.terminals_in_order() {
            let Some(raw_pattern) = grammar.terminal_pattern(terminal) else {
                continue;
            };
            let anchored = format!("^(?:{raw_pattern})");
            let pattern = Regex::new(&anchored).map_err(|e| Ll1Error::MalformedGrammar {
                reason: format!("terminal '{terminal}' has an invalid regex '{raw_pattern}': {e}"),
            })?;
            patterns.push(CompiledTerminal {
                terminal: terminal.clone(),
                pattern,
            });
        }

        Ok(Tokenizer { patterns })
    }

    /// Scans `input` left to right, emitting the longest match at each
    /// offset. Whitespace is not implicitly skipped: a grammar that wants
    /// it ignored must declare it as its own terminal and the caller must
    /// filter it out of the token stream it hands to the executor.
    pub fn tokenize(&self, input: &str) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        let mut offset = 0usize;

        while offset < input.len() {
            let slice = &input[offset..];
            let mut best: Option<(&CompiledTerminal, usize)> = None;

            for compiled in &self.patterns {
                if let Some(m) = compiled.pattern.find(slice) {
                    if m.start() == 0 {
                        let len = m.end();
                        if len > 0 && best.as_ref().map_or(true, |(_, best_len)| len > *best_len) {
                            best = Some((compiled, len));
                        }
                    }
                }
            }

            match best {
                Some((compiled, len)) => {
                    tokens.push(Token {
                        terminal: compiled.terminal.clone(),
                        lexeme: slice[..len].to_string(),
                    });
                    offset += len;
                }
                None => {
                    return Err(Ll1Error::Tokenize {
                        reason: format!("no declared terminal matches input at offset {offset}: '{}'", &slice[..slice.len().min(20)]),
                    });
                }
            }
        }

        Ok(tokens)
    }
}
