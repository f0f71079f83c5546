//! The grammar model: the immutable input to the rest of the pipeline.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::{Ll1Error, Result};
use crate::symbol::Symbol;

/// A single production `non_terminal -> rhs`.
///
/// An epsilon production is normalised to an empty `rhs` at construction
/// time (Design Note "Epsilon encoding"): the source's two encodings,
/// `[Epsilon]` and `[]`, are folded into one internal representation so
/// every downstream stage only has to check `rhs.is_empty()`.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Production {
    pub non_terminal: Symbol,
    pub rhs: Vec<Symbol>,
}

impl Production {
    pub fn new(non_terminal: Symbol, rhs: Vec<Symbol>) -> Self {
        let rhs = if rhs.len() == 1 && rhs[0].is_epsilon() {
            Vec::new()
        } else {
            rhs
        };
        Production { non_terminal, rhs }
    }

    /// True for a production whose right-hand side derives the empty string.
    pub fn is_epsilon(&self) -> bool {
        self.rhs.is_empty()
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rhs.is_empty() {
            write!(f, "{} -> ε", self.non_terminal)
        } else {
            let rhs: Vec<String> = self.rhs.iter().map(|s| s.to_string()).collect();
            write!(f, "{} -> {}", self.non_terminal, rhs.join(" "))
        }
    }
}

/// A validated, immutable context-free grammar.
///
/// Construct with [`GrammarBuilder`]; once built, a `Grammar` is read-only
/// for the rest of its lifetime, matching the pipeline's "constructed once"
/// lifecycle.
#[derive(Debug, Clone)]
pub struct Grammar {
    start_symbol: Symbol,
    terminals: HashSet<Symbol>,
    terminal_order: Vec<Symbol>,
    non_terminals: HashSet<Symbol>,
    production_map: HashMap<Symbol, Vec<Production>>,
    all_productions: Vec<Production>,
    terminal_patterns: HashMap<Symbol, String>,
}

impl Grammar {
    pub fn start_symbol(&self) -> &Symbol {
        &self.start_symbol
    }

    pub fn terminals(&self) -> &HashSet<Symbol> {
        &self.terminals
    }

    /// Terminals in the order they were first declared, used to break
    /// longest-match tokenisation ties (§4.7).
    pub fn terminals_in_order(&self) -> &[Symbol] {
        &self.terminal_order
    }

    pub fn non_terminals(&self) -> &HashSet<Symbol> {
        &self.non_terminals
    }

    /// All productions whose left-hand side is `non_terminal`, in the order
    /// they were declared.
    pub fn productions_for(&self, non_terminal: &Symbol) -> &[Production] {
        self.production_map
            .get(non_terminal)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every production in the grammar, in declaration order.
    pub fn all_productions(&self) -> &[Production] {
        &self.all_productions
    }

    pub fn terminal_pattern(&self, terminal: &Symbol) -> Option<&str> {
        self.terminal_patterns.get(terminal).map(String::as_str)
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for production in &self.all_productions {
            writeln!(f, "{}", production)?;
        }
        Ok(())
    }
}

/// Incrementally assembles a [`Grammar`], validating its invariants on
/// [`build`](GrammarBuilder::build).
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    start_symbol: Option<Symbol>,
    terminals: HashSet<Symbol>,
    terminal_order: Vec<Symbol>,
    non_terminals: HashSet<Symbol>,
    productions: Vec<Production>,
    terminal_patterns: HashMap<Symbol, String>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_symbol(mut self, name: impl Into<String>) -> Self {
        self.start_symbol = Some(Symbol::non_terminal(name));
        self
    }

    pub fn declare_terminal(mut self, name: impl Into<String>) -> Self {
        let symbol = Symbol::terminal(name);
        if self.terminals.insert(symbol.clone()) {
            self.terminal_order.push(symbol);
        }
        self
    }

    pub fn declare_non_terminal(mut self, name: impl Into<String>) -> Self {
        self.non_terminals.insert(Symbol::non_terminal(name));
        self
    }

    pub fn add_production(mut self, non_terminal: impl Into<String>, rhs: Vec<Symbol>) -> Self {
        let nt = Symbol::non_terminal(non_terminal);
        self.non_terminals.insert(nt.clone());
        self.productions.push(Production::new(nt, rhs));
        self
    }

    pub fn terminal_pattern(mut self, terminal: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.terminal_patterns
            .insert(Symbol::terminal(terminal), pattern.into());
        self
    }

    /// Validates and finalises the grammar.
    ///
    /// Checks, in order: a start symbol was declared, no symbol is
    /// literally named `$` (Open Question (a)), the start symbol is among
    /// the declared non-terminals, terminals and non-terminals are
    /// disjoint, and every symbol appearing on some right-hand side is
    /// epsilon, a declared terminal, or a declared non-terminal.
    pub fn build(self) -> Result<Grammar> {
        let start_symbol = self.start_symbol.ok_or_else(|| Ll1Error::MalformedGrammar {
            reason: "no start symbol declared".to_string(),
        })?;

        let reserved = Symbol::terminal("$");
        if self.terminals.contains(&reserved) || self.non_terminals.contains(&reserved) {
            return Err(Ll1Error::MalformedGrammar {
                reason: "a terminal literally named '$' is reserved for the end marker"
                    .to_string(),
            });
        }

        if !self.non_terminals.contains(&start_symbol) {
            return Err(Ll1Error::MalformedGrammar {
                reason: format!("start symbol '{}' is not a declared non-terminal", start_symbol),
            });
        }

        let overlap: Vec<&Symbol> = self.terminals.intersection(&self.non_terminals).collect();
        if !overlap.is_empty() {
            return Err(Ll1Error::MalformedGrammar {
                reason: format!(
                    "symbols declared as both terminal and non-terminal: {:?}",
                    overlap
                ),
            });
        }

        for production in &self.productions {
            for symbol in &production.rhs {
                let declared = match symbol {
                    Symbol::Epsilon => true,
                    Symbol::EndMarker => false,
                    Symbol::Terminal(_) => self.terminals.contains(symbol),
                    Symbol::NonTerminal(_) => self.non_terminals.contains(symbol),
                };
                if !declared {
                    return Err(Ll1Error::MalformedGrammar {
                        reason: format!(
                            "symbol '{}' on the right-hand side of {} is undeclared",
                            symbol, production
                        ),
                    });
                }
            }
        }

        let mut production_map: HashMap<Symbol, Vec<Production>> = HashMap::new();
        for production in &self.productions {
            production_map
                .entry(production.non_terminal.clone())
                .or_default()
                .push(production.clone());
        }

        Ok(Grammar {
            start_symbol,
            terminals: self.terminals,
            terminal_order: self.terminal_order,
            non_terminals: self.non_terminals,
            production_map,
            all_productions: self.productions,
            terminal_patterns: self.terminal_patterns,
        })
    }
}
