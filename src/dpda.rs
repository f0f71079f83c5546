//! The canonical three-state DPDA synthesised from an LL(1) parsing table.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::error::{Ll1Error, Result};
use crate::grammar::Grammar;
use crate::symbol::Symbol;
use crate::table::ParsingTable;

pub const START_STATE: &str = "q0";
pub const RUN_STATE: &str = "q";
pub const ACCEPT_STATE: &str = "f";

/// A transition's lookahead: either an epsilon move or a move keyed on a
/// specific terminal (the parsing table may also key a move on the end
/// marker, since FOLLOW sets can contain it).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Lookahead {
    Epsilon,
    Symbol(Symbol),
}

/// A deterministic pushdown automaton: the seven-tuple of the data model,
/// plus the epsilon marker implicit in `Lookahead::Epsilon`.
#[derive(Debug, Clone)]
pub struct Dpda {
    pub(crate) states: HashSet<String>,
    pub(crate) input_alphabet: HashSet<Symbol>,
    pub(crate) stack_alphabet: HashSet<Symbol>,
    pub(crate) initial_stack_symbol: Symbol,
    pub(crate) start_state: String,
    pub(crate) accept_states: HashSet<String>,
    pub(crate) transitions: HashMap<(String, Lookahead, Symbol), (String, Vec<Symbol>)>,
}

impl Dpda {
    /// Synthesises the canonical `{q0, q, f}` DPDA for `grammar` driven by
    /// `table`, using `initial_stack_symbol` as Z0.
    ///
    /// See spec §4.3 for the transition shape: bootstrap, per-table-entry
    /// expansion, per-terminal match-and-consume, and the accept-on-empty-
    /// input move. The result is validated for determinism before it is
    /// returned.
    pub fn synthesize(
        grammar: &Grammar,
        table: &ParsingTable,
        initial_stack_symbol: Symbol,
    ) -> Result<Self> {
        let states: HashSet<String> = [START_STATE, RUN_STATE, ACCEPT_STATE]
            .into_iter()
            .map(String::from)
            .collect();
        let input_alphabet = grammar.terminals().clone();
        let mut stack_alphabet = grammar.terminals().clone();
        stack_alphabet.extend(grammar.non_terminals().iter().cloned());
        stack_alphabet.insert(initial_stack_symbol.clone());

        let mut transitions = HashMap::new();

        transitions.insert(
            (START_STATE.to_string(), Lookahead::Epsilon, initial_stack_symbol.clone()),
            (
                RUN_STATE.to_string(),
                vec![grammar.start_symbol().clone(), initial_stack_symbol.clone()],
            ),
        );

        for non_terminal in grammar.non_terminals() {
            let mut lookaheads: Vec<Symbol> = grammar.terminals().iter().cloned().collect();
            lookaheads.push(Symbol::EndMarker);

            for lookahead in lookaheads {
                if let Some(production) = table.get(non_terminal, &lookahead) {
                    transitions.insert(
                        (
                            RUN_STATE.to_string(),
                            Lookahead::Symbol(lookahead),
                            non_terminal.clone(),
                        ),
                        (RUN_STATE.to_string(), production.rhs.clone()),
                    );
                }
            }
        }

        for terminal in grammar.terminals() {
            transitions.insert(
                (
                    RUN_STATE.to_string(),
                    Lookahead::Symbol(terminal.clone()),
                    terminal.clone(),
                ),
                (RUN_STATE.to_string(), Vec::new()),
            );
        }

        transitions.insert(
            (RUN_STATE.to_string(), Lookahead::Epsilon, initial_stack_symbol.clone()),
            (ACCEPT_STATE.to_string(), Vec::new()),
        );

        debug!("synthesised DPDA with {} transitions", transitions.len());

        let dpda = Dpda {
            states,
            input_alphabet,
            stack_alphabet,
            initial_stack_symbol,
            start_state: START_STATE.to_string(),
            accept_states: HashSet::from([ACCEPT_STATE.to_string()]),
            transitions,
        };
        dpda.validate_determinism()?;
        Ok(dpda)
    }

    /// Checks that for every `(state, stack_top)`, an epsilon move and an
    /// input-consuming move on some terminal are not both defined.
    fn validate_determinism(&self) -> Result<()> {
        for (state, _lookahead, stack_top) in self.transitions.keys() {
            let has_epsilon = self
                .transitions
                .contains_key(&(state.clone(), Lookahead::Epsilon, stack_top.clone()));
            let has_terminal_move = self.input_alphabet.iter().any(|terminal| {
                self.transitions.contains_key(&(
                    state.clone(),
                    Lookahead::Symbol(terminal.clone()),
                    stack_top.clone(),
                ))
            });
            if has_epsilon && has_terminal_move {
                return Err(Ll1Error::DeterminismViolation {
                    state: state.clone(),
                    stack_top: stack_top.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn states(&self) -> &HashSet<String> {
        &self.states
    }

    pub fn accept_states(&self) -> &HashSet<String> {
        &self.accept_states
    }

    pub fn initial_stack_symbol(&self) -> &Symbol {
        &self.initial_stack_symbol
    }

    pub fn start_state(&self) -> &str {
        &self.start_state
    }

    /// Looks up the transition for `(state, lookahead, stack_top)`.
    pub(crate) fn transition(
        &self,
        state: &str,
        lookahead: &Lookahead,
        stack_top: &Symbol,
    ) -> Option<&(String, Vec<Symbol>)> {
        self.transitions
            .get(&(state.to_string(), lookahead.clone(), stack_top.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;

    fn arithmetic_grammar() -> Grammar {
        GrammarBuilder::new()
            .start_symbol("E")
            .declare_non_terminal("E")
            .declare_non_terminal("E'")
            .declare_non_terminal("T")
            .declare_non_terminal("T'")
            .declare_non_terminal("F")
            .declare_terminal("+")
            .declare_terminal("*")
            .declare_terminal("(")
            .declare_terminal(")")
            .declare_terminal("id")
            .add_production("E", vec![Symbol::non_terminal("T"), Symbol::non_terminal("E'")])
            .add_production(
                "E'",
                vec![
                    Symbol::terminal("+"),
                    Symbol::non_terminal("T"),
                    Symbol::non_terminal("E'"),
                ],
            )
            .add_production("E'", vec![Symbol::Epsilon])
            .add_production("T", vec![Symbol::non_terminal("F"), Symbol::non_terminal("T'")])
            .add_production(
                "T'",
                vec![
                    Symbol::terminal("*"),
                    Symbol::non_terminal("F"),
                    Symbol::non_terminal("T'"),
                ],
            )
            .add_production("T'", vec![Symbol::Epsilon])
            .add_production(
                "F",
                vec![
                    Symbol::terminal("("),
                    Symbol::non_terminal("E"),
                    Symbol::terminal(")"),
                ],
            )
            .add_production("F", vec![Symbol::terminal("id")])
            .build()
            .unwrap()
    }

    #[test]
    fn synthesis_produces_three_states() {
        let g = arithmetic_grammar();
        let table = ParsingTable::build(&g).unwrap();
        let dpda = Dpda::synthesize(&g, &table, Symbol::non_terminal("Z0")).unwrap();
        assert_eq!(dpda.states().len(), 3);
        assert_eq!(dpda.accept_states(), &HashSet::from([ACCEPT_STATE.to_string()]));
    }

    #[test]
    fn bootstrap_transition_pushes_start_then_z0() {
        let g = arithmetic_grammar();
        let table = ParsingTable::build(&g).unwrap();
        let z0 = Symbol::non_terminal("Z0");
        let dpda = Dpda::synthesize(&g, &table, z0.clone()).unwrap();
        let (next, push) = dpda.transition(START_STATE, &Lookahead::Epsilon, &z0).unwrap();
        assert_eq!(next, RUN_STATE);
        assert_eq!(push, &vec![Symbol::non_terminal("E"), z0]);
    }

    #[test]
    fn match_consume_transition_pops_and_pushes_nothing() {
        let g = arithmetic_grammar();
        let table = ParsingTable::build(&g).unwrap();
        let dpda = Dpda::synthesize(&g, &table, Symbol::non_terminal("Z0")).unwrap();
        let id = Symbol::terminal("id");
        let (next, push) = dpda
            .transition(RUN_STATE, &Lookahead::Symbol(id.clone()), &id)
            .unwrap();
        assert_eq!(next, RUN_STATE);
        assert!(push.is_empty());
    }

    #[test]
    fn non_terminal_named_like_the_initial_stack_symbol_violates_determinism() {
        // A non-terminal literally named "Z0" collides with the synthetic
        // initial stack symbol: the bootstrap/accept epsilon move on Z0 and
        // the table-driven expansion move on Z0 (keyed by the lookahead that
        // predicts its production) end up on the same (state, stack_top).
        let g = GrammarBuilder::new()
            .start_symbol("S")
            .declare_non_terminal("S")
            .declare_non_terminal("Z0")
            .declare_terminal("a")
            .add_production("S", vec![Symbol::non_terminal("Z0")])
            .add_production("Z0", vec![Symbol::terminal("a")])
            .build()
            .unwrap();
        let table = ParsingTable::build(&g).unwrap();
        let err = Dpda::synthesize(&g, &table, Symbol::non_terminal("Z0")).unwrap_err();
        assert!(matches!(err, Ll1Error::DeterminismViolation { .. }));
    }
}
