//! Executes a synthesised DPDA against a token stream.

use std::fmt::Write as _;

use log::{info, trace};

use crate::dpda::{Dpda, Lookahead};
use crate::error::{Ll1Error, RejectReason};
use crate::symbol::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StepKind {
    MatchConsume,
    ExpandNoConsume,
    EpsilonNoConsume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Halt {
    NoTransition,
    StackEmpty,
    Accepted,
    BudgetExceeded,
}

/// One executed (or halting) step, kept around so the reconstructor can
/// replay the same run without re-deriving transitions.
#[derive(Debug, Clone)]
pub(crate) struct ExecutedStep {
    pub state_before: String,
    pub stack_top: Symbol,
    pub kind: StepKind,
    pub next_state: String,
    pub push: Vec<Symbol>,
}

pub(crate) struct Run {
    pub accepted: bool,
    pub trace: String,
    pub steps: Vec<ExecutedStep>,
}

impl Dpda {
    /// Runs the automaton against `tokens`, a sequence of terminal symbols.
    ///
    /// Returns `(accepted, trace)` per spec §6.3: the trace is for human
    /// inspection, never parsed back in. Never raises — rejection is
    /// reported via the boolean plus the trace text, matching the
    /// "parse errors returned, not raised" policy of §7.
    pub fn accepts_input(&self, tokens: &[Symbol]) -> (bool, String) {
        let run = self.run(tokens);
        (run.accepted, run.trace)
    }

    /// Same execution as [`accepts_input`](Dpda::accepts_input), but raises
    /// a structured [`Ll1Error`] on rejection so CLI-style callers can use
    /// `?`. This is the one place a parse failure becomes an `Err`, per the
    /// error handling policy.
    pub fn parse(&self, tokens: &[Symbol]) -> Result<String, Ll1Error> {
        let run = self.run(tokens);
        if run.accepted {
            Ok(run.trace)
        } else {
            Err(self.reject_reasons(tokens, &run))
        }
    }

    pub(crate) fn reject_reasons(&self, tokens: &[Symbol], run: &Run) -> Ll1Error {
        // Re-derive the final configuration from the step list to build
        // precise reject reasons without re-running the automaton.
        let mut state = self.start_state.clone();
        let mut stack = vec![self.initial_stack_symbol.clone()];
        let mut index = 0usize;
        for step in &run.steps {
            stack.pop();
            for symbol in step.push.iter().rev() {
                if !symbol.is_epsilon() {
                    stack.push(symbol.clone());
                }
            }
            state = step.next_state.clone();
            if step.kind == StepKind::MatchConsume {
                index += 1;
            }
        }

        let mut reasons = Vec::new();
        if index != tokens.len() {
            reasons.push(RejectReason::UnconsumedTokens {
                remaining: tokens.len() - index,
            });
        }
        if !self.accept_states.contains(&state) {
            reasons.push(RejectReason::NonAcceptState { state: state.clone() });
        }
        if !stack.is_empty() {
            reasons.push(RejectReason::NonEmptyStack { depth: stack.len() });
        }
        if reasons.is_empty() {
            // Only possible if the step cap fired before any of the other
            // conditions could be evaluated as failing.
            return Ll1Error::StepBudgetExceeded { steps: run.steps.len() };
        }
        Ll1Error::ParseReject { reasons }
    }

    pub(crate) fn run(&self, tokens: &[Symbol]) -> Run {
        let n = tokens.len();
        let max_steps = 8 * n + 35;

        let mut state = self.start_state.clone();
        let mut stack: Vec<Symbol> = vec![self.initial_stack_symbol.clone()];
        let mut index = 0usize;
        let mut steps = Vec::new();
        let mut trace = String::new();

        let token_display: Vec<String> = tokens.iter().map(Symbol::to_string).collect();
        let _ = writeln!(trace, "input tokens: [{}]", token_display.join(", "));

        let mut step_no = 0usize;
        let halt = 'run: loop {
            if step_no >= max_steps {
                break 'run Halt::BudgetExceeded;
            }
            step_no += 1;

            let Some(stack_top) = stack.last().cloned() else {
                break 'run Halt::StackEmpty;
            };

            let consumed = token_display[..index.min(n)].join(" ");
            let remaining = token_display[index.min(n)..].join(" ");
            let lookahead_display = if index < n { token_display[index].clone() } else { "$".to_string() };
            let stack_display: Vec<&str> = stack.iter().map(|s| s.name().unwrap_or_default()).collect();
            let _ = writeln!(
                trace,
                "{step_no}. state={state} consumed=\"{consumed}\" remaining=\"{remaining}\" stack={:?} lookahead={lookahead_display}",
                stack_display
            );
            trace!(
                "step {step_no}: state={state} stack_top={stack_top} lookahead={lookahead_display}"
            );

            let selected = if index < n {
                let lookahead = tokens[index].clone();
                self.transition(&state, &Lookahead::Symbol(lookahead.clone()), &stack_top)
                    .map(|(next, push)| {
                        let kind = if push.is_empty() && stack_top == lookahead {
                            StepKind::MatchConsume
                        } else {
                            StepKind::ExpandNoConsume
                        };
                        (kind, next.clone(), push.clone())
                    })
            } else {
                self.transition(&state, &Lookahead::Symbol(Symbol::EndMarker), &stack_top)
                    .map(|(next, push)| (StepKind::ExpandNoConsume, next.clone(), push.clone()))
            };

            let selected = selected.or_else(|| {
                self.transition(&state, &Lookahead::Epsilon, &stack_top)
                    .map(|(next, push)| (StepKind::EpsilonNoConsume, next.clone(), push.clone()))
            });

            let Some((kind, next_state, push)) = selected else {
                let _ = writeln!(trace, "   halt: no transition δ({state}, {lookahead_display}, {stack_top})");
                break 'run Halt::NoTransition;
            };

            let used = match kind {
                StepKind::EpsilonNoConsume => "ε".to_string(),
                _ => lookahead_display.clone(),
            };
            let push_display: Vec<String> = push.iter().map(Symbol::to_string).collect();
            let _ = writeln!(
                trace,
                "   δ({state}, {used}, {stack_top}) -> ({next_state}, [{}])",
                push_display.join(", ")
            );

            steps.push(ExecutedStep {
                state_before: state.clone(),
                stack_top: stack_top.clone(),
                kind,
                next_state: next_state.clone(),
                push: push.clone(),
            });

            stack.pop();
            for symbol in push.iter().rev() {
                if !symbol.is_epsilon() {
                    stack.push(symbol.clone());
                }
            }
            state = next_state;
            if kind == StepKind::MatchConsume {
                index += 1;
            }

            if index == n && self.accept_states.contains(&state) && stack.is_empty() {
                break 'run Halt::Accepted;
            }
        };

        let accepted = matches!(halt, Halt::Accepted);
        let _ = writeln!(
            trace,
            "halted: {:?} state={state} tokens_consumed={index}/{n} stack_depth={}",
            halt,
            stack.len()
        );
        if accepted {
            info!("input accepted after {} step(s)", steps.len());
        } else {
            info!("input rejected ({:?}) after {} step(s)", halt, steps.len());
        }

        Run { accepted, trace, steps }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;
    use crate::table::ParsingTable;

    fn arithmetic_grammar() -> crate::grammar::Grammar {
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

    fn build_dpda() -> Dpda {
        let g = arithmetic_grammar();
        let table = ParsingTable::build(&g).unwrap();
        Dpda::synthesize(&g, &table, Symbol::non_terminal("Z0")).unwrap()
    }

    fn tokens(names: &[&str]) -> Vec<Symbol> {
        names.iter().map(|n| Symbol::terminal(*n)).collect()
    }

    #[test]
    fn accepts_single_id() {
        let dpda = build_dpda();
        let (accepted, _) = dpda.accepts_input(&tokens(&["id"]));
        assert!(accepted);
    }

    #[test]
    fn accepts_id_plus_id() {
        let dpda = build_dpda();
        let (accepted, _) = dpda.accepts_input(&tokens(&["id", "+", "id"]));
        assert!(accepted);
    }

    #[test]
    fn accepts_parenthesised_expression() {
        let dpda = build_dpda();
        let (accepted, _) = dpda.accepts_input(&tokens(&[
            "(", "id", "+", "id", ")", "*", "id",
        ]));
        assert!(accepted);
    }

    #[test]
    fn rejects_trailing_operator() {
        let dpda = build_dpda();
        let (accepted, _) = dpda.accepts_input(&tokens(&["id", "+"]));
        assert!(!accepted);
    }

    #[test]
    fn rejects_leading_operator() {
        let dpda = build_dpda();
        let (accepted, _) = dpda.accepts_input(&tokens(&["+", "id"]));
        assert!(!accepted);
    }

    #[test]
    fn rejects_empty_input() {
        let dpda = build_dpda();
        let (accepted, _) = dpda.accepts_input(&[]);
        assert!(!accepted);
    }

    #[test]
    fn parse_raises_structured_reject_reasons() {
        let dpda = build_dpda();
        let err = dpda.parse(&tokens(&["id", "+"])).unwrap_err();
        match err {
            Ll1Error::ParseReject { reasons } => assert!(!reasons.is_empty()),
            other => panic!("expected ParseReject, got {other:?}"),
        }
    }

    #[test]
    fn step_bound_never_triggers_on_valid_input() {
        let dpda = build_dpda();
        let long_input: Vec<&str> = std::iter::repeat(["id", "+"]).take(20).flatten().chain(std::iter::once("id")).collect();
        let (accepted, _) = dpda.accepts_input(&tokens(&long_input));
        assert!(accepted);
    }
}
