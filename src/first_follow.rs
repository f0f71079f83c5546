//! Fixed-point computation of FIRST and FOLLOW sets.
//!
//! Both computations are monotone passes over a finite lattice (subsets of
//! the terminal alphabet plus the epsilon/end markers), so they converge
//! regardless of map iteration order; no worklist is needed at the grammar
//! sizes this pipeline targets.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::grammar::Grammar;
use crate::symbol::Symbol;

pub type FirstSets = HashMap<Symbol, HashSet<Symbol>>;
pub type FollowSets = HashMap<Symbol, HashSet<Symbol>>;

/// Computes FIRST(α) for a sequence of symbols, given already-converged
/// per-symbol FIRST sets.
///
/// Walks left to right, accumulating `FIRST(Yi) \ {Epsilon}` while every
/// `Yi` seen so far derives epsilon; if the whole sequence is nullable
/// (including the empty sequence), Epsilon is added to the result.
pub fn first_of_sequence(first_sets: &FirstSets, sequence: &[Symbol]) -> HashSet<Symbol> {
    let mut result = HashSet::new();
    let mut all_nullable = true;

    for symbol in sequence {
        let symbol_first = first_sets.get(symbol).cloned().unwrap_or_default();
        for terminal in &symbol_first {
            if !terminal.is_epsilon() {
                result.insert(terminal.clone());
            }
        }
        if !symbol_first.contains(&Symbol::Epsilon) {
            all_nullable = false;
            break;
        }
    }

    if all_nullable {
        result.insert(Symbol::Epsilon);
    }

    result
}

/// Computes FIRST for every terminal and non-terminal in `grammar`.
///
/// FIRST(t) = {t} for every terminal t; FIRST(A) is built up by fixed-point
/// iteration over `A`'s productions until a full pass changes nothing.
pub fn compute_first_sets(grammar: &Grammar) -> FirstSets {
    let mut first_sets: FirstSets = HashMap::new();

    for terminal in grammar.terminals() {
        first_sets.insert(terminal.clone(), HashSet::from([terminal.clone()]));
    }
    for non_terminal in grammar.non_terminals() {
        first_sets.insert(non_terminal.clone(), HashSet::new());
    }

    let mut changed = true;
    let mut pass = 0;
    while changed {
        changed = false;
        pass += 1;

        for production in grammar.all_productions() {
            let lhs = &production.non_terminal;

            if production.is_epsilon() {
                if first_sets.get_mut(lhs).unwrap().insert(Symbol::Epsilon) {
                    changed = true;
                }
                continue;
            }

            let rhs_first = first_of_sequence(&first_sets, &production.rhs);
            let entry = first_sets.get_mut(lhs).unwrap();
            for symbol in rhs_first {
                if entry.insert(symbol) {
                    changed = true;
                }
            }
        }

        debug!("FIRST fixed-point pass {pass}: changed={changed}");
    }

    first_sets
}

/// Computes FOLLOW for every non-terminal in `grammar`.
///
/// FOLLOW(start) is seeded with `EndMarker` (never `Epsilon` — see Design
/// Note "EndMarker encoding" / Open Question (b)). For each production
/// `A -> X1...Xn`, a trailer set starting at FOLLOW(A) is walked from Xn
/// down to X1: a non-terminal Xi gets the trailer unioned in, then the
/// trailer is updated to FIRST(Xi) (extended with the old trailer if Xi is
/// nullable) or `{Xi}` if Xi is a terminal.
pub fn compute_follow_sets(grammar: &Grammar, first_sets: &FirstSets) -> FollowSets {
    let mut follow_sets: FollowSets = HashMap::new();
    for non_terminal in grammar.non_terminals() {
        follow_sets.insert(non_terminal.clone(), HashSet::new());
    }
    follow_sets
        .get_mut(grammar.start_symbol())
        .expect("start symbol is always a declared non-terminal")
        .insert(Symbol::EndMarker);

    let mut changed = true;
    let mut pass = 0;
    while changed {
        changed = false;
        pass += 1;

        for production in grammar.all_productions() {
            let lhs = &production.non_terminal;
            let mut trailer = follow_sets.get(lhs).cloned().unwrap_or_default();

            for symbol in production.rhs.iter().rev() {
                if symbol.is_nonterminal() {
                    let entry = follow_sets.get_mut(symbol).unwrap();
                    let before = entry.len();
                    entry.extend(trailer.iter().cloned());
                    if entry.len() != before {
                        changed = true;
                    }

                    let symbol_first = first_sets.get(symbol).cloned().unwrap_or_default();
                    if symbol_first.contains(&Symbol::Epsilon) {
                        let mut extended: HashSet<Symbol> = symbol_first
                            .into_iter()
                            .filter(|s| !s.is_epsilon())
                            .collect();
                        extended.extend(trailer.into_iter());
                        trailer = extended;
                    } else {
                        trailer = symbol_first;
                    }
                } else {
                    // Terminal or Epsilon: FIRST of a lone terminal is
                    // itself; epsilon contributes nothing and cannot appear
                    // mid-sequence after normalisation.
                    trailer = HashSet::from([symbol.clone()]);
                }
            }
        }

        debug!("FOLLOW fixed-point pass {pass}: changed={changed}");
    }

    follow_sets
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
    fn first_of_terminal_is_itself() {
        let g = arithmetic_grammar();
        let first = compute_first_sets(&g);
        for terminal in g.terminals() {
            assert_eq!(first.get(terminal).unwrap(), &HashSet::from([terminal.clone()]));
        }
    }

    #[test]
    fn first_of_f_is_paren_and_id() {
        let g = arithmetic_grammar();
        let first = compute_first_sets(&g);
        let first_f = first.get(&Symbol::non_terminal("F")).unwrap();
        assert_eq!(
            first_f,
            &HashSet::from([Symbol::terminal("("), Symbol::terminal("id")])
        );
    }

    #[test]
    fn nullable_nonterminals_contain_epsilon() {
        let g = arithmetic_grammar();
        let first = compute_first_sets(&g);
        assert!(first.get(&Symbol::non_terminal("E'")).unwrap().contains(&Symbol::Epsilon));
        assert!(first.get(&Symbol::non_terminal("T'")).unwrap().contains(&Symbol::Epsilon));
        assert!(!first.get(&Symbol::non_terminal("E")).unwrap().contains(&Symbol::Epsilon));
    }

    #[test]
    fn follow_of_start_contains_end_marker() {
        let g = arithmetic_grammar();
        let first = compute_first_sets(&g);
        let follow = compute_follow_sets(&g, &first);
        assert!(follow.get(&Symbol::non_terminal("E")).unwrap().contains(&Symbol::EndMarker));
    }

    #[test]
    fn follow_of_e_prime_matches_textbook() {
        let g = arithmetic_grammar();
        let first = compute_first_sets(&g);
        let follow = compute_follow_sets(&g, &first);
        let follow_e_prime = follow.get(&Symbol::non_terminal("E'")).unwrap();
        assert_eq!(
            follow_e_prime,
            &HashSet::from([Symbol::EndMarker, Symbol::terminal(")")])
        );
    }

    #[test]
    fn follow_of_f_includes_plus_star_and_close_paren() {
        let g = arithmetic_grammar();
        let first = compute_first_sets(&g);
        let follow = compute_follow_sets(&g, &first);
        let follow_f = follow.get(&Symbol::non_terminal("F")).unwrap();
        assert!(follow_f.contains(&Symbol::terminal("+")));
        assert!(follow_f.contains(&Symbol::terminal("*")));
        assert!(follow_f.contains(&Symbol::terminal(")")));
        assert!(follow_f.contains(&Symbol::EndMarker));
    }
}
