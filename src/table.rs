//! The LL(1) predictive parsing table.

use std::collections::HashMap;
use std::fmt;

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};
use log::debug;

use crate::error::{Ll1Error, Result};
use crate::first_follow::{compute_first_sets, compute_follow_sets, first_of_sequence};
use crate::grammar::{Grammar, Production};
use crate::symbol::Symbol;

/// Maps `(non-terminal, terminal-or-end-marker)` to the single production
/// to apply there.
#[derive(Debug, Clone)]
pub struct ParsingTable {
    cells: HashMap<(Symbol, Symbol), Production>,
    non_terminals: Vec<Symbol>,
    columns: Vec<Symbol>,
}

impl ParsingTable {
    /// Builds the parsing table for `grammar`, computing FIRST/FOLLOW along
    /// the way.
    ///
    /// For each production `A -> α`: every terminal in `FIRST(α) \ {ε}`
    /// gets the cell `table[A, t] = α`; if `ε ∈ FIRST(α)`, every terminal
    /// (and `$`) in `FOLLOW(A)` also gets that cell. A second production
    /// claiming an already-filled cell is an `Ll1Error::LL1Conflict`.
    pub fn build(grammar: &Grammar) -> Result<Self> {
        let first_sets = compute_first_sets(grammar);
        let follow_sets = compute_follow_sets(grammar, &first_sets);
        Self::build_from_sets(grammar, &first_sets, &follow_sets)
    }

    fn build_from_sets(
        grammar: &Grammar,
        first_sets: &crate::first_follow::FirstSets,
        follow_sets: &crate::first_follow::FollowSets,
    ) -> Result<Self> {
        let mut cells: HashMap<(Symbol, Symbol), Production> = HashMap::new();

        let mut set_cell = |cells: &mut HashMap<(Symbol, Symbol), Production>,
                             nt: Symbol,
                             terminal: Symbol,
                             production: &Production| {
            let key = (nt, terminal);
            if let Some(existing) = cells.get(&key) {
                if existing != production {
                    return Err(Ll1Error::LL1Conflict {
                        nonterminal: key.0.clone(),
                        terminal: key.1.clone(),
                        existing: existing.rhs.clone(),
                        incoming: production.rhs.clone(),
                    });
                }
            }
            cells.insert(key, production.clone());
            Ok(())
        };

        for production in grammar.all_productions() {
            let nt = production.non_terminal.clone();
            let first_of_rhs = first_of_sequence(first_sets, &production.rhs);

            for terminal in first_of_rhs.iter().filter(|s| !s.is_epsilon()) {
                set_cell(&mut cells, nt.clone(), terminal.clone(), production)?;
            }

            if first_of_rhs.contains(&Symbol::Epsilon) {
                let follow = follow_sets.get(&nt).cloned().unwrap_or_default();
                for terminal in &follow {
                    set_cell(&mut cells, nt.clone(), terminal.clone(), production)?;
                }
            }
        }

        debug!("parsing table built with {} cells", cells.len());

        let mut non_terminals: Vec<Symbol> = grammar.non_terminals().iter().cloned().collect();
        non_terminals.sort();

        let mut columns: Vec<Symbol> = grammar.terminals().iter().cloned().collect();
        columns.push(Symbol::EndMarker);
        columns.sort();

        Ok(Self {
            cells,
            non_terminals,
            columns,
        })
    }

    /// The production for `(non_terminal, lookahead)`, if the table defines
    /// one.
    pub fn get(&self, non_terminal: &Symbol, lookahead: &Symbol) -> Option<&Production> {
        self.cells.get(&(non_terminal.clone(), lookahead.clone()))
    }

    fn to_comfy_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        let mut header = vec![Cell::new("").add_attribute(Attribute::Bold)];
        header.extend(
            self.columns
                .iter()
                .map(|c| Cell::new(c.to_string()).add_attribute(Attribute::Bold)),
        );
        table.add_row(header);

        for nt in &self.non_terminals {
            let mut row = vec![Cell::new(nt.to_string())];
            for column in &self.columns {
                let content = self
                    .get(nt, column)
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "-".to_string());
                row.push(Cell::new(content));
            }
            table.add_row(row);
        }

        table
    }
}

impl fmt::Display for ParsingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_comfy_table())
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
    fn table_entry_for_e_on_id_is_t_e_prime() {
        let g = arithmetic_grammar();
        let table = ParsingTable::build(&g).unwrap();
        let entry = table
            .get(&Symbol::non_terminal("E"), &Symbol::terminal("id"))
            .unwrap();
        assert_eq!(entry.rhs, vec![Symbol::non_terminal("T"), Symbol::non_terminal("E'")]);
    }

    #[test]
    fn table_entry_for_e_prime_on_end_marker_is_epsilon() {
        let g = arithmetic_grammar();
        let table = ParsingTable::build(&g).unwrap();
        let entry = table
            .get(&Symbol::non_terminal("E'"), &Symbol::EndMarker)
            .unwrap();
        assert!(entry.is_epsilon());
    }

    #[test]
    fn no_entry_for_e_on_plus() {
        let g = arithmetic_grammar();
        let table = ParsingTable::build(&g).unwrap();
        assert!(table.get(&Symbol::non_terminal("E"), &Symbol::terminal("+")).is_none());
    }

    #[test]
    fn detects_ll1_conflict() {
        // S -> A | B ; A -> a ; B -> a   (both choices predict on 'a')
        let g = GrammarBuilder::new()
            .start_symbol("S")
            .declare_non_terminal("S")
            .declare_non_terminal("A")
            .declare_non_terminal("B")
            .declare_terminal("a")
            .add_production("S", vec![Symbol::non_terminal("A")])
            .add_production("S", vec![Symbol::non_terminal("B")])
            .add_production("A", vec![Symbol::terminal("a")])
            .add_production("B", vec![Symbol::terminal("a")])
            .build()
            .unwrap();

        let err = ParsingTable::build(&g).unwrap_err();
        assert!(matches!(err, Ll1Error::LL1Conflict { .. }));
    }

    #[test]
    fn display_renders_a_table() {
        let g = arithmetic_grammar();
        let table = ParsingTable::build(&g).unwrap();
        let rendered = table.to_string();
        assert!(rendered.contains("id"));
        assert!(rendered.contains('$'));
    }
}
