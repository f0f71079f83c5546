//! The tagged symbol alphabet shared by every pipeline stage.
//!
//! Grammars built from naive string conventions ("uppercase means
//! non-terminal") push the convention into every consumer. Here the tag is
//! the type, so FIRST/FOLLOW, table lookup, and DPDA transitions dispatch
//! exhaustively instead of by string-shape sniffing.

use std::cmp::Ordering;
use std::fmt;

/// A single grammar symbol.
///
/// Names are opaque strings; only the variant distinguishes kinds, matching
/// the data model's "equality and hashing over (tag, name)" rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// A terminal of the grammar's alphabet.
    Terminal(String),
    /// A non-terminal of the grammar.
    NonTerminal(String),
    /// The empty string, ε.
    Epsilon,
    /// The synthetic end-of-input marker, $.
    EndMarker,
}

impl Symbol {
    pub fn terminal(name: impl Into<String>) -> Self {
        Symbol::Terminal(name.into())
    }

    pub fn non_terminal(name: impl Into<String>) -> Self {
        Symbol::NonTerminal(name.into())
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    #[inline]
    pub fn is_nonterminal(&self) -> bool {
        matches!(self, Symbol::NonTerminal(_))
    }

    #[inline]
    pub fn is_epsilon(&self) -> bool {
        matches!(self, Symbol::Epsilon)
    }

    #[inline]
    pub fn is_end_marker(&self) -> bool {
        matches!(self, Symbol::EndMarker)
    }

    /// The symbol's name, if it carries one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Symbol::Terminal(n) | Symbol::NonTerminal(n) => Some(n.as_str()),
            Symbol::Epsilon | Symbol::EndMarker => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Symbol::Epsilon => 0,
            Symbol::Terminal(_) => 1,
            Symbol::NonTerminal(_) => 2,
            Symbol::EndMarker => 3,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Terminal(n) | Symbol::NonTerminal(n) => write!(f, "{}", n),
            Symbol::Epsilon => write!(f, "ε"),
            Symbol::EndMarker => write!(f, "$"),
        }
    }
}

/// Total order: Epsilon < Terminal < NonTerminal < EndMarker, then by name.
///
/// Used only to make trace and table output deterministic; it carries no
/// grammar-theoretic meaning.
impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Symbol::Terminal(a), Symbol::Terminal(b)) => a.cmp(b),
            (Symbol::NonTerminal(a), Symbol::NonTerminal(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
