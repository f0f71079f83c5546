//! Error types spanning grammar construction, table building, DPDA
//! synthesis, and execution.

use thiserror::Error;

use crate::symbol::Symbol;

/// Why a parse was rejected. A run may fail more than one of these at once;
/// `Ll1Error::ParseReject` carries every reason that applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Input position is short of the end of the token stream.
    UnconsumedTokens { remaining: usize },
    /// The DPDA halted outside its accept-state set.
    NonAcceptState { state: String },
    /// The stack was non-empty when the run stopped.
    NonEmptyStack { depth: usize },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::UnconsumedTokens { remaining } => {
                write!(f, "{} input token(s) were not consumed", remaining)
            }
            RejectReason::NonAcceptState { state } => {
                write!(f, "run ended in non-accept state '{}'", state)
            }
            RejectReason::NonEmptyStack { depth } => {
                write!(f, "stack was non-empty at the end ({} symbol(s))", depth)
            }
        }
    }
}

/// Errors produced anywhere in the grammar → table → DPDA → parse pipeline.
#[derive(Error, Debug)]
pub enum Ll1Error {
    #[error("malformed grammar: {reason}")]
    MalformedGrammar { reason: String },

    #[error(
        "LL(1) conflict at table[{nonterminal}, {terminal}]: existing={existing:?} incoming={incoming:?}"
    )]
    LL1Conflict {
        nonterminal: Symbol,
        terminal: Symbol,
        existing: Vec<Symbol>,
        incoming: Vec<Symbol>,
    },

    #[error("DPDA determinism violation in state '{state}' over stack top {stack_top}")]
    DeterminismViolation { state: String, stack_top: Symbol },

    #[error("input rejected: {}", reasons.iter().map(|r| r.to_string()).collect::<Vec<_>>().join("; "))]
    ParseReject { reasons: Vec<RejectReason> },

    #[error("step budget of {steps} exceeded during parsing")]
    StepBudgetExceeded { steps: usize },

    #[error("tokenisation failed: {reason}")]
    Tokenize { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Ll1Error>;
