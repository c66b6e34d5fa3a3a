use std::fmt;

use serde::Serialize;

use super::{ll1_parsing_table::Collision, Symbol, END_MARK, EPSILON};

/// Problems found while loading a grammar. All of them abort the session.
///
/// `line` is the 1-based line of the grammar text, or the 1-based position
/// of the rule when the grammar comes from [`Grammar::load`](super::Grammar::load).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    MissingSeparator { line: usize },
    TooManySeparators { line: usize },
    InvalidLeftSide { line: usize, left: String },
    ReservedSymbol { line: usize, symbol: char },
    MisplacedEpsilon { line: usize },
    UndefinedNonTerminal { line: usize, name: char },
    Empty,
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::MissingSeparator { line } => {
                write!(f, "Line {}: missing \"=\" between left and right side", line)
            }
            GrammarError::TooManySeparators { line } => write!(f, "Line {}: too many \"=\"", line),
            GrammarError::InvalidLeftSide { line, left } => write!(
                f,
                "Line {}: left side \"{}\" is not a single uppercase letter",
                line, left
            ),
            GrammarError::ReservedSymbol { line, symbol } => write!(
                f,
                "Line {}: \"{}\" is reserved and cannot appear in a production",
                line, symbol
            ),
            GrammarError::MisplacedEpsilon { line } => write!(
                f,
                "Line {}: \"{}\" must be an alternative on its own",
                line, EPSILON
            ),
            GrammarError::UndefinedNonTerminal { line, name } => write!(
                f,
                "Line {}: non-terminal \"{}\" has no productions",
                line, name
            ),
            GrammarError::Empty => write!(f, "grammar has no productions"),
        }
    }
}

impl std::error::Error for GrammarError {}

/// Raised by the strict table builder when two productions claim one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    Ambiguous(Collision),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::Ambiguous(collision) => {
                write!(f, "grammar is not LL(1): {}", collision)
            }
        }
    }
}

impl std::error::Error for TableError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectReason {
    /// A terminal on top of the stack differs from the lookahead.
    UnexpectedTerminal { expected: char, found: Symbol },
    /// No table cell for the stack top and lookahead. `top` is `$` when
    /// the stack is done but input remains.
    NoTableEntry { top: Symbol, lookahead: Symbol },
    /// The table has a cell claimed by two productions; nothing is parsed.
    AmbiguousTable { non_terminal: char, lookahead: Symbol },
    StackExhausted,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::UnexpectedTerminal { expected, found } => write!(
                f,
                "unexpected terminal: expected '{}', found '{}'",
                expected, found
            ),
            RejectReason::NoTableEntry { top, lookahead } => {
                write!(f, "no table entry for [{}, {}]", top, lookahead)
            }
            RejectReason::AmbiguousTable {
                non_terminal,
                lookahead,
            } => write!(
                f,
                "table[{}, {}] is claimed by more than one production",
                non_terminal, lookahead
            ),
            RejectReason::StackExhausted => {
                write!(f, "stack exhausted before reaching '{}'", END_MARK)
            }
        }
    }
}

/// Why and where a parse stopped. `step` indexes the trace, `position` is
/// the 0-based input index of the lookahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParseError {
    pub reason: RejectReason,
    pub step: usize,
    pub position: usize,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (step {}, input position {})",
            self.reason, self.step, self.position
        )
    }
}

impl std::error::Error for ParseError {}
