use std::fmt;

use serde::Serialize;

use super::{
    parse_tree::{NodeId, TreeArena},
    Grammar, ParseError, ParseTree, ParsingTable, Production, RejectReason, Symbol,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    Match { terminal: char },
    Apply { non_terminal: char, production: Production },
    Accept,
    Error { reason: RejectReason },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Match { terminal } => write!(f, "Match '{}'", terminal),
            Action::Apply {
                non_terminal,
                production,
            } => write!(f, "Apply: {} -> {}", non_terminal, production),
            Action::Accept => write!(f, "Accept"),
            Action::Error { reason } => write!(f, "Error: {}", reason),
        }
    }
}

/// The machine state before one transition, and the transition taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseStep {
    /// Bottom first.
    pub stack: Vec<Symbol>,
    /// Index of the lookahead in [`ParseResult::input`].
    pub position: usize,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Accepted(ParseTree),
    Rejected(ParseError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseResult {
    pub outcome: Outcome,
    /// The whole input followed by the end marker.
    pub input: Vec<Symbol>,
    pub steps: Vec<ParseStep>,
}

impl ParseResult {
    /// Unread input at `step`, end marker included.
    pub fn remaining(&self, step: &ParseStep) -> &[Symbol] {
        self.input.get(step.position..).unwrap_or(&[])
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self.outcome, Outcome::Accepted(_))
    }

    pub fn tree(&self) -> Option<&ParseTree> {
        match &self.outcome {
            Outcome::Accepted(tree) => Some(tree),
            Outcome::Rejected(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ParseError> {
        match &self.outcome {
            Outcome::Accepted(_) => None,
            Outcome::Rejected(error) => Some(error),
        }
    }
}

struct Machine<'a> {
    table: &'a ParsingTable,
    input: Vec<Symbol>,
    position: usize,
    stack: Vec<Symbol>,
    nodes: Vec<NodeId>,
    arena: TreeArena,
    steps: Vec<ParseStep>,
}

impl Machine<'_> {
    fn record(&mut self, action: Action) {
        self.steps.push(ParseStep {
            stack: self.stack.clone(),
            position: self.position,
            action,
        });
    }

    fn reject(mut self, reason: RejectReason) -> ParseResult {
        let error = ParseError {
            reason,
            step: self.steps.len(),
            position: self.position,
        };
        self.record(Action::Error { reason });
        ParseResult {
            outcome: Outcome::Rejected(error),
            input: self.input,
            steps: self.steps,
        }
    }

    fn expand(&mut self, non_terminal: char, production: &Production) -> bool {
        self.record(Action::Apply {
            non_terminal,
            production: production.clone(),
        });
        self.stack.pop();
        let parent = match self.nodes.pop() {
            Some(parent) => parent,
            None => return false,
        };

        if production.is_epsilon() {
            let leaf = self.arena.new_node(Symbol::Epsilon);
            self.arena.set_children(parent, vec![leaf]);
            return true;
        }

        let children: Vec<NodeId> = production
            .symbols()
            .iter()
            .map(|symbol| self.arena.new_node(*symbol))
            .collect();
        for (symbol, child) in production.symbols().iter().zip(&children).rev() {
            self.stack.push(*symbol);
            self.nodes.push(*child);
        }
        self.arena.set_children(parent, children);
        true
    }

    fn run(mut self, root: NodeId) -> ParseResult {
        let table = self.table;
        while let Some(&top) = self.stack.last() {
            let lookahead = self.input[self.position];
            match top {
                Symbol::EndMark if lookahead == Symbol::EndMark => {
                    self.record(Action::Accept);
                    let outcome = match self.arena.into_tree(root) {
                        Some(tree) => Outcome::Accepted(tree),
                        None => Outcome::Rejected(ParseError {
                            reason: RejectReason::StackExhausted,
                            step: self.steps.len() - 1,
                            position: self.position,
                        }),
                    };
                    return ParseResult {
                        outcome,
                        input: self.input,
                        steps: self.steps,
                    };
                }
                Symbol::Terminal(expected) if top == lookahead => {
                    self.record(Action::Match { terminal: expected });
                    self.stack.pop();
                    self.nodes.pop();
                    self.position += 1;
                }
                Symbol::Terminal(expected) => {
                    return self.reject(RejectReason::UnexpectedTerminal {
                        expected,
                        found: lookahead,
                    });
                }
                Symbol::NonTerminal(name) => match table.get(name, lookahead) {
                    Some(production) => {
                        if !self.expand(name, production) {
                            break;
                        }
                    }
                    None => {
                        return self.reject(RejectReason::NoTableEntry { top, lookahead });
                    }
                },
                Symbol::EndMark | Symbol::Epsilon => {
                    return self.reject(RejectReason::NoTableEntry { top, lookahead });
                }
            }
        }

        self.reject(RejectReason::StackExhausted)
    }
}

impl ParsingTable {
    /// Runs the predictive parser over `input`, one terminal per character.
    /// A table with collisions is refused before the first transition.
    pub fn parse(&self, grammar: &Grammar, input: &str) -> ParseResult {
        let start = Symbol::NonTerminal(grammar.start_symbol());
        let mut arena = TreeArena::default();
        let root = arena.new_node(start);

        let machine = Machine {
            table: self,
            input: input
                .chars()
                .map(Symbol::Terminal)
                .chain(std::iter::once(Symbol::EndMark))
                .collect(),
            position: 0,
            stack: vec![Symbol::EndMark, start],
            nodes: vec![root],
            arena,
            steps: Vec::new(),
        };
        match self.collisions().first() {
            Some(collision) => machine.reject(RejectReason::AmbiguousTable {
                non_terminal: collision.non_terminal,
                lookahead: collision.lookahead,
            }),
            None => machine.run(root),
        }
    }
}
