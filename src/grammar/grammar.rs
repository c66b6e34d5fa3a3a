use std::collections::BTreeSet;
use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::{Serialize, Serializer};

use super::{GrammarError, END_MARK, EPSILON};

/// One grammar symbol. Every symbol is a single character; uppercase
/// letters are non-terminals, everything else is a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Terminal(char),
    NonTerminal(char),
    Epsilon,
    EndMark,
}

impl Symbol {
    pub fn classify(c: char) -> Self {
        if c == EPSILON {
            Symbol::Epsilon
        } else if c == END_MARK {
            Symbol::EndMark
        } else if c.is_uppercase() {
            Symbol::NonTerminal(c)
        } else {
            Symbol::Terminal(c)
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Symbol::Terminal(c) | Symbol::NonTerminal(c) => *c,
            Symbol::Epsilon => EPSILON,
            Symbol::EndMark => END_MARK,
        }
    }

    pub fn non_terminal(&self) -> Option<char> {
        match self {
            Symbol::NonTerminal(c) => Some(*c),
            _ => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Right-hand side of a rule. An ε production is exactly `[Symbol::Epsilon]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
    symbols: Vec<Symbol>,
}

impl Production {
    pub fn epsilon() -> Self {
        Self {
            symbols: vec![Symbol::Epsilon],
        }
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn is_epsilon(&self) -> bool {
        self.symbols == [Symbol::Epsilon]
    }

    /// Reads one alternative. Whitespace is dropped and an empty
    /// alternative means ε.
    pub(super) fn read(text: &str, line: usize) -> Result<Self, GrammarError> {
        let symbols: Vec<Symbol> = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(Symbol::classify)
            .collect();

        if symbols.is_empty() {
            return Ok(Self::epsilon());
        }
        if symbols.contains(&Symbol::EndMark) {
            return Err(GrammarError::ReservedSymbol {
                line,
                symbol: END_MARK,
            });
        }
        if symbols.len() > 1 && symbols.contains(&Symbol::Epsilon) {
            return Err(GrammarError::MisplacedEpsilon { line });
        }

        Ok(Self { symbols })
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.symbols {
            write!(f, "{}", symbol)?;
        }
        Ok(())
    }
}

impl Serialize for Production {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonTerminal {
    pub name: char,
    pub productions: Vec<Production>,
}

impl NonTerminal {
    pub fn new(name: char) -> Self {
        Self {
            name,
            productions: Vec::new(),
        }
    }
}

/// An immutable grammar. The first rule's left side is the start symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    non_terminals: IndexMap<char, NonTerminal>,
    terminals: IndexSet<char>,
    start_symbol: char,
}

impl Grammar {
    /// Builds a grammar from `(left side, alternatives)` pairs, in order.
    /// A left side seen twice gets the new alternatives appended.
    pub fn load<I, R, S>(rules: I) -> Result<Self, GrammarError>
    where
        I: IntoIterator<Item = (char, R)>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GrammarBuilder::default();
        for (i, (left, rights)) in rules.into_iter().enumerate() {
            builder.add_rule(i + 1, left, rights)?;
        }
        builder.build()
    }

    pub fn start_symbol(&self) -> char {
        self.start_symbol
    }

    pub fn non_terminal_iter(&self) -> impl Iterator<Item = &NonTerminal> {
        self.non_terminals.values()
    }

    pub fn get_non_terminal(&self, name: char) -> Option<&NonTerminal> {
        self.non_terminals.get(&name)
    }

    /// Terminals in order of first appearance.
    pub fn terminal_iter(&self) -> impl Iterator<Item = char> + '_ {
        self.terminals.iter().copied()
    }

    /// Non-terminals that derive the empty string, found directly from the
    /// productions without going through FIRST.
    pub fn nullable(&self) -> BTreeSet<char> {
        let mut nullable = BTreeSet::new();
        let mut changed = true;
        while changed {
            changed = false;
            for nt in self.non_terminal_iter() {
                if nullable.contains(&nt.name) {
                    continue;
                }
                let derives_empty = nt.productions.iter().any(|production| {
                    production.symbols().iter().all(|s| match s {
                        Symbol::Epsilon => true,
                        Symbol::NonTerminal(name) => nullable.contains(name),
                        Symbol::Terminal(_) | Symbol::EndMark => false,
                    })
                });
                if derives_empty {
                    nullable.insert(nt.name);
                    changed = true;
                }
            }
        }
        nullable
    }
}

#[derive(Debug, Default)]
pub(super) struct GrammarBuilder {
    non_terminals: IndexMap<char, NonTerminal>,
    references: Vec<(usize, char)>,
}

impl GrammarBuilder {
    pub(super) fn add_rule<R, S>(
        &mut self,
        line: usize,
        left: char,
        rights: R,
    ) -> Result<(), GrammarError>
    where
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !left.is_uppercase() {
            return Err(GrammarError::InvalidLeftSide {
                line,
                left: left.to_string(),
            });
        }

        let mut productions = Vec::new();
        for right in rights {
            let production = Production::read(right.as_ref(), line)?;
            self.references.extend(
                production
                    .symbols()
                    .iter()
                    .filter_map(|s| s.non_terminal())
                    .map(|name| (line, name)),
            );
            productions.push(production);
        }

        self.non_terminals
            .entry(left)
            .or_insert_with(|| NonTerminal::new(left))
            .productions
            .extend(productions);
        Ok(())
    }

    pub(super) fn build(self) -> Result<Grammar, GrammarError> {
        let start_symbol = *self
            .non_terminals
            .keys()
            .next()
            .ok_or(GrammarError::Empty)?;

        if let Some(&(line, name)) = self
            .references
            .iter()
            .find(|(_, name)| !self.non_terminals.contains_key(name))
        {
            return Err(GrammarError::UndefinedNonTerminal { line, name });
        }

        let terminals = self
            .non_terminals
            .values()
            .flat_map(|nt| nt.productions.iter())
            .flat_map(|production| production.symbols().iter())
            .filter_map(|s| match s {
                Symbol::Terminal(c) => Some(*c),
                _ => None,
            })
            .collect();

        Ok(Grammar {
            non_terminals: self.non_terminals,
            terminals,
            start_symbol,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn classify_symbols() {
        assert_eq!(Symbol::classify('E'), Symbol::NonTerminal('E'));
        assert_eq!(Symbol::classify('+'), Symbol::Terminal('+'));
        assert_eq!(Symbol::classify('i'), Symbol::Terminal('i'));
        assert_eq!(Symbol::classify(EPSILON), Symbol::Epsilon);
        assert_eq!(Symbol::classify(END_MARK), Symbol::EndMark);
    }

    #[test]
    fn load_keeps_rule_and_alternative_order() {
        let g = Grammar::load(vec![
            ('E', vec!["TX"]),
            ('X', vec!["+TX", "ε"]),
            ('T', vec!["(E)", "i"]),
        ])
        .unwrap();

        assert_eq!(g.start_symbol(), 'E');
        let names: Vec<char> = g.non_terminal_iter().map(|nt| nt.name).collect();
        assert_eq!(names, vec!['E', 'X', 'T']);

        let x = g.get_non_terminal('X').unwrap();
        assert_eq!(x.productions[0].to_string(), "+TX");
        assert!(x.productions[1].is_epsilon());

        let terminals: Vec<char> = g.terminal_iter().collect();
        assert_eq!(terminals, vec!['+', '(', ')', 'i']);
    }

    #[test]
    fn repeated_left_side_appends() {
        let g = Grammar::load(vec![('S', vec!["a"]), ('S', vec!["b"])]).unwrap();
        let s = g.get_non_terminal('S').unwrap();
        assert_eq!(s.productions.len(), 2);
        assert_eq!(s.productions[1].to_string(), "b");
    }

    #[test]
    fn empty_alternative_is_epsilon() {
        let g = Grammar::load(vec![('S', vec!["a", ""])]).unwrap();
        assert!(g.get_non_terminal('S').unwrap().productions[1].is_epsilon());
    }

    #[test]
    fn undefined_non_terminal() {
        let e = Grammar::load(vec![('S', vec!["aB"])]).unwrap_err();
        assert_eq!(e, GrammarError::UndefinedNonTerminal { line: 1, name: 'B' });
    }

    #[test]
    fn reserved_and_misplaced_symbols() {
        assert_eq!(
            Grammar::load(vec![('S', vec!["a$"])]).unwrap_err(),
            GrammarError::ReservedSymbol {
                line: 1,
                symbol: '$'
            }
        );
        assert_eq!(
            Grammar::load(vec![('S', vec!["a"]), ('A', vec!["aε"])]).unwrap_err(),
            GrammarError::MisplacedEpsilon { line: 2 }
        );
        assert_eq!(
            Grammar::load(vec![('s', vec!["a"])]).unwrap_err(),
            GrammarError::InvalidLeftSide {
                line: 1,
                left: "s".to_string()
            }
        );
        assert_eq!(
            Grammar::load(Vec::<(char, Vec<&str>)>::new()).unwrap_err(),
            GrammarError::Empty
        );
    }

    #[test]
    fn nullable_through_chain() {
        let g = Grammar::load(vec![
            ('S', vec!["AB", "c"]),
            ('A', vec!["a", "ε"]),
            ('B', vec!["A"]),
        ])
        .unwrap();
        assert_eq!(g.nullable(), BTreeSet::from(['A', 'B', 'S']));
    }
}
