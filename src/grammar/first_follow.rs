use std::collections::BTreeSet;

use indexmap::IndexMap;

use super::{Grammar, Symbol};

/// FIRST set of every non-terminal. A set holds terminals and, when the
/// non-terminal derives the empty string, [`Symbol::Epsilon`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstSets(IndexMap<char, BTreeSet<Symbol>>);

impl FirstSets {
    pub fn get(&self, name: char) -> Option<&BTreeSet<Symbol>> {
        self.0.get(&name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &BTreeSet<Symbol>)> {
        self.0.iter().map(|(name, set)| (*name, set))
    }

    pub fn derives_epsilon(&self, name: char) -> bool {
        self.get(name)
            .map_or(false, |set| set.contains(&Symbol::Epsilon))
    }

    /// FIRST of a symbol string, scanned left to right. Contains ε when
    /// every symbol can vanish, which includes the empty string.
    pub fn of_symbols(&self, symbols: &[Symbol]) -> BTreeSet<Symbol> {
        let mut first = BTreeSet::new();
        for symbol in symbols {
            match symbol {
                Symbol::Terminal(_) | Symbol::EndMark => {
                    first.insert(*symbol);
                    return first;
                }
                Symbol::NonTerminal(name) => {
                    let set = match self.get(*name) {
                        Some(set) => set,
                        None => return first,
                    };
                    first.extend(set.iter().filter(|s| **s != Symbol::Epsilon));
                    if !set.contains(&Symbol::Epsilon) {
                        return first;
                    }
                }
                Symbol::Epsilon => {}
            }
        }
        first.insert(Symbol::Epsilon);
        first
    }

    /// One pass over every production. Returns whether any set grew.
    pub fn refine(&mut self, grammar: &Grammar) -> bool {
        let mut changed = false;
        for nt in grammar.non_terminal_iter() {
            for production in &nt.productions {
                let first = self.of_symbols(production.symbols());
                let entry = self.0.entry(nt.name).or_default();
                for symbol in first {
                    changed |= entry.insert(symbol);
                }
            }
        }
        changed
    }
}

/// FOLLOW set of every non-terminal: terminals and possibly [`Symbol::EndMark`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowSets(IndexMap<char, BTreeSet<Symbol>>);

impl FollowSets {
    pub fn get(&self, name: char) -> Option<&BTreeSet<Symbol>> {
        self.0.get(&name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &BTreeSet<Symbol>)> {
        self.0.iter().map(|(name, set)| (*name, set))
    }

    /// One pass over every occurrence of a non-terminal on a right side.
    /// Returns whether any set grew.
    pub fn refine(&mut self, grammar: &Grammar, first: &FirstSets) -> bool {
        let mut changed = false;
        for left in grammar.non_terminal_iter() {
            for production in &left.productions {
                if production.is_epsilon() {
                    continue;
                }
                let symbols = production.symbols();
                for (i, symbol) in symbols.iter().enumerate() {
                    let name = match symbol.non_terminal() {
                        Some(name) => name,
                        None => continue,
                    };

                    let rest = first.of_symbols(&symbols[i + 1..]);
                    let mut follow: Vec<Symbol> = rest
                        .iter()
                        .filter(|s| **s != Symbol::Epsilon)
                        .copied()
                        .collect();
                    if rest.contains(&Symbol::Epsilon) {
                        follow.extend(self.get(left.name).into_iter().flatten().copied());
                    }

                    let entry = self.0.entry(name).or_default();
                    for symbol in follow {
                        changed |= entry.insert(symbol);
                    }
                }
            }
        }
        changed
    }
}

impl Grammar {
    pub fn calculate_first(&self) -> FirstSets {
        let mut first = FirstSets(
            self.non_terminal_iter()
                .map(|nt| (nt.name, BTreeSet::new()))
                .collect(),
        );
        while first.refine(self) {}
        first
    }

    /// `$` is put into FOLLOW of the start symbol before iterating.
    pub fn calculate_follow(&self, first: &FirstSets) -> FollowSets {
        let mut follow = FollowSets(
            self.non_terminal_iter()
                .map(|nt| (nt.name, BTreeSet::new()))
                .collect(),
        );
        follow
            .0
            .entry(self.start_symbol())
            .or_default()
            .insert(Symbol::EndMark);
        while follow.refine(self, first) {}
        follow
    }
}
