use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use super::{FirstSets, FollowSets, Grammar, Production, Symbol, TableError};

/// A cell that was written more than once. `production` is what the cell
/// holds afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub non_terminal: char,
    pub lookahead: Symbol,
    pub replaced: Production,
    pub production: Production,
}

impl fmt::Display for Collision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "table[{0}, {1}]: {0} -> {2} replaced by {0} -> {3}",
            self.non_terminal, self.lookahead, self.replaced, self.production
        )
    }
}

/// Predictive parsing table, one row per non-terminal in grammar order.
/// Columns are the grammar's terminals followed by `$`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsingTable {
    columns: Vec<Symbol>,
    rows: IndexMap<char, BTreeMap<Symbol, Production>>,
    collisions: Vec<Collision>,
}

impl ParsingTable {
    pub fn get(&self, non_terminal: char, lookahead: Symbol) -> Option<&Production> {
        self.rows.get(&non_terminal)?.get(&lookahead)
    }

    pub fn columns(&self) -> &[Symbol] {
        &self.columns
    }

    pub fn rows(&self) -> impl Iterator<Item = (char, &BTreeMap<Symbol, Production>)> {
        self.rows.iter().map(|(name, row)| (*name, row))
    }

    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    /// Number of filled cells.
    pub fn len(&self) -> usize {
        self.rows.values().map(|row| row.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Grammar {
    /// Builds the table, refusing grammars where two writes hit one cell.
    pub fn build_ll1_table(
        &self,
        first: &FirstSets,
        follow: &FollowSets,
    ) -> Result<ParsingTable, TableError> {
        let table = self.build_ll1_table_lossy(first, follow);
        match table.collisions.first() {
            Some(collision) => Err(TableError::Ambiguous(collision.clone())),
            None => Ok(table),
        }
    }

    /// Builds the table even for non-LL(1) grammars. The last production to
    /// claim a cell keeps it; every overwrite is listed in
    /// [`ParsingTable::collisions`].
    pub fn build_ll1_table_lossy(&self, first: &FirstSets, follow: &FollowSets) -> ParsingTable {
        let columns: Vec<Symbol> = self
            .terminal_iter()
            .map(Symbol::Terminal)
            .chain(std::iter::once(Symbol::EndMark))
            .collect();

        let mut rows = IndexMap::new();
        let mut collisions = Vec::new();

        for nt in self.non_terminal_iter() {
            let mut row: BTreeMap<Symbol, Production> = BTreeMap::new();
            for production in &nt.productions {
                let production_first = first.of_symbols(production.symbols());

                let mut lookaheads: Vec<Symbol> = production_first
                    .iter()
                    .filter(|s| **s != Symbol::Epsilon)
                    .copied()
                    .collect();
                if production_first.contains(&Symbol::Epsilon) {
                    lookaheads.extend(follow.get(nt.name).into_iter().flatten().copied());
                }

                for lookahead in lookaheads {
                    if let Some(replaced) = row.insert(lookahead, production.clone()) {
                        collisions.push(Collision {
                            non_terminal: nt.name,
                            lookahead,
                            replaced,
                            production: production.clone(),
                        });
                    }
                }
            }
            rows.insert(nt.name, row);
        }

        ParsingTable {
            columns,
            rows,
            collisions,
        }
    }
}
