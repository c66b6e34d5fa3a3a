use super::{FirstSets, FollowSets, Grammar, Ll1Report, ParsingTable};

/// Everything computed once per grammar. The table is present even when
/// the grammar is not LL(1); check [`Analysis::is_ll1`] before parsing with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub first: FirstSets,
    pub follow: FollowSets,
    pub report: Ll1Report,
    pub table: ParsingTable,
}

impl Analysis {
    pub fn is_ll1(&self) -> bool {
        self.report.is_ll1()
    }
}

impl Grammar {
    pub fn analyze(&self) -> Analysis {
        let first = self.calculate_first();
        let follow = self.calculate_follow(&first);
        let report = self.check_ll1(&first, &follow);
        let table = self.build_ll1_table_lossy(&first, &follow);
        Analysis {
            first,
            follow,
            report,
            table,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Grammar;

    #[test]
    fn table_is_returned_for_non_ll1_grammar() {
        let analysis = Grammar::parse("S=ab/ac").unwrap().analyze();
        assert!(!analysis.is_ll1());
        assert_eq!(analysis.table.len(), 1);
        assert_eq!(analysis.table.collisions().len(), 1);
    }

    #[test]
    fn no_conflicts_means_no_collisions() {
        for grammar in [
            "E=TX\nX=+TX/ε\nT=(E)/i",
            "S=ab/ac",
            "S=Aa\nA=a/ε",
            "S=Ab\nA=B/ε\nB=ε",
            "S=Bx/x\nB=b/ε",
            "S=aSb/Ac\nA=d/ε",
        ] {
            let analysis = Grammar::parse(grammar).unwrap().analyze();
            assert_eq!(
                analysis.is_ll1(),
                analysis.table.collisions().is_empty(),
                "{}",
                grammar
            );
        }
    }
}
