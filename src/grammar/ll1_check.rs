use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use super::{FirstSets, FollowSets, Grammar, Production, Symbol, EPSILON};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Conflict {
    /// Two alternatives share a lookahead terminal.
    FirstFirst {
        non_terminal: char,
        left: Production,
        right: Production,
        terminals: BTreeSet<Symbol>,
    },
    /// The non-terminal can vanish and FIRST overlaps FOLLOW.
    FirstFollow {
        non_terminal: char,
        terminals: BTreeSet<Symbol>,
    },
    /// Two alternatives both derive ε.
    NullableAlternatives {
        non_terminal: char,
        left: Production,
        right: Production,
    },
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(set: &BTreeSet<Symbol>) -> String {
            set.iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        }

        match self {
            Conflict::FirstFirst {
                non_terminal,
                left,
                right,
                terminals,
            } => write!(
                f,
                "FIRST({0} -> {1}) ^ FIRST({0} -> {2}) = {{ {3} }}",
                non_terminal,
                left,
                right,
                join(terminals)
            ),
            Conflict::FirstFollow {
                non_terminal,
                terminals,
            } => write!(
                f,
                "FIRST({0}) ^ FOLLOW({0}) = {{ {1} }} ({2} in FIRST)",
                non_terminal,
                join(terminals),
                EPSILON
            ),
            Conflict::NullableAlternatives {
                non_terminal,
                left,
                right,
            } => write!(
                f,
                "{0} -> {1} and {0} -> {2} both derive {3}",
                non_terminal, left, right, EPSILON
            ),
        }
    }
}

/// Every LL(1) violation of a grammar, in grammar order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Ll1Report {
    pub conflicts: Vec<Conflict>,
}

impl Ll1Report {
    pub fn is_ll1(&self) -> bool {
        self.conflicts.is_empty()
    }
}

impl Grammar {
    pub fn check_ll1(&self, first: &FirstSets, follow: &FollowSets) -> Ll1Report {
        let mut conflicts = Vec::new();

        for nt in self.non_terminal_iter() {
            let firsts: Vec<BTreeSet<Symbol>> = nt
                .productions
                .iter()
                .map(|production| first.of_symbols(production.symbols()))
                .collect();

            for i in 0..firsts.len() {
                for j in i + 1..firsts.len() {
                    let terminals: BTreeSet<Symbol> = firsts[i]
                        .intersection(&firsts[j])
                        .filter(|s| **s != Symbol::Epsilon)
                        .copied()
                        .collect();
                    if !terminals.is_empty() {
                        conflicts.push(Conflict::FirstFirst {
                            non_terminal: nt.name,
                            left: nt.productions[i].clone(),
                            right: nt.productions[j].clone(),
                            terminals,
                        });
                    }

                    if firsts[i].contains(&Symbol::Epsilon) && firsts[j].contains(&Symbol::Epsilon)
                    {
                        conflicts.push(Conflict::NullableAlternatives {
                            non_terminal: nt.name,
                            left: nt.productions[i].clone(),
                            right: nt.productions[j].clone(),
                        });
                    }
                }
            }

            if first.derives_epsilon(nt.name) {
                let empty = BTreeSet::new();
                let nt_first = first.get(nt.name).unwrap_or(&empty);
                let nt_follow = follow.get(nt.name).unwrap_or(&empty);
                let terminals: BTreeSet<Symbol> = nt_first
                    .intersection(nt_follow)
                    .filter(|s| **s != Symbol::Epsilon)
                    .copied()
                    .collect();
                if !terminals.is_empty() {
                    conflicts.push(Conflict::FirstFollow {
                        non_terminal: nt.name,
                        terminals,
                    });
                }
            }
        }

        Ll1Report { conflicts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn report(grammar: &str) -> (Grammar, Ll1Report) {
        let g = Grammar::parse(grammar).unwrap();
        let first = g.calculate_first();
        let follow = g.calculate_follow(&first);
        let report = g.check_ll1(&first, &follow);
        (g, report)
    }

    #[test]
    fn expression_is_ll1() {
        let (_, report) = report("E=TX\nX=+TX/ε\nT=(E)/i");
        assert!(report.is_ll1());
    }

    #[test]
    fn common_prefix_is_first_first() {
        let (g, report) = report("S=A\nA=ab/ac");
        let a = g.get_non_terminal('A').unwrap();
        assert!(!report.is_ll1());
        assert_eq!(
            report.conflicts,
            vec![Conflict::FirstFirst {
                non_terminal: 'A',
                left: a.productions[0].clone(),
                right: a.productions[1].clone(),
                terminals: [Symbol::Terminal('a')].into_iter().collect(),
            }]
        );
        assert_eq!(
            report.conflicts[0].to_string(),
            "FIRST(A -> ab) ^ FIRST(A -> ac) = { a }"
        );
    }

    #[test]
    fn overlap_through_nullable_prefix() {
        let (_, report) = report("S=Bx/x\nB=b/ε");
        assert_eq!(report.conflicts.len(), 1);
        assert!(matches!(
            report.conflicts[0],
            Conflict::FirstFirst {
                non_terminal: 'S',
                ..
            }
        ));
    }

    #[test]
    fn nullable_non_terminal_followed_by_its_first() {
        let (_, report) = report("S=Aa\nA=a/ε");
        assert_eq!(
            report.conflicts,
            vec![Conflict::FirstFollow {
                non_terminal: 'A',
                terminals: [Symbol::Terminal('a')].into_iter().collect(),
            }]
        );
        assert_eq!(
            report.conflicts[0].to_string(),
            "FIRST(A) ^ FOLLOW(A) = { a } (ε in FIRST)"
        );
    }

    #[test]
    fn two_vanishing_alternatives() {
        let (_, report) = report("S=Ab\nA=B/ε\nB=ε");
        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].to_string(), "A -> B and A -> ε both derive ε");
    }

    #[test]
    fn all_conflicts_are_collected() {
        let (_, report) = report("S=ab/ac/Aa\nA=a/ε");
        let kinds: Vec<String> = report
            .conflicts
            .iter()
            .map(|c| match c {
                Conflict::FirstFirst { non_terminal, .. } => format!("first/first {}", non_terminal),
                Conflict::FirstFollow { non_terminal, .. } => format!("first/follow {}", non_terminal),
                Conflict::NullableAlternatives { non_terminal, .. } => {
                    format!("nullable {}", non_terminal)
                }
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                "first/first S",
                "first/first S",
                "first/first S",
                "first/follow A"
            ]
        );
    }
}
