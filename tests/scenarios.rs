use std::collections::BTreeSet;

use ll1_course_helper::grammar::{
    Conflict, Grammar, ParseError, ParsingTable, RejectReason,
    Symbol::{self, EndMark, Epsilon, NonTerminal, Terminal},
};
use pretty_assertions::assert_eq;

const EXPRESSION: &str = "E=TX\nX=+TX/ε\nT=(E)/i";

const SAMPLES: &[&str] = &[
    EXPRESSION,
    "S=aSb/c",
    "S=aS/ε",
    "A=ab/ac",
    "S=Aa\nA=a/ε",
    "S=AB\nA=a/ε\nB=b/ε",
    "S=Ab\nA=B/ε\nB=ε",
    "S=Bx/x\nB=b/ε",
    "S=aSb/Ac\nA=d/ε",
    "S=iEtSX/a\nX=eS/ε\nE=b",
];

fn ll1_table(text: &str) -> (Grammar, ParsingTable) {
    let g = Grammar::parse(text).unwrap();
    let first = g.calculate_first();
    let follow = g.calculate_follow(&first);
    let table = g.build_ll1_table(&first, &follow).unwrap();
    (g, table)
}

#[test]
fn expression_grammar() {
    let g = Grammar::parse(EXPRESSION).unwrap();
    let analysis = g.analyze();

    assert_eq!(
        analysis.first.get('T'),
        Some(&BTreeSet::from([Terminal('('), Terminal('i')]))
    );
    let first_x = analysis.first.get('X').unwrap();
    assert!(first_x.contains(&Terminal('+')));
    assert!(first_x.contains(&Epsilon));
    assert_eq!(
        analysis.follow.get('E'),
        Some(&BTreeSet::from([Terminal(')'), EndMark]))
    );
    assert!(analysis.is_ll1());

    let result = analysis.table.parse(&g, "i+i");
    assert!(result.is_accepted());
}

#[test]
fn shared_prefix_is_first_first_conflict() {
    let analysis = Grammar::parse("A=ab/ac").unwrap().analyze();
    assert!(!analysis.is_ll1());
    assert_eq!(analysis.report.conflicts.len(), 1);
    match &analysis.report.conflicts[0] {
        Conflict::FirstFirst {
            non_terminal,
            left,
            right,
            terminals,
        } => {
            assert_eq!(*non_terminal, 'A');
            assert_eq!(left.to_string(), "ab");
            assert_eq!(right.to_string(), "ac");
            assert_eq!(terminals, &BTreeSet::from([Terminal('a')]));
        }
        other => panic!("unexpected conflict: {}", other),
    }
}

#[test]
fn mismatched_terminal_is_rejected_where_it_happens() {
    let (g, table) = ll1_table(EXPRESSION);
    let result = table.parse(&g, "(i");
    assert_eq!(
        result.error(),
        Some(&ParseError {
            reason: RejectReason::UnexpectedTerminal {
                expected: ')',
                found: EndMark,
            },
            step: result.steps.len() - 1,
            position: 2,
        })
    );
}

#[test]
fn exhausted_input_has_no_table_entry() {
    let (g, table) = ll1_table("S=aSb/c");
    let result = table.parse(&g, "aa");
    assert_eq!(
        result.error().map(|e| (e.reason, e.position)),
        Some((
            RejectReason::NoTableEntry {
                top: NonTerminal('S'),
                lookahead: EndMark,
            },
            2
        ))
    );
}

#[test]
fn epsilon_in_first_iff_nullable() {
    for text in SAMPLES {
        let g = Grammar::parse(text).unwrap();
        let first = g.calculate_first();
        let nullable = g.nullable();
        for nt in g.non_terminal_iter() {
            assert_eq!(
                first.derives_epsilon(nt.name),
                nullable.contains(&nt.name),
                "{} in {:?}",
                nt.name,
                text
            );
        }
    }
}

#[test]
fn end_mark_follows_start_symbol() {
    for text in SAMPLES {
        let g = Grammar::parse(text).unwrap();
        let follow = g.calculate_follow(&g.calculate_first());
        assert!(
            follow.get(g.start_symbol()).unwrap().contains(&EndMark),
            "{:?}",
            text
        );
    }
}

#[test]
fn fixpoint_is_idempotent() {
    for text in SAMPLES {
        let g = Grammar::parse(text).unwrap();
        let first = g.calculate_first();
        let follow = g.calculate_follow(&first);

        let mut first_again = first.clone();
        assert!(!first_again.refine(&g), "{:?}", text);
        assert_eq!(first_again, first);

        let mut follow_again = follow.clone();
        assert!(!follow_again.refine(&g, &first), "{:?}", text);
        assert_eq!(follow_again, follow);
    }
}

#[test]
fn conflicts_iff_collisions() {
    for text in SAMPLES {
        let analysis = Grammar::parse(text).unwrap().analyze();
        assert_eq!(
            analysis.report.conflicts.is_empty(),
            analysis.table.collisions().is_empty(),
            "{:?}",
            text
        );
    }
}

#[test]
fn table_construction_is_deterministic() {
    for text in SAMPLES {
        let g = Grammar::parse(text).unwrap();
        assert_eq!(g.analyze(), g.analyze(), "{:?}", text);
    }
}

#[test]
fn accepted_frontier_reproduces_input() {
    let cases: &[(&str, &[&str])] = &[
        (EXPRESSION, &["i", "i+i", "(i+i)+i", "((i))"]),
        ("S=aSb/c", &["c", "acb", "aacbb"]),
        ("S=aS/ε", &["", "a", "aaaa"]),
        ("S=AB\nA=a/ε\nB=b/ε", &["", "a", "b", "ab"]),
    ];
    for (text, inputs) in cases {
        let (g, table) = ll1_table(text);
        for input in *inputs {
            let result = table.parse(&g, input);
            assert_eq!(
                result.tree().map(|t| t.frontier()),
                Some(input.to_string()),
                "{:?} on {:?}",
                input,
                text
            );
        }
    }
}

#[test]
fn rejection_does_not_affect_later_parses() {
    let (g, table) = ll1_table(EXPRESSION);
    assert!(!table.parse(&g, "i+").is_accepted());
    assert!(!table.parse(&g, "$").is_accepted());
    assert!(table.parse(&g, "i+i").is_accepted());
    assert_eq!(
        table.parse(&g, "x").error().map(|e| e.reason),
        Some(RejectReason::NoTableEntry {
            top: Symbol::NonTerminal('E'),
            lookahead: Terminal('x'),
        })
    );
}

#[test]
fn analyzed_tables_always_terminate() {
    for text in SAMPLES {
        let g = Grammar::parse(text).unwrap();
        let analysis = g.analyze();
        for input in ["", "b", "ab", "ibtaea", "i+i"] {
            let result = analysis.table.parse(&g, input);
            if !analysis.is_ll1() {
                assert!(
                    matches!(
                        result.error().map(|e| e.reason),
                        Some(RejectReason::AmbiguousTable { .. })
                    ),
                    "{:?} on {:?}",
                    input,
                    text
                );
            }
        }
    }
    let g = Grammar::parse("S=b/Sa").unwrap();
    assert!(!g.analyze().table.parse(&g, "baa").is_accepted());
}

#[test]
fn two_nullable_alternatives_share_a_cell() {
    let analysis = Grammar::parse("S=Ab\nA=B/ε\nB=ε").unwrap().analyze();
    assert!(matches!(
        analysis.report.conflicts.as_slice(),
        [Conflict::NullableAlternatives { non_terminal: 'A', .. }]
    ));
    let collision = &analysis.table.collisions()[0];
    assert_eq!(
        (collision.non_terminal, collision.lookahead),
        ('A', Terminal('b'))
    );
    assert_eq!(collision.replaced.to_string(), "B");
    assert!(collision.production.is_epsilon());
}
