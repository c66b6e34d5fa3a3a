use std::collections::BTreeSet;

use crowbook_text_processing::escape;
use serde::Serialize;

use super::{
    Analysis, Collision, Conflict, FirstSets, FollowSets, Grammar, Ll1Report, ParseResult,
    ParseTree, ParsingTable, Production, Symbol, EPSILON,
};

fn latex_symbol(s: &str) -> String {
    escape::tex(s).replace(EPSILON, r"\epsilon ")
}

/// Pads every column to its widest cell.
fn column_widths(rows: &[Vec<String>]) -> Vec<usize> {
    let columns = rows.iter().map(|row| row.len()).max().unwrap_or(0);
    (0..columns)
        .map(|j| {
            rows.iter()
                .filter_map(|row| row.get(j))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct ProductionOutput<'a> {
    pub left: char,
    pub rights: Vec<&'a Production>,
}

impl ProductionOutput<'_> {
    pub fn to_plaintext(&self, multiline: bool) -> String {
        self.rights
            .iter()
            .enumerate()
            .map(|(i, right)| {
                if i == 0 {
                    format!("{} -> {}", self.left, right)
                } else if multiline {
                    format!("   | {}", right)
                } else {
                    format!(" | {}", right)
                }
            })
            .collect::<Vec<_>>()
            .join(if multiline { "\n" } else { "" })
    }

    pub fn to_latex(&self, and_sign: bool) -> String {
        if self.rights.is_empty() {
            return String::new();
        }

        let left = if and_sign {
            format!("{} & \\rightarrow &", self.left)
        } else {
            format!("{} \\rightarrow ", self.left)
        };
        let right = self
            .rights
            .iter()
            .map(|right| {
                right
                    .symbols()
                    .iter()
                    .map(|s| latex_symbol(&s.to_string()))
                    .collect::<Vec<_>>()
                    .join(" \\ ")
            })
            .collect::<Vec<_>>()
            .join(" \\mid ");

        left + &right
    }
}

pub struct ProductionOutputVec<'a> {
    productions: Vec<ProductionOutput<'a>>,
}

impl ProductionOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        self.productions
            .iter()
            .map(|s| s.to_plaintext(true))
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        std::iter::once("\\[\\begin{array}{cll}".to_string())
            .chain(self.productions.iter().map(|s| s.to_latex(true)))
            .chain(std::iter::once("\\end{array}\\]".to_string()))
            .collect::<Vec<String>>()
            .join("\\\\\n")
    }
}

impl Grammar {
    pub fn to_production_output_vec(&self) -> ProductionOutputVec {
        let productions = self
            .non_terminal_iter()
            .map(|nt| ProductionOutput {
                left: nt.name,
                rights: nt.productions.iter().collect(),
            })
            .collect();
        ProductionOutputVec { productions }
    }
}

#[derive(Serialize)]
struct NonTerminalOutput {
    name: char,
    nullable: bool,
    first: Vec<String>,
    follow: Vec<String>,
}

impl NonTerminalOutput {
    fn to_latex(&self) -> String {
        fn f(a: &[String]) -> String {
            a.iter()
                .map(|s| format!("${}$", latex_symbol(s)))
                .collect::<Vec<_>>()
                .join(r"\ ")
        }

        format!(
            "{} & {} & {} & {}",
            self.name,
            self.nullable,
            f(&self.first),
            f(&self.follow)
        )
    }
}

#[derive(Serialize)]
pub struct NonTerminalOutputVec {
    data: Vec<NonTerminalOutput>,
}

impl NonTerminalOutputVec {
    pub fn to_plaintext(&self) -> String {
        let first = self
            .data
            .iter()
            .map(|s| format!("FIRST({}) = {{ {} }}", s.name, s.first.join(", ")));
        let follow = self
            .data
            .iter()
            .map(|s| format!("FOLLOW({}) = {{ {} }}", s.name, s.follow.join(", ")));

        std::iter::once("FIRST Sets:".to_string())
            .chain(first)
            .chain(std::iter::once(String::new()))
            .chain(std::iter::once("FOLLOW Sets:".to_string()))
            .chain(follow)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_latex(&self) -> String {
        let content = self
            .data
            .iter()
            .map(|e| e.to_latex())
            .collect::<Vec<_>>()
            .join("\\\\\n ");

        "\\begin{tabular}{c|c|c|c}\n".to_string()
            + "Symbol & Nullable & First & Follow\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }
}

impl Grammar {
    pub fn to_non_terminal_output_vec(
        &self,
        first: &FirstSets,
        follow: &FollowSets,
    ) -> NonTerminalOutputVec {
        fn names(set: Option<&BTreeSet<Symbol>>) -> Vec<String> {
            set.into_iter().flatten().map(|s| s.to_string()).collect()
        }

        let data = self
            .non_terminal_iter()
            .map(|nt| NonTerminalOutput {
                name: nt.name,
                nullable: first.derives_epsilon(nt.name),
                first: names(first.get(nt.name)),
                follow: names(follow.get(nt.name)),
            })
            .collect();
        NonTerminalOutputVec { data }
    }
}

#[derive(Serialize)]
pub struct LL1ParsingTableOutput<'a> {
    terminals: Vec<Symbol>,
    rows: Vec<(char, Vec<Option<&'a Production>>)>,
}

impl LL1ParsingTableOutput<'_> {
    /// Bordered grid; empty cells are `-`.
    pub fn to_plaintext(&self) -> String {
        let mut grid: Vec<Vec<String>> = vec![std::iter::once("NT".to_string())
            .chain(self.terminals.iter().map(|t| t.to_string()))
            .collect()];
        for (left, row) in &self.rows {
            grid.push(
                std::iter::once(left.to_string())
                    .chain(row.iter().map(|cell| match cell {
                        Some(production) => format!("{} -> {}", left, production),
                        None => "-".to_string(),
                    }))
                    .collect(),
            );
        }

        let width: Vec<usize> = column_widths(&grid).into_iter().map(|w| w + 2).collect();
        let separator = format!(
            "+{}+",
            width
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("+")
        );

        let mut lines = vec![separator.clone()];
        for line in &grid {
            lines.push(format!(
                "|{}|",
                line.iter()
                    .enumerate()
                    .map(|(i, s)| format!("{:<width$}", s, width = width[i]))
                    .collect::<Vec<_>>()
                    .join("|")
            ));
            lines.push(separator.clone());
        }
        lines.join("\n")
    }

    pub fn to_latex(&self) -> String {
        let mut header: Vec<String> = vec![format!(
            "\\[\\begin{{array}}{{c{}}}\n",
            "|l".repeat(self.terminals.len()),
        )];
        header.extend(
            self.terminals
                .iter()
                .map(|t| format!("\\text{{{}}}", latex_symbol(&t.to_string()))),
        );
        let header = header.join(" & ");

        let mut output: Vec<String> = Vec::new();
        for (left, row) in &self.rows {
            let mut line: Vec<String> = vec![left.to_string()];
            line.extend(row.iter().map(|cell| match cell {
                Some(production) => ProductionOutput {
                    left: *left,
                    rights: vec![*production],
                }
                .to_latex(false),
                None => String::new(),
            }));
            output.push(line.join(" & "));
        }

        let output = output.join("\\\\\n");

        header + "\\\\\\hline\n" + &output + "\n\\end{array}\\]"
    }
}

impl ParsingTable {
    pub fn to_output(&self) -> LL1ParsingTableOutput {
        let terminals = self.columns().to_vec();
        let rows = self
            .rows()
            .map(|(left, row)| {
                (
                    left,
                    terminals.iter().map(|t| row.get(t)).collect::<Vec<_>>(),
                )
            })
            .collect();
        LL1ParsingTableOutput { terminals, rows }
    }
}

impl Ll1Report {
    pub fn to_plaintext(&self) -> String {
        if self.is_ll1() {
            return "All LL(1) conditions satisfied.".to_string();
        }
        self.conflicts
            .iter()
            .map(|c| format!("Conflict: {}", c))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Serialize)]
pub struct AnalysisOutput<'a> {
    sets: NonTerminalOutputVec,
    ll1: bool,
    conflicts: &'a [Conflict],
    table: LL1ParsingTableOutput<'a>,
    collisions: &'a [Collision],
}

impl AnalysisOutput<'_> {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Analysis {
    pub fn to_output<'a>(&'a self, grammar: &Grammar) -> AnalysisOutput<'a> {
        AnalysisOutput {
            sets: grammar.to_non_terminal_output_vec(&self.first, &self.follow),
            ll1: self.is_ll1(),
            conflicts: &self.report.conflicts,
            table: self.table.to_output(),
            collisions: self.table.collisions(),
        }
    }
}

impl ParseResult {
    /// Stack, remaining input and action for every step.
    pub fn trace_to_plaintext(&self) -> String {
        fn join(symbols: &[Symbol], separator: &str) -> String {
            symbols
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(separator)
        }

        let mut rows: Vec<Vec<String>> =
            vec![vec!["Stack".to_string(), "Input".to_string(), "Action".to_string()]];
        rows.extend(self.steps.iter().map(|step| {
            vec![
                join(&step.stack, " "),
                join(self.remaining(step), ""),
                step.action.to_string(),
            ]
        }));

        let width = column_widths(&rows);
        rows.iter()
            .map(|row| {
                format!(
                    "{:<w0$}   {:<w1$}   {}",
                    row[0],
                    row[1],
                    row[2],
                    w0 = width[0],
                    w1 = width[1]
                )
                .trim_end()
                .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

const SIBLING_GAP: usize = 2;

struct PlacedNode {
    depth: usize,
    center: usize,
    label: String,
    children: Vec<usize>,
}

impl ParseTree {
    fn label(&self) -> String {
        if self.is_terminal() {
            format!("[{}]", self.symbol)
        } else {
            self.symbol.to_string()
        }
    }

    fn width(&self) -> usize {
        let label = self.label().chars().count();
        if self.children.is_empty() {
            return label;
        }
        let children: usize = self.children.iter().map(|c| c.width()).sum::<usize>()
            + SIBLING_GAP * (self.children.len() - 1);
        label.max(children)
    }

    /// Lays out the subtree in `[left, left + width)` and returns its center.
    fn place(&self, left: usize, depth: usize, out: &mut Vec<PlacedNode>) -> usize {
        let width = self.width();
        let mut children = Vec::new();
        let center = if self.children.is_empty() {
            left + width / 2
        } else {
            let total: usize = self.children.iter().map(|c| c.width()).sum::<usize>()
                + SIBLING_GAP * (self.children.len() - 1);
            let mut x = left + (width - total) / 2;
            for child in &self.children {
                children.push(child.place(x, depth + 1, out));
                x += child.width() + SIBLING_GAP;
            }
            (children[0] + children[children.len() - 1]) / 2
        };

        out.push(PlacedNode {
            depth,
            center,
            label: self.label(),
            children,
        });
        center
    }

    /// Draws the tree top-down: each level under its parent, terminal leaves
    /// in brackets, `|` and `+---+` connectors between levels.
    pub fn to_plaintext(&self) -> String {
        let width = self.width();
        let mut placed = Vec::new();
        self.place(0, 0, &mut placed);
        let depth = placed.iter().map(|n| n.depth).max().unwrap_or(0);

        let mut lines: Vec<String> = Vec::new();
        for level in 0..=depth {
            let nodes: Vec<&PlacedNode> = placed.iter().filter(|n| n.depth == level).collect();

            let mut line = vec![' '; width];
            for node in &nodes {
                let len = node.label.chars().count();
                let start = node.center.saturating_sub(len / 2).min(width - len);
                for (i, c) in node.label.chars().enumerate() {
                    line[start + i] = c;
                }
            }
            lines.push(line.into_iter().collect::<String>().trim_end().to_string());

            if level == depth {
                break;
            }

            let mut connector = vec![' '; width];
            let mut branch = vec![' '; width];
            for node in nodes.iter().filter(|n| !n.children.is_empty()) {
                connector[node.center] = '|';
                if let [child] = node.children.as_slice() {
                    branch[*child] = '|';
                } else {
                    let (min, max) = (node.children[0], node.children[node.children.len() - 1]);
                    for cell in &mut branch[min..=max] {
                        *cell = '-';
                    }
                    for child in &node.children {
                        branch[*child] = '+';
                    }
                }
            }
            lines.push(connector.into_iter().collect::<String>().trim_end().to_string());
            lines.push(branch.into_iter().collect::<String>().trim_end().to_string());
        }
        lines.join("\n")
    }
}
