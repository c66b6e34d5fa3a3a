use serde::Serialize;

use super::Symbol;

/// A parse tree node. Children are owned; terminals and ε are leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseTree {
    pub symbol: Symbol,
    pub children: Vec<ParseTree>,
}

impl ParseTree {
    pub fn leaf(symbol: Symbol) -> Self {
        Self {
            symbol,
            children: Vec::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.symbol, Symbol::Terminal(_) | Symbol::Epsilon)
    }

    /// Terminal leaves read left to right, ε leaves skipped.
    pub fn frontier(&self) -> String {
        let mut out = String::new();
        self.collect_frontier(&mut out);
        out
    }

    fn collect_frontier(&self, out: &mut String) {
        match self.symbol {
            Symbol::Terminal(c) => out.push(c),
            _ => {
                for child in &self.children {
                    child.collect_frontier(out);
                }
            }
        }
    }
}

pub(super) type NodeId = usize;

#[derive(Debug)]
struct ArenaNode {
    symbol: Symbol,
    children: Vec<NodeId>,
}

/// Holds nodes while the parser still needs handles to them.
#[derive(Debug, Default)]
pub(super) struct TreeArena {
    nodes: Vec<Option<ArenaNode>>,
}

impl TreeArena {
    pub(super) fn new_node(&mut self, symbol: Symbol) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Some(ArenaNode {
            symbol,
            children: Vec::new(),
        }));
        id
    }

    pub(super) fn set_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        if let Some(Some(node)) = self.nodes.get_mut(parent) {
            node.children = children;
        }
    }

    /// Moves the nodes under `root` into an owned tree.
    pub(super) fn into_tree(mut self, root: NodeId) -> Option<ParseTree> {
        self.take(root)
    }

    fn take(&mut self, id: NodeId) -> Option<ParseTree> {
        let node = self.nodes.get_mut(id)?.take()?;
        let children = node
            .children
            .into_iter()
            .map(|child| self.take(child))
            .collect::<Option<Vec<_>>>()?;
        Some(ParseTree {
            symbol: node.symbol,
            children,
        })
    }
}
