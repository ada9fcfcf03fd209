use super::rules::Symbol;
use std::ops::Index;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub symbol: Symbol,
    /// Literal token text, empty for nonterminals.
    pub text: String,
    pub line: usize,
}

/// Syntax tree stored in an arena. Detached nodes stay in the arena but are unreachable from the root.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Tree {
    pub fn new(symbol: Symbol, line: usize) -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            symbol,
            text: String::new(),
            line,
        };
        Tree {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.nodes[id.0].parent = None;
        self.root = id;
    }

    pub fn add_child(&mut self, parent: NodeId, symbol: Symbol, text: &str, line: usize) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            symbol,
            text: text.to_string(),
            line,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// First child whose symbol is named `name`.
    pub fn find_child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|child| self[*child].symbol.name() == name)
    }

    /// Indented dump of the subtree under `id`.
    pub fn pretty(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.pretty_into(id, 0, &mut out);
        out
    }

    fn pretty_into(&self, id: NodeId, depth: usize, out: &mut String) {
        let node = &self[id];
        let indent = "  ".repeat(depth);
        let line = match node.symbol {
            Symbol::Terminal(_) => format!("{indent}{} `{}`\n", node.symbol, node.text),
            _ => format!("{indent}{}\n", node.symbol),
        };
        out.push_str(&line);
        for child in &node.children {
            self.pretty_into(*child, depth + 1, out);
        }
    }
}

impl Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        self.node(id)
    }
}
