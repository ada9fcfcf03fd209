//! Rewrites the concrete syntax tree into the abstract one consumed by code generation.
//!
//! ```text
//! program
//! ├─ data
//! │  ├─ .data
//! │  └─ data_list
//! │     └─ data_item [identifier, immediate] ...
//! └─ text
//!    ├─ .text
//!    └─ text_list
//!       ├─ identifier            (label)
//!       └─ reg_reg | reg | reg_value | jump [mnemonic, operands...] ...
//! ```

use super::rules::Symbol;
use super::tree::{NodeId, Tree};

const PUNCTUATION: [&str; 3] = ["=", ":", ","];

/// Right-recursive list nonterminals. They are flattened and never collapsed.
pub const LISTS: [&str; 2] = ["data_list", "text_list"];

fn is_list(symbol: &Symbol) -> bool {
    symbol.is_nonterminal() && LISTS.contains(&symbol.name())
}

/// Simplifies the tree in place and returns the new root.
pub fn simplify(tree: &mut Tree) -> NodeId {
    let old = tree.root();
    let root = simplify_node(tree, old).unwrap_or(old);
    tree.set_root(root);
    root
}

fn simplify_node(tree: &mut Tree, id: NodeId) -> Option<NodeId> {
    if tree[id].symbol == Symbol::Lambda {
        return None;
    }

    let mut kept = Vec::new();
    for child in tree.children(id).to_vec() {
        let Some(child) = simplify_node(tree, child) else {
            continue;
        };
        let node = &tree[child];
        if node.symbol.is_terminal() && PUNCTUATION.contains(&node.text.as_str()) {
            continue;
        }
        kept.push(child);
    }

    let symbol = tree[id].symbol.clone();
    if is_list(&symbol) {
        kept = kept
            .into_iter()
            .flat_map(|child| {
                if tree[child].symbol == symbol {
                    tree.children(child).to_vec()
                } else {
                    vec![child]
                }
            })
            .collect();
    }

    for child in &kept {
        tree.node_mut(*child).parent = Some(id);
    }

    if kept.len() == 1 && !is_list(&symbol) {
        let only = kept[0];
        let grandparent = tree.parent(id);
        tree.node_mut(only).parent = grandparent;
        return Some(only);
    }

    tree.node_mut(id).children = kept;
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::lexer::Lexer;
    use crate::grammar::parser::Parser;
    use crate::grammar::rules::{Grammar, GRAMMAR};
    use crate::grammar::table::ParseTable;

    fn ast(source: &str) -> String {
        let grammar = Grammar::parse(GRAMMAR).unwrap();
        let table = ParseTable::new(&grammar).unwrap();
        let mut tree = Parser::new(&table).parse(Lexer::new(source).parse()).unwrap();
        let root = simplify(&mut tree);
        tree.pretty(root)
    }

    #[test]
    fn flattens_lists() {
        let source = ".data\nx = 0x05\ny = 0x06\n.text\nmain:\nLDI R0, x\nJMP 010, main\nSYS R0";
        let expected = "\
program
  data
    .data `.data`
    data_list
      data_item
        identifier `x`
        immediate `0x05`
      data_item
        identifier `y`
        immediate `0x06`
  text
    .text `.text`
    text_list
      identifier `main`
      reg_value
        commandz `LDI`
        register `R0`
        identifier `x`
      jump
        commandzj `JMP`
        mask `010`
        identifier `main`
      reg
        commandy `SYS`
        register `R0`
";
        assert_eq!(ast(source), expected);
    }

    #[test]
    fn single_item_lists_survive() {
        let dump = ast(".data\nx = 0x05\n.text\nmain:");
        assert!(dump.contains("    data_list\n      data_item\n"));
        assert!(dump.contains("    text_list\n      identifier `main`\n"));
    }

    #[test]
    fn empty_sections_keep_their_nodes() {
        let expected = "\
program
  data
    .data `.data`
    data_list
  text
    .text `.text`
    text_list
      identifier `main`
";
        assert_eq!(ast(".data\n.text\nmain:"), expected);
        assert_eq!(ast(""), "program\n  data\n  text\n");
    }
}
