use super::rules::{Symbol, END_MARKER};
use super::table::ParseTable;
use super::token::{Token, TokenKind};
use super::tree::Tree;
use crate::error::Error;
use log::trace;
use std::collections::VecDeque;

enum Entry {
    Symbol(Symbol),
    /// Return the cursor to the parent once a production is fully expanded.
    Ascend,
}

/// Table-driven predictive parser producing a concrete syntax tree.
pub struct Parser<'t> {
    table: &'t ParseTable,
}

impl<'t> Parser<'t> {
    pub fn new(table: &'t ParseTable) -> Self {
        Self { table }
    }

    pub fn parse(&self, tokens: Vec<Token>) -> Result<Tree, Error> {
        let last_line = tokens.last().map_or(1, |t| t.line);
        let mut tokens: VecDeque<Token> = tokens.into();
        tokens.push_back(Token::end(last_line));

        let start = self.table.start().clone();
        let mut tree = Tree::new(start.clone(), 1);
        let mut cursor = tree.root();
        let mut stack = vec![Entry::Symbol(Symbol::end()), Entry::Symbol(start)];

        while let Some(top) = stack.pop() {
            match top {
                Entry::Ascend => {
                    if let Some(parent) = tree.parent(cursor) {
                        cursor = parent;
                    }
                }
                Entry::Symbol(Symbol::Terminal(name)) if name == END_MARKER => {
                    let token = tokens.pop_front().ok_or(Error::UnexpectedEof)?;
                    if token.kind != TokenKind::End {
                        return Err(Error::ExpectedEnd {
                            line: token.line,
                            found: token.to_string(),
                        });
                    }
                }
                Entry::Symbol(symbol @ Symbol::Nonterminal(_)) => {
                    let next = tokens.front().ok_or(Error::UnexpectedEof)?;
                    let production = self.table.lookup(&symbol, next).ok_or_else(|| Error::NoRule {
                        line: next.line,
                        nonterminal: symbol.to_string(),
                        found: next.to_string(),
                    })?;
                    trace!("expand {symbol} on {next}");
                    cursor = tree.add_child(cursor, symbol, "", next.line);
                    stack.push(Entry::Ascend);
                    stack.extend(production.iter().rev().cloned().map(Entry::Symbol));
                }
                Entry::Symbol(symbol @ Symbol::Terminal(_)) => {
                    let next = tokens.front().ok_or(Error::UnexpectedEof)?;
                    if !next.matches(symbol.name()) {
                        return Err(Error::UnexpectedToken {
                            line: next.line,
                            expected: symbol.to_string(),
                            found: next.to_string(),
                        });
                    }
                    let token = tokens.pop_front().ok_or(Error::UnexpectedEof)?;
                    trace!("match {symbol} with {token}");
                    tree.add_child(cursor, symbol, &token.text, token.line);
                }
                Entry::Symbol(Symbol::Lambda) => {
                    let line = tree[cursor].line;
                    tree.add_child(cursor, Symbol::Lambda, "", line);
                }
            }
        }
        Ok(tree)
    }
}
