use super::rules::{Grammar, Production, Symbol};
use super::token::Token;
use crate::error::Error;
use indexmap::IndexMap;
use log::{debug, trace};

/// LL(1) parse table: (nonterminal, lookahead terminal) to the production to expand.
#[derive(Debug, Clone)]
pub struct ParseTable {
    start: Symbol,
    rows: IndexMap<Symbol, IndexMap<Symbol, Production>>,
}

impl ParseTable {
    pub fn new(grammar: &Grammar) -> Result<Self, Error> {
        for nonterminal in grammar.nonterminals() {
            grammar.verify_disjoint(nonterminal)?;
        }

        let mut table = ParseTable {
            start: grammar.start().clone(),
            rows: IndexMap::new(),
        };
        for (lhs, productions) in grammar.rules() {
            for production in productions {
                for terminal in grammar.predict_set(lhs, production) {
                    trace!("table[{lhs}, {terminal}] = {production:?}");
                    table.insert(lhs, terminal, production.clone())?;
                }
            }
        }
        debug!("parse table: {} entries", table.len());
        Ok(table)
    }

    pub(crate) fn insert(
        &mut self,
        nonterminal: &Symbol,
        terminal: Symbol,
        production: Production,
    ) -> Result<(), Error> {
        let row = self.rows.entry(nonterminal.clone()).or_default();
        if row.contains_key(&terminal) {
            return Err(Error::TableConflict {
                nonterminal: nonterminal.to_string(),
                terminal: terminal.to_string(),
            });
        }
        row.insert(terminal, production);
        Ok(())
    }

    pub fn start(&self) -> &Symbol {
        &self.start
    }

    pub fn get(&self, nonterminal: &Symbol, terminal: &Symbol) -> Option<&Production> {
        self.rows.get(nonterminal)?.get(terminal)
    }

    /// Finds the production for `nonterminal` with `token` as lookahead.
    /// A terminal spelled like the token's text wins over one named after its kind.
    /// Category terminals only ever match by kind.
    pub fn lookup(&self, nonterminal: &Symbol, token: &Token) -> Option<&Production> {
        let row = self.rows.get(nonterminal)?;
        row.iter()
            .find(|(terminal, _)| token.matches_text(terminal.name()))
            .or_else(|| row.iter().find(|(terminal, _)| token.matches_kind(terminal.name())))
            .map(|(_, production)| production)
    }

    pub fn len(&self) -> usize {
        self.rows.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
