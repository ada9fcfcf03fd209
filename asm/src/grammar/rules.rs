use crate::error::Error;
use indexmap::{IndexMap, IndexSet};
use log::debug;
use std::fmt;

pub const ARROW: &str = "->";
pub const LAMBDA: &str = "lambda";
/// End of input. Never written in grammar text; FOLLOW of the start symbol contains it.
pub const END_MARKER: &str = "$";

/// Source grammar of the assembly language.
pub const GRAMMAR: &str = "
program -> data text
data -> .data data_list
data -> lambda
data_list -> data_item data_list
data_list -> lambda
data_item -> identifier = immediate
text -> .text text_list
text -> lambda
text_list -> identifier : text_list
text_list -> reg_reg text_list
text_list -> reg text_list
text_list -> reg_value text_list
text_list -> jump text_list
text_list -> lambda
reg_reg -> commandx register , register
reg -> commandy register
reg_value -> commandz register , operand
jump -> commandzj mask , operand
operand -> immediate
operand -> identifier
";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    Nonterminal(String),
    Terminal(String),
    Lambda,
}

impl Symbol {
    pub fn nonterminal(name: &str) -> Self {
        Symbol::Nonterminal(name.to_string())
    }

    pub fn terminal(name: &str) -> Self {
        Symbol::Terminal(name.to_string())
    }

    pub fn end() -> Self {
        Symbol::Terminal(END_MARKER.to_string())
    }

    pub fn name(&self) -> &str {
        match self {
            Symbol::Nonterminal(name) | Symbol::Terminal(name) => name,
            Symbol::Lambda => LAMBDA,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    pub fn is_nonterminal(&self) -> bool {
        matches!(self, Symbol::Nonterminal(_))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

pub type Production = Vec<Symbol>;

fn is_lambda(production: &[Symbol]) -> bool {
    production == [Symbol::Lambda]
}

#[derive(Debug, Clone)]
pub struct Grammar {
    start: Symbol,
    rules: IndexMap<Symbol, Vec<Production>>,
    terminals: IndexSet<Symbol>,
    nullable: IndexMap<Symbol, bool>,
}

impl Grammar {
    pub fn parse(text: &str) -> Result<Self, Error> {
        let mut lines: IndexMap<&str, Vec<Vec<&str>>> = IndexMap::new();
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let malformed = || Error::MalformedGrammar(line.to_string());
            let (lhs, rhs) = line.split_once(ARROW).ok_or_else(malformed)?;
            let lhs = lhs.trim();
            let rhs: Vec<&str> = rhs.split_whitespace().collect();
            if lhs.is_empty() || lhs.contains(char::is_whitespace) || rhs.is_empty() {
                return Err(malformed());
            }
            lines.entry(lhs).or_default().push(rhs);
        }

        let Some(start) = lines.keys().next() else {
            return Err(Error::MalformedGrammar(String::from("(empty grammar)")));
        };
        let start = Symbol::nonterminal(start);

        let classify = |word: &str| {
            if lines.contains_key(word) {
                Symbol::nonterminal(word)
            } else if word == LAMBDA {
                Symbol::Lambda
            } else {
                Symbol::terminal(word)
            }
        };

        let mut rules = IndexMap::new();
        let mut terminals = IndexSet::new();
        for (lhs, alternatives) in &lines {
            let productions: Vec<Production> = alternatives
                .iter()
                .map(|words| words.iter().map(|w| classify(*w)).collect())
                .collect();
            for symbol in productions.iter().flatten() {
                if symbol.is_terminal() {
                    terminals.insert(symbol.clone());
                }
            }
            rules.insert(Symbol::nonterminal(lhs), productions);
        }

        let mut grammar = Grammar {
            start,
            rules,
            terminals,
            nullable: IndexMap::new(),
        };
        grammar.nullable = grammar.compute_nullable();
        debug!(
            "grammar: {} nonterminals, {} terminals, start `{}`",
            grammar.rules.len(),
            grammar.terminals.len(),
            grammar.start
        );
        Ok(grammar)
    }

    pub fn start(&self) -> &Symbol {
        &self.start
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = &Symbol> {
        self.rules.keys()
    }

    pub fn terminals(&self) -> impl Iterator<Item = &Symbol> {
        self.terminals.iter()
    }

    pub fn rules(&self) -> impl Iterator<Item = (&Symbol, &[Production])> {
        self.rules.iter().map(|(lhs, prods)| (lhs, prods.as_slice()))
    }

    pub fn productions(&self, nonterminal: &Symbol) -> &[Production] {
        self.rules.get(nonterminal).map(Vec::as_slice).unwrap_or(&[])
    }
}

// ----------------------------------------------------------------------------
// Nullability
// ----------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum Visit {
    InProgress,
    Done(bool),
}

impl Grammar {
    fn compute_nullable(&self) -> IndexMap<Symbol, bool> {
        let mut memo = IndexMap::new();
        for nonterminal in self.rules.keys() {
            self.nullable_of(nonterminal, &mut memo);
        }
        memo.into_iter()
            .map(|(symbol, visit)| match visit {
                Visit::Done(nullable) => (symbol, nullable),
                Visit::InProgress => (symbol, false),
            })
            .collect()
    }

    /// A nonterminal on the active path counts as not nullable, so cycles terminate.
    fn nullable_of(&self, nonterminal: &Symbol, memo: &mut IndexMap<Symbol, Visit>) -> bool {
        match memo.get(nonterminal) {
            Some(Visit::Done(nullable)) => return *nullable,
            Some(Visit::InProgress) => return false,
            None => {}
        }
        memo.insert(nonterminal.clone(), Visit::InProgress);

        let mut nullable = false;
        for production in self.productions(nonterminal) {
            if is_lambda(production) {
                nullable = true;
                break;
            }
            let mut all = true;
            for symbol in production {
                let derives = match symbol {
                    Symbol::Nonterminal(_) => self.nullable_of(symbol, memo),
                    Symbol::Lambda => true,
                    Symbol::Terminal(_) => false,
                };
                if !derives {
                    all = false;
                    break;
                }
            }
            if all {
                nullable = true;
                break;
            }
        }

        memo.insert(nonterminal.clone(), Visit::Done(nullable));
        nullable
    }

    pub fn derives_to_lambda(&self, symbol: &Symbol) -> bool {
        match symbol {
            Symbol::Lambda => true,
            Symbol::Terminal(_) => false,
            Symbol::Nonterminal(_) => self.nullable.get(symbol).copied().unwrap_or(false),
        }
    }
}

// ----------------------------------------------------------------------------
// FIRST / FOLLOW / PREDICT
// ----------------------------------------------------------------------------

/// `None` marks a nonterminal whose FIRST set is being expanded.
type FirstMemo = IndexMap<Symbol, Option<IndexSet<Symbol>>>;

impl Grammar {
    pub fn first_set(&self, symbol: &Symbol) -> IndexSet<Symbol> {
        self.first(symbol, &mut FirstMemo::new())
    }

    fn first(&self, symbol: &Symbol, memo: &mut FirstMemo) -> IndexSet<Symbol> {
        match symbol {
            Symbol::Terminal(_) => IndexSet::from([symbol.clone()]),
            Symbol::Lambda => IndexSet::new(),
            Symbol::Nonterminal(_) => {
                match memo.get(symbol) {
                    Some(Some(set)) => return set.clone(),
                    Some(None) => return IndexSet::new(),
                    None => {}
                }
                memo.insert(symbol.clone(), None);
                let mut set = IndexSet::new();
                for production in self.productions(symbol) {
                    if !is_lambda(production) {
                        set.extend(self.first_of_seq(production, memo).0);
                    }
                }
                memo.insert(symbol.clone(), Some(set.clone()));
                set
            }
        }
    }

    /// Terminals that can begin `seq`, and whether all of `seq` derives lambda.
    fn first_of_seq(&self, seq: &[Symbol], memo: &mut FirstMemo) -> (IndexSet<Symbol>, bool) {
        let mut set = IndexSet::new();
        for symbol in seq {
            set.extend(self.first(symbol, memo).into_iter().filter(Symbol::is_terminal));
            if !self.derives_to_lambda(symbol) {
                return (set, false);
            }
        }
        (set, true)
    }

    pub fn follow_set(&self, symbol: &Symbol) -> IndexSet<Symbol> {
        if !symbol.is_nonterminal() {
            return IndexSet::new();
        }
        self.follow(symbol, &IndexSet::new())
    }

    fn follow(&self, target: &Symbol, visited: &IndexSet<Symbol>) -> IndexSet<Symbol> {
        if visited.contains(target) {
            return IndexSet::new();
        }
        let mut visited = visited.clone();
        visited.insert(target.clone());

        let mut set = IndexSet::new();
        if *target == self.start {
            set.insert(Symbol::end());
        }
        for (lhs, productions) in &self.rules {
            for production in productions {
                for (idx, symbol) in production.iter().enumerate() {
                    if symbol != target {
                        continue;
                    }
                    let (first, nullable) = self.first_of_seq(&production[idx + 1..], &mut FirstMemo::new());
                    set.extend(first);
                    if nullable && lhs != target {
                        set.extend(self.follow(lhs, &visited));
                    }
                }
            }
        }
        set
    }

    pub fn predict_set(&self, lhs: &Symbol, production: &[Symbol]) -> IndexSet<Symbol> {
        if is_lambda(production) {
            return self.follow_set(lhs);
        }
        let (mut set, nullable) = self.first_of_seq(production, &mut FirstMemo::new());
        if nullable {
            set.extend(self.follow_set(lhs));
        }
        set
    }

    /// Checks that no two productions of `nonterminal` predict a common terminal.
    pub fn verify_disjoint(&self, nonterminal: &Symbol) -> Result<(), Error> {
        let predicts: Vec<IndexSet<Symbol>> = self
            .productions(nonterminal)
            .iter()
            .map(|production| self.predict_set(nonterminal, production))
            .collect();
        for (idx, a) in predicts.iter().enumerate() {
            for b in &predicts[idx + 1..] {
                if let Some(terminal) = a.intersection(b).next() {
                    return Err(Error::NotLL1 {
                        nonterminal: nonterminal.to_string(),
                        terminal: terminal.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
