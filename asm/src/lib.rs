pub mod codegen;
mod error;
pub mod grammar;
pub mod label;
pub mod util;

pub use codegen::Program;
pub use error::{Error, ErrorKind};

use grammar::lexer::{lex_file, Lexer};
use grammar::parser::Parser;
use grammar::rules::{Grammar, GRAMMAR};
use grammar::table::ParseTable;
use grammar::token::Token;
use log::{debug, trace};

/// Grammar and parse table for the assembly language, built once and reused across compiles.
#[derive(Debug, Clone)]
pub struct Assembler {
    grammar: Grammar,
    table: ParseTable,
}

impl Assembler {
    pub fn new() -> Result<Self, Error> {
        let grammar = Grammar::parse(GRAMMAR)?;
        let table = ParseTable::new(&grammar)?;
        Ok(Assembler { grammar, table })
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn table(&self) -> &ParseTable {
        &self.table
    }

    pub fn assemble(&self, path: &str) -> Result<Program, Error> {
        let (_, tokens) = lex_file(path)?;
        self.assemble_tokens(path, tokens)
    }

    /// Assembles in-memory source. `name` only labels log output.
    pub fn assemble_str(&self, name: &str, source: &str) -> Result<Program, Error> {
        self.assemble_tokens(name, Lexer::new(source).parse())
    }

    fn assemble_tokens(&self, name: &str, tokens: Vec<Token>) -> Result<Program, Error> {
        debug!("{name}: {} tokens", tokens.len());
        let mut tree = Parser::new(&self.table).parse(tokens)?;
        let root = grammar::sdt::simplify(&mut tree);
        trace!("{name}: syntax tree\n{}", tree.pretty(root));
        codegen::generate(&tree)
    }
}

/// Assembles the file at `path` with a freshly built [`Assembler`].
pub fn assemble(path: &str) -> Result<Program, Error> {
    Assembler::new()?.assemble(path)
}
