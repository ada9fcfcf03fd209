pub mod lexer;
pub mod parser;
pub mod rules;
pub mod sdt;
pub mod table;
pub mod token;
pub mod tree;
