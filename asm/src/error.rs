use color_print::cprintln;
use thiserror::Error;

/// Stage of the pipeline an error comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lex,
    Grammar,
    Parse,
    Compile,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to read file: {0}")]
    FileRead(String, #[source] std::io::Error),

    // ------------------------------------------------------------------------
    #[error("Malformed grammar line: `{0}`")]
    MalformedGrammar(String),

    #[error("Grammar is not LL(1): productions of `{nonterminal}` both predict `{terminal}`")]
    NotLL1 {
        nonterminal: String,
        terminal: String,
    },

    #[error("Parse table conflict at (`{nonterminal}`, `{terminal}`)")]
    TableConflict {
        nonterminal: String,
        terminal: String,
    },

    // ------------------------------------------------------------------------
    #[error("No rule for `{nonterminal}` on {found} (line {line})")]
    NoRule {
        line: usize,
        nonterminal: String,
        found: String,
    },

    #[error("Expected `{expected}` but found {found} (line {line})")]
    UnexpectedToken {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("Expected end of input but found {found} (line {line})")]
    ExpectedEnd { line: usize, found: String },

    #[error("Unexpected end of input")]
    UnexpectedEof,

    // ------------------------------------------------------------------------
    #[error("Re-defined label: `{name}` (line {line}, first defined on line {first})")]
    RedefinedLabel {
        name: String,
        line: usize,
        first: usize,
    },

    #[error("Data section overflows its {capacity} bytes (line {line})")]
    DataOverflow { line: usize, capacity: usize },

    #[error("Text section overflows its {capacity} bytes (line {line})")]
    TextOverflow { line: usize, capacity: usize },

    #[error("Undefined label: `{name}` (line {line})")]
    UndefinedLabel { name: String, line: usize },

    #[error("Missing entry label `main`")]
    MissingMain,

    #[error("Cannot parse `{text}` as immediate (line {line})")]
    InvalidImmediate { text: String, line: usize },

    #[error("Cannot parse `{text}` as register (line {line})")]
    InvalidRegister { text: String, line: usize },

    #[error("Cannot parse `{text}` as jump mask (line {line})")]
    InvalidMask { text: String, line: usize },

    #[error("Invalid operands for `{op}`: {reason} (line {line})")]
    InvalidOperand {
        op: String,
        reason: String,
        line: usize,
    },

    #[error("Malformed syntax tree: {0}")]
    MalformedTree(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::FileOpen(..) | Error::FileRead(..) => ErrorKind::Lex,
            Error::MalformedGrammar(_) | Error::NotLL1 { .. } | Error::TableConflict { .. } => {
                ErrorKind::Grammar
            }
            Error::NoRule { .. }
            | Error::UnexpectedToken { .. }
            | Error::ExpectedEnd { .. }
            | Error::UnexpectedEof => ErrorKind::Parse,
            _ => ErrorKind::Compile,
        }
    }

    /// Source line (1-based) the error points at, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::NoRule { line, .. }
            | Error::UnexpectedToken { line, .. }
            | Error::ExpectedEnd { line, .. }
            | Error::RedefinedLabel { line, .. }
            | Error::DataOverflow { line, .. }
            | Error::TextOverflow { line, .. }
            | Error::UndefinedLabel { line, .. }
            | Error::InvalidImmediate { line, .. }
            | Error::InvalidRegister { line, .. }
            | Error::InvalidMask { line, .. }
            | Error::InvalidOperand { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Print error with diagnostic information showing file location and line content
    pub fn print_diag(&self, file: &str, source: &str) {
        cprintln!("<red,bold>error</>: {}", self);

        let Some(line_num) = self.line() else {
            cprintln!("     <blue>--></> <underline>{}</>", file);
            return;
        };
        cprintln!("     <blue>--></> <underline>{}:{}</>", file, line_num);
        cprintln!("      <blue>|</>");

        let line_content = source.lines().nth(line_num.saturating_sub(1)).unwrap_or("");

        cprintln!(" <blue>{:>4} |</> {}", line_num, line_content);
        cprintln!("      <blue>|</>");

        if let Error::RedefinedLabel { first, .. } = self {
            let first_content = source.lines().nth(first.saturating_sub(1)).unwrap_or("");
            cprintln!("<cyan,bold>note</>: first defined here");
            cprintln!(" <blue>{:>4} |</> {}", first, first_content);
        }
    }
}
