use super::rules::END_MARKER;
use std::fmt;
use strum::{Display, EnumString};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: &str, line: usize) -> Self {
        Token {
            kind,
            text: text.to_string(),
            line,
        }
    }

    /// End-of-input marker appended by the parser.
    pub fn end(line: usize) -> Self {
        Token::new(TokenKind::End, END_MARKER, line)
    }

    /// Terminal named by its literal text, like `,` or `.data`.
    /// Category names such as `immediate` never match here, whatever the token's text.
    pub fn matches_text(&self, terminal: &str) -> bool {
        terminal != END_MARKER
            && self.kind != TokenKind::End
            && !TokenKind::is_category(terminal)
            && self.text == terminal
    }

    /// Terminal named after a token kind, like `register` for [`TokenKind::Register`].
    pub fn matches_kind(&self, terminal: &str) -> bool {
        if terminal == END_MARKER {
            self.kind == TokenKind::End
        } else {
            self.kind != TokenKind::End && self.kind.to_string().eq_ignore_ascii_case(terminal)
        }
    }

    pub fn matches(&self, terminal: &str) -> bool {
        self.matches_text(terminal) || self.matches_kind(terminal)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::End => write!(f, "end of input"),
            kind => write!(f, "`{}` ({})", self.text, kind),
        }
    }
}

/// Token categories, in tie-break order: on equally long matches the earlier kind wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum TokenKind {
    Section,   // .data, .text
    CommandX,  // two registers
    CommandY,  // one register
    CommandZ,  // register and value
    CommandZJ, // conditional jump
    Register,
    Mask,      // 3-bit literal
    Immediate, // 0xHH
    Identifier,
    Comma,
    Equals,
    Colon,
    Unknown,
    End,
}

impl TokenKind {
    /// True if `terminal` names a token category rather than a literal spelling.
    pub fn is_category(terminal: &str) -> bool {
        terminal.parse::<TokenKind>().is_ok()
    }
}
