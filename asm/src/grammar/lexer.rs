use super::token::{Token, TokenKind};
use crate::error::Error;
use once_cell::sync::Lazy;
use regex::Regex;

static PATTERNS: Lazy<Vec<(TokenKind, Regex)>> = Lazy::new(|| {
    [
        (TokenKind::Section, r"\..*"),
        (TokenKind::CommandX, r"MOV|CMP|SHL|SHR|ADD|SUB|AND|ORR"),
        (TokenKind::CommandY, r"NOT|PSH|POP|SYS"),
        (TokenKind::CommandZ, r"LDI|LDA|STA"),
        (TokenKind::CommandZJ, r"JMP"),
        (TokenKind::Register, r"R\d|PC|SP"),
        (TokenKind::Mask, r"[01]{3}"),
        (TokenKind::Immediate, r"0x[A-F0-9]{2}"),
        (TokenKind::Identifier, r"[a-z]+"),
        (TokenKind::Comma, r","),
        (TokenKind::Equals, r"="),
        (TokenKind::Colon, r":"),
    ]
    .into_iter()
    .map(|(kind, pattern)| {
        let anchored = format!("^(?:{pattern})");
        (kind, Regex::new(&anchored).expect("lexer patterns are valid"))
    })
    .collect()
});

pub struct Lexer<'a> {
    code: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(code: &'a str) -> Self {
        Self { code }
    }

    pub fn parse(self) -> Vec<Token> {
        let mut tokens = Vec::new();
        for (idx, line) in self.code.lines().enumerate() {
            tokens.extend(LineLexer::new(line, idx + 1).parse());
        }
        tokens
    }
}

/// Reads and tokenizes a source file.
pub fn lex_file(path: &str) -> Result<(String, Vec<Token>), Error> {
    use std::io::Read;

    let mut file = std::fs::File::open(path).map_err(|e| Error::FileOpen(path.to_string(), e))?;
    let mut source = String::new();
    file.read_to_string(&mut source)
        .map_err(|e| Error::FileRead(path.to_string(), e))?;
    let tokens = Lexer::new(&source).parse();
    Ok((source, tokens))
}

pub struct LineLexer<'a> {
    line: &'a str,
    row: usize,
}

impl<'a> LineLexer<'a> {
    /// `row` is the 1-based line number stamped on every token.
    pub fn new(line: &'a str, row: usize) -> Self {
        let line = match line.find('#') {
            Some(idx) => &line[..idx],
            None => line,
        };
        Self {
            line: line.trim_end(),
            row,
        }
    }

    pub fn parse(self) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut rest = self.line;
        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }

            let mut best: Option<(TokenKind, usize)> = None;
            for (kind, regex) in PATTERNS.iter() {
                if let Some(m) = regex.find(rest) {
                    // Strictly longer only, so ties keep the earlier kind.
                    if m.end() > best.map_or(0, |(_, len)| len) {
                        best = Some((*kind, m.end()));
                    }
                }
            }

            let (kind, len) = match best {
                Some(found) => found,
                None => {
                    let ch = rest.chars().next().map_or(1, char::len_utf8);
                    (TokenKind::Unknown, ch)
                }
            };
            tokens.push(Token::new(kind, &rest[..len], self.row));
            rest = &rest[len..];
        }
        tokens
    }
}
