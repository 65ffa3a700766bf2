use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    Eof,
    Def,
    Extern,
    If,
    Then,
    Else,
    Ident(String),
    Number(f64),
    OpenParen,
    CloseParen,
    /// Any other character. Binary operators, `;` and `,` reach the parser this way.
    Char(char),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Eof => write!(f, "end of input"),
            Token::Def => write!(f, "'def'"),
            Token::Extern => write!(f, "'extern'"),
            Token::If => write!(f, "'if'"),
            Token::Then => write!(f, "'then'"),
            Token::Else => write!(f, "'else'"),
            Token::Ident(name) => write!(f, "identifier '{}'", name),
            Token::Number(value) => write!(f, "number {}", value),
            Token::OpenParen => write!(f, "'('"),
            Token::CloseParen => write!(f, "')'"),
            Token::Char(c) => write!(f, "'{}'", c.escape_debug()),
        }
    }
}

/// Non-fatal problems noticed while scanning. The scanner never fails.
#[derive(Debug, PartialEq, Clone, thiserror::Error)]
pub enum ScanWarning {
    #[error("NUL character is invalid in source, treated as space")]
    NulCharacter { offset: usize },
    #[error("malformed number '{lexeme}', read as {value}")]
    MalformedNumber {
        offset: usize,
        lexeme: String,
        value: f64,
    },
}

impl ScanWarning {
    pub fn offset(&self) -> usize {
        match self {
            ScanWarning::NulCharacter { offset } | ScanWarning::MalformedNumber { offset, .. } => {
                *offset
            }
        }
    }
}

lazy_static! {
    static ref IDENT_RE: Regex = Regex::new(r"\A[A-Za-z][A-Za-z0-9]*").unwrap();
    static ref NUMBER_RE: Regex = Regex::new(r"\A[0-9.]+").unwrap();
    // the part of a number lexeme strtod would actually consume
    static ref NUMERIC_PREFIX_RE: Regex = Regex::new(r"\A[0-9]*(?:\.[0-9]*)?").unwrap();
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r')
}

fn keyword(ident: &str) -> Option<Token> {
    match ident {
        "def" => Some(Token::Def),
        "extern" => Some(Token::Extern),
        "if" => Some(Token::If),
        "then" => Some(Token::Then),
        "else" => Some(Token::Else),
        _ => None,
    }
}

/// Pull-based tokenizer over an in-memory source buffer.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    source: String,
    cursor: usize,
    token_start: usize,
    warnings: Vec<ScanWarning>,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        let mut scanner = Self::default();
        scanner.init(source);
        scanner
    }

    /// Replace the buffer and rewind to its start.
    pub fn init(&mut self, source: &str) {
        self.source = source.to_string();
        self.cursor = 0;
        self.token_start = 0;
        self.warnings.clear();
    }

    /// Byte offset where the most recently returned token starts.
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    pub fn warnings(&self) -> &[ScanWarning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<ScanWarning> {
        std::mem::take(&mut self.warnings)
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.cursor..].chars().next()
    }

    /// Fetch one character, folding `\r\n`, `\n\r` and lone `\r` into `\n`.
    /// `None` is end of input.
    fn next_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.cursor += c.len_utf8();

        match c {
            '\0' => {
                // a trailing NUL terminates the buffer; stay put so EOF repeats
                if self.cursor == self.source.len() {
                    self.cursor -= 1;
                    return None;
                }
                self.warnings.push(ScanWarning::NulCharacter {
                    offset: self.cursor - 1,
                });
                Some(' ')
            }
            '\n' | '\r' => {
                if let Some(next) = self.peek_char() {
                    if (next == '\n' || next == '\r') && next != c {
                        self.cursor += 1;
                    }
                }
                Some('\n')
            }
            c => Some(c),
        }
    }

    fn take_lexeme(&mut self, pattern: &Regex) -> String {
        let start = self.token_start;
        let len = pattern
            .find(&self.source[start..])
            .map_or(0, |found| found.end());
        self.cursor = start + len;
        self.source[start..start + len].to_string()
    }

    fn scan_number(&mut self) -> Token {
        let lexeme = self.take_lexeme(&NUMBER_RE);
        let prefix = NUMERIC_PREFIX_RE
            .find(&lexeme)
            .map_or("", |found| found.as_str());

        let (value, well_formed) = match prefix.parse::<f64>() {
            Ok(value) => (value, prefix.len() == lexeme.len()),
            Err(_) => (0.0, false),
        };
        if !well_formed {
            self.warnings.push(ScanWarning::MalformedNumber {
                offset: self.token_start,
                lexeme,
                value,
            });
        }

        Token::Number(value)
    }

    pub fn next_token(&mut self) -> Token {
        loop {
            let c = loop {
                self.token_start = self.cursor;
                match self.next_char() {
                    Some(c) if is_space(c) => continue,
                    other => break other,
                }
            };

            let c = match c {
                Some(c) => c,
                None => return Token::Eof,
            };

            if c.is_ascii_alphabetic() {
                let ident = self.take_lexeme(&IDENT_RE);
                return keyword(&ident).unwrap_or(Token::Ident(ident));
            }

            if c.is_ascii_digit() || c == '.' {
                return self.scan_number();
            }

            if c == '#' {
                while let Some(c) = self.next_char() {
                    if c == '\n' {
                        break;
                    }
                }
                continue;
            }

            return match c {
                '(' => Token::OpenParen,
                ')' => Token::CloseParen,
                c => Token::Char(c),
            };
        }
    }
}

/// Scan a whole buffer in source order. The last token is always `Token::Eof`.
pub fn lex(input: &str) -> Vec<Token> {
    let mut scanner = Scanner::new(input);
    let mut res = Vec::new();
    loop {
        let token = scanner.next_token();
        let done = token == Token::Eof;
        res.push(token);
        if done {
            return res;
        }
    }
}

/// 1-based line and column of a byte offset, counting line endings the way
/// the scanner folds them.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn of(source: &str, offset: usize) -> Self {
        let mut location = Location { line: 1, column: 1 };
        let mut chars = source.char_indices().peekable();

        while let Some((index, c)) = chars.next() {
            if index >= offset {
                break;
            }
            match c {
                '\n' | '\r' => {
                    if let Some(&(_, next)) = chars.peek() {
                        if (next == '\n' || next == '\r') && next != c {
                            chars.next();
                        }
                    }
                    location.line += 1;
                    location.column = 1;
                }
                _ => location.column += 1,
            }
        }

        location
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
