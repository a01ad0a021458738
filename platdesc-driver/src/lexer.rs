//! Hand-written tokenizer for the description language. Grammar
//! generators in the corpus (`cfgrammar`/`lrlex`/`lrpar`, as used by
//! the teacher's `drmemd::logic::compile` module) need a `.l` lexer
//! specification to drive them; none shipped with this crate, so
//! tokenizing is done directly against the character stream instead,
//! in the same spirit as `drmemd/src/logic/compile.rs`'s hand-rolled
//! `Expr`/`Program` construction.

use crate::position::Position;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Using,
    Prefix,
    As,
    Local,
    None,
    Init,
    True,
    False,
    Identifier(String),
    String(String),
    Number(String),
    Colon,
    At,
    Arrow,
    LAngle,
    RAngle,
    Comma,
    LBrace,
    RBrace,
    LParen,
    RParen,
    Semicolon,
    Dot,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct LexError {
    pub position: Position,
    pub message: String,
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Lexer {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn here(&self) -> Position {
        Position::new(self.line, self.column, 1)
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            let start = self.here();
            let Some(c) = self.peek() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    position: start,
                });
                break;
            };

            let kind = match c {
                ':' => {
                    self.advance();
                    TokenKind::Colon
                }
                '@' => {
                    self.advance();
                    TokenKind::At
                }
                ',' => {
                    self.advance();
                    TokenKind::Comma
                }
                '{' => {
                    self.advance();
                    TokenKind::LBrace
                }
                '}' => {
                    self.advance();
                    TokenKind::RBrace
                }
                '(' => {
                    self.advance();
                    TokenKind::LParen
                }
                ')' => {
                    self.advance();
                    TokenKind::RParen
                }
                ';' => {
                    self.advance();
                    TokenKind::Semicolon
                }
                '<' => {
                    self.advance();
                    TokenKind::LAngle
                }
                '>' => {
                    self.advance();
                    TokenKind::RAngle
                }
                '.' if !self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                    self.advance();
                    TokenKind::Dot
                }
                '-' if self.peek_at(1) == Some('>') => {
                    self.advance();
                    self.advance();
                    TokenKind::Arrow
                }
                '"' => self.lex_string(start)?,
                c if c.is_ascii_digit() || (c == '-' && self.peek_at(1).is_some_and(|d| d.is_ascii_digit())) => {
                    self.lex_number()
                }
                c if c.is_alphabetic() || c == '_' => self.lex_word(),
                other => {
                    return Err(LexError {
                        position: start,
                        message: format!("unexpected character '{other}'"),
                    })
                }
            };

            let end_column = self.column;
            let length = end_column.saturating_sub(start.column).max(1);
            tokens.push(Token {
                kind,
                position: Position::new(start.line, start.column, length),
            });
        }
        Ok(tokens)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while !matches!(self.peek(), Some('\n') | None) {
                        self.advance();
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    self.advance();
                    self.advance();
                    while !(self.peek().is_none() || (self.peek() == Some('*') && self.peek_at(1) == Some('/'))) {
                        self.advance();
                    }
                    self.advance();
                    self.advance();
                }
                _ => break,
            }
        }
    }

    fn lex_string(&mut self, start: Position) -> Result<TokenKind, LexError> {
        self.advance();
        let mut s = String::new();
        loop {
            match self.advance() {
                None | Some('\n') => {
                    return Err(LexError {
                        position: start,
                        message: "unterminated string literal".to_string(),
                    })
                }
                Some('"') => break,
                Some('\\') => match self.advance() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some('"') => s.push('"'),
                    Some('\\') => s.push('\\'),
                    Some(other) => s.push(other),
                    None => {
                        return Err(LexError {
                            position: start,
                            message: "unterminated string literal".to_string(),
                        })
                    }
                },
                Some(c) => s.push(c),
            }
        }
        Ok(TokenKind::String(s))
    }

    fn lex_number(&mut self) -> TokenKind {
        let mut s = String::new();
        if self.peek() == Some('-') {
            s.push(self.advance().unwrap());
        }
        if self.peek() == Some('0') && matches!(self.peek_at(1), Some('x') | Some('X')) {
            s.push(self.advance().unwrap());
            s.push(self.advance().unwrap());
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                s.push(self.advance().unwrap());
            }
            return TokenKind::Number(s);
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            s.push(self.advance().unwrap());
        }
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            s.push(self.advance().unwrap());
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                s.push(self.advance().unwrap());
            }
        }
        TokenKind::Number(s)
    }

    fn lex_word(&mut self) -> TokenKind {
        let mut s = String::new();
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            s.push(self.advance().unwrap());
        }
        match s.as_str() {
            "using" => TokenKind::Using,
            "prefix" => TokenKind::Prefix,
            "as" => TokenKind::As,
            "local" => TokenKind::Local,
            "none" => TokenKind::None,
            "init" => TokenKind::Init,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            _ => TokenKind::Identifier(s),
        }
    }
}
