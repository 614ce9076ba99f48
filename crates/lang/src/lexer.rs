//! Hand-rolled lexer, in the teacher's style: no `logos`/`pest`
//! dependency, a single forward scan over the byte slice with a small
//! lookahead buffer.

use crate::token::{Spanned, Token};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub message: String,
    pub line: u32,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for LexError {}

pub struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    line: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer { source: source.as_bytes(), pos: 0, line: 1 }
    }

    pub fn tokenize(mut self) -> Result<Vec<Spanned>, LexError> {
        let mut out = Vec::new();
        loop {
            let tok = self.next_token()?;
            let done = tok.token == Token::Eof;
            out.push(tok);
            if done {
                break;
            }
        }
        Ok(out)
    }

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        if c == b'\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_ascii_whitespace() => {
                    self.advance();
                }
                Some(b'#') => {
                    while let Some(c) = self.peek() {
                        if c == b'\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while let Some(c) = self.peek() {
                        if c == b'\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn next_token(&mut self) -> Result<Spanned, LexError> {
        self.skip_whitespace_and_comments();
        let line = self.line;
        let Some(c) = self.peek() else {
            return Ok(Spanned { token: Token::Eof, line });
        };

        let token = match c {
            b'(' => { self.advance(); Token::LParen }
            b')' => { self.advance(); Token::RParen }
            b'{' => { self.advance(); Token::LBrace }
            b'}' => { self.advance(); Token::RBrace }
            b'[' => { self.advance(); Token::LBracket }
            b']' => { self.advance(); Token::RBracket }
            b',' => { self.advance(); Token::Comma }
            b':' => { self.advance(); Token::Colon }
            b';' => { self.advance(); Token::Semicolon }
            b'.' => {
                self.advance();
                if self.peek() == Some(b'.') {
                    self.advance();
                    Token::DotDot
                } else {
                    Token::Dot
                }
            }
            b'+' => { self.advance(); Token::Plus }
            b'-' => { self.advance(); Token::Minus }
            b'*' => { self.advance(); Token::Star }
            b'/' => { self.advance(); Token::Slash }
            b'%' => { self.advance(); Token::Percent }
            b'!' => {
                self.advance();
                if self.peek() == Some(b'=') {
                    self.advance();
                    Token::BangEq
                } else {
                    Token::Bang
                }
            }
            b'=' => {
                self.advance();
                if self.peek() == Some(b'=') {
                    self.advance();
                    Token::EqEq
                } else {
                    Token::Eq
                }
            }
            b'<' => {
                self.advance();
                if self.peek() == Some(b'=') {
                    self.advance();
                    Token::LtEq
                } else {
                    Token::Lt
                }
            }
            b'>' => {
                self.advance();
                if self.peek() == Some(b'=') {
                    self.advance();
                    Token::GtEq
                } else {
                    Token::Gt
                }
            }
            b'&' if self.peek_at(1) == Some(b'&') => {
                self.advance();
                self.advance();
                Token::And
            }
            b'|' if self.peek_at(1) == Some(b'|') => {
                self.advance();
                self.advance();
                Token::Or
            }
            b'"' => self.lex_string()?,
            c if c.is_ascii_digit() => self.lex_number(),
            c if c.is_ascii_alphabetic() || c == b'_' => self.lex_ident_or_keyword(),
            other => {
                return Err(LexError {
                    message: format!("unexpected character '{}'", other as char),
                    line,
                });
            }
        };
        Ok(Spanned { token, line })
    }

    fn lex_string(&mut self) -> Result<Token, LexError> {
        let line = self.line;
        self.advance(); // opening quote
        let mut bytes = Vec::new();
        loop {
            match self.advance() {
                None => return Err(LexError { message: "unterminated string literal".into(), line }),
                Some(b'"') => break,
                Some(b'\\') => match self.advance() {
                    Some(b'n') => bytes.push(b'\n'),
                    Some(b't') => bytes.push(b'\t'),
                    Some(b'r') => bytes.push(b'\r'),
                    Some(b'"') => bytes.push(b'"'),
                    Some(b'\\') => bytes.push(b'\\'),
                    Some(other) => bytes.push(other),
                    None => return Err(LexError { message: "unterminated escape".into(), line }),
                },
                Some(c) => bytes.push(c),
            }
        }
        Ok(Token::Str(bytes))
    }

    fn lex_number(&mut self) -> Token {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap();
        Token::Number(text.parse().unwrap_or(0.0))
    }

    fn lex_ident_or_keyword(&mut self) -> Token {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_') {
            self.advance();
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap();
        match text {
            "let" => Token::Let,
            "const" => Token::Const,
            "if" => Token::If,
            "else" => Token::Else,
            "while" => Token::While,
            "foreach" => Token::Foreach,
            "in" => Token::In,
            "break" => Token::Break,
            "continue" => Token::Continue,
            "return" => Token::Return,
            "function" => Token::Function,
            "import" => Token::Import,
            "new" => Token::New,
            "true" => Token::True,
            "false" => Token::False,
            "nil" => Token::Nil,
            "and" => Token::And,
            "or" => Token::Or,
            _ => Token::Ident(text.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Token> {
        Lexer::new(src).tokenize().unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn lexes_basic_call() {
        assert_eq!(
            kinds("println(1)"),
            vec![
                Token::Ident("println".into()),
                Token::LParen,
                Token::Number(1.0),
                Token::RParen,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn lexes_range_dotdot_distinctly_from_member_dot() {
        assert_eq!(kinds("a..b"), vec![
            Token::Ident("a".into()), Token::DotDot, Token::Ident("b".into()), Token::Eof
        ]);
        assert_eq!(kinds("a.b"), vec![
            Token::Ident("a".into()), Token::Dot, Token::Ident("b".into()), Token::Eof
        ]);
    }

    #[test]
    fn lexes_string_escapes() {
        assert_eq!(kinds("\"a\\nb\""), vec![Token::Str(b"a\nb".to_vec()), Token::Eof]);
    }

    #[test]
    fn hash_comment_runs_to_end_of_line() {
        assert_eq!(kinds("1 # comment\n2"), vec![Token::Number(1.0), Token::Number(2.0), Token::Eof]);
    }
}
