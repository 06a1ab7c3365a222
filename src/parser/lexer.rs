// Copyright 2026 Quarry Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Predicate lexer
//!
//! Tokenizes the predicate text produced by
//! [`CompiledQuery::bind_inline`](crate::compile::CompiledQuery::bind_inline)
//! under the ANSI dialect: double-quoted identifiers, single-quoted strings
//! with doubled-quote escapes, numbers, comparison operators and the
//! boolean keywords.

use crate::core::{Error, Result};

/// Token type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// Bare identifier or keyword (keywords are matched case-insensitively
    /// by the parser)
    Word,
    /// Double-quoted identifier, unescaped
    QuotedIdentifier,
    /// Integer literal
    Integer,
    /// Float literal
    Float,
    /// Single-quoted string, unescaped
    String,
    /// Comparison operator (= <> < <= > >=)
    Operator,
    LeftParen,
    RightParen,
    Comma,
    Dot,
    Eof,
}

/// One token with its source position (1-based line and column)
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub literal: String,
    pub line: usize,
    pub column: usize,
}

/// Lexer over predicate text
pub struct Lexer {
    input: Vec<char>,
    /// Index of the next character to read
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    fn token(&self, token_type: TokenType, literal: String, line: usize, column: usize) -> Token {
        Token {
            token_type,
            literal,
            line,
            column,
        }
    }

    /// Produce the next token
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();
        let (line, column) = (self.line, self.column);

        let ch = match self.advance() {
            Some(ch) => ch,
            None => return Ok(self.token(TokenType::Eof, String::new(), line, column)),
        };

        match ch {
            '(' => Ok(self.token(TokenType::LeftParen, "(".into(), line, column)),
            ')' => Ok(self.token(TokenType::RightParen, ")".into(), line, column)),
            ',' => Ok(self.token(TokenType::Comma, ",".into(), line, column)),
            '.' => Ok(self.token(TokenType::Dot, ".".into(), line, column)),
            '=' => Ok(self.token(TokenType::Operator, "=".into(), line, column)),
            '<' => match self.peek() {
                Some('>') => {
                    self.advance();
                    Ok(self.token(TokenType::Operator, "<>".into(), line, column))
                }
                Some('=') => {
                    self.advance();
                    Ok(self.token(TokenType::Operator, "<=".into(), line, column))
                }
                _ => Ok(self.token(TokenType::Operator, "<".into(), line, column)),
            },
            '>' => match self.peek() {
                Some('=') => {
                    self.advance();
                    Ok(self.token(TokenType::Operator, ">=".into(), line, column))
                }
                _ => Ok(self.token(TokenType::Operator, ">".into(), line, column)),
            },
            '"' => self.read_quoted(line, column),
            '\'' => self.read_string(line, column),
            '-' => self.read_number(ch, line, column),
            c if c.is_ascii_digit() => self.read_number(c, line, column),
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut word = String::new();
                word.push(c);
                while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
                    word.push(self.advance().unwrap());
                }
                Ok(self.token(TokenType::Word, word, line, column))
            }
            other => Err(Error::parse(
                format!("unexpected character '{}'", other),
                line,
                column,
            )),
        }
    }

    /// Double-quoted identifier with "" escapes
    fn read_quoted(&mut self, line: usize, column: usize) -> Result<Token> {
        let mut out = String::new();
        loop {
            match self.advance() {
                Some('"') => {
                    if self.peek() == Some('"') {
                        self.advance();
                        out.push('"');
                    } else {
                        return Ok(self.token(TokenType::QuotedIdentifier, out, line, column));
                    }
                }
                Some(c) => out.push(c),
                None => {
                    return Err(Error::parse("unterminated quoted identifier", line, column))
                }
            }
        }
    }

    /// Single-quoted string with '' escapes
    fn read_string(&mut self, line: usize, column: usize) -> Result<Token> {
        let mut out = String::new();
        loop {
            match self.advance() {
                Some('\'') => {
                    if self.peek() == Some('\'') {
                        self.advance();
                        out.push('\'');
                    } else {
                        return Ok(self.token(TokenType::String, out, line, column));
                    }
                }
                Some(c) => out.push(c),
                None => return Err(Error::parse("unterminated string literal", line, column)),
            }
        }
    }

    fn read_number(&mut self, first: char, line: usize, column: usize) -> Result<Token> {
        let mut out = String::new();
        out.push(first);
        let mut is_float = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                out.push(c);
                self.advance();
            } else if c == '.' && !is_float {
                // A digit must follow for this to be a fraction, not a dot
                if matches!(self.input.get(self.position + 1), Some(d) if d.is_ascii_digit()) {
                    is_float = true;
                    out.push(c);
                    self.advance();
                } else {
                    break;
                }
            } else {
                break;
            }
        }
        if out == "-" {
            return Err(Error::parse("expected digits after '-'", line, column));
        }
        let token_type = if is_float {
            TokenType::Float
        } else {
            TokenType::Integer
        };
        Ok(self.token(token_type, out, line, column))
    }
}
