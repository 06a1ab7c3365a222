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

//! Predicate parser
//!
//! Parses a WHERE/HAVING predicate back into an [`Expression`]. Scope is
//! exactly what the ANSI dialect emits for predicates: comparisons,
//! IS [NOT] NULL/TRUE/FALSE, [NOT] IN with a value list, [NOT] LIKE, and
//! AND/OR/NOT with standard precedence. Used to verify that compiled
//! output preserves predicate semantics.

use crate::core::{Error, Result, Value};
use crate::expr::ast::{
    BinaryExpression, BinaryOperator, Expression, Identifier, QualifiedIdentifier,
};

use super::lexer::{Lexer, Token, TokenType};

/// Parse a predicate string into an expression tree
pub fn parse_predicate(input: &str) -> Result<Expression> {
    let mut parser = Parser::new(input)?;
    let expr = parser.parse_or()?;
    parser.expect_eof()?;
    Ok(expr)
}

struct Parser {
    lexer: Lexer,
    current: Token,
}

impl Parser {
    fn new(input: &str) -> Result<Self> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    fn bump(&mut self) -> Result<Token> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::parse(message, self.current.line, self.current.column)
    }

    /// True when the current token is the given keyword (case-insensitive)
    fn at_keyword(&self, keyword: &str) -> bool {
        self.current.token_type == TokenType::Word
            && self.current.literal.eq_ignore_ascii_case(keyword)
    }

    fn eat_keyword(&mut self, keyword: &str) -> Result<bool> {
        if self.at_keyword(keyword) {
            self.bump()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, token_type: TokenType, what: &str) -> Result<Token> {
        if self.current.token_type != token_type {
            return Err(self.error(format!("expected {}, got '{}'", what, self.current.literal)));
        }
        self.bump()
    }

    fn expect_eof(&mut self) -> Result<()> {
        if self.current.token_type != TokenType::Eof {
            return Err(self.error(format!("trailing input '{}'", self.current.literal)));
        }
        Ok(())
    }

    // OR has the loosest binding, then AND, then NOT, then comparisons

    fn parse_or(&mut self) -> Result<Expression> {
        let mut parts = vec![self.parse_and()?];
        while self.eat_keyword("OR")? {
            parts.push(self.parse_and()?);
        }
        Ok(if parts.len() == 1 {
            parts.pop().unwrap()
        } else {
            Expression::Or(parts)
        })
    }

    fn parse_and(&mut self) -> Result<Expression> {
        let mut parts = vec![self.parse_not()?];
        while self.eat_keyword("AND")? {
            parts.push(self.parse_not()?);
        }
        Ok(if parts.len() == 1 {
            parts.pop().unwrap()
        } else {
            Expression::And(parts)
        })
    }

    fn parse_not(&mut self) -> Result<Expression> {
        if self.eat_keyword("NOT")? {
            let inner = self.parse_not()?;
            return Ok(Expression::Not(Box::new(inner)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expression> {
        let left = self.parse_primary()?;

        if self.current.token_type == TokenType::Operator {
            let op = match self.current.literal.as_str() {
                "=" => BinaryOperator::Equal,
                "<>" => BinaryOperator::NotEqual,
                "<" => BinaryOperator::LessThan,
                "<=" => BinaryOperator::LessEqual,
                ">" => BinaryOperator::GreaterThan,
                ">=" => BinaryOperator::GreaterEqual,
                other => return Err(self.error(format!("unknown operator '{}'", other))),
            };
            self.bump()?;
            let right = self.parse_primary()?;
            return Ok(Expression::Binary(BinaryExpression::new(op, left, right)));
        }

        if self.at_keyword("IS") {
            self.bump()?;
            let negated = self.eat_keyword("NOT")?;
            let op = if negated {
                BinaryOperator::IsNot
            } else {
                BinaryOperator::Is
            };
            let value = if self.eat_keyword("NULL")? {
                Value::Null
            } else if self.eat_keyword("TRUE")? {
                Value::Boolean(true)
            } else if self.eat_keyword("FALSE")? {
                Value::Boolean(false)
            } else {
                return Err(self.error("expected NULL, TRUE or FALSE after IS"));
            };
            return Ok(Expression::Binary(BinaryExpression::new(
                op,
                left,
                Expression::Literal(value),
            )));
        }

        if self.at_keyword("NOT") {
            // NOT IN / NOT LIKE
            self.bump()?;
            if self.eat_keyword("IN")? {
                let list = self.parse_value_list()?;
                return Ok(Expression::Binary(BinaryExpression::new(
                    BinaryOperator::NotIn,
                    left,
                    list,
                )));
            }
            if self.eat_keyword("LIKE")? {
                let right = self.parse_primary()?;
                return Ok(Expression::Binary(BinaryExpression::new(
                    BinaryOperator::NotLike,
                    left,
                    right,
                )));
            }
            return Err(self.error("expected IN or LIKE after NOT"));
        }

        if self.eat_keyword("IN")? {
            let list = self.parse_value_list()?;
            return Ok(Expression::Binary(BinaryExpression::new(
                BinaryOperator::In,
                left,
                list,
            )));
        }

        if self.eat_keyword("LIKE")? {
            let right = self.parse_primary()?;
            return Ok(Expression::Binary(BinaryExpression::new(
                BinaryOperator::Like,
                left,
                right,
            )));
        }

        Ok(left)
    }

    fn parse_value_list(&mut self) -> Result<Expression> {
        self.expect(TokenType::LeftParen, "'('")?;
        let mut items = vec![self.parse_primary()?];
        while self.current.token_type == TokenType::Comma {
            self.bump()?;
            items.push(self.parse_primary()?);
        }
        self.expect(TokenType::RightParen, "')'")?;
        Ok(Expression::List(items))
    }

    fn parse_primary(&mut self) -> Result<Expression> {
        match self.current.token_type {
            TokenType::LeftParen => {
                self.bump()?;
                let inner = self.parse_or()?;
                self.expect(TokenType::RightParen, "')'")?;
                Ok(inner)
            }
            TokenType::QuotedIdentifier => {
                let first = self.bump()?;
                if self.current.token_type == TokenType::Dot {
                    self.bump()?;
                    let second = self.expect(TokenType::QuotedIdentifier, "identifier")?;
                    Ok(Expression::Qualified(QualifiedIdentifier::new(
                        first.literal,
                        second.literal,
                    )))
                } else {
                    Ok(Expression::Identifier(Identifier::new(first.literal)))
                }
            }
            TokenType::Integer => {
                let token = self.bump()?;
                let value = token.literal.parse::<i64>().map_err(|_| {
                    Error::parse(
                        format!("integer literal '{}' out of range", token.literal),
                        token.line,
                        token.column,
                    )
                })?;
                Ok(Expression::Literal(Value::Integer(value)))
            }
            TokenType::Float => {
                let token = self.bump()?;
                let value = token.literal.parse::<f64>().map_err(|_| {
                    Error::parse(
                        format!("malformed float literal '{}'", token.literal),
                        token.line,
                        token.column,
                    )
                })?;
                Ok(Expression::Literal(Value::Float(value)))
            }
            TokenType::String => {
                let token = self.bump()?;
                Ok(Expression::Literal(Value::text(token.literal)))
            }
            TokenType::Word => {
                if self.eat_keyword("NULL")? {
                    return Ok(Expression::Literal(Value::Null));
                }
                if self.eat_keyword("TRUE")? {
                    return Ok(Expression::Literal(Value::Boolean(true)));
                }
                if self.eat_keyword("FALSE")? {
                    return Ok(Expression::Literal(Value::Boolean(false)));
                }
                let token = self.bump()?;
                Ok(Expression::Identifier(Identifier::new(token.literal)))
            }
            _ => Err(self.error(format!("unexpected token '{}'", self.current.literal))),
        }
    }
}
