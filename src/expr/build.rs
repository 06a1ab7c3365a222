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

//! Fluent expression construction
//!
//! Named combinators for building [`Expression`] trees directly, used by
//! filter and select inputs when the pair-map forms are not expressive
//! enough.
//!
//! # Example
//!
//! ```
//! use quarry::expr::build::{col, lit};
//!
//! let pred = col("age").ge(lit(21)).and(col("name").like("A%"));
//! assert_eq!(pred.to_string(), "((age >= 21) AND (name LIKE 'A%'))");
//! ```

use std::sync::Arc;

use crate::core::Value;
use crate::dataset::clause::{ClauseSet, Direction, OrderedExpression};

use super::ast::{
    AliasedExpression, BinaryExpression, BinaryOperator, Expression, FunctionCall, Identifier,
    QualifiedIdentifier, RawFragment, UnaryExpression, UnaryOperator,
};

// ============================================================================
// Free constructors
// ============================================================================

/// Column reference; a dotted name becomes a qualified identifier
///
/// `col("id")` is a bare column, `col("items.id")` is `items.id`.
pub fn col(name: &str) -> Expression {
    match name.split_once('.') {
        Some((table, column)) => Expression::Qualified(QualifiedIdentifier::new(table, column)),
        None => Expression::Identifier(Identifier::new(name)),
    }
}

/// Explicitly qualified column reference
pub fn qual(table: impl Into<String>, name: impl Into<String>) -> Expression {
    Expression::Qualified(QualifiedIdentifier::new(table, name))
}

/// Literal value
pub fn lit(value: impl Into<Value>) -> Expression {
    Expression::Literal(value.into())
}

/// Function call
pub fn func(name: impl Into<String>, args: Vec<Expression>) -> Expression {
    Expression::FunctionCall(FunctionCall::new(name, args))
}

/// Star (*)
pub fn star() -> Expression {
    Expression::Star
}

/// COUNT(*)
pub fn count_star() -> Expression {
    func("COUNT", vec![Expression::Star])
}

/// Scalar subquery over a clause set
pub fn subquery(clauses: Arc<ClauseSet>) -> Expression {
    Expression::Subquery(clauses)
}

/// Raw SQL fragment with positional (?) parameter values
pub fn raw(template: impl Into<String>, params: Vec<Value>) -> Expression {
    Expression::Raw(RawFragment::new(template, params))
}

// ============================================================================
// Combinator methods
// ============================================================================

impl Expression {
    fn binary(self, op: BinaryOperator, rhs: Expression) -> Expression {
        Expression::Binary(BinaryExpression::new(op, self, rhs))
    }

    /// self = rhs
    pub fn eq(self, rhs: Expression) -> Expression {
        self.binary(BinaryOperator::Equal, rhs)
    }

    /// self <> rhs
    pub fn neq(self, rhs: Expression) -> Expression {
        self.binary(BinaryOperator::NotEqual, rhs)
    }

    /// self < rhs
    pub fn lt(self, rhs: Expression) -> Expression {
        self.binary(BinaryOperator::LessThan, rhs)
    }

    /// self <= rhs
    pub fn le(self, rhs: Expression) -> Expression {
        self.binary(BinaryOperator::LessEqual, rhs)
    }

    /// self > rhs
    pub fn gt(self, rhs: Expression) -> Expression {
        self.binary(BinaryOperator::GreaterThan, rhs)
    }

    /// self >= rhs
    pub fn ge(self, rhs: Expression) -> Expression {
        self.binary(BinaryOperator::GreaterEqual, rhs)
    }

    /// self LIKE pattern
    pub fn like(self, pattern: impl Into<Value>) -> Expression {
        self.binary(BinaryOperator::Like, Expression::Literal(pattern.into()))
    }

    /// self ILIKE pattern (case-insensitive; dialect-dependent rendering)
    pub fn ilike(self, pattern: impl Into<Value>) -> Expression {
        self.binary(BinaryOperator::ILike, Expression::Literal(pattern.into()))
    }

    /// self matches regex pattern (dialect-dependent rendering)
    pub fn regexp(self, pattern: impl Into<Value>) -> Expression {
        self.binary(BinaryOperator::Regexp, Expression::Literal(pattern.into()))
    }

    /// self IS NULL
    pub fn is_null(self) -> Expression {
        self.binary(BinaryOperator::Is, Expression::Literal(Value::Null))
    }

    /// self IS NOT NULL
    pub fn is_not_null(self) -> Expression {
        self.binary(BinaryOperator::IsNot, Expression::Literal(Value::Null))
    }

    /// self IN (values)
    pub fn in_list<V>(self, values: impl IntoIterator<Item = V>) -> Expression
    where
        V: Into<Value>,
    {
        let items = values
            .into_iter()
            .map(|v| Expression::Literal(v.into()))
            .collect();
        self.binary(BinaryOperator::In, Expression::List(items))
    }

    /// self IN (subquery)
    pub fn in_subquery(self, clauses: Arc<ClauseSet>) -> Expression {
        self.binary(BinaryOperator::In, Expression::Subquery(clauses))
    }

    /// self AND rhs (merges into an existing n-ary AND)
    pub fn and(self, rhs: Expression) -> Expression {
        self.and_combine(rhs)
    }

    /// self OR rhs (merges into an existing n-ary OR)
    pub fn or(self, rhs: Expression) -> Expression {
        match self {
            Expression::Or(mut parts) => {
                parts.push(rhs);
                Expression::Or(parts)
            }
            first => Expression::Or(vec![first, rhs]),
        }
    }

    /// NOT self (De Morgan form, see [`Expression::negated`])
    pub fn not(self) -> Expression {
        self.negated()
    }

    /// self + rhs
    pub fn add(self, rhs: Expression) -> Expression {
        self.binary(BinaryOperator::Add, rhs)
    }

    /// self - rhs
    pub fn sub(self, rhs: Expression) -> Expression {
        self.binary(BinaryOperator::Subtract, rhs)
    }

    /// self * rhs
    pub fn mul(self, rhs: Expression) -> Expression {
        self.binary(BinaryOperator::Multiply, rhs)
    }

    /// self / rhs
    pub fn div(self, rhs: Expression) -> Expression {
        self.binary(BinaryOperator::Divide, rhs)
    }

    /// self || rhs
    pub fn concat(self, rhs: Expression) -> Expression {
        self.binary(BinaryOperator::Concat, rhs)
    }

    /// -self
    pub fn neg(self) -> Expression {
        Expression::Unary(UnaryExpression {
            op: UnaryOperator::Negate,
            operand: Box::new(self),
        })
    }

    /// self AS alias
    pub fn alias(self, alias: impl Into<String>) -> Expression {
        Expression::Aliased(AliasedExpression {
            expr: Box::new(self),
            alias: alias.into(),
        })
    }

    /// Ascending order term
    pub fn asc(self) -> OrderedExpression {
        OrderedExpression {
            expr: self,
            direction: Direction::Asc,
        }
    }

    /// Descending order term
    pub fn desc(self) -> OrderedExpression {
        OrderedExpression {
            expr: self,
            direction: Direction::Desc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_splits_qualified_names() {
        assert_eq!(
            col("items.id"),
            Expression::Qualified(QualifiedIdentifier::new("items", "id"))
        );
        assert_eq!(col("id"), Expression::Identifier(Identifier::new("id")));
    }

    #[test]
    fn test_comparison_builders() {
        assert_eq!(col("a").eq(lit(1)).to_string(), "(a = 1)");
        assert_eq!(col("a").ge(lit(1)).to_string(), "(a >= 1)");
        assert_eq!(col("a").is_null().to_string(), "(a IS NULL)");
        assert_eq!(
            col("a").in_list([1i64, 2, 3]).to_string(),
            "(a IN (1, 2, 3))"
        );
    }

    #[test]
    fn test_boolean_merging() {
        let e = col("a")
            .eq(lit(1))
            .and(col("b").eq(lit(2)))
            .and(col("c").eq(lit(3)));
        match e {
            Expression::And(parts) => assert_eq!(parts.len(), 3),
            other => panic!("expected n-ary AND, got {}", other),
        }
    }

    #[test]
    fn test_count_star() {
        assert_eq!(count_star().to_string(), "COUNT(*)");
    }
}
