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

//! Expression model
//!
//! Algebraic representation of SQL-valued expressions. Nodes are immutable
//! after construction and shared freely; subqueries hold their clause set
//! behind an Arc so deriving datasets never copies the embedded query.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::core::Value;
use crate::dataset::clause::{ClauseSet, RawBindings};

// ============================================================================
// Expression
// ============================================================================

/// Expression enum representing all expression node types
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Bare identifier (column name)
    Identifier(Identifier),
    /// Qualified identifier (table.column)
    Qualified(QualifiedIdentifier),
    /// Literal value (compiled to a placeholder + parameter)
    Literal(Value),
    /// Placeholder inside a raw fragment (? or :name)
    Placeholder(Placeholder),
    /// Binary expression (a = b, a + b, a LIKE b)
    Binary(BinaryExpression),
    /// Unary expression (-a)
    Unary(UnaryExpression),
    /// Function call (COUNT(*), lower(name))
    FunctionCall(FunctionCall),
    /// Boolean conjunction over two or more operands
    And(Vec<Expression>),
    /// Boolean disjunction over two or more operands
    Or(Vec<Expression>),
    /// Boolean negation
    Not(Box<Expression>),
    /// Expression list (RHS of IN)
    List(Vec<Expression>),
    /// Scalar subquery
    Subquery(Arc<ClauseSet>),
    /// Star (*) for SELECT * and COUNT(*)
    Star,
    /// Aliased expression (expr AS alias)
    Aliased(AliasedExpression),
    /// Raw SQL fragment with bound parameter values
    Raw(RawFragment),
}

/// Bare identifier
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Qualified identifier (table.column)
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedIdentifier {
    pub qualifier: String,
    pub name: String,
}

impl QualifiedIdentifier {
    pub fn new(qualifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            qualifier: qualifier.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for QualifiedIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.qualifier, self.name)
    }
}

/// Placeholder inside a raw SQL fragment
#[derive(Debug, Clone, PartialEq)]
pub enum Placeholder {
    /// Positional marker (?), 0-based ordinal into the fragment's params
    Positional(usize),
    /// Named marker (:name), looked up in the statement's binding map
    Named(String),
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placeholder::Positional(_) => write!(f, "?"),
            Placeholder::Named(name) => write!(f, ":{}", name),
        }
    }
}

/// Binary operator (pre-resolved at construction time; the compiler matches
/// on this enum instead of comparing operator strings)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    // Comparison operators
    Equal,        // =
    NotEqual,     // <>
    LessThan,     // <
    LessEqual,    // <=
    GreaterThan,  // >
    GreaterEqual, // >=

    // Membership
    In,    // IN
    NotIn, // NOT IN

    // Null / boolean checks
    Is,    // IS
    IsNot, // IS NOT

    // Pattern matching
    Like,      // LIKE
    NotLike,   // NOT LIKE
    ILike,     // ILIKE (case-insensitive, dialect-dependent)
    NotILike,  // NOT ILIKE
    Regexp,    // regex match (dialect-dependent rendering)
    NotRegexp, // negated regex match

    // Arithmetic
    Add,      // +
    Subtract, // -
    Multiply, // *
    Divide,   // /

    // String
    Concat, // ||
}

impl BinaryOperator {
    /// ANSI symbol for this operator; pattern/regex operators are rendered
    /// by the dialect instead and only fall back to these names in
    /// diagnostics
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Equal => "=",
            BinaryOperator::NotEqual => "<>",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::In => "IN",
            BinaryOperator::NotIn => "NOT IN",
            BinaryOperator::Is => "IS",
            BinaryOperator::IsNot => "IS NOT",
            BinaryOperator::Like => "LIKE",
            BinaryOperator::NotLike => "NOT LIKE",
            BinaryOperator::ILike => "ILIKE",
            BinaryOperator::NotILike => "NOT ILIKE",
            BinaryOperator::Regexp => "REGEXP",
            BinaryOperator::NotRegexp => "NOT REGEXP",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Concat => "||",
        }
    }

    /// The direct negation of this operator, if one exists
    pub fn negated(&self) -> Option<BinaryOperator> {
        match self {
            BinaryOperator::Equal => Some(BinaryOperator::NotEqual),
            BinaryOperator::NotEqual => Some(BinaryOperator::Equal),
            BinaryOperator::LessThan => Some(BinaryOperator::GreaterEqual),
            BinaryOperator::LessEqual => Some(BinaryOperator::GreaterThan),
            BinaryOperator::GreaterThan => Some(BinaryOperator::LessEqual),
            BinaryOperator::GreaterEqual => Some(BinaryOperator::LessThan),
            BinaryOperator::In => Some(BinaryOperator::NotIn),
            BinaryOperator::NotIn => Some(BinaryOperator::In),
            BinaryOperator::Is => Some(BinaryOperator::IsNot),
            BinaryOperator::IsNot => Some(BinaryOperator::Is),
            BinaryOperator::Like => Some(BinaryOperator::NotLike),
            BinaryOperator::NotLike => Some(BinaryOperator::Like),
            BinaryOperator::ILike => Some(BinaryOperator::NotILike),
            BinaryOperator::NotILike => Some(BinaryOperator::ILike),
            BinaryOperator::Regexp => Some(BinaryOperator::NotRegexp),
            BinaryOperator::NotRegexp => Some(BinaryOperator::Regexp),
            _ => None,
        }
    }

    /// Returns true for operators the dialect renders itself
    pub fn is_pattern(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Like
                | BinaryOperator::NotLike
                | BinaryOperator::ILike
                | BinaryOperator::NotILike
                | BinaryOperator::Regexp
                | BinaryOperator::NotRegexp
        )
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Binary expression
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    pub op: BinaryOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

impl BinaryExpression {
    pub fn new(op: BinaryOperator, left: Expression, right: Expression) -> Self {
        Self {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

impl fmt::Display for BinaryExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.left, self.op, self.right)
    }
}

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    /// Arithmetic negation (-)
    Negate,
}

/// Unary expression
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpression {
    pub op: UnaryOperator,
    pub operand: Box<Expression>,
}

impl fmt::Display for UnaryExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            UnaryOperator::Negate => write!(f, "(-{})", self.operand),
        }
    }
}

/// Function call
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expression>,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}

/// Aliased expression (expr AS alias)
#[derive(Debug, Clone, PartialEq)]
pub struct AliasedExpression {
    pub expr: Box<Expression>,
    pub alias: String,
}

impl fmt::Display for AliasedExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} AS {}", self.expr, self.alias)
    }
}

/// Raw SQL fragment with bound parameter values
///
/// The template may contain ? markers consuming positional values left to
/// right, or :name markers resolved from a named-bindings map. The fragment
/// text is spliced into the output verbatim apart from marker rewriting.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFragment {
    pub template: String,
    pub bindings: RawBindings,
}

impl RawFragment {
    /// Fragment with positional (?) parameters
    pub fn new(template: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            template: template.into(),
            bindings: RawBindings::Positional(params),
        }
    }

    /// Fragment with named (:name) parameters
    pub fn named(template: impl Into<String>, bindings: FxHashMap<String, Value>) -> Self {
        Self {
            template: template.into(),
            bindings: RawBindings::Named(bindings),
        }
    }
}

impl fmt::Display for RawFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.template)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(e) => write!(f, "{}", e),
            Expression::Qualified(e) => write!(f, "{}", e),
            Expression::Literal(v) => write!(f, "{}", v),
            Expression::Placeholder(p) => write!(f, "{}", p),
            Expression::Binary(e) => write!(f, "{}", e),
            Expression::Unary(e) => write!(f, "{}", e),
            Expression::FunctionCall(e) => write!(f, "{}", e),
            Expression::And(parts) => write_joined(f, parts, " AND "),
            Expression::Or(parts) => write_joined(f, parts, " OR "),
            Expression::Not(inner) => write!(f, "NOT {}", inner),
            Expression::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            Expression::Subquery(_) => write!(f, "(<subquery>)"),
            Expression::Star => write!(f, "*"),
            Expression::Aliased(e) => write!(f, "{}", e),
            Expression::Raw(e) => write!(f, "{}", e),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, parts: &[Expression], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", part)?;
    }
    write!(f, ")")
}

// ============================================================================
// Negation and normalization
// ============================================================================

impl Expression {
    /// De Morgan negation of this expression
    ///
    /// Comparison, membership, IS and pattern operators flip directly;
    /// NOT is pushed through AND/OR with recursively negated operands;
    /// a double negation unwraps. Anything without a direct negation is
    /// wrapped in NOT.
    pub fn negated(&self) -> Expression {
        match self {
            Expression::Binary(b) => match b.op.negated() {
                Some(op) => Expression::Binary(BinaryExpression {
                    op,
                    left: b.left.clone(),
                    right: b.right.clone(),
                }),
                None => Expression::Not(Box::new(self.clone())),
            },
            Expression::And(parts) => {
                Expression::Or(parts.iter().map(Expression::negated).collect())
            }
            Expression::Or(parts) => {
                Expression::And(parts.iter().map(Expression::negated).collect())
            }
            Expression::Not(inner) => (**inner).clone(),
            other => Expression::Not(Box::new(other.clone())),
        }
    }

    /// Flatten directly nested AND-of-AND and OR-of-OR into a single level
    ///
    /// Used to compare predicates built along different paths: the builder
    /// produces binary AND nesting while the translator produces n-ary
    /// nodes, and both should compare equal semantically.
    pub fn flattened(&self) -> Expression {
        match self {
            Expression::And(parts) => {
                let mut flat = Vec::with_capacity(parts.len());
                for part in parts {
                    match part.flattened() {
                        Expression::And(inner) => flat.extend(inner),
                        other => flat.push(other),
                    }
                }
                if flat.len() == 1 {
                    flat.pop().unwrap()
                } else {
                    Expression::And(flat)
                }
            }
            Expression::Or(parts) => {
                let mut flat = Vec::with_capacity(parts.len());
                for part in parts {
                    match part.flattened() {
                        Expression::Or(inner) => flat.extend(inner),
                        other => flat.push(other),
                    }
                }
                if flat.len() == 1 {
                    flat.pop().unwrap()
                } else {
                    Expression::Or(flat)
                }
            }
            Expression::Not(inner) => Expression::Not(Box::new(inner.flattened())),
            Expression::Binary(b) => Expression::Binary(BinaryExpression {
                op: b.op,
                left: Box::new(b.left.flattened()),
                right: Box::new(b.right.flattened()),
            }),
            other => other.clone(),
        }
    }

    /// AND-combine two predicates, merging into an existing n-ary AND
    pub fn and_combine(self, other: Expression) -> Expression {
        match self {
            Expression::And(mut parts) => {
                parts.push(other);
                Expression::And(parts)
            }
            first => Expression::And(vec![first, other]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::build::{col, lit};

    #[test]
    fn test_operator_negation() {
        assert_eq!(
            BinaryOperator::Equal.negated(),
            Some(BinaryOperator::NotEqual)
        );
        assert_eq!(BinaryOperator::In.negated(), Some(BinaryOperator::NotIn));
        assert_eq!(BinaryOperator::Is.negated(), Some(BinaryOperator::IsNot));
        assert_eq!(
            BinaryOperator::LessThan.negated(),
            Some(BinaryOperator::GreaterEqual)
        );
        assert_eq!(BinaryOperator::Add.negated(), None);
    }

    #[test]
    fn test_de_morgan_negation() {
        let pred = col("a").eq(lit(1)).and(col("b").eq(lit(2)));
        let negated = pred.negated();
        assert_eq!(
            negated,
            col("a").neq(lit(1)).or(col("b").neq(lit(2)))
        );
    }

    #[test]
    fn test_double_negation_unwraps() {
        let pred = Expression::Not(Box::new(col("a").eq(lit(1))));
        assert_eq!(pred.negated(), col("a").eq(lit(1)));
    }

    #[test]
    fn test_negation_wraps_unknown_shapes() {
        let raw = Expression::Raw(RawFragment::new("custom_fn(a)", vec![]));
        assert_eq!(raw.negated(), Expression::Not(Box::new(raw.clone())));
    }

    #[test]
    fn test_flatten_nested_and() {
        let nested = Expression::And(vec![
            Expression::And(vec![col("a").eq(lit(1)), col("b").eq(lit(2))]),
            col("c").eq(lit(3)),
        ]);
        let flat = Expression::And(vec![
            col("a").eq(lit(1)),
            col("b").eq(lit(2)),
            col("c").eq(lit(3)),
        ]);
        assert_eq!(nested.flattened(), flat);
    }

    #[test]
    fn test_display() {
        let e = col("a").eq(lit(1)).and(col("t.b").neq(lit("x")));
        assert_eq!(e.to_string(), "((a = 1) AND (t.b <> 'x'))");
        // Qualified identifiers render with their dot
        assert_eq!(col("t.b").to_string(), "t.b");
    }
}
