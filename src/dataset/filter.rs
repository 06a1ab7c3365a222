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

//! Filter predicate translation
//!
//! Converts heterogeneous filter inputs into canonical boolean
//! [`Expression`] trees. Operator selection depends on the value variant,
//! dispatched by an explicit match: scalars become equality, lists become
//! IN, sub-datasets become IN (subquery), ranges become bound conjunctions,
//! patterns become the dialect's match operator. Unrepresentable inputs
//! fail with [`Error::UnsupportedFilterType`] at translation time.

use std::ops::RangeInclusive;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::core::{Error, Result, Value};
use crate::expr::ast::{
    BinaryExpression, BinaryOperator, Expression, Identifier, QualifiedIdentifier, RawFragment,
};

use super::clause::ClauseSet;

// ============================================================================
// Column references
// ============================================================================

/// A column key in a filter or join pair
///
/// Parsed from strings: a dotted name is an explicit qualification
/// ("items.id"), which the join resolver never overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Plain(String),
    Qualified(String, String),
}

impl ColumnRef {
    /// Parse a column reference, splitting on the first dot
    pub fn parse(name: &str) -> Self {
        match name.split_once('.') {
            Some((table, column)) => {
                ColumnRef::Qualified(table.to_string(), column.to_string())
            }
            None => ColumnRef::Plain(name.to_string()),
        }
    }

    /// True when the reference already names its table
    pub fn is_qualified(&self) -> bool {
        matches!(self, ColumnRef::Qualified(_, _))
    }

    /// The bare column name
    pub fn column_name(&self) -> &str {
        match self {
            ColumnRef::Plain(name) => name,
            ColumnRef::Qualified(_, name) => name,
        }
    }

    /// Expression for this reference as written
    pub fn to_expression(&self) -> Expression {
        match self {
            ColumnRef::Plain(name) => Expression::Identifier(Identifier::new(name.clone())),
            ColumnRef::Qualified(table, name) => {
                Expression::Qualified(QualifiedIdentifier::new(table.clone(), name.clone()))
            }
        }
    }

    /// Expression qualified with `table` unless already qualified
    pub fn qualified_with(&self, table: &str) -> Expression {
        match self {
            ColumnRef::Plain(name) => {
                Expression::Qualified(QualifiedIdentifier::new(table, name.clone()))
            }
            ColumnRef::Qualified(_, _) => self.to_expression(),
        }
    }
}

impl From<&str> for ColumnRef {
    fn from(name: &str) -> Self {
        ColumnRef::parse(name)
    }
}

impl From<String> for ColumnRef {
    fn from(name: String) -> Self {
        ColumnRef::parse(&name)
    }
}

// ============================================================================
// Pattern objects
// ============================================================================

/// A pattern-match filter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub text: String,
    pub case_insensitive: bool,
    pub regex: bool,
}

impl Pattern {
    /// LIKE pattern (% and _ wildcards)
    pub fn like(text: impl Into<String>) -> Self {
        Pattern {
            text: text.into(),
            case_insensitive: false,
            regex: false,
        }
    }

    /// Case-insensitive LIKE pattern
    pub fn ilike(text: impl Into<String>) -> Self {
        Pattern {
            text: text.into(),
            case_insensitive: true,
            regex: false,
        }
    }

    /// Regular-expression pattern (dialect-dependent operator)
    pub fn regex(text: impl Into<String>) -> Self {
        Pattern {
            text: text.into(),
            case_insensitive: false,
            regex: true,
        }
    }

    fn operator(&self) -> BinaryOperator {
        match (self.regex, self.case_insensitive) {
            (true, _) => BinaryOperator::Regexp,
            (false, true) => BinaryOperator::ILike,
            (false, false) => BinaryOperator::Like,
        }
    }
}

// ============================================================================
// Filter values
// ============================================================================

/// The value side of a filter pair; the variant selects the operator
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Equality against a scalar; NULL and booleans become IS checks
    Scalar(Value),
    /// Set membership (IN); an empty list is constant-false
    List(Vec<Value>),
    /// Set membership against a sub-dataset
    Dataset(Arc<ClauseSet>),
    /// Inclusive range: >= start AND <= end
    Range { start: Value, end: Value },
    /// Pattern match
    Pattern(Pattern),
    /// Pre-built expression used as the right-hand side of equality
    Expr(Expression),
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        FilterValue::Scalar(Value::Integer(v))
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        FilterValue::Scalar(Value::Integer(v as i64))
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        FilterValue::Scalar(Value::Float(v))
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        FilterValue::Scalar(Value::Boolean(v))
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Scalar(Value::from(v))
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Scalar(Value::from(v))
    }
}

impl From<Value> for FilterValue {
    fn from(v: Value) -> Self {
        FilterValue::Scalar(v)
    }
}

impl<V> From<Vec<V>> for FilterValue
where
    V: Into<Value>,
{
    fn from(values: Vec<V>) -> Self {
        FilterValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<RangeInclusive<i64>> for FilterValue {
    fn from(range: RangeInclusive<i64>) -> Self {
        let (start, end) = range.into_inner();
        FilterValue::Range {
            start: Value::Integer(start),
            end: Value::Integer(end),
        }
    }
}

impl From<Pattern> for FilterValue {
    fn from(pattern: Pattern) -> Self {
        FilterValue::Pattern(pattern)
    }
}

impl From<Expression> for FilterValue {
    fn from(expr: Expression) -> Self {
        FilterValue::Expr(expr)
    }
}

impl From<Arc<ClauseSet>> for FilterValue {
    fn from(clauses: Arc<ClauseSet>) -> Self {
        FilterValue::Dataset(clauses)
    }
}

// ============================================================================
// Filter arguments
// ============================================================================

/// One filter input
///
/// The pair-sequence form is ordered and permits duplicate keys, which a
/// mapping form could not represent; it is the canonical multi-pair input.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterArg {
    /// Ordered (column, value) pairs, AND-combined in input order
    Pairs(Vec<(ColumnRef, FilterValue)>),
    /// Pre-built boolean expression, used verbatim
    Expr(Expression),
    /// Raw SQL template with positional (?) parameter values
    Raw(RawFragment),
    /// Bare identifier, treated as a truthiness test (IS TRUE)
    Ident(ColumnRef),
}

impl FilterArg {
    /// Build the pair-sequence form
    pub fn pairs<K, V, I>(input: I) -> Self
    where
        K: Into<ColumnRef>,
        V: Into<FilterValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        FilterArg::Pairs(
            input
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Raw SQL template with positional (?) parameters
    pub fn raw(template: impl Into<String>, params: Vec<Value>) -> Self {
        FilterArg::Raw(RawFragment::new(template, params))
    }

    /// Raw SQL template with named (:name) parameters
    pub fn raw_named(template: impl Into<String>, bindings: FxHashMap<String, Value>) -> Self {
        FilterArg::Raw(RawFragment::named(template, bindings))
    }

    /// Bare-identifier truthiness test
    pub fn ident(column: impl Into<ColumnRef>) -> Self {
        FilterArg::Ident(column.into())
    }
}

impl From<Expression> for FilterArg {
    fn from(expr: Expression) -> Self {
        FilterArg::Expr(expr)
    }
}

impl<K, V> From<(K, V)> for FilterArg
where
    K: Into<ColumnRef>,
    V: Into<FilterValue>,
{
    fn from(pair: (K, V)) -> Self {
        FilterArg::Pairs(vec![(pair.0.into(), pair.1.into())])
    }
}

// ============================================================================
// Translation
// ============================================================================

/// Translate one filter input into a canonical boolean expression
pub fn translate(arg: FilterArg) -> Result<Expression> {
    match arg {
        FilterArg::Pairs(pairs) => {
            let mut parts = Vec::with_capacity(pairs.len());
            for (column, value) in pairs {
                parts.push(translate_pair(&column, value)?);
            }
            match parts.len() {
                0 => Err(Error::unsupported_filter("empty pair sequence")),
                1 => Ok(parts.pop().unwrap()),
                _ => Ok(Expression::And(parts)),
            }
        }
        FilterArg::Expr(expr) => Ok(expr),
        FilterArg::Raw(fragment) => Ok(Expression::Raw(fragment)),
        FilterArg::Ident(column) => Ok(Expression::Binary(BinaryExpression::new(
            BinaryOperator::Is,
            column.to_expression(),
            Expression::Literal(Value::Boolean(true)),
        ))),
    }
}

/// Translate one (column, value) pair per the operator-selection rules
fn translate_pair(column: &ColumnRef, value: FilterValue) -> Result<Expression> {
    let key = column.to_expression();
    match value {
        FilterValue::Scalar(Value::Null) => Ok(Expression::Binary(BinaryExpression::new(
            BinaryOperator::Is,
            key,
            Expression::Literal(Value::Null),
        ))),
        FilterValue::Scalar(Value::Boolean(b)) => Ok(Expression::Binary(BinaryExpression::new(
            BinaryOperator::Is,
            key,
            Expression::Literal(Value::Boolean(b)),
        ))),
        FilterValue::Scalar(Value::Float(f)) if f.is_nan() => Err(Error::unsupported_filter(
            format!("NaN equality for column '{}'", column.column_name()),
        )),
        FilterValue::Scalar(v) => Ok(Expression::Binary(BinaryExpression::new(
            BinaryOperator::Equal,
            key,
            Expression::Literal(v),
        ))),
        FilterValue::List(values) => {
            if values.is_empty() {
                // Empty IN can match nothing; emit constant false
                return Ok(Expression::Raw(RawFragment::new("1 = 0", vec![])));
            }
            let items = values.into_iter().map(Expression::Literal).collect();
            Ok(Expression::Binary(BinaryExpression::new(
                BinaryOperator::In,
                key,
                Expression::List(items),
            )))
        }
        FilterValue::Dataset(clauses) => Ok(Expression::Binary(BinaryExpression::new(
            BinaryOperator::In,
            key,
            Expression::Subquery(clauses),
        ))),
        FilterValue::Range { start, end } => {
            match start.partial_cmp(&end) {
                Some(ord) if ord != std::cmp::Ordering::Greater => {}
                _ => {
                    return Err(Error::unsupported_filter(format!(
                        "range bounds {} and {} for column '{}' are inverted or incomparable",
                        start,
                        end,
                        column.column_name()
                    )))
                }
            }
            Ok(Expression::And(vec![
                Expression::Binary(BinaryExpression::new(
                    BinaryOperator::GreaterEqual,
                    key.clone(),
                    Expression::Literal(start),
                )),
                Expression::Binary(BinaryExpression::new(
                    BinaryOperator::LessEqual,
                    key,
                    Expression::Literal(end),
                )),
            ]))
        }
        FilterValue::Pattern(pattern) => {
            let op = pattern.operator();
            Ok(Expression::Binary(BinaryExpression::new(
                op,
                key,
                Expression::Literal(Value::text(pattern.text)),
            )))
        }
        FilterValue::Expr(expr) => Ok(Expression::Binary(BinaryExpression::new(
            BinaryOperator::Equal,
            key,
            expr,
        ))),
    }
}
