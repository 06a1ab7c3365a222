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

//! Join condition resolution
//!
//! Pair-form join conditions qualify their keys with the alias of the table
//! being joined and their values with the alias of the most recently joined
//! table (the base table for the first join). That "previous" alias is
//! threaded explicitly from the clause set into every resolution call; an
//! already-qualified reference always wins over implicit qualification.
//! USING and NATURAL joins bypass resolution entirely.

use crate::core::{Error, Result, Value};
use crate::expr::ast::{BinaryExpression, BinaryOperator, Expression};

use super::clause::{ClauseSet, JoinCondition};
use super::filter::ColumnRef;

// ============================================================================
// Condition inputs
// ============================================================================

/// The value side of a join-condition pair
#[derive(Debug, Clone, PartialEq)]
pub enum JoinOperand {
    /// Column reference, implicitly qualified with the previous alias
    /// unless already qualified
    Column(ColumnRef),
    /// Literal value, never qualified
    Value(Value),
    /// Pre-built expression, used verbatim
    Expr(Expression),
}

impl From<&str> for JoinOperand {
    fn from(name: &str) -> Self {
        JoinOperand::Column(ColumnRef::parse(name))
    }
}

impl From<ColumnRef> for JoinOperand {
    fn from(column: ColumnRef) -> Self {
        JoinOperand::Column(column)
    }
}

impl From<Value> for JoinOperand {
    fn from(value: Value) -> Self {
        JoinOperand::Value(value)
    }
}

impl From<i64> for JoinOperand {
    fn from(value: i64) -> Self {
        JoinOperand::Value(Value::Integer(value))
    }
}

impl From<Expression> for JoinOperand {
    fn from(expr: Expression) -> Self {
        JoinOperand::Expr(expr)
    }
}

/// One join-condition input form
#[derive(Debug, Clone, PartialEq)]
pub enum JoinOn {
    /// Ordered (column, operand) pairs, equality-joined and AND-combined
    Pairs(Vec<(ColumnRef, JoinOperand)>),
    /// Pre-built ON expression, bypasses implicit qualification
    Expr(Expression),
    /// USING (col, ...) with the literal shared column names
    Using(Vec<String>),
}

impl JoinOn {
    /// Build the pair form
    pub fn pairs<K, V, I>(input: I) -> Self
    where
        K: Into<ColumnRef>,
        V: Into<JoinOperand>,
        I: IntoIterator<Item = (K, V)>,
    {
        JoinOn::Pairs(
            input
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build the USING form
    pub fn using<S, I>(columns: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        JoinOn::Using(columns.into_iter().map(Into::into).collect())
    }
}

impl From<Expression> for JoinOn {
    fn from(expr: Expression) -> Self {
        JoinOn::Expr(expr)
    }
}

impl<K, V> From<(K, V)> for JoinOn
where
    K: Into<ColumnRef>,
    V: Into<JoinOperand>,
{
    fn from(pair: (K, V)) -> Self {
        JoinOn::Pairs(vec![(pair.0.into(), pair.1.into())])
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// The qualifier the next join's pair values implicitly reference: the
/// most recently joined table, or the base table when no join exists yet
pub fn previous_qualifier(clauses: &ClauseSet) -> Result<String> {
    let table = match clauses.joins.last() {
        Some(join) => &join.target,
        None => clauses.from.first().ok_or_else(|| {
            Error::ambiguous_qualification("*", "dataset has no base table to qualify against")
        })?,
    };
    match table.qualifier() {
        Some(name) => Ok(name.to_string()),
        None => Err(Error::ambiguous_qualification(
            "*",
            "previous table is an unaliased subquery; alias it or qualify explicitly",
        )),
    }
}

/// Resolve a join condition input against the current and previous aliases
pub fn resolve(current: &str, previous: &str, on: JoinOn) -> Result<JoinCondition> {
    match on {
        JoinOn::Pairs(pairs) => {
            let mut parts = Vec::with_capacity(pairs.len());
            for (column, operand) in pairs {
                let left = column.qualified_with(current);
                let right = match operand {
                    JoinOperand::Column(c) => c.qualified_with(previous),
                    JoinOperand::Value(v) => Expression::Literal(v),
                    JoinOperand::Expr(e) => e,
                };
                parts.push(Expression::Binary(BinaryExpression::new(
                    BinaryOperator::Equal,
                    left,
                    right,
                )));
            }
            if parts.is_empty() {
                return Err(Error::ambiguous_qualification(
                    "*",
                    "join condition has no pairs",
                ));
            }
            let expr = if parts.len() == 1 {
                parts.pop().unwrap()
            } else {
                Expression::And(parts)
            };
            Ok(JoinCondition::On(expr))
        }
        JoinOn::Expr(expr) => Ok(JoinCondition::On(expr)),
        JoinOn::Using(columns) => {
            if columns.is_empty() {
                return Err(Error::EmptyUsingList);
            }
            Ok(JoinCondition::Using(columns))
        }
    }
}
