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

//! Clause set - the immutable state of one dataset
//!
//! A [`ClauseSet`] is a snapshot of every accumulated clause. Builder
//! transformations clone the snapshot and replace only the fields they
//! touch; predicates and subqueries sit behind Arc so derived snapshots
//! share them. Two clause sets are value-equal iff every field is.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::core::Value;
use crate::expr::ast::Expression;

// ============================================================================
// Table references
// ============================================================================

/// Source of a table reference: a named table or a derived subquery
#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    /// Named table
    Named(String),
    /// Derived table (subquery)
    Subquery(Arc<ClauseSet>),
}

/// A table reference with an optional alias
#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    pub source: TableSource,
    pub alias: Option<String>,
}

impl TableRef {
    /// Reference a named table
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            source: TableSource::Named(name.into()),
            alias: None,
        }
    }

    /// Reference a named table with an alias
    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            source: TableSource::Named(name.into()),
            alias: Some(alias.into()),
        }
    }

    /// Reference a derived table with an alias
    pub fn derived(clauses: Arc<ClauseSet>, alias: impl Into<String>) -> Self {
        Self {
            source: TableSource::Subquery(clauses),
            alias: Some(alias.into()),
        }
    }

    /// The name other clauses can qualify columns with: the alias when
    /// present, otherwise the table name. None for an unaliased subquery.
    pub fn qualifier(&self) -> Option<&str> {
        match (&self.alias, &self.source) {
            (Some(alias), _) => Some(alias),
            (None, TableSource::Named(name)) => Some(name),
            (None, TableSource::Subquery(_)) => None,
        }
    }
}

impl From<&str> for TableRef {
    fn from(name: &str) -> Self {
        TableRef::named(name)
    }
}

impl From<String> for TableRef {
    fn from(name: String) -> Self {
        TableRef::named(name)
    }
}

// ============================================================================
// Joins
// ============================================================================

/// Join kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Natural,
    Cross,
}

impl JoinKind {
    /// SQL keyword sequence for this join kind
    pub fn keyword(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL JOIN",
            JoinKind::Natural => "NATURAL JOIN",
            JoinKind::Cross => "CROSS JOIN",
        }
    }

    /// NATURAL and CROSS joins carry no condition
    pub fn takes_condition(&self) -> bool {
        !matches!(self, JoinKind::Natural | JoinKind::Cross)
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// Resolved join condition
#[derive(Debug, Clone, PartialEq)]
pub enum JoinCondition {
    /// ON expression
    On(Expression),
    /// USING (col, ...)
    Using(Vec<String>),
}

/// One join in append order
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSpec {
    pub kind: JoinKind,
    pub target: TableRef,
    pub condition: Option<JoinCondition>,
}

// ============================================================================
// Ordering, limit, locking
// ============================================================================

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn reversed(&self) -> Direction {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// One ORDER BY term
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedExpression {
    pub expr: Expression,
    pub direction: Direction,
}

impl OrderedExpression {
    /// Same expression, flipped direction
    pub fn reversed(&self) -> OrderedExpression {
        OrderedExpression {
            expr: self.expr.clone(),
            direction: self.direction.reversed(),
        }
    }
}

/// LIMIT count with OFFSET
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub count: u64,
    pub offset: u64,
}

/// Row-locking suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockMode {
    ForUpdate,
}

// ============================================================================
// Raw statements
// ============================================================================

/// Parameter bindings for a raw statement
#[derive(Debug, Clone, PartialEq)]
pub enum RawBindings {
    /// Values consumed left to right by ? markers
    Positional(Vec<Value>),
    /// Values looked up by :name markers
    Named(FxHashMap<String, Value>),
}

/// A literal statement that bypasses clause compilation entirely
#[derive(Debug, Clone, PartialEq)]
pub struct RawStatement {
    pub sql: String,
    pub bindings: RawBindings,
}

// ============================================================================
// ClauseSet
// ============================================================================

/// Immutable snapshot of one dataset's accumulated clauses
///
/// Every field is independently replaceable. An empty select list means
/// `SELECT *`. When `raw` is set the other fields are ignored by the
/// compiler and the literal statement is passed through.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClauseSet {
    pub from: Vec<TableRef>,
    pub joins: Vec<JoinSpec>,
    pub select: Vec<Expression>,
    pub where_: Option<Arc<Expression>>,
    pub having: Option<Arc<Expression>>,
    pub group: Vec<Expression>,
    pub order: Vec<OrderedExpression>,
    pub limit: Option<Limit>,
    pub distinct: bool,
    pub lock: Option<LockMode>,
    pub raw: Option<RawStatement>,
}

impl ClauseSet {
    /// Clause set over a single base table
    pub fn from_table(table: impl Into<TableRef>) -> Self {
        ClauseSet {
            from: vec![table.into()],
            ..ClauseSet::default()
        }
    }

    /// Clause set carrying a literal statement (see [`RawStatement`])
    pub fn from_raw(sql: impl Into<String>, bindings: RawBindings) -> Self {
        ClauseSet {
            raw: Some(RawStatement {
                sql: sql.into(),
                bindings,
            }),
            ..ClauseSet::default()
        }
    }

    /// True when this clause set bypasses compilation
    pub fn is_raw(&self) -> bool {
        self.raw.is_some()
    }
}
