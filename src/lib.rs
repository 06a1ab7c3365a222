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

//! # Quarry - immutable SQL query building and compilation
//!
//! Quarry is the query-building core of an ORM: immutable, composable
//! query values that accumulate clauses through chained transformations
//! and compile deterministically to dialect-correct SQL with an ordered
//! parameter list. It executes nothing - the compiled `(sql, params)`
//! pair is handed to an external statement executor.
//!
//! ## Key properties
//!
//! - **Persistent values** - every builder call returns a new dataset;
//!   the receiver is never mutated and remains independently usable
//! - **Injection-safe by construction** - literal values always compile
//!   to placeholders, never into the SQL text
//! - **Implicit join qualification** - pair-form join conditions resolve
//!   against the current and most-recently-joined aliases, with explicit
//!   qualification as the escape hatch
//! - **Dialect-aware** - quoting, placeholder markers and operator
//!   support differ per target; unsupported constructs fail at compile
//!   time
//!
//! ## Quick Start
//!
//! ```rust
//! use quarry::{compile, Ansi, Dataset};
//!
//! let albums = Dataset::from_table("albums");
//! let recent = albums
//!     .filter(("year", 2015i64..=2020)).unwrap()
//!     .order([quarry::col("year").desc()])
//!     .limit(10);
//!
//! let query = compile(recent.clauses(), &Ansi).unwrap();
//! assert_eq!(
//!     query.sql,
//!     "SELECT * FROM \"albums\" WHERE \"year\" >= ? AND \"year\" <= ? \
//!      ORDER BY \"year\" DESC LIMIT 10"
//! );
//! // `albums` is untouched and still compiles to SELECT * FROM "albums"
//! ```
//!
//! ## Modules
//!
//! - [`core`] - [`Value`] and [`Error`]/[`Result`]
//! - [`expr`] - the expression model and fluent construction API
//! - [`dataset`] - clause sets, the chainable builder, filter translation
//!   and join resolution
//! - [`compile`] - dialects and the clause-set compiler
//! - [`parser`] - predicate read-back for round-trip verification

pub mod compile;
pub mod core;
pub mod dataset;
pub mod expr;
pub mod parser;

// Re-export main types for convenience
pub use core::{Error, Result, Value};

pub use expr::{
    col, count_star, func, lit, qual, raw, star, BinaryOperator, Expression, Identifier,
    QualifiedIdentifier, RawFragment,
};

pub use dataset::{
    ClauseSet, ColumnRef, Dataset, Direction, FilterArg, FilterValue, JoinCondition, JoinKind,
    JoinOn, JoinOperand, JoinSpec, Limit, LockMode, OrderedExpression, Pattern, RawBindings,
    RawStatement, TableRef, TableSource,
};

pub use compile::{compile, Ansi, CompiledQuery, Dialect, Postgres, Sqlite};

pub use parser::parse_predicate;
