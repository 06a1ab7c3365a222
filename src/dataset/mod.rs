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

//! Datasets: immutable clause sets and the chainable builder over them
//!
//! - [`clause`] - the [`ClauseSet`] snapshot and its component types
//! - [`builder`] - the chainable [`Dataset`] transformations
//! - [`filter`] - filter-input translation to canonical predicates
//! - [`join`] - join-condition resolution and alias threading

pub mod builder;
pub mod clause;
pub mod filter;
pub mod join;

pub use builder::Dataset;
pub use clause::{
    ClauseSet, Direction, JoinCondition, JoinKind, JoinSpec, Limit, LockMode, OrderedExpression,
    RawBindings, RawStatement, TableRef, TableSource,
};
pub use filter::{ColumnRef, FilterArg, FilterValue, Pattern};
pub use join::{JoinOn, JoinOperand};
