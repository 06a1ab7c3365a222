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

//! Error types for Quarry
//!
//! All errors are raised synchronously at the call that detects them.
//! Query building touches no external resource, so there is no transient
//! failure category and no retry logic anywhere in the crate.

use thiserror::Error;

/// Result type alias for Quarry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Quarry operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // =========================================================================
    // Builder errors
    // =========================================================================
    /// reverse() called on a dataset with no ORDER BY clause
    #[error("cannot reverse dataset: no order clause present")]
    MissingOrder,

    /// Filter value of a kind the translator cannot canonicalize
    #[error("unsupported filter value: {0}")]
    UnsupportedFilterType(String),

    /// USING join with an empty column list
    #[error("USING join requires at least one column")]
    EmptyUsingList,

    // =========================================================================
    // Join resolution errors
    // =========================================================================
    /// Join condition column cannot be implicitly qualified
    #[error("cannot qualify column '{column}' in join condition: {detail}")]
    AmbiguousQualification { column: String, detail: String },

    // =========================================================================
    // Compilation errors
    // =========================================================================
    /// Construct unsupported by the target dialect
    #[error("compilation failed: {0}")]
    Compilation(String),

    /// Named placeholder in raw SQL with no value bound to it
    #[error("no value bound for parameter ':{0}'")]
    UnboundParameter(String),

    // =========================================================================
    // Read-back parser errors
    // =========================================================================
    /// Predicate text could not be parsed
    #[error("parse error at line {line}, column {column}: {message}")]
    Parse {
        message: String,
        line: usize,
        column: usize,
    },
}

impl Error {
    /// Create a new UnsupportedFilterType error
    pub fn unsupported_filter(detail: impl Into<String>) -> Self {
        Error::UnsupportedFilterType(detail.into())
    }

    /// Create a new AmbiguousQualification error
    pub fn ambiguous_qualification(column: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::AmbiguousQualification {
            column: column.into(),
            detail: detail.into(),
        }
    }

    /// Create a new Compilation error
    pub fn compilation(message: impl Into<String>) -> Self {
        Error::Compilation(message.into())
    }

    /// Create a new Parse error
    pub fn parse(message: impl Into<String>, line: usize, column: usize) -> Self {
        Error::Parse {
            message: message.into(),
            line,
            column,
        }
    }

    /// Check if this error was caused by builder input (as opposed to a
    /// dialect limitation discovered at compile time)
    pub fn is_builder_error(&self) -> bool {
        matches!(
            self,
            Error::MissingOrder
                | Error::UnsupportedFilterType(_)
                | Error::EmptyUsingList
                | Error::AmbiguousQualification { .. }
        )
    }

    /// Check if this error was raised during compilation
    pub fn is_compilation_error(&self) -> bool {
        matches!(self, Error::Compilation(_) | Error::UnboundParameter(_))
    }
}
