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

//! Dialects - target-database rendering rules
//!
//! A dialect decides identifier quoting, placeholder markers, pattern
//! operators, and which constructs exist at all. Everything a dialect
//! cannot express fails with [`Error::Compilation`] at compile time rather
//! than producing SQL the target would reject.

use crate::core::{Error, Result};
use crate::dataset::clause::{JoinKind, Limit, LockMode};

/// Target-database-specific rendering rules
pub trait Dialect {
    /// Dialect name for diagnostics
    fn name(&self) -> &'static str;

    /// Quote an identifier into `out`
    ///
    /// The default is ANSI double-quoting with embedded quotes doubled.
    fn quote_identifier(&self, ident: &str, out: &mut String) {
        out.push('"');
        for ch in ident.chars() {
            if ch == '"' {
                out.push('"');
            }
            out.push(ch);
        }
        out.push('"');
    }

    /// Write the marker for the `ordinal`-th parameter (1-based)
    fn placeholder(&self, ordinal: usize, out: &mut String);

    /// The operator text for a pattern match
    ///
    /// `case_insensitive` and `regex` come from the pattern object;
    /// `negated` selects the NOT form.
    fn pattern_operator(
        &self,
        case_insensitive: bool,
        regex: bool,
        negated: bool,
    ) -> Result<&'static str>;

    /// Whether the dialect can emit this join kind
    fn supports_join(&self, _kind: JoinKind) -> bool {
        true
    }

    /// Write the LIMIT/OFFSET clause (including leading space)
    fn write_limit(&self, limit: Limit, out: &mut String) {
        out.push_str(" LIMIT ");
        out.push_str(&limit.count.to_string());
        if limit.offset > 0 {
            out.push_str(" OFFSET ");
            out.push_str(&limit.offset.to_string());
        }
    }

    /// The locking suffix (including leading space)
    fn lock_clause(&self, mode: LockMode) -> Result<&'static str> {
        match mode {
            LockMode::ForUpdate => Ok(" FOR UPDATE"),
        }
    }
}

// ============================================================================
// ANSI (test double)
// ============================================================================

/// Plain ANSI dialect: double-quoted identifiers, `?` markers, LIKE only
///
/// Serves as the test-double dialect for round-trip verification.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ansi;

impl Dialect for Ansi {
    fn name(&self) -> &'static str {
        "ansi"
    }

    fn placeholder(&self, _ordinal: usize, out: &mut String) {
        out.push('?');
    }

    fn pattern_operator(
        &self,
        case_insensitive: bool,
        regex: bool,
        negated: bool,
    ) -> Result<&'static str> {
        if regex {
            return Err(Error::compilation(
                "ansi dialect has no regular-expression operator",
            ));
        }
        if case_insensitive {
            return Err(Error::compilation(
                "ansi dialect has no case-insensitive LIKE",
            ));
        }
        Ok(if negated { "NOT LIKE" } else { "LIKE" })
    }
}

// ============================================================================
// PostgreSQL
// ============================================================================

/// PostgreSQL: `$n` markers, ILIKE, `~` regex operators
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Dialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn placeholder(&self, ordinal: usize, out: &mut String) {
        out.push('$');
        out.push_str(&ordinal.to_string());
    }

    fn pattern_operator(
        &self,
        case_insensitive: bool,
        regex: bool,
        negated: bool,
    ) -> Result<&'static str> {
        Ok(match (regex, case_insensitive, negated) {
            (true, false, false) => "~",
            (true, false, true) => "!~",
            (true, true, false) => "~*",
            (true, true, true) => "!~*",
            (false, true, false) => "ILIKE",
            (false, true, true) => "NOT ILIKE",
            (false, false, false) => "LIKE",
            (false, false, true) => "NOT LIKE",
        })
    }
}

// ============================================================================
// SQLite
// ============================================================================

/// SQLite: `?` markers, no RIGHT/FULL join, no row locking
///
/// SQLite's LIKE is case-insensitive for ASCII, so ILIKE maps onto it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl Dialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn placeholder(&self, _ordinal: usize, out: &mut String) {
        out.push('?');
    }

    fn pattern_operator(
        &self,
        _case_insensitive: bool,
        regex: bool,
        negated: bool,
    ) -> Result<&'static str> {
        Ok(match (regex, negated) {
            (true, false) => "REGEXP",
            (true, true) => "NOT REGEXP",
            (false, false) => "LIKE",
            (false, true) => "NOT LIKE",
        })
    }

    fn supports_join(&self, kind: JoinKind) -> bool {
        !matches!(kind, JoinKind::Right | JoinKind::Full)
    }

    fn lock_clause(&self, mode: LockMode) -> Result<&'static str> {
        match mode {
            LockMode::ForUpdate => Err(Error::compilation("sqlite does not support FOR UPDATE")),
        }
    }
}
