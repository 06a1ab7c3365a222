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

//! Compilation Tests
//!
//! End-to-end checks of SQL text and parameter lists across dialects:
//! placeholder styles, pattern-operator selection, raw statements, and
//! the guarantee that filter values never reach the text as literals.

use quarry::{
    col, compile, lit, Ansi, Dataset, Error, FilterArg, Pattern, Postgres, Sqlite, Value,
};
use rustc_hash::FxHashMap;

/// Test parameter order follows emission order across clauses
#[test]
fn test_parameter_order_spans_clauses() {
    let ds = Dataset::from_table("albums")
        .select([col("name"), lit(7).alias("seven")])
        .filter(("year", 2015i64))
        .unwrap()
        .group([col("name")])
        .having(col("plays").gt(lit(100)))
        .unwrap();

    let q = compile(ds.clauses(), &Ansi).unwrap();
    assert_eq!(
        q.sql,
        "SELECT \"name\", ? AS \"seven\" FROM \"albums\" WHERE \"year\" = ? \
         GROUP BY \"name\" HAVING \"plays\" > ?"
    );
    assert_eq!(
        q.params,
        vec![Value::integer(7), Value::integer(2015), Value::integer(100)]
    );
}

/// Test hostile filter values stay out of the SQL text entirely
#[test]
fn test_values_never_appear_in_text() {
    let hostile = "x'; DROP TABLE albums; --";
    let ds = Dataset::from_table("albums").filter(("name", hostile)).unwrap();
    let q = compile(ds.clauses(), &Ansi).unwrap();

    assert!(!q.sql.contains("DROP"));
    assert_eq!(q.sql, "SELECT * FROM \"albums\" WHERE \"name\" = ?");
    assert_eq!(q.params, vec![Value::text(hostile)]);

    // When inlined for diagnostics, the embedded quote is doubled
    let inlined = q.bind_inline().unwrap();
    assert_eq!(
        inlined,
        "SELECT * FROM \"albums\" WHERE \"name\" = 'x''; DROP TABLE albums; --'"
    );
}

/// Test Postgres placeholders are numbered in parameter order
#[test]
fn test_postgres_numbered_placeholders() {
    let ds = Dataset::from_table("items")
        .filter(FilterArg::pairs([("a", 1i64), ("b", 2i64)]))
        .unwrap();
    let q = compile(ds.clauses(), &Postgres).unwrap();
    assert_eq!(q.sql, "SELECT * FROM \"items\" WHERE \"a\" = $1 AND \"b\" = $2");
}

/// Test pattern operator selection per dialect
#[test]
fn test_pattern_operators_by_dialect() {
    let ds = Dataset::from_table("items")
        .filter(("name", Pattern::ilike("A%")))
        .unwrap();

    assert_eq!(
        compile(ds.clauses(), &Postgres).unwrap().sql,
        "SELECT * FROM \"items\" WHERE \"name\" ILIKE $1"
    );
    // SQLite LIKE is case-insensitive already, so ILIKE folds to LIKE
    assert_eq!(
        compile(ds.clauses(), &Sqlite).unwrap().sql,
        "SELECT * FROM \"items\" WHERE \"name\" LIKE ?"
    );
    // Baseline ANSI has no case-insensitive match operator
    assert!(compile(ds.clauses(), &Ansi).unwrap_err().is_compilation_error());

    let rx = Dataset::from_table("items")
        .filter(("name", Pattern::regex("^A")))
        .unwrap();
    assert_eq!(
        compile(rx.clauses(), &Postgres).unwrap().sql,
        "SELECT * FROM \"items\" WHERE \"name\" ~ $1"
    );
    assert_eq!(
        compile(rx.clauses(), &Sqlite).unwrap().sql,
        "SELECT * FROM \"items\" WHERE \"name\" REGEXP ?"
    );
}

/// Test IN with an empty list compiles to a constant-false predicate
#[test]
fn test_empty_in_list_is_constant_false() {
    let ds = Dataset::from_table("items")
        .filter(("id", Vec::<i64>::new()))
        .unwrap();
    let q = compile(ds.clauses(), &Ansi).unwrap();
    assert_eq!(q.sql, "SELECT * FROM \"items\" WHERE 1 = 0");
    assert!(q.params.is_empty());
}

/// Test subquery filter values nest with their own parameters in order
#[test]
fn test_subquery_filter_parameter_interleaving() {
    let inner = Dataset::from_table("albums")
        .select([col("artist_id")])
        .filter(("year", 2020i64))
        .unwrap();
    let outer = Dataset::from_table("artists")
        .filter(("id", inner.to_subquery()))
        .unwrap()
        .filter(("active", true))
        .unwrap();

    let q = compile(outer.clauses(), &Postgres).unwrap();
    assert_eq!(
        q.sql,
        "SELECT * FROM \"artists\" WHERE \"id\" IN \
         (SELECT \"artist_id\" FROM \"albums\" WHERE \"year\" = $1) \
         AND \"active\" IS TRUE"
    );
    assert_eq!(q.params, vec![Value::integer(2020)]);
}

/// Test raw statements pass through with positional rewriting only
#[test]
fn test_raw_statement_passthrough() {
    let ds = Dataset::from_table("ignored").with_sql(
        "SELECT * FROM albums WHERE name = ? AND year > ?",
        vec![Value::text("Why?"), Value::integer(2000)],
    );
    let q = compile(ds.clauses(), &Postgres).unwrap();
    assert_eq!(q.sql, "SELECT * FROM albums WHERE name = $1 AND year > $2");
    assert_eq!(q.params.len(), 2);

    // A '?' inside a string literal is not a placeholder
    let lit_q = Dataset::from_table("ignored")
        .with_sql("SELECT 'what?' WHERE x = ?", vec![Value::integer(1)]);
    let q = compile(lit_q.clauses(), &Postgres).unwrap();
    assert_eq!(q.sql, "SELECT 'what?' WHERE x = $1");
}

/// Test named raw bindings resolve by name and reject unbound names
#[test]
fn test_raw_named_bindings() {
    let mut bindings = FxHashMap::default();
    bindings.insert("name".to_string(), Value::text("a"));
    bindings.insert("year".to_string(), Value::integer(2000));

    let ds = Dataset::from_table("ignored").with_sql_named(
        "SELECT * FROM albums WHERE name = :name AND year > :year AND y2 = :year",
        bindings.clone(),
    );
    let q = compile(ds.clauses(), &Ansi).unwrap();
    assert_eq!(
        q.sql,
        "SELECT * FROM albums WHERE name = ? AND year > ? AND y2 = ?"
    );
    assert_eq!(
        q.params,
        vec![Value::text("a"), Value::integer(2000), Value::integer(2000)]
    );

    let missing = Dataset::from_table("ignored")
        .with_sql_named("SELECT :nope", bindings.clone());
    assert!(matches!(
        compile(missing.clauses(), &Ansi).unwrap_err(),
        Error::UnboundParameter(name) if name == "nope"
    ));

    // A Postgres-style cast is not a named marker
    let cast = Dataset::from_table("ignored")
        .with_sql_named("SELECT year::text FROM albums WHERE name = :name", bindings);
    let q = compile(cast.clauses(), &Ansi).unwrap();
    assert_eq!(q.sql, "SELECT year::text FROM albums WHERE name = ?");
}

/// Test raw filter fragments with named parameters resolve by name
#[test]
fn test_raw_filter_fragment_named_bindings() {
    let mut bindings = FxHashMap::default();
    bindings.insert("min".to_string(), Value::integer(10));

    let ds = Dataset::from_table("items")
        .filter(FilterArg::raw_named("plays > :min", bindings))
        .unwrap();
    let q = compile(ds.clauses(), &Postgres).unwrap();
    assert_eq!(q.sql, "SELECT * FROM \"items\" WHERE plays > $1");
    assert_eq!(q.params, vec![Value::integer(10)]);

    // An unbound name still fails
    let ds = Dataset::from_table("items")
        .filter(FilterArg::raw_named("plays > :max", FxHashMap::default()))
        .unwrap();
    assert!(matches!(
        compile(ds.clauses(), &Ansi).unwrap_err(),
        Error::UnboundParameter(name) if name == "max"
    ));
}

/// Test markers inside quoted identifiers are not rewritten
#[test]
fn test_quoted_identifier_is_not_a_marker() {
    let ds = Dataset::from_table("ignored")
        .with_sql("SELECT \"odd:name\", \"what?\" FROM t WHERE x = ?", vec![Value::integer(1)]);
    let q = compile(ds.clauses(), &Postgres).unwrap();
    assert_eq!(q.sql, "SELECT \"odd:name\", \"what?\" FROM t WHERE x = $1");
    assert_eq!(q.params, vec![Value::integer(1)]);
}

/// Test limit, offset, distinct and lock suffixes
#[test]
fn test_suffix_clauses() {
    let ds = Dataset::from_table("items")
        .select([col("kind")])
        .distinct()
        .order([col("kind").asc()])
        .limit_offset(10, 20);
    assert_eq!(
        compile(ds.clauses(), &Ansi).unwrap().sql,
        "SELECT DISTINCT \"kind\" FROM \"items\" ORDER BY \"kind\" ASC LIMIT 10 OFFSET 20"
    );

    let locked = Dataset::from_table("items").for_update();
    assert_eq!(
        compile(locked.clauses(), &Postgres).unwrap().sql,
        "SELECT * FROM \"items\" FOR UPDATE"
    );
    assert!(compile(locked.clauses(), &Sqlite)
        .unwrap_err()
        .is_compilation_error());
}

/// Test identifier quoting defeats injection through column names
#[test]
fn test_identifier_quoting() {
    let ds = Dataset::from_table("weird\"name")
        .filter(("a\"b", 1i64))
        .unwrap();
    let q = compile(ds.clauses(), &Ansi).unwrap();
    assert_eq!(
        q.sql,
        "SELECT * FROM \"weird\"\"name\" WHERE \"a\"\"b\" = ?"
    );
}
