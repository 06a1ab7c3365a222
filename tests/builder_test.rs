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

//! Builder Semantics Tests
//!
//! Covers the replace-vs-append contract, filter clause targeting, and
//! the persistence property: deriving from a dataset never changes what
//! the original compiles to.

use proptest::prelude::*;
use quarry::{col, compile, lit, Ansi, Dataset, Error};

fn sql(ds: &Dataset) -> String {
    compile(ds.clauses(), &Ansi).unwrap().sql
}

/// Test that every transformation leaves the receiver compiling unchanged
#[test]
fn test_transformations_preserve_receiver_sql() {
    let base = Dataset::from_table("items")
        .filter(("kind", "a"))
        .unwrap()
        .order([col("id").asc()]);
    let before = sql(&base);

    let _ = base.filter(("id", 1i64)).unwrap();
    let _ = base.exclude(("id", vec![1i64, 2])).unwrap();
    let _ = base.order([col("name").desc()]);
    let _ = base.reverse().unwrap();
    let _ = base.select([col("id")]);
    let _ = base.group_and_count([col("kind")]);
    let _ = base.limit(5);
    let _ = base.from_self();
    let _ = base.invert();
    let _ = base.unfiltered();
    let _ = base.with_sql("SELECT 1", vec![]);

    assert_eq!(sql(&base), before);
}

/// Test select replace semantics vs select_append
#[test]
fn test_select_replace_vs_append_sql() {
    let ds = Dataset::from_table("items");
    assert_eq!(
        sql(&ds.select([col("id")]).select([col("name")])),
        "SELECT \"name\" FROM \"items\""
    );
    assert_eq!(
        sql(&ds.select([col("id")]).select_append([col("name")])),
        "SELECT \"id\", \"name\" FROM \"items\""
    );
    assert_eq!(
        sql(&ds.select([col("id")]).select_all()),
        "SELECT * FROM \"items\""
    );
}

/// Test order replace, append, prepend and reverse
#[test]
fn test_order_semantics() {
    let ds = Dataset::from_table("items").order([col("x").asc()]);

    assert_eq!(
        sql(&ds.order([col("y").asc()])),
        "SELECT * FROM \"items\" ORDER BY \"y\" ASC"
    );
    assert_eq!(
        sql(&ds.order_append([col("y").desc()])),
        "SELECT * FROM \"items\" ORDER BY \"x\" ASC, \"y\" DESC"
    );
    assert_eq!(
        sql(&ds.order_prepend([col("y").desc()])),
        "SELECT * FROM \"items\" ORDER BY \"y\" DESC, \"x\" ASC"
    );
    assert_eq!(
        sql(&ds.reverse().unwrap()),
        "SELECT * FROM \"items\" ORDER BY \"x\" DESC"
    );
    assert_eq!(sql(&ds.unordered()), "SELECT * FROM \"items\"");
}

/// Test that reverse without an order clause fails
#[test]
fn test_reverse_unordered_fails() {
    let err = Dataset::from_table("items").reverse().unwrap_err();
    assert_eq!(err, Error::MissingOrder);
}

/// Test last: reversed order plus LIMIT 1, order required
#[test]
fn test_last_compiles_to_reversed_limit_one() {
    let ds = Dataset::from_table("items").order([col("id").asc()]);
    assert_eq!(
        sql(&ds.last().unwrap()),
        "SELECT * FROM \"items\" ORDER BY \"id\" DESC LIMIT 1"
    );

    let err = Dataset::from_table("items").last().unwrap_err();
    assert_eq!(err, Error::MissingOrder);
}

/// Test that filter targets HAVING once one exists, by clause presence
#[test]
fn test_filter_dispatches_on_clause_presence() {
    let grouped = Dataset::from_table("albums")
        .group([col("artist_id")])
        .having(col("count").gt(lit(10)))
        .unwrap();

    let via_filter = grouped.filter(("kind", 1i64)).unwrap();
    assert_eq!(
        sql(&via_filter),
        "SELECT * FROM \"albums\" GROUP BY \"artist_id\" \
         HAVING \"count\" > ? AND \"kind\" = ?"
    );

    let via_where = grouped.where_(("kind", 1i64)).unwrap();
    assert_eq!(
        sql(&via_where),
        "SELECT * FROM \"albums\" WHERE \"kind\" = ? \
         GROUP BY \"artist_id\" HAVING \"count\" > ?"
    );
}

/// Test chained filters equal one multi-pair filter modulo AND grouping
#[test]
fn test_chained_filters_equal_pair_sequence() {
    use quarry::FilterArg;

    let chained = Dataset::from_table("items")
        .filter(("a", 1i64))
        .unwrap()
        .filter(("b", 2i64))
        .unwrap();
    let combined = Dataset::from_table("items")
        .filter(FilterArg::pairs([("a", 1i64), ("b", 2i64)]))
        .unwrap();

    assert_eq!(sql(&chained), sql(&combined));
}

/// Test invert negates WHERE and HAVING independently
#[test]
fn test_invert_keeps_where_and_having_independent() {
    let ds = Dataset::from_table("items")
        .where_(("a", 1i64))
        .unwrap()
        .having(("b", 2i64))
        .unwrap()
        .invert();
    assert_eq!(
        sql(&ds),
        "SELECT * FROM \"items\" WHERE \"a\" <> ? HAVING \"b\" <> ?"
    );
}

/// Test unfiltered clears both filter clauses
#[test]
fn test_unfiltered_clears_where_and_having() {
    let ds = Dataset::from_table("items")
        .where_(("a", 1i64))
        .unwrap()
        .having(("b", 2i64))
        .unwrap()
        .unfiltered();
    assert_eq!(sql(&ds), "SELECT * FROM \"items\"");
}

/// Test from_self groups over the limited subquery, not before it
#[test]
fn test_from_self_wraps_prior_clauses() {
    let inner = Dataset::from_table("items").order([col("x").asc()]).limit(100);

    let wrapped = inner.from_self().group([col("x")]);
    assert_eq!(
        sql(&wrapped),
        "SELECT * FROM (SELECT * FROM \"items\" ORDER BY \"x\" ASC LIMIT 100) AS \"t1\" \
         GROUP BY \"x\""
    );

    // Without the wrap, grouping applies before the limit
    let unwrapped = inner.group([col("x")]);
    assert_eq!(
        sql(&unwrapped),
        "SELECT * FROM \"items\" GROUP BY \"x\" ORDER BY \"x\" ASC LIMIT 100"
    );
}

/// Test group_and_count output shape
#[test]
fn test_group_and_count() {
    let ds = Dataset::from_table("albums").group_and_count([col("artist_id")]);
    assert_eq!(
        sql(&ds),
        "SELECT \"artist_id\", COUNT(*) AS \"count\" FROM \"albums\" GROUP BY \"artist_id\""
    );
}

// ============================================================================
// Property: random derivation chains never alter the original
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Filter(&'static str, i64),
    Exclude(&'static str, i64),
    Order(&'static str),
    OrderAppend(&'static str),
    Select(&'static str),
    SelectAppend(&'static str),
    Group(&'static str),
    Limit(u64),
    Distinct,
    Invert,
    Unfiltered,
    FromSelf,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let cols = prop::sample::select(vec!["a", "b", "c", "d"]);
    prop_oneof![
        (cols.clone(), any::<i64>()).prop_map(|(c, v)| Op::Filter(c, v)),
        (cols.clone(), any::<i64>()).prop_map(|(c, v)| Op::Exclude(c, v)),
        cols.clone().prop_map(Op::Order),
        cols.clone().prop_map(Op::OrderAppend),
        cols.clone().prop_map(Op::Select),
        cols.clone().prop_map(Op::SelectAppend),
        cols.prop_map(Op::Group),
        (1u64..1000).prop_map(Op::Limit),
        Just(Op::Distinct),
        Just(Op::Invert),
        Just(Op::Unfiltered),
        Just(Op::FromSelf),
    ]
}

fn apply(ds: &Dataset, op: &Op) -> Dataset {
    match op {
        Op::Filter(c, v) => ds.filter((*c, *v)).unwrap(),
        Op::Exclude(c, v) => ds.exclude((*c, *v)).unwrap(),
        Op::Order(c) => ds.order([col(c).asc()]),
        Op::OrderAppend(c) => ds.order_append([col(c).desc()]),
        Op::Select(c) => ds.select([col(c)]),
        Op::SelectAppend(c) => ds.select_append([col(c)]),
        Op::Group(c) => ds.group([col(c)]),
        Op::Limit(n) => ds.limit(*n),
        Op::Distinct => ds.distinct(),
        Op::Invert => ds.invert(),
        Op::Unfiltered => ds.unfiltered(),
        Op::FromSelf => ds.from_self(),
    }
}

proptest! {
    /// For any chain of transformations, the starting dataset compiles to
    /// the same query before and after the chain is applied
    #[test]
    fn prop_derivation_never_mutates_base(ops in prop::collection::vec(op_strategy(), 1..12)) {
        let base = Dataset::from_table("items").filter(("kind", 1i64)).unwrap();
        let before = compile(base.clauses(), &Ansi).unwrap();

        let mut derived = base.clone();
        for op in &ops {
            derived = apply(&derived, op);
        }
        // Derived dataset still compiles (soundness of every chain)
        compile(derived.clauses(), &Ansi).unwrap();

        let after = compile(base.clauses(), &Ansi).unwrap();
        prop_assert_eq!(before, after);
    }
}
