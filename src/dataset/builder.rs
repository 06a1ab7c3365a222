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

//! Dataset builder
//!
//! Chainable, non-mutating transformations over a [`ClauseSet`]. Every call
//! returns a new dataset; the receiver is never altered and remains usable,
//! so one dataset can be the base of any number of derived queries.
//!
//! Replace-vs-append semantics are part of the contract: `order`, `select`,
//! `group` and `from` replace their clause wholesale, while the `_append`
//! variants and the filter family extend what is already there.
//!
//! # Example
//!
//! ```
//! use quarry::dataset::Dataset;
//! use quarry::compile::{compile, Ansi};
//!
//! let base = Dataset::from_table("albums");
//! let recent = base.filter(("year", 2020i64)).unwrap();
//! // `base` still compiles to the unfiltered query
//! let q = compile(base.clauses(), &Ansi).unwrap();
//! assert_eq!(q.sql, "SELECT * FROM \"albums\"");
//! ```

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::core::{Error, Result, Value};
use crate::expr::ast::Expression;
use crate::expr::build::count_star;

use super::clause::{
    ClauseSet, JoinCondition, JoinKind, JoinSpec, Limit, LockMode, OrderedExpression, RawBindings,
    TableRef,
};
use super::filter::{translate, FilterArg};
use super::join::{previous_qualifier, resolve, JoinOn};

/// Alias given to the derived table produced by [`Dataset::from_self`]
const SELF_SUBQUERY_ALIAS: &str = "t1";

/// An immutable, chainable query-building value
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    clauses: ClauseSet,
}

impl Dataset {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Dataset over a single base table
    pub fn from_table(table: impl Into<TableRef>) -> Self {
        Dataset {
            clauses: ClauseSet::from_table(table),
        }
    }

    /// Dataset over an existing clause set
    pub fn from_clauses(clauses: ClauseSet) -> Self {
        Dataset { clauses }
    }

    /// The underlying clause set
    pub fn clauses(&self) -> &ClauseSet {
        &self.clauses
    }

    /// Consume the dataset, returning its clause set
    pub fn into_clauses(self) -> ClauseSet {
        self.clauses
    }

    /// Clause set behind an Arc, for embedding as a subquery
    pub fn to_subquery(&self) -> Arc<ClauseSet> {
        Arc::new(self.clauses.clone())
    }

    fn derive(&self, f: impl FnOnce(&mut ClauseSet)) -> Dataset {
        let mut clauses = self.clauses.clone();
        f(&mut clauses);
        Dataset { clauses }
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    /// AND-combine a predicate into the WHERE clause, unless a HAVING
    /// clause already exists, in which case the HAVING clause is extended
    /// instead (the clause targeted depends on clause presence, not on the
    /// method name)
    pub fn filter(&self, arg: impl Into<FilterArg>) -> Result<Dataset> {
        let pred = translate(arg.into())?;
        Ok(self.combine_filter(pred))
    }

    /// AND-combine a predicate into the WHERE clause, regardless of any
    /// HAVING clause
    pub fn where_(&self, arg: impl Into<FilterArg>) -> Result<Dataset> {
        let pred = translate(arg.into())?;
        Ok(self.derive(|c| c.where_ = Some(Arc::new(combine(&c.where_, pred)))))
    }

    /// AND-combine a predicate into the HAVING clause
    pub fn having(&self, arg: impl Into<FilterArg>) -> Result<Dataset> {
        let pred = translate(arg.into())?;
        Ok(self.derive(|c| c.having = Some(Arc::new(combine(&c.having, pred)))))
    }

    /// Like [`filter`](Dataset::filter), with the predicate negated
    /// (De Morgan) before combining
    pub fn exclude(&self, arg: impl Into<FilterArg>) -> Result<Dataset> {
        let pred = translate(arg.into())?.negated();
        Ok(self.combine_filter(pred))
    }

    fn combine_filter(&self, pred: Expression) -> Dataset {
        self.derive(|c| {
            if c.having.is_some() {
                c.having = Some(Arc::new(combine(&c.having, pred)));
            } else {
                c.where_ = Some(Arc::new(combine(&c.where_, pred)));
            }
        })
    }

    /// Negate the WHERE and HAVING clauses, each independently
    ///
    /// A dataset with neither clause is returned unchanged.
    pub fn invert(&self) -> Dataset {
        self.derive(|c| {
            if let Some(w) = &c.where_ {
                c.where_ = Some(Arc::new(w.negated()));
            }
            if let Some(h) = &c.having {
                c.having = Some(Arc::new(h.negated()));
            }
        })
    }

    /// Clear both the WHERE and HAVING clauses
    pub fn unfiltered(&self) -> Dataset {
        self.derive(|c| {
            c.where_ = None;
            c.having = None;
        })
    }

    // =========================================================================
    // Ordering
    // =========================================================================

    /// Replace the ORDER BY list wholesale
    pub fn order(&self, terms: impl IntoIterator<Item = OrderedExpression>) -> Dataset {
        self.derive(|c| c.order = terms.into_iter().collect())
    }

    /// Append to the existing ORDER BY list
    pub fn order_append(&self, terms: impl IntoIterator<Item = OrderedExpression>) -> Dataset {
        self.derive(|c| c.order.extend(terms))
    }

    /// Prepend to the existing ORDER BY list
    pub fn order_prepend(&self, terms: impl IntoIterator<Item = OrderedExpression>) -> Dataset {
        self.derive(|c| {
            let mut order: Vec<OrderedExpression> = terms.into_iter().collect();
            order.extend(c.order.drain(..));
            c.order = order;
        })
    }

    /// Flip the direction of every ORDER BY term
    pub fn reverse(&self) -> Result<Dataset> {
        if self.clauses.order.is_empty() {
            return Err(Error::MissingOrder);
        }
        Ok(self.derive(|c| {
            c.order = c.order.iter().map(OrderedExpression::reversed).collect();
        }))
    }

    /// Clear the ORDER BY list
    pub fn unordered(&self) -> Dataset {
        self.derive(|c| c.order.clear())
    }

    /// Dataset selecting the final row of the current order: every
    /// direction flipped and the limit set to 1
    ///
    /// Fails with [`Error::MissingOrder`] when no order clause exists,
    /// like [`reverse`](Dataset::reverse): without an order there is no
    /// last row to speak of.
    pub fn last(&self) -> Result<Dataset> {
        Ok(self.reverse()?.limit(1))
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Replace the select list wholesale
    pub fn select(&self, exprs: impl IntoIterator<Item = Expression>) -> Dataset {
        self.derive(|c| c.select = exprs.into_iter().collect())
    }

    /// Append to the existing select list
    pub fn select_append(&self, exprs: impl IntoIterator<Item = Expression>) -> Dataset {
        self.derive(|c| c.select.extend(exprs))
    }

    /// Clear the select list, reverting to SELECT *
    pub fn select_all(&self) -> Dataset {
        self.derive(|c| c.select.clear())
    }

    /// Emit SELECT DISTINCT
    pub fn distinct(&self) -> Dataset {
        self.derive(|c| c.distinct = true)
    }

    // =========================================================================
    // Limit
    // =========================================================================

    /// LIMIT n
    pub fn limit(&self, count: u64) -> Dataset {
        self.limit_offset(count, 0)
    }

    /// LIMIT n OFFSET m
    pub fn limit_offset(&self, count: u64, offset: u64) -> Dataset {
        self.derive(|c| c.limit = Some(Limit { count, offset }))
    }

    /// Clear the limit
    pub fn unlimited(&self) -> Dataset {
        self.derive(|c| c.limit = None)
    }

    // =========================================================================
    // Grouping
    // =========================================================================

    /// Replace the GROUP BY list wholesale
    pub fn group(&self, exprs: impl IntoIterator<Item = Expression>) -> Dataset {
        self.derive(|c| c.group = exprs.into_iter().collect())
    }

    /// Group by the given expressions and count each group
    ///
    /// Sets GROUP BY and appends `COUNT(*) AS count` to the select list;
    /// a default (`*`) select list is first replaced by the group
    /// expressions so the output names the groups.
    pub fn group_and_count(&self, exprs: impl IntoIterator<Item = Expression>) -> Dataset {
        let exprs: Vec<Expression> = exprs.into_iter().collect();
        self.derive(|c| {
            if c.select.is_empty() {
                c.select = exprs.clone();
            }
            c.select.push(count_star().alias("count"));
            c.group = exprs;
        })
    }

    // =========================================================================
    // FROM
    // =========================================================================

    /// Replace the FROM list wholesale
    pub fn from(&self, tables: impl IntoIterator<Item = TableRef>) -> Dataset {
        self.derive(|c| c.from = tables.into_iter().collect())
    }

    /// Wrap the entire current clause set as a subquery and start over
    ///
    /// The new dataset's only clause is a FROM over the derived table
    /// (aliased `t1`); prior filters, ordering and limits apply inside the
    /// subquery boundary and are invisible to subsequent builder calls.
    pub fn from_self(&self) -> Dataset {
        let inner = Arc::new(self.clauses.clone());
        Dataset {
            clauses: ClauseSet {
                from: vec![TableRef::derived(inner, SELF_SUBQUERY_ALIAS)],
                ..ClauseSet::default()
            },
        }
    }

    // =========================================================================
    // Joins
    // =========================================================================

    /// INNER JOIN
    pub fn join(&self, target: impl Into<TableRef>, on: impl Into<JoinOn>) -> Result<Dataset> {
        self.join_kind(JoinKind::Inner, target, on)
    }

    /// LEFT JOIN
    pub fn left_join(
        &self,
        target: impl Into<TableRef>,
        on: impl Into<JoinOn>,
    ) -> Result<Dataset> {
        self.join_kind(JoinKind::Left, target, on)
    }

    /// RIGHT JOIN
    pub fn right_join(
        &self,
        target: impl Into<TableRef>,
        on: impl Into<JoinOn>,
    ) -> Result<Dataset> {
        self.join_kind(JoinKind::Right, target, on)
    }

    /// FULL JOIN
    pub fn full_join(
        &self,
        target: impl Into<TableRef>,
        on: impl Into<JoinOn>,
    ) -> Result<Dataset> {
        self.join_kind(JoinKind::Full, target, on)
    }

    /// Join of the given kind with a condition input
    ///
    /// Pair-form conditions are resolved against the target's alias and
    /// the previous table's alias; expression and USING forms pass through
    /// untouched.
    pub fn join_kind(
        &self,
        kind: JoinKind,
        target: impl Into<TableRef>,
        on: impl Into<JoinOn>,
    ) -> Result<Dataset> {
        let target = target.into();
        let on = on.into();
        let condition = match on {
            JoinOn::Pairs(_) => {
                let current = self.join_target_qualifier(&target)?;
                let previous = previous_qualifier(&self.clauses)?;
                resolve(&current, &previous, on)?
            }
            other => resolve("", "", other)?,
        };
        Ok(self.push_join(kind, target, Some(condition)))
    }

    /// Join with a condition callback
    ///
    /// The callback receives the current alias, the previous alias and the
    /// joins appended so far, and returns the ON expression directly,
    /// bypassing implicit qualification.
    pub fn join_with<F>(
        &self,
        kind: JoinKind,
        target: impl Into<TableRef>,
        condition: F,
    ) -> Result<Dataset>
    where
        F: FnOnce(&str, &str, &[JoinSpec]) -> Expression,
    {
        let target = target.into();
        let current = self.join_target_qualifier(&target)?;
        let previous = previous_qualifier(&self.clauses)?;
        let expr = condition(&current, &previous, &self.clauses.joins);
        Ok(self.push_join(kind, target, Some(JoinCondition::On(expr))))
    }

    /// NATURAL JOIN (no condition)
    pub fn natural_join(&self, target: impl Into<TableRef>) -> Dataset {
        self.push_join(JoinKind::Natural, target.into(), None)
    }

    /// CROSS JOIN (no condition)
    pub fn cross_join(&self, target: impl Into<TableRef>) -> Dataset {
        self.push_join(JoinKind::Cross, target.into(), None)
    }

    /// Join USING the given shared column names
    pub fn join_using<S>(
        &self,
        kind: JoinKind,
        target: impl Into<TableRef>,
        columns: impl IntoIterator<Item = S>,
    ) -> Result<Dataset>
    where
        S: Into<String>,
    {
        let condition = resolve("", "", JoinOn::using(columns))?;
        Ok(self.push_join(kind, target.into(), Some(condition)))
    }

    fn join_target_qualifier(&self, target: &TableRef) -> Result<String> {
        target.qualifier().map(str::to_string).ok_or_else(|| {
            Error::ambiguous_qualification(
                "*",
                "join target is an unaliased subquery; alias it or qualify explicitly",
            )
        })
    }

    fn push_join(
        &self,
        kind: JoinKind,
        target: TableRef,
        condition: Option<JoinCondition>,
    ) -> Dataset {
        self.derive(|c| {
            c.joins.push(JoinSpec {
                kind,
                target,
                condition,
            })
        })
    }

    // =========================================================================
    // Raw SQL and locking
    // =========================================================================

    /// Replace the dataset with a literal statement and positional (?)
    /// parameters; compilation passes the text through untouched apart
    /// from placeholder-marker rewriting
    pub fn with_sql(&self, sql: impl Into<String>, params: Vec<Value>) -> Dataset {
        Dataset {
            clauses: ClauseSet::from_raw(sql, RawBindings::Positional(params)),
        }
    }

    /// Replace the dataset with a literal statement using named (:name)
    /// placeholders bound from the given map
    pub fn with_sql_named(
        &self,
        sql: impl Into<String>,
        bindings: FxHashMap<String, Value>,
    ) -> Dataset {
        Dataset {
            clauses: ClauseSet::from_raw(sql, RawBindings::Named(bindings)),
        }
    }

    /// Append FOR UPDATE
    pub fn for_update(&self) -> Dataset {
        self.derive(|c| c.lock = Some(LockMode::ForUpdate))
    }
}

/// AND-combine a new predicate into an optional existing one
fn combine(existing: &Option<Arc<Expression>>, pred: Expression) -> Expression {
    match existing {
        Some(current) => (**current).clone().and_combine(pred),
        None => pred,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::clause::Direction;
    use crate::expr::build::{col, lit};

    #[test]
    fn test_transformations_do_not_alter_receiver() {
        let base = Dataset::from_table("items");
        let snapshot = base.clone();

        let _ = base.filter(("id", 1i64)).unwrap();
        let _ = base.order([col("x").asc()]);
        let _ = base.select([col("id")]);
        let _ = base.limit(10);
        let _ = base.distinct();
        let _ = base.from_self();

        assert_eq!(base, snapshot);
    }

    #[test]
    fn test_filter_targets_having_when_present() {
        let ds = Dataset::from_table("items")
            .group([col("kind")])
            .having(col("count").gt(lit(1)))
            .unwrap();

        // "filter" extends HAVING because one exists
        let filtered = ds.filter(("kind", "a")).unwrap();
        assert!(filtered.clauses().where_.is_none());
        assert!(filtered.clauses().having.is_some());

        // explicit "where_" still targets WHERE
        let wheres = ds.where_(("kind", "a")).unwrap();
        assert!(wheres.clauses().where_.is_some());
    }

    #[test]
    fn test_exclude_negates_before_combining() {
        let ds = Dataset::from_table("items")
            .exclude(("id", vec![1i64, 2]))
            .unwrap();
        let pred = ds.clauses().where_.as_ref().unwrap();
        assert_eq!(pred.to_string(), "(id NOT IN (1, 2))");
    }

    #[test]
    fn test_invert_keeps_clauses_independent() {
        let ds = Dataset::from_table("items")
            .where_(("a", 1i64))
            .unwrap()
            .having(("b", 2i64))
            .unwrap()
            .invert();
        assert_eq!(
            ds.clauses().where_.as_ref().unwrap().to_string(),
            "(a <> 1)"
        );
        assert_eq!(
            ds.clauses().having.as_ref().unwrap().to_string(),
            "(b <> 2)"
        );
    }

    #[test]
    fn test_invert_without_filters_is_noop() {
        let ds = Dataset::from_table("items");
        assert_eq!(ds.invert(), ds);
    }

    #[test]
    fn test_unfiltered_clears_both() {
        let ds = Dataset::from_table("items")
            .where_(("a", 1i64))
            .unwrap()
            .having(("b", 2i64))
            .unwrap()
            .unfiltered();
        assert!(ds.clauses().where_.is_none());
        assert!(ds.clauses().having.is_none());
    }

    #[test]
    fn test_order_replace_and_append() {
        let ds = Dataset::from_table("items").order([col("a").asc()]);

        let replaced = ds.order([col("b").desc()]);
        assert_eq!(replaced.clauses().order.len(), 1);
        assert_eq!(replaced.clauses().order[0].expr, col("b"));

        let appended = ds.order_append([col("b").desc()]);
        assert_eq!(appended.clauses().order.len(), 2);

        let prepended = ds.order_prepend([col("b").desc()]);
        assert_eq!(prepended.clauses().order[0].expr, col("b"));
        assert_eq!(prepended.clauses().order[1].expr, col("a"));
    }

    #[test]
    fn test_reverse_requires_order() {
        let ds = Dataset::from_table("items");
        assert_eq!(ds.reverse().unwrap_err(), Error::MissingOrder);

        let reversed = ds.order([col("x").asc()]).reverse().unwrap();
        assert_eq!(reversed.clauses().order[0].direction, Direction::Desc);
    }

    #[test]
    fn test_last_flips_order_and_limits() {
        let ds = Dataset::from_table("items");
        assert_eq!(ds.last().unwrap_err(), Error::MissingOrder);

        let last = ds.order([col("x").asc()]).last().unwrap();
        assert_eq!(last.clauses().order[0].direction, Direction::Desc);
        assert_eq!(last.clauses().limit, Some(Limit { count: 1, offset: 0 }));
    }

    #[test]
    fn test_select_replace_vs_append() {
        let ds = Dataset::from_table("items");

        let replaced = ds.select([col("id")]).select([col("name")]);
        assert_eq!(replaced.clauses().select, vec![col("name")]);

        let appended = ds.select([col("id")]).select_append([col("name")]);
        assert_eq!(appended.clauses().select, vec![col("id"), col("name")]);

        assert!(appended.select_all().clauses().select.is_empty());
    }

    #[test]
    fn test_group_and_count() {
        let ds = Dataset::from_table("albums").group_and_count([col("artist_id")]);
        assert_eq!(ds.clauses().group, vec![col("artist_id")]);
        assert_eq!(ds.clauses().select.len(), 2);
        assert_eq!(ds.clauses().select[1].to_string(), "COUNT(*) AS count");
    }

    #[test]
    fn test_from_self_hides_prior_clauses() {
        let ds = Dataset::from_table("items")
            .order([col("x").asc()])
            .limit(100)
            .from_self();
        assert!(ds.clauses().order.is_empty());
        assert!(ds.clauses().limit.is_none());
        assert_eq!(ds.clauses().from.len(), 1);
        assert_eq!(ds.clauses().from[0].alias.as_deref(), Some("t1"));
    }

    #[test]
    fn test_join_threads_previous_alias() {
        let ds = Dataset::from_table("artists")
            .join("albums", ("artist_id", "id"))
            .unwrap()
            .join("members", ("album_id", "id"))
            .unwrap();

        let second = &ds.clauses().joins[1];
        match &second.condition {
            Some(JoinCondition::On(expr)) => {
                // Values qualify against "albums", the most recent join
                assert_eq!(
                    expr.to_string(),
                    "(members.album_id = albums.id)"
                );
            }
            other => panic!("expected ON condition, got {:?}", other),
        }
    }

    #[test]
    fn test_join_with_callback_sees_prior_joins() {
        let ds = Dataset::from_table("artists")
            .join("albums", ("artist_id", "id"))
            .unwrap()
            .join_with(JoinKind::Inner, "members", |current, previous, joins| {
                assert_eq!(current, "members");
                assert_eq!(previous, "albums");
                assert_eq!(joins.len(), 1);
                col(&format!("{}.id", current)).eq(col("artists.member_id"))
            })
            .unwrap();
        assert_eq!(ds.clauses().joins.len(), 2);
    }

    #[test]
    fn test_with_sql_bypasses_builder() {
        let ds = Dataset::from_table("items")
            .filter(("id", 1i64))
            .unwrap()
            .with_sql("SELECT custom FROM elsewhere WHERE x = ?", vec![Value::Integer(9)]);
        assert!(ds.clauses().is_raw());
    }

    #[test]
    fn test_for_update() {
        let ds = Dataset::from_table("items").for_update();
        assert_eq!(ds.clauses().lock, Some(LockMode::ForUpdate));
    }
}
