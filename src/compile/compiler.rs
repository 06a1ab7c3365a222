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

//! SQL compilation
//!
//! A pure function from a clause set to `(sql, params)`. Clause emission
//! order is fixed: SELECT, FROM, JOINs in append order, WHERE, GROUP BY,
//! HAVING, ORDER BY, LIMIT/OFFSET, locking suffix. Every literal value is
//! emitted as a dialect placeholder with the value appended to the
//! parameter list in emission order; the SQL text never contains user
//! values. Raw statements bypass clause emission entirely.

use crate::core::{Error, Result, Value};
use crate::dataset::clause::{ClauseSet, JoinCondition, RawBindings, TableRef, TableSource};
use crate::expr::ast::{BinaryExpression, BinaryOperator, Expression, UnaryOperator};

use super::dialect::Dialect;

/// A compiled statement: SQL text plus its ordered parameter list
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

impl CompiledQuery {
    /// Substitute the parameters back into the text as SQL literals
    ///
    /// For diagnostics and round-trip verification only; hand the
    /// placeholder form to the statement executor, never this.
    pub fn bind_inline(&self) -> Result<String> {
        let mut out = String::with_capacity(self.sql.len() + self.params.len() * 8);
        let mut chars = self.sql.chars().peekable();
        let mut next_positional = 0usize;
        let mut in_string = false;
        let mut in_quoted_ident = false;

        while let Some(ch) = chars.next() {
            match ch {
                '\'' if !in_quoted_ident => {
                    in_string = !in_string;
                    out.push(ch);
                }
                '"' if !in_string => {
                    in_quoted_ident = !in_quoted_ident;
                    out.push(ch);
                }
                '?' if !in_string && !in_quoted_ident => {
                    let value = self.params.get(next_positional).ok_or_else(|| {
                        Error::compilation("placeholder refers past the end of the parameter list")
                    })?;
                    next_positional += 1;
                    out.push_str(&value.sql_literal());
                }
                '$' if !in_string && !in_quoted_ident => {
                    let mut digits = String::new();
                    while let Some(d) = chars.peek() {
                        if d.is_ascii_digit() {
                            digits.push(*d);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    if digits.is_empty() {
                        out.push('$');
                        continue;
                    }
                    let ordinal: usize = digits.parse().map_err(|_| {
                        Error::compilation("malformed numbered placeholder")
                    })?;
                    let value = self.params.get(ordinal.wrapping_sub(1)).ok_or_else(|| {
                        Error::compilation("placeholder refers past the end of the parameter list")
                    })?;
                    out.push_str(&value.sql_literal());
                }
                _ => out.push(ch),
            }
        }
        Ok(out)
    }
}

/// Compile a clause set for the given dialect
pub fn compile(clauses: &ClauseSet, dialect: &dyn Dialect) -> Result<CompiledQuery> {
    let mut compiler = Compiler {
        dialect,
        sql: String::with_capacity(128),
        params: Vec::new(),
    };
    compiler.write_clause_set(clauses)?;
    Ok(CompiledQuery {
        sql: compiler.sql,
        params: compiler.params,
    })
}

struct Compiler<'a> {
    dialect: &'a dyn Dialect,
    sql: String,
    params: Vec<Value>,
}

impl Compiler<'_> {
    fn push_param(&mut self, value: Value) {
        self.params.push(value);
        self.dialect.placeholder(self.params.len(), &mut self.sql);
    }

    fn quote(&mut self, ident: &str) {
        let mut quoted = String::with_capacity(ident.len() + 2);
        self.dialect.quote_identifier(ident, &mut quoted);
        self.sql.push_str(&quoted);
    }

    // =========================================================================
    // Statement emission
    // =========================================================================

    fn write_clause_set(&mut self, clauses: &ClauseSet) -> Result<()> {
        if let Some(raw) = &clauses.raw {
            return self.write_raw(&raw.sql, &raw.bindings);
        }

        self.sql.push_str("SELECT ");
        if clauses.distinct {
            self.sql.push_str("DISTINCT ");
        }
        if clauses.select.is_empty() {
            self.sql.push('*');
        } else {
            for (i, expr) in clauses.select.iter().enumerate() {
                if i > 0 {
                    self.sql.push_str(", ");
                }
                self.write_expr(expr)?;
            }
        }

        if clauses.from.is_empty() {
            if !clauses.joins.is_empty() {
                return Err(Error::compilation("joins require a FROM table"));
            }
        } else {
            self.sql.push_str(" FROM ");
            for (i, table) in clauses.from.iter().enumerate() {
                if i > 0 {
                    self.sql.push_str(", ");
                }
                self.write_table_ref(table)?;
            }
        }

        for join in &clauses.joins {
            if !self.dialect.supports_join(join.kind) {
                return Err(Error::compilation(format!(
                    "{} is not supported by the {} dialect",
                    join.kind,
                    self.dialect.name()
                )));
            }
            self.sql.push(' ');
            self.sql.push_str(join.kind.keyword());
            self.sql.push(' ');
            self.write_table_ref(&join.target)?;
            match &join.condition {
                None => {}
                Some(_) if !join.kind.takes_condition() => {
                    return Err(Error::compilation(format!(
                        "{} cannot carry a condition",
                        join.kind
                    )));
                }
                Some(JoinCondition::On(expr)) => {
                    self.sql.push_str(" ON ");
                    self.write_predicate(expr)?;
                }
                Some(JoinCondition::Using(columns)) => {
                    self.sql.push_str(" USING (");
                    for (i, column) in columns.iter().enumerate() {
                        if i > 0 {
                            self.sql.push_str(", ");
                        }
                        self.quote(column);
                    }
                    self.sql.push(')');
                }
            }
        }

        if let Some(pred) = &clauses.where_ {
            self.sql.push_str(" WHERE ");
            self.write_predicate(pred)?;
        }

        if !clauses.group.is_empty() {
            self.sql.push_str(" GROUP BY ");
            for (i, expr) in clauses.group.iter().enumerate() {
                if i > 0 {
                    self.sql.push_str(", ");
                }
                self.write_expr(expr)?;
            }
        }

        if let Some(pred) = &clauses.having {
            self.sql.push_str(" HAVING ");
            self.write_predicate(pred)?;
        }

        if !clauses.order.is_empty() {
            self.sql.push_str(" ORDER BY ");
            for (i, term) in clauses.order.iter().enumerate() {
                if i > 0 {
                    self.sql.push_str(", ");
                }
                self.write_expr(&term.expr)?;
                self.sql.push(' ');
                self.sql.push_str(term.direction.keyword());
            }
        }

        if let Some(limit) = clauses.limit {
            self.dialect.write_limit(limit, &mut self.sql);
        }

        if let Some(mode) = clauses.lock {
            let suffix = self.dialect.lock_clause(mode)?;
            self.sql.push_str(suffix);
        }

        Ok(())
    }

    fn write_table_ref(&mut self, table: &TableRef) -> Result<()> {
        match &table.source {
            TableSource::Named(name) => {
                self.quote(name);
                if let Some(alias) = &table.alias {
                    self.sql.push_str(" AS ");
                    self.quote(alias);
                }
            }
            TableSource::Subquery(inner) => {
                let alias = table.alias.as_ref().ok_or_else(|| {
                    Error::compilation("derived table requires an alias")
                })?;
                self.sql.push('(');
                self.write_clause_set(inner)?;
                self.sql.push_str(") AS ");
                self.quote(alias);
            }
        }
        Ok(())
    }

    // =========================================================================
    // Expression emission
    // =========================================================================

    /// Top-level predicate position (WHERE/HAVING/ON): boolean combinators
    /// emit without outer parentheses
    fn write_predicate(&mut self, expr: &Expression) -> Result<()> {
        match expr {
            Expression::And(parts) => self.write_bool_parts(parts, " AND "),
            Expression::Or(parts) => self.write_bool_parts(parts, " OR "),
            other => self.write_expr(other),
        }
    }

    fn write_bool_parts(&mut self, parts: &[Expression], sep: &str) -> Result<()> {
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(sep);
            }
            // Nested combinators keep their parentheses via operand position
            self.write_expr(part)?;
        }
        Ok(())
    }

    /// Operand position: boolean combinators are parenthesized
    fn write_expr(&mut self, expr: &Expression) -> Result<()> {
        match expr {
            Expression::Identifier(ident) => {
                self.quote(&ident.name);
                Ok(())
            }
            Expression::Qualified(q) => {
                self.quote(&q.qualifier);
                self.sql.push('.');
                self.quote(&q.name);
                Ok(())
            }
            Expression::Literal(value) => {
                self.push_param(value.clone());
                Ok(())
            }
            Expression::Placeholder(p) => Err(Error::compilation(format!(
                "placeholder {} outside a raw fragment",
                p
            ))),
            Expression::Binary(b) => self.write_binary(b),
            Expression::Unary(u) => {
                match u.op {
                    UnaryOperator::Negate => self.sql.push('-'),
                }
                self.write_operand(&u.operand)
            }
            Expression::FunctionCall(call) => {
                self.sql.push_str(&call.name);
                self.sql.push('(');
                for (i, arg) in call.args.iter().enumerate() {
                    if i > 0 {
                        self.sql.push_str(", ");
                    }
                    self.write_expr(arg)?;
                }
                self.sql.push(')');
                Ok(())
            }
            Expression::And(_) | Expression::Or(_) => {
                self.sql.push('(');
                self.write_predicate(expr)?;
                self.sql.push(')');
                Ok(())
            }
            Expression::Not(inner) => {
                self.sql.push_str("NOT (");
                self.write_predicate(inner)?;
                self.sql.push(')');
                Ok(())
            }
            Expression::List(items) => {
                self.sql.push('(');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.sql.push_str(", ");
                    }
                    self.write_expr(item)?;
                }
                self.sql.push(')');
                Ok(())
            }
            Expression::Subquery(inner) => {
                self.sql.push('(');
                self.write_clause_set(inner)?;
                self.sql.push(')');
                Ok(())
            }
            Expression::Star => {
                self.sql.push('*');
                Ok(())
            }
            Expression::Aliased(aliased) => {
                self.write_expr(&aliased.expr)?;
                self.sql.push_str(" AS ");
                self.quote(&aliased.alias);
                Ok(())
            }
            Expression::Raw(fragment) => self.write_raw(&fragment.template, &fragment.bindings),
        }
    }

    fn write_binary(&mut self, b: &BinaryExpression) -> Result<()> {
        // IS / IS NOT take keyword operands, not placeholders
        if matches!(b.op, BinaryOperator::Is | BinaryOperator::IsNot) {
            self.write_operand(&b.left)?;
            self.sql.push_str(if b.op == BinaryOperator::Is {
                " IS "
            } else {
                " IS NOT "
            });
            return match &*b.right {
                Expression::Literal(Value::Null) => {
                    self.sql.push_str("NULL");
                    Ok(())
                }
                Expression::Literal(Value::Boolean(v)) => {
                    self.sql.push_str(if *v { "TRUE" } else { "FALSE" });
                    Ok(())
                }
                other => Err(Error::compilation(format!(
                    "IS comparison requires NULL or a boolean, got {}",
                    other
                ))),
            };
        }

        if b.op.is_pattern() {
            let (case_insensitive, regex, negated) = match b.op {
                BinaryOperator::Like => (false, false, false),
                BinaryOperator::NotLike => (false, false, true),
                BinaryOperator::ILike => (true, false, false),
                BinaryOperator::NotILike => (true, false, true),
                BinaryOperator::Regexp => (false, true, false),
                BinaryOperator::NotRegexp => (false, true, true),
                _ => unreachable!(),
            };
            let op_text = self
                .dialect
                .pattern_operator(case_insensitive, regex, negated)?;
            self.write_operand(&b.left)?;
            self.sql.push(' ');
            self.sql.push_str(op_text);
            self.sql.push(' ');
            return self.write_operand(&b.right);
        }

        self.write_operand(&b.left)?;
        self.sql.push(' ');
        self.sql.push_str(b.op.symbol());
        self.sql.push(' ');
        self.write_operand(&b.right)
    }

    /// Operand of a binary/unary expression: nested binaries are
    /// parenthesized so arithmetic nesting stays unambiguous
    fn write_operand(&mut self, expr: &Expression) -> Result<()> {
        match expr {
            Expression::Binary(_) => {
                self.sql.push('(');
                self.write_expr(expr)?;
                self.sql.push(')');
                Ok(())
            }
            other => self.write_expr(other),
        }
    }

    // =========================================================================
    // Raw pass-through
    // =========================================================================

    /// Shared by whole-statement bypass and raw filter fragments: both
    /// carry a template plus positional or named bindings
    fn write_raw(&mut self, template: &str, bindings: &RawBindings) -> Result<()> {
        let mut next = 0usize;
        self.write_template(template, |compiler, marker| match (marker, bindings) {
            (Marker::Positional, RawBindings::Positional(values)) => {
                let value = values.get(next).cloned().ok_or_else(|| {
                    Error::compilation("raw template has more placeholders than parameters")
                })?;
                next += 1;
                compiler.push_param(value);
                Ok(())
            }
            (Marker::Positional, RawBindings::Named(_)) => Err(Error::compilation(
                "positional placeholder in a named-parameter template",
            )),
            (Marker::Named(name), RawBindings::Named(map)) => {
                let value = map
                    .get(&name)
                    .cloned()
                    .ok_or(Error::UnboundParameter(name))?;
                compiler.push_param(value);
                Ok(())
            }
            (Marker::Named(name), RawBindings::Positional(_)) => {
                Err(Error::UnboundParameter(name))
            }
        })?;
        if let RawBindings::Positional(values) = bindings {
            if next != values.len() {
                return Err(Error::compilation(
                    "raw template has fewer placeholders than parameters",
                ));
            }
        }
        Ok(())
    }

    /// Copy a raw template, dispatching ? and :name markers found outside
    /// string literals and quoted identifiers; "::" passes through for
    /// cast syntax
    fn write_template<F>(&mut self, template: &str, mut on_marker: F) -> Result<()>
    where
        F: FnMut(&mut Self, Marker) -> Result<()>,
    {
        let mut chars = template.chars().peekable();
        let mut in_string = false;
        let mut in_quoted_ident = false;
        while let Some(ch) = chars.next() {
            match ch {
                '\'' if !in_quoted_ident => {
                    in_string = !in_string;
                    self.sql.push(ch);
                }
                '"' if !in_string => {
                    in_quoted_ident = !in_quoted_ident;
                    self.sql.push(ch);
                }
                '?' if !in_string && !in_quoted_ident => on_marker(self, Marker::Positional)?,
                ':' if !in_string && !in_quoted_ident => {
                    if chars.peek() == Some(&':') {
                        chars.next();
                        self.sql.push_str("::");
                        continue;
                    }
                    let mut name = String::new();
                    while let Some(c) = chars.peek() {
                        if c.is_ascii_alphanumeric() || *c == '_' {
                            name.push(*c);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    if name.is_empty() {
                        self.sql.push(':');
                    } else {
                        on_marker(self, Marker::Named(name))?;
                    }
                }
                _ => self.sql.push(ch),
            }
        }
        Ok(())
    }
}

enum Marker {
    Positional,
    Named(String),
}
