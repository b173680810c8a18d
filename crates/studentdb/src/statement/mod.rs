//! Statement rendering for the `students` table.
//!
//! Every builder fills one of four fixed templates. Values coming from a [`Student`]
//! are rendered as SQL literals; condition and update fragments are copied verbatim,
//! so the caller is responsible for producing safe fragments.
//!
//! # Example
//!
//! ```ignore
//! use studentdb::{build_delete, build_select};
//!
//! let all = build_select(None)?;
//! assert_eq!(all.sql(), "SELECT * FROM students");
//!
//! let del = build_delete("id=7")?;
//! assert_eq!(del.sql(), "DELETE FROM students WHERE id = 7;");
//! # Ok::<(), studentdb::DbError>(())
//! ```

mod kind;

#[cfg(test)]
mod tests;

pub use kind::StatementKind;

use crate::condition::{Condition, UpdateSpec};
use crate::error::DbResult;
use crate::student::Student;
use std::fmt;

pub const INSERT_TEMPLATE: &str =
    "INSERT INTO students (id, name, login, password, group_id) VALUES ({}, {}, {}, {}, {});";
pub const SELECT_TEMPLATE: &str = "SELECT * FROM students";
pub const UPDATE_TEMPLATE: &str = "UPDATE students SET {} WHERE {}";
pub const DELETE_TEMPLATE: &str = "DELETE FROM students WHERE {} = {};";

/// A rendered command together with its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Statement {
    kind: StatementKind,
    sql: String,
}

impl Statement {
    fn new(kind: StatementKind, sql: String) -> Self {
        Self { kind, sql }
    }

    /// Wrap caller-written SQL, classifying it by its leading keyword.
    pub fn raw(sql: impl Into<String>) -> Self {
        let sql = sql.into();
        let kind = StatementKind::from_sql(&sql);
        Self { kind, sql }
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Access the SQL string.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn into_sql(self) -> String {
        self.sql
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Render an insert of all five student fields, in column order.
pub fn build_insert(student: &Student) -> Statement {
    let values = [
        student.id.to_string(),
        quote_literal(&student.name),
        quote_literal(&student.login),
        quote_literal(&student.password),
        student.group_id.to_string(),
    ];
    Statement::new(StatementKind::Insert, fill_template(INSERT_TEMPLATE, &values))
}

/// Render a select over all students, optionally scoped by a `field=value` condition.
pub fn build_select(condition: Option<&str>) -> DbResult<Statement> {
    let sql = match condition {
        None => SELECT_TEMPLATE.to_string(),
        Some(raw) => {
            let c = Condition::parse(raw)?;
            format!("{SELECT_TEMPLATE} WHERE {}={}", c.field, c.value)
        }
    };
    Ok(Statement::new(StatementKind::Select, sql))
}

/// Render an update from free-form `SET` and `WHERE` fragments.
pub fn build_update(update_info: &str, condition: &str) -> Statement {
    let sql = fill_template(UPDATE_TEMPLATE, &[update_info, condition]);
    Statement::new(StatementKind::Update, sql)
}

/// Same as [`build_update`], taking both fragments as an [`UpdateSpec`].
pub fn build_update_spec(spec: &UpdateSpec) -> Statement {
    build_update(&spec.assignments, &spec.condition)
}

/// Render a delete scoped by a `field=value` condition.
pub fn build_delete(condition: &str) -> DbResult<Statement> {
    let c = Condition::parse(condition)?;
    let sql = fill_template(DELETE_TEMPLATE, &[c.field.as_str(), c.value.as_str()]);
    Ok(Statement::new(StatementKind::Delete, sql))
}

/// Substitute `values` for the `{}` slots of `template`, left to right.
///
/// Templates are constants whose slot count matches the call sites.
fn fill_template<S: AsRef<str>>(template: &str, values: &[S]) -> String {
    debug_assert_eq!(template.matches("{}").count(), values.len());

    let extra: usize = values.iter().map(|v| v.as_ref().len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;
    let mut values = values.iter();
    while let Some(pos) = rest.find("{}") {
        out.push_str(&rest[..pos]);
        if let Some(v) = values.next() {
            out.push_str(v.as_ref());
        }
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}

/// Render text as a single-quoted SQL literal, doubling embedded quotes.
fn quote_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            out.push('\'');
        }
        out.push(ch);
    }
    out.push('\'');
    out
}

/// Strip leading whitespace, SQL comments (`--` and `/* */`), and parentheses
/// from a SQL string to find the first meaningful keyword.
pub(crate) fn strip_sql_prefix(sql: &str) -> &str {
    let mut s = sql;
    loop {
        let before = s;
        s = s.trim_start();
        if s.starts_with("--") {
            if let Some(pos) = s.find('\n') {
                s = &s[pos + 1..];
                continue;
            }
            return "";
        }
        if s.starts_with("/*") {
            if let Some(pos) = s.find("*/") {
                s = &s[pos + 2..];
                continue;
            }
            return "";
        }
        if let Some(rest) = s.strip_prefix('(') {
            s = rest;
            continue;
        }
        if s == before {
            break;
        }
    }
    s
}

/// Whether `s` starts with `keyword` as a whole word (case-insensitive).
pub(crate) fn starts_with_keyword(s: &str, keyword: &str) -> bool {
    match s.get(0..keyword.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(keyword) => s
            .as_bytes()
            .get(keyword.len())
            .is_none_or(|&b| !is_word_byte(b)),
        _ => false,
    }
}

pub(crate) fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}
