//! Normalized execution results.

use crate::statement::StatementKind;
use indexmap::IndexMap;
use tokio_postgres::{SimpleQueryMessage, SimpleQueryRow};

/// One result row: column name → textual value (`None` for SQL NULL), in column order.
pub type RowMap = IndexMap<String, Option<String>>;

/// What [`StudentStore::execute`](crate::StudentStore::execute) returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecuteResult {
    /// All rows produced by a read statement.
    Rows(Vec<RowMap>),
    /// Driver acknowledgement for anything else. `rows_affected` is absent when the
    /// server reported no command completion (e.g. an empty statement).
    Ack { rows_affected: Option<u64> },
}

impl ExecuteResult {
    pub(crate) fn from_messages(kind: StatementKind, messages: &[SimpleQueryMessage]) -> Self {
        if kind.returns_rows() {
            let rows = messages
                .iter()
                .filter_map(|m| match m {
                    SimpleQueryMessage::Row(row) => Some(row_to_map(row)),
                    _ => None,
                })
                .collect();
            ExecuteResult::Rows(rows)
        } else {
            let rows_affected = messages.iter().rev().find_map(|m| match m {
                SimpleQueryMessage::CommandComplete(n) => Some(*n),
                _ => None,
            });
            ExecuteResult::Ack { rows_affected }
        }
    }

    pub fn is_rows(&self) -> bool {
        matches!(self, ExecuteResult::Rows(_))
    }

    /// Rows of a read statement, `None` for an acknowledgement.
    pub fn rows(&self) -> Option<&[RowMap]> {
        match self {
            ExecuteResult::Rows(rows) => Some(rows),
            ExecuteResult::Ack { .. } => None,
        }
    }

    pub fn into_rows(self) -> Option<Vec<RowMap>> {
        match self {
            ExecuteResult::Rows(rows) => Some(rows),
            ExecuteResult::Ack { .. } => None,
        }
    }

    /// Affected-row count of an acknowledgement, `None` for rows or when unreported.
    pub fn rows_affected(&self) -> Option<u64> {
        match self {
            ExecuteResult::Ack { rows_affected } => *rows_affected,
            ExecuteResult::Rows(_) => None,
        }
    }

    /// Number of rows returned, or affected rows for an acknowledgement.
    pub(crate) fn row_count(&self) -> Option<u64> {
        match self {
            ExecuteResult::Rows(rows) => Some(rows.len() as u64),
            ExecuteResult::Ack { rows_affected } => *rows_affected,
        }
    }
}

fn row_to_map(row: &SimpleQueryRow) -> RowMap {
    row.columns()
        .iter()
        .enumerate()
        .map(|(idx, col)| (col.name().to_string(), row.get(idx).map(str::to_string)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, Option<&str>)]) -> RowMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
            .collect()
    }

    #[test]
    fn read_without_messages_is_empty_rows() {
        let r = ExecuteResult::from_messages(StatementKind::Select, &[]);
        assert_eq!(r, ExecuteResult::Rows(Vec::new()));
        assert_eq!(r.row_count(), Some(0));
    }

    #[test]
    fn write_without_messages_is_empty_ack() {
        let r = ExecuteResult::from_messages(StatementKind::Delete, &[]);
        assert_eq!(r, ExecuteResult::Ack { rows_affected: None });
        assert!(!r.is_rows());
        assert_eq!(r.rows(), None);
    }

    #[test]
    fn accessors() {
        let rows = vec![row(&[("id", Some("1")), ("name", None)])];
        let r = ExecuteResult::Rows(rows.clone());
        assert!(r.is_rows());
        assert_eq!(r.rows().map(<[RowMap]>::len), Some(1));
        assert_eq!(r.rows_affected(), None);
        assert_eq!(r.clone().into_rows(), Some(rows));

        let first = &r.rows().unwrap()[0];
        let columns: Vec<&str> = first.keys().map(String::as_str).collect();
        assert_eq!(columns, ["id", "name"]);
        assert_eq!(first["name"], None);

        let ack = ExecuteResult::Ack {
            rows_affected: Some(3),
        };
        assert_eq!(ack.rows_affected(), Some(3));
        assert_eq!(ack.row_count(), Some(3));
        assert_eq!(ack.into_rows(), None);
    }
}
