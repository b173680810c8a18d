use super::{is_word_byte, starts_with_keyword, strip_sql_prefix};

/// The kind of command a [`Statement`](super::Statement) carries.
///
/// Whether the executor fetches rows is decided from this value, never from
/// substrings of the SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// SELECT query (including `WITH ... SELECT` and `VALUES`)
    Select,
    /// SHOW session command
    Show,
    /// EXPLAIN of another statement (returns the plan as rows)
    Explain,
    /// INSERT statement
    Insert,
    /// UPDATE statement
    Update,
    /// DELETE statement
    Delete,
    /// Anything else (DDL, SET, VACUUM, ...)
    Other,
}

impl StatementKind {
    /// Classify SQL by its leading keyword.
    ///
    /// Leading whitespace, comments and opening parentheses are skipped. Keywords that
    /// appear later in the text (inside a condition value, a subquery) are ignored.
    pub fn from_sql(sql: &str) -> Self {
        let trimmed = strip_sql_prefix(sql);
        if starts_with_keyword(trimmed, "SELECT")
            || starts_with_keyword(trimmed, "VALUES")
            || starts_with_keyword(trimmed, "TABLE")
        {
            StatementKind::Select
        } else if starts_with_keyword(trimmed, "WITH") {
            Self::detect_cte_dml(&trimmed["WITH".len()..])
        } else if starts_with_keyword(trimmed, "SHOW") {
            StatementKind::Show
        } else if starts_with_keyword(trimmed, "EXPLAIN") {
            StatementKind::Explain
        } else if starts_with_keyword(trimmed, "INSERT") {
            StatementKind::Insert
        } else if starts_with_keyword(trimmed, "UPDATE") {
            StatementKind::Update
        } else if starts_with_keyword(trimmed, "DELETE") {
            StatementKind::Delete
        } else {
            StatementKind::Other
        }
    }

    /// Find the statement a `WITH` clause is attached to.
    ///
    /// Returns the first DML keyword at parenthesis depth 0, skipping CTE bodies, string
    /// literals, quoted identifiers and comments. Defaults to `Select`.
    fn detect_cte_dml(sql: &str) -> Self {
        let bytes = sql.as_bytes();
        let mut depth: i32 = 0;
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'(' => depth += 1,
                b')' => depth -= 1,
                quote @ (b'\'' | b'"') => {
                    i += 1;
                    while i < bytes.len() {
                        if bytes[i] == quote {
                            if i + 1 < bytes.len() && bytes[i + 1] == quote {
                                i += 1;
                            } else {
                                break;
                            }
                        }
                        i += 1;
                    }
                }
                b'-' if bytes.get(i + 1) == Some(&b'-') => {
                    while i < bytes.len() && bytes[i] != b'\n' {
                        i += 1;
                    }
                }
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    match sql[i + 2..].find("*/") {
                        Some(end) => i += end + 3,
                        None => break,
                    }
                }
                b if is_word_byte(b) => {
                    let start = i;
                    while i < bytes.len() && is_word_byte(bytes[i]) {
                        i += 1;
                    }
                    if depth == 0 {
                        let word = &sql[start..i];
                        if word.eq_ignore_ascii_case("INSERT") {
                            return StatementKind::Insert;
                        } else if word.eq_ignore_ascii_case("UPDATE") {
                            return StatementKind::Update;
                        } else if word.eq_ignore_ascii_case("DELETE") {
                            return StatementKind::Delete;
                        } else if word.eq_ignore_ascii_case("SELECT")
                            || word.eq_ignore_ascii_case("VALUES")
                            || word.eq_ignore_ascii_case("TABLE")
                        {
                            return StatementKind::Select;
                        }
                    }
                    continue;
                }
                _ => {}
            }
            i += 1;
        }
        StatementKind::Select
    }

    /// Whether executing this kind yields result rows.
    pub fn returns_rows(self) -> bool {
        matches!(
            self,
            StatementKind::Select | StatementKind::Show | StatementKind::Explain
        )
    }

    /// Whether the executor wraps this kind in a committed transaction.
    ///
    /// `EXPLAIN ANALYZE` runs the explained statement, so it commits like DML.
    /// `Show` and `Other` run in autocommit mode: PostgreSQL rejects some of them
    /// (`CREATE DATABASE`, `VACUUM`) inside a transaction block.
    pub fn is_transactional(self) -> bool {
        matches!(
            self,
            StatementKind::Select
                | StatementKind::Explain
                | StatementKind::Insert
                | StatementKind::Update
                | StatementKind::Delete
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatementKind::Select => "select",
            StatementKind::Show => "show",
            StatementKind::Explain => "explain",
            StatementKind::Insert => "insert",
            StatementKind::Update => "update",
            StatementKind::Delete => "delete",
            StatementKind::Other => "other",
        }
    }
}
