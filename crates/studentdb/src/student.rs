//! The `students` record.

use serde::{Deserialize, Serialize};

/// A row of the `students` table.
///
/// Field order matches the column order of the insert template:
/// `id, name, login, password, group_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub login: String,
    pub password: String,
    pub group_id: i64,
}

impl Student {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
        group_id: i64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            login: login.into(),
            password: password.into(),
            group_id,
        }
    }
}
