//! Textual `field=value` conditions and update clauses.
//!
//! Conditions are deliberately naive: a single equality, split once on the first `=`,
//! with no escaping. Both halves are copied into the statement verbatim.

use crate::error::{DbError, DbResult};
use std::fmt;
use std::str::FromStr;

/// A single `field=value` equality constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub field: String,
    pub value: String,
}

impl Condition {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Parse `field=value`.
    ///
    /// Everything after the first `=` belongs to the value, so `a=b=c` parses as
    /// field `a`, value `b=c`. A string without `=` is rejected.
    pub fn parse(s: &str) -> DbResult<Self> {
        match s.split_once('=') {
            Some((field, value)) => Ok(Self::new(field, value)),
            None => Err(DbError::MalformedCondition(s.to_string())),
        }
    }
}

impl FromStr for Condition {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.field, self.value)
    }
}

/// Free-form `SET` and `WHERE` fragments for an update.
///
/// Neither part is validated or escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSpec {
    pub assignments: String,
    pub condition: String,
}

impl UpdateSpec {
    pub fn new(assignments: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            assignments: assignments.into(),
            condition: condition.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_equals() {
        let c = Condition::parse("group_id=3").unwrap();
        assert_eq!(c, Condition::new("group_id", "3"));

        let c: Condition = "note=a=b".parse().unwrap();
        assert_eq!(c.field, "note");
        assert_eq!(c.value, "a=b");
    }

    #[test]
    fn keeps_whitespace_verbatim() {
        let c = Condition::parse("name = 'Ann'").unwrap();
        assert_eq!(c.field, "name ");
        assert_eq!(c.value, " 'Ann'");
        assert_eq!(c.to_string(), "name = 'Ann'");
    }

    #[test]
    fn empty_sides_are_accepted() {
        let c = Condition::parse("=").unwrap();
        assert_eq!(c, Condition::new("", ""));
    }

    #[test]
    fn rejects_missing_equals() {
        let err = Condition::parse("idonly").unwrap_err();
        assert!(err.is_malformed_condition());
        assert!(err.to_string().contains("idonly"));
    }
}
