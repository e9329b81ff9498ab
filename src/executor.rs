//! Execution boundary
//!
//! The generator only produces SQL text. Running it belongs to an
//! [`Executor`] supplied by the caller; this module defines the values that
//! cross that boundary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Ordered SQL statements executed as one unit
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SqlPlan {
    statements: Vec<String>,
}

impl SqlPlan {
    pub fn new(statements: Vec<String>) -> Self {
        Self { statements }
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl From<Vec<String>> for SqlPlan {
    fn from(statements: Vec<String>) -> Self {
        Self::new(statements)
    }
}

impl<'a> IntoIterator for &'a SqlPlan {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}

/// Rows returned by one statement, keyed by column name
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TabularData {
    rows: Vec<BTreeMap<String, serde_json::Value>>,
}

impl TabularData {
    pub fn new(rows: Vec<BTreeMap<String, serde_json::Value>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[BTreeMap<String, serde_json::Value>] {
        &self.rows
    }

    /// `column` of the first row as an integer; count queries return exactly one
    pub fn first_integer(&self, column: &str) -> Option<i64> {
        self.rows.first()?.get(column)?.as_i64()
    }
}

/// Runs generated SQL against a database
pub trait Executor {
    type Error;

    fn execute_physical_plan(&mut self, plan: &SqlPlan) -> Result<(), Self::Error>;

    /// Execute every statement, returning one result set per statement
    fn execute_physical_plan_and_get_results(
        &mut self,
        plan: &SqlPlan,
    ) -> Result<Vec<TabularData>, Self::Error>;
}
