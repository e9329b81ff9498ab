//! Phased logical plan

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::node::{Operation, Selection};

/// Row-count statistics an ingest run can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatisticName {
    IncomingRecordCount,
    RowsInserted,
    RowsUpdated,
    RowsDeleted,
    RowsWithErrors,
}

impl StatisticName {
    /// Column alias carried by the generated count query
    pub fn as_str(&self) -> &'static str {
        match self {
            StatisticName::IncomingRecordCount => "incomingRecordCount",
            StatisticName::RowsInserted => "rowsInserted",
            StatisticName::RowsUpdated => "rowsUpdated",
            StatisticName::RowsDeleted => "rowsDeleted",
            StatisticName::RowsWithErrors => "rowsWithErrors",
        }
    }
}

impl fmt::Display for StatisticName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations of one ingest run, grouped by the phase that runs them
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LogicalPlan {
    pub pre_actions: Vec<Operation>,
    /// Checks run before ingest; any non-zero count aborts the load
    pub initialize_load: Vec<Operation>,
    pub ingest: Vec<Operation>,
    pub post_actions: Vec<Operation>,
    pub metadata_ingest: Vec<Operation>,
    /// Count queries, each returning one row with the statistic as its only column
    pub statistics: BTreeMap<StatisticName, Selection>,
}

impl LogicalPlan {
    pub fn operation_count(&self) -> usize {
        self.pre_actions.len()
            + self.initialize_load.len()
            + self.ingest.len()
            + self.post_actions.len()
            + self.metadata_ingest.len()
            + self.statistics.len()
    }
}
