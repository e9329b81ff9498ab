//! Generated SQL, grouped by execution phase

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::executor::SqlPlan;
use crate::ingest::DataSplitRange;
use crate::plan::StatisticName;
use crate::transformer::RenderedPlan;

/// SQL for one ingest run, or for one data split of it.
///
/// Phases run in field order: pre-actions, initialize-load checks, ingest,
/// post-actions, then metadata ingest. Statistics queries run after ingest
/// and before post-actions drop the staging table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorResult {
    pub pre_actions_sql: Vec<String>,
    pub initialize_load_sql: Vec<String>,
    pub ingest_sql: Vec<String>,
    pub post_actions_sql: Vec<String>,
    pub metadata_ingest_sql: Vec<String>,
    pub statistics_sql: BTreeMap<StatisticName, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_split: Option<DataSplitRange>,
}

impl GeneratorResult {
    pub fn new(rendered: RenderedPlan, data_split: Option<DataSplitRange>) -> Self {
        Self {
            pre_actions_sql: rendered.pre_actions,
            initialize_load_sql: rendered.initialize_load,
            ingest_sql: rendered.ingest,
            post_actions_sql: rendered.post_actions,
            metadata_ingest_sql: rendered.metadata_ingest,
            statistics_sql: rendered.statistics,
            data_split,
        }
    }

    pub fn pre_actions_sql_plan(&self) -> SqlPlan {
        SqlPlan::new(self.pre_actions_sql.clone())
    }

    pub fn initialize_load_sql_plan(&self) -> SqlPlan {
        SqlPlan::new(self.initialize_load_sql.clone())
    }

    pub fn ingest_sql_plan(&self) -> SqlPlan {
        SqlPlan::new(self.ingest_sql.clone())
    }

    pub fn post_actions_sql_plan(&self) -> SqlPlan {
        SqlPlan::new(self.post_actions_sql.clone())
    }

    pub fn metadata_ingest_sql_plan(&self) -> SqlPlan {
        SqlPlan::new(self.metadata_ingest_sql.clone())
    }

    /// One single-statement plan per collected statistic
    pub fn statistics_sql_plans(&self) -> BTreeMap<StatisticName, SqlPlan> {
        self.statistics_sql
            .iter()
            .map(|(name, sql)| (*name, SqlPlan::new(vec![sql.clone()])))
            .collect()
    }

    /// Every statement in execution order, statistics excluded
    pub fn all_sql(&self) -> Vec<&str> {
        self.pre_actions_sql
            .iter()
            .chain(&self.initialize_load_sql)
            .chain(&self.ingest_sql)
            .chain(&self.post_actions_sql)
            .chain(&self.metadata_ingest_sql)
            .map(String::as_str)
            .collect()
    }
}
