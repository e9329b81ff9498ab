//! Operation node types

use super::expr::{Condition, FieldValue, Value};
use crate::dataset::{Dataset, DatasetDefinition, Field};

/// A single step of an ingest run
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Create(Create),
    Drop(Drop),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
    Merge(Merge),
    Alter(Alter),
    Truncate(Truncate),
    Show(Show),
    /// Standalone query, e.g. a statistics count
    Select(Selection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    All,
    Distinct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    IfExists,
    IfNotExists,
}

/// Projection over an optional source with filter, grouping and limit
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selection {
    pub source: Option<Dataset>,
    /// Selected values; empty means `*`
    pub fields: Vec<Value>,
    pub condition: Option<Condition>,
    pub group_by: Vec<Value>,
    pub having: Option<Condition>,
    pub quantifier: Option<Quantifier>,
    pub limit: Option<u64>,
    /// Set when the selection is used as a derived table
    pub alias: Option<String>,
}

impl Selection {
    pub fn new(fields: Vec<Value>) -> Self {
        Self {
            fields,
            ..Default::default()
        }
    }

    /// `SELECT * FROM source`
    pub fn all_from(source: impl Into<Dataset>) -> Self {
        Self::new(Vec::new()).source(source)
    }

    pub fn source(mut self, source: impl Into<Dataset>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn filter_opt(mut self, condition: Option<Condition>) -> Self {
        self.condition = condition;
        self
    }

    pub fn group_by(mut self, values: Vec<Value>) -> Self {
        self.group_by = values;
        self
    }

    pub fn having(mut self, condition: Condition) -> Self {
        self.having = Some(condition);
        self
    }

    pub fn distinct(mut self) -> Self {
        self.quantifier = Some(Quantifier::Distinct);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

impl From<Selection> for Dataset {
    fn from(selection: Selection) -> Self {
        Dataset::Selection(Box::new(selection))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Create {
    pub dataset: DatasetDefinition,
    pub modifier: Option<Modifier>,
}

impl Create {
    pub fn if_not_exists(dataset: DatasetDefinition) -> Self {
        Self {
            dataset,
            modifier: Some(Modifier::IfNotExists),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Drop {
    pub dataset: DatasetDefinition,
    pub modifier: Option<Modifier>,
    pub cascade: bool,
}

/// `INSERT INTO target (fields) (source)`
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub target: DatasetDefinition,
    pub fields: Vec<String>,
    pub source: Selection,
}

/// Assignment of a value to a target column
#[derive(Debug, Clone, PartialEq)]
pub struct Pair {
    pub field: FieldValue,
    pub value: Value,
}

impl Pair {
    pub fn new(field: FieldValue, value: Value) -> Self {
        Self { field, value }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub dataset: DatasetDefinition,
    pub pairs: Vec<Pair>,
    pub condition: Option<Condition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub dataset: DatasetDefinition,
    pub condition: Option<Condition>,
}

/// Upsert of `source` into `target`.
///
/// Matched and unmatched branches are carried as separate lists. When
/// `delete_condition` is set, matched rows satisfying it are deleted instead
/// of updated.
#[derive(Debug, Clone, PartialEq)]
pub struct Merge {
    pub target: DatasetDefinition,
    pub source: Dataset,
    pub on: Condition,
    pub matched_condition: Option<Condition>,
    pub matched_pairs: Vec<Pair>,
    pub unmatched_fields: Vec<String>,
    pub unmatched_values: Vec<Value>,
    pub unmatched_condition: Option<Condition>,
    pub delete_condition: Option<Condition>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlterKind {
    AddColumn(Field),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alter {
    pub dataset: DatasetDefinition,
    pub kind: AlterKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Truncate {
    pub dataset: DatasetDefinition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowKind {
    Schemas,
    Tables,
}

/// `SHOW SCHEMAS` or `SHOW TABLES`, scoped by the dataset's group when given
#[derive(Debug, Clone, PartialEq)]
pub struct Show {
    pub kind: ShowKind,
    pub dataset: Option<DatasetDefinition>,
}
