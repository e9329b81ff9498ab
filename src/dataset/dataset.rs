//! Dataset variants and the main/staging pairing

use serde::{Deserialize, Serialize};

use super::schema::SchemaDefinition;
use crate::error::BuildError;
use crate::plan::{Condition, Selection};

/// A physical table: optional database and group (schema), name, alias and fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDefinition {
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    pub schema: SchemaDefinition,
}

impl DatasetDefinition {
    pub fn new(name: impl Into<String>, schema: SchemaDefinition) -> Self {
        Self {
            database: None,
            group: None,
            name: name.into(),
            alias: None,
            schema,
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Same table, different schema. The original value is left untouched.
    pub fn with_schema(&self, schema: SchemaDefinition) -> Self {
        Self {
            schema,
            ..self.clone()
        }
    }
}

/// Comparison used by [`DatasetFilter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

/// Literal compared against in a [`DatasetFilter`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Integer(i64),
    String(String),
}

/// `<field> <op> <value>` applied to the base table of a [`DerivedDataset`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetFilter {
    pub field: String,
    pub op: FilterOperator,
    pub value: FilterValue,
}

impl DatasetFilter {
    pub fn new(field: impl Into<String>, op: FilterOperator, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }
}

/// A base table narrowed by simple field filters, read as a sub-select
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedDataset {
    pub base: DatasetDefinition,
    pub filters: Vec<DatasetFilter>,
}

/// A base table narrowed by an arbitrary condition, read as a sub-select
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredDataset {
    pub base: DatasetDefinition,
    pub condition: Condition,
}

/// Anything that can appear where a table is expected
#[derive(Debug, Clone, PartialEq)]
pub enum Dataset {
    Definition(DatasetDefinition),
    Derived(DerivedDataset),
    Filtered(FilteredDataset),
    Selection(Box<Selection>),
}

impl Dataset {
    /// The underlying table, if the dataset is backed by one
    pub fn definition(&self) -> Option<&DatasetDefinition> {
        match self {
            Dataset::Definition(def) => Some(def),
            Dataset::Derived(derived) => Some(&derived.base),
            Dataset::Filtered(filtered) => Some(&filtered.base),
            Dataset::Selection(_) => None,
        }
    }

    pub fn schema(&self) -> Option<&SchemaDefinition> {
        self.definition().map(|d| &d.schema)
    }

    pub fn alias(&self) -> Option<&str> {
        match self {
            Dataset::Selection(sel) => sel.alias.as_deref(),
            other => other.definition().and_then(|d| d.alias.as_deref()),
        }
    }

    /// True for plain tables; derived, filtered and selection datasets are views
    pub fn is_table(&self) -> bool {
        matches!(self, Dataset::Definition(_))
    }
}

impl From<DatasetDefinition> for Dataset {
    fn from(def: DatasetDefinition) -> Self {
        Dataset::Definition(def)
    }
}

impl From<DerivedDataset> for Dataset {
    fn from(derived: DerivedDataset) -> Self {
        Dataset::Derived(derived)
    }
}

impl From<FilteredDataset> for Dataset {
    fn from(filtered: FilteredDataset) -> Self {
        Dataset::Filtered(filtered)
    }
}

/// The main (target) and staging (source) datasets of one ingest run
#[derive(Debug, Clone, PartialEq)]
pub struct Datasets {
    main: DatasetDefinition,
    staging: Dataset,
    metadata: Option<DatasetDefinition>,
}

impl Datasets {
    pub fn builder() -> DatasetsBuilder {
        DatasetsBuilder::default()
    }

    pub fn of(main: DatasetDefinition, staging: impl Into<Dataset>) -> Self {
        Self {
            main,
            staging: staging.into(),
            metadata: None,
        }
    }

    pub fn main(&self) -> &DatasetDefinition {
        &self.main
    }

    pub fn staging(&self) -> &Dataset {
        &self.staging
    }

    /// Batch metadata table, when the caller overrides the default
    pub fn metadata(&self) -> Option<&DatasetDefinition> {
        self.metadata.as_ref()
    }

    pub fn with_main(&self, main: DatasetDefinition) -> Self {
        Self {
            main,
            ..self.clone()
        }
    }

    pub fn with_staging(&self, staging: impl Into<Dataset>) -> Self {
        Self {
            staging: staging.into(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Default)]
pub struct DatasetsBuilder {
    main: Option<DatasetDefinition>,
    staging: Option<Dataset>,
    metadata: Option<DatasetDefinition>,
}

impl DatasetsBuilder {
    pub fn main_dataset(mut self, main: DatasetDefinition) -> Self {
        self.main = Some(main);
        self
    }

    pub fn staging_dataset(mut self, staging: impl Into<Dataset>) -> Self {
        self.staging = Some(staging.into());
        self
    }

    pub fn metadata_dataset(mut self, metadata: DatasetDefinition) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn build(self) -> Result<Datasets, BuildError> {
        let mut missing = Vec::new();
        if self.main.is_none() {
            missing.push("mainDataset");
        }
        if self.staging.is_none() {
            missing.push("stagingDataset");
        }
        match (self.main, self.staging) {
            (Some(main), Some(staging)) => Ok(Datasets {
                main,
                staging,
                metadata: self.metadata,
            }),
            _ => Err(BuildError::missing("Datasets", missing)),
        }
    }
}
