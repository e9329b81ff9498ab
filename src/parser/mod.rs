//! Ingest configuration parser (verb module)
//!
//! Transforms YAML run descriptions into datasets, an ingest mode and
//! generator options. Strategies go through their builders, so a
//! configuration fails with the same messages as the builder API.

use std::path::Path;

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::dataset::{Dataset, DatasetDefinition, Datasets, DerivedDataset};
use crate::error::{BuildError, ParseError};
use crate::generator::{FixedClock, RelationalGenerator};
use crate::ingest::{
    AppendOnly, AuditingStrategy, DataSplitRange, DateTimeAuditing, DeduplicationStrategy,
    IngestMode, NontemporalDelta, NontemporalSnapshot,
};
use crate::sink::{CaseConversion, RelationalSink};

/// One ingest run as described by a configuration file
#[derive(Debug, Clone, PartialEq)]
pub struct IngestSpec {
    pub datasets: Datasets,
    pub ingest_mode: IngestMode,
    pub options: GeneratorOptions,
    /// Empty unless the run is split
    pub data_splits: Vec<DataSplitRange>,
}

/// Optional generator settings; absent keys keep the builder defaults
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct GeneratorOptions {
    pub collect_statistics: bool,
    pub cleanup_staging_data: bool,
    pub create_staging_dataset: bool,
    pub enable_schema_evolution: bool,
    pub case_conversion: CaseConversion,
    pub sample_row_count: u64,
    /// Pins the batch timestamp instead of reading the wall clock
    pub execution_timestamp: Option<NaiveDateTime>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            collect_statistics: false,
            cleanup_staging_data: true,
            create_staging_dataset: true,
            enable_schema_evolution: false,
            case_conversion: CaseConversion::None,
            sample_row_count: 20,
            execution_timestamp: None,
        }
    }
}

impl IngestSpec {
    /// A generator for this run targeting `sink`
    pub fn generator(&self, sink: impl RelationalSink + 'static) -> Result<RelationalGenerator, BuildError> {
        let options = &self.options;
        let mut builder = RelationalGenerator::builder()
            .ingest_mode(self.ingest_mode.clone())
            .relational_sink(sink)
            .collect_statistics(options.collect_statistics)
            .cleanup_staging_data(options.cleanup_staging_data)
            .create_staging_dataset(options.create_staging_dataset)
            .enable_schema_evolution(options.enable_schema_evolution)
            .case_conversion(options.case_conversion)
            .sample_row_count(options.sample_row_count);
        if let Some(ts) = options.execution_timestamp {
            builder = builder.execution_timestamp_clock(FixedClock::at(ts));
        }
        builder.build()
    }
}

/// Parse an ingest configuration from a YAML file
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<IngestSpec, ParseError> {
    let path_str = path.as_ref().display().to_string();
    let contents = std::fs::read_to_string(&path).map_err(|e| ParseError::Io {
        path: path_str,
        source: e,
    })?;
    parse_str(&contents)
}

/// Parse an ingest configuration from a YAML string
pub fn parse_str(yaml: &str) -> Result<IngestSpec, ParseError> {
    let raw: RawSpec = serde_yaml::from_str(yaml)?;
    raw.into_spec()
}

// ---------------------------------------------------------------------------
// Raw YAML shapes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawSpec {
    main_dataset: DatasetDefinition,
    staging_dataset: RawStaging,
    #[serde(default)]
    metadata_dataset: Option<DatasetDefinition>,
    ingest_mode: RawIngestMode,
    #[serde(default)]
    options: GeneratorOptions,
    #[serde(default)]
    data_splits: Vec<DataSplitRange>,
}

/// A derived staging dataset is recognised by its `base` key
#[derive(Deserialize)]
#[serde(untagged)]
enum RawStaging {
    Derived(DerivedDataset),
    Table(DatasetDefinition),
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
enum RawIngestMode {
    AppendOnly {
        digest_field: Option<String>,
        #[serde(default)]
        deduplication_strategy: DeduplicationStrategy,
        #[serde(default)]
        auditing: RawAuditing,
        data_split_field: Option<String>,
    },
    NontemporalDelta {
        digest_field: Option<String>,
        #[serde(default)]
        auditing: RawAuditing,
        delete_indicator_field: Option<String>,
        #[serde(default)]
        delete_indicator_values: Vec<String>,
        data_split_field: Option<String>,
    },
    NontemporalSnapshot {
        #[serde(default)]
        auditing: RawAuditing,
    },
}

#[derive(Deserialize, Default)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
enum RawAuditing {
    #[default]
    NoAuditing,
    DateTimeAuditing { date_time_field: Option<String> },
}

impl RawSpec {
    fn into_spec(self) -> Result<IngestSpec, ParseError> {
        let staging: Dataset = match self.staging_dataset {
            RawStaging::Derived(derived) => derived.into(),
            RawStaging::Table(table) => table.into(),
        };
        let mut datasets = Datasets::builder()
            .main_dataset(self.main_dataset)
            .staging_dataset(staging);
        if let Some(metadata) = self.metadata_dataset {
            datasets = datasets.metadata_dataset(metadata);
        }

        Ok(IngestSpec {
            datasets: datasets.build()?,
            ingest_mode: self.ingest_mode.build()?,
            options: self.options,
            data_splits: self.data_splits,
        })
    }
}

impl RawIngestMode {
    fn build(self) -> Result<IngestMode, BuildError> {
        let mode = match self {
            RawIngestMode::AppendOnly {
                digest_field,
                deduplication_strategy,
                auditing,
                data_split_field,
            } => {
                let mut builder = AppendOnly::builder()
                    .deduplication_strategy(deduplication_strategy)
                    .auditing_strategy(auditing.build()?);
                if let Some(field) = digest_field {
                    builder = builder.digest_field(field);
                }
                if let Some(field) = data_split_field {
                    builder = builder.data_split_field(field);
                }
                builder.build()?.into()
            }
            RawIngestMode::NontemporalDelta {
                digest_field,
                auditing,
                delete_indicator_field,
                delete_indicator_values,
                data_split_field,
            } => {
                let mut builder = NontemporalDelta::builder()
                    .auditing_strategy(auditing.build()?)
                    .delete_indicator_values(delete_indicator_values);
                if let Some(field) = digest_field {
                    builder = builder.digest_field(field);
                }
                if let Some(field) = delete_indicator_field {
                    builder = builder.delete_indicator_field(field);
                }
                if let Some(field) = data_split_field {
                    builder = builder.data_split_field(field);
                }
                builder.build()?.into()
            }
            RawIngestMode::NontemporalSnapshot { auditing } => {
                NontemporalSnapshot::new(auditing.build()?).into()
            }
        };
        Ok(mode)
    }
}

impl RawAuditing {
    fn build(self) -> Result<AuditingStrategy, BuildError> {
        match self {
            RawAuditing::NoAuditing => Ok(AuditingStrategy::NoAuditing),
            RawAuditing::DateTimeAuditing { date_time_field } => {
                let mut builder = DateTimeAuditing::builder();
                if let Some(field) = date_time_field {
                    builder = builder.date_time_field(field);
                }
                Ok(builder.build()?.into())
            }
        }
    }
}
