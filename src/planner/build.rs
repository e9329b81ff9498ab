//! Plan building logic

use chrono::NaiveDateTime;

use crate::dataset::{Dataset, DatasetDefinition, Datasets, Field};
use crate::ingest::{AuditingStrategy, DataSplitRange, DeduplicationStrategy, IngestMode};
use crate::plan::{
    Alter, AlterKind, Condition, Create, Drop, LogicalPlan, Modifier, Operation, Selection, Show,
    ShowKind, Truncate, Value,
};
use crate::sink::Capability;

use super::context::{aliased, PlanContext, STAGING_ALIAS};
use super::error::PlanError;
use super::metadata::{metadata_dataset, plan_metadata_ingest};
use super::statistics::plan_statistics;
use super::{append_only, nontemporal_delta, nontemporal_snapshot};

/// Knobs that shape a plan independently of the ingest mode
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerOptions {
    /// Drop (or truncate) staging once the run finishes
    pub cleanup_staging_data: bool,
    /// Emit `CREATE TABLE IF NOT EXISTS` for a table staging dataset
    pub create_staging_dataset: bool,
    pub collect_statistics: bool,
    /// Add staging fields missing from main with `ALTER TABLE`
    pub enable_schema_evolution: bool,
    /// Timestamp written to audit columns and batch metadata
    pub batch_start: NaiveDateTime,
    /// Capabilities of the target sink
    pub capabilities: &'static [Capability],
}

impl PlannerOptions {
    pub fn new(batch_start: NaiveDateTime) -> Self {
        Self {
            cleanup_staging_data: true,
            create_staging_dataset: true,
            collect_statistics: false,
            enable_schema_evolution: false,
            batch_start,
            capabilities: &[],
        }
    }

    pub fn with_capabilities(mut self, capabilities: &'static [Capability]) -> Self {
        self.capabilities = capabilities;
        self
    }

    fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

/// Plan a single ingest run over the whole staging dataset
pub fn plan(
    datasets: &Datasets,
    mode: &IngestMode,
    options: &PlannerOptions,
) -> Result<LogicalPlan, PlanError> {
    plan_batch(datasets, mode, options, None)
}

/// Plan one run per data split range, in range order
pub fn plan_with_data_splits(
    datasets: &Datasets,
    mode: &IngestMode,
    options: &PlannerOptions,
    ranges: &[DataSplitRange],
) -> Result<Vec<LogicalPlan>, PlanError> {
    if ranges.is_empty() {
        return Ok(Vec::new());
    }
    validate_data_splits(mode)?;

    tracing::debug!(
        target: "relingest::planner",
        mode = mode.name(),
        splits = ranges.len(),
        "planning data splits"
    );
    ranges
        .iter()
        .map(|range| plan_batch(datasets, mode, options, Some(range)))
        .collect()
}

/// Plan the run for one data split range.
///
/// Each split is its own batch: callers pass options carrying that batch's
/// start timestamp so audit stamps and statistics never span splits.
pub fn plan_data_split(
    datasets: &Datasets,
    mode: &IngestMode,
    options: &PlannerOptions,
    range: &DataSplitRange,
) -> Result<LogicalPlan, PlanError> {
    validate_data_splits(mode)?;
    plan_batch(datasets, mode, options, Some(range))
}

fn validate_data_splits(mode: &IngestMode) -> Result<(), PlanError> {
    match mode {
        IngestMode::NontemporalSnapshot(_) => {
            return Err(PlanError::DataSplitsNotSupported("NontemporalSnapshot"))
        }
        IngestMode::AppendOnly(append)
            if append.deduplication_strategy == DeduplicationStrategy::FilterDuplicates
                && append.auditing_strategy == AuditingStrategy::NoAuditing =>
        {
            return Err(PlanError::DataSplitsNotSupported("NoAuditing"))
        }
        _ => {}
    }
    if mode.data_split_field().is_none() {
        return Err(PlanError::MissingDataSplitField);
    }
    Ok(())
}

fn plan_batch(
    datasets: &Datasets,
    mode: &IngestMode,
    options: &PlannerOptions,
    data_split: Option<&DataSplitRange>,
) -> Result<LogicalPlan, PlanError> {
    let staging = datasets.staging();
    if options.cleanup_staging_data && !staging.is_table() {
        return Err(PlanError::CleanupOnDerivedStaging);
    }

    let ctx = PlanContext::new(datasets.main(), staging, mode, options.batch_start, data_split)?;
    let metadata = match datasets.metadata() {
        Some(metadata) => metadata.clone(),
        None => metadata_dataset()?,
    };

    tracing::debug!(
        target: "relingest::planner",
        mode = mode.name(),
        main = %ctx.main.name,
        data_fields = ctx.data_fields.len(),
        primary_keys = ctx.primary_keys.len(),
        "planning ingest"
    );

    let (initialize_load, ingest) = match mode {
        IngestMode::AppendOnly(append) => (
            append_only::plan_initialize_load(&ctx, append, options.supports(Capability::AliasInHaving)),
            append_only::plan_ingest(&ctx, append),
        ),
        IngestMode::NontemporalDelta(delta) => {
            (Vec::new(), nontemporal_delta::plan_ingest(&ctx, delta)?)
        }
        IngestMode::NontemporalSnapshot(_) => (Vec::new(), nontemporal_snapshot::plan_ingest(&ctx)?),
    };

    Ok(LogicalPlan {
        pre_actions: plan_pre_actions(&ctx, &metadata, options)?,
        initialize_load,
        ingest,
        post_actions: plan_post_actions(&ctx, options),
        metadata_ingest: vec![plan_metadata_ingest(&ctx, &metadata)],
        statistics: if options.collect_statistics {
            plan_statistics(&ctx, mode)
        } else {
            Default::default()
        },
    })
}

fn plan_pre_actions(
    ctx: &PlanContext,
    metadata: &DatasetDefinition,
    options: &PlannerOptions,
) -> Result<Vec<Operation>, PlanError> {
    let mut operations = vec![Operation::Create(Create::if_not_exists(ctx.main.clone()))];

    match &ctx.staging {
        Dataset::Definition(staging) if options.create_staging_dataset => {
            operations.push(Operation::Create(Create::if_not_exists(staging.clone())));
        }
        Dataset::Definition(_) => {}
        _ if options.create_staging_dataset => {
            tracing::warn!(
                target: "relingest::planner",
                "staging dataset is not a table, skipping its creation"
            );
        }
        _ => {}
    }

    operations.push(Operation::Create(Create::if_not_exists(metadata.clone())));

    for field in &ctx.data_fields {
        if ctx.main.schema.contains(&field.name) {
            continue;
        }
        if !options.enable_schema_evolution {
            return Err(PlanError::FieldNotFound {
                field: field.name.clone(),
                dataset: "main",
            });
        }
        // existing rows have no value for the new column
        let added = Field {
            nullable: true,
            primary_key: false,
            ..field.clone()
        };
        operations.push(Operation::Alter(Alter {
            dataset: ctx.main.clone(),
            kind: AlterKind::AddColumn(added),
        }));
    }
    Ok(operations)
}

fn plan_post_actions(ctx: &PlanContext, options: &PlannerOptions) -> Vec<Operation> {
    if !options.cleanup_staging_data {
        return Vec::new();
    }
    let Dataset::Definition(staging) = &ctx.staging else {
        return Vec::new();
    };
    let operation = if options.create_staging_dataset {
        Operation::Drop(Drop {
            dataset: staging.clone(),
            modifier: Some(Modifier::IfExists),
            cascade: true,
        })
    } else {
        Operation::Truncate(Truncate {
            dataset: staging.clone(),
        })
    };
    vec![operation]
}

/// Sample staging rows that would violate main's `NOT NULL` columns
pub fn plan_dry_run(datasets: &Datasets, sample_row_count: u64) -> Result<LogicalPlan, PlanError> {
    let main = datasets.main();
    let staging = aliased(datasets.staging(), STAGING_ALIAS);
    let schema = staging.schema().ok_or(PlanError::UnsupportedStaging)?;
    let alias = staging.alias().unwrap_or(STAGING_ALIAS);

    let ingest = main
        .schema
        .fields()
        .iter()
        .filter(|f| f.is_not_null() && schema.contains(&f.name))
        .map(|f| {
            Operation::Select(
                Selection::all_from(staging.clone())
                    .filter(Condition::IsNull(Value::field(alias, &f.name)))
                    .limit(sample_row_count),
            )
        })
        .collect();

    Ok(LogicalPlan {
        ingest,
        ..Default::default()
    })
}

/// `SHOW TABLES` / `SHOW SCHEMAS`, optionally narrowed to one dataset
pub fn plan_show(kind: ShowKind, dataset: Option<&DatasetDefinition>) -> LogicalPlan {
    LogicalPlan {
        ingest: vec![Operation::Show(Show {
            kind,
            dataset: dataset.cloned(),
        })],
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DataType, SchemaDefinition};
    use crate::ingest::{AppendOnly, NontemporalDelta, NontemporalSnapshot};
    use chrono::NaiveDate;

    fn options() -> PlannerOptions {
        let ts = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        PlannerOptions::new(ts)
    }

    fn datasets(extra_staging: Option<Field>) -> Datasets {
        let mut fields = vec![
            Field::new("id", DataType::Integer).primary_key(),
            Field::new("digest", DataType::Varchar(None)),
        ];
        let main = DatasetDefinition::new("main", SchemaDefinition::new(fields.clone()).unwrap());
        fields.extend(extra_staging);
        let staging = DatasetDefinition::new("staging", SchemaDefinition::new(fields).unwrap());
        Datasets::of(main, staging)
    }

    #[test]
    fn test_empty_ranges_plan_nothing() {
        let mode = IngestMode::NontemporalSnapshot(NontemporalSnapshot::default());
        let plans = plan_with_data_splits(&datasets(None), &mode, &options(), &[]).unwrap();
        assert!(plans.is_empty());
    }

    #[test]
    fn test_snapshot_rejects_data_splits() {
        let mode = IngestMode::NontemporalSnapshot(NontemporalSnapshot::default());
        let range = DataSplitRange::new(1, 2).unwrap();
        let err = plan_with_data_splits(&datasets(None), &mode, &options(), &[range]).unwrap_err();
        assert_eq!(err.to_string(), "DataSplits not supported for NontemporalSnapshot mode");
    }

    #[test]
    fn test_data_splits_need_split_field() {
        let mode = IngestMode::NontemporalDelta(
            NontemporalDelta::builder().digest_field("digest").build().unwrap(),
        );
        let range = DataSplitRange::new(1, 2).unwrap();
        let err = plan_with_data_splits(&datasets(None), &mode, &options(), &[range]).unwrap_err();
        assert_eq!(err, PlanError::MissingDataSplitField);
    }

    #[test]
    fn test_new_staging_field_requires_schema_evolution() {
        let ds = datasets(Some(Field::new("note", DataType::Varchar(None)).not_null()));
        let mode = IngestMode::AppendOnly(AppendOnly::builder().build().unwrap());

        let err = plan(&ds, &mode, &options()).unwrap_err();
        assert_eq!(err.to_string(), "Field [note] not found in main dataset");

        let mut opts = options();
        opts.enable_schema_evolution = true;
        let plan = plan(&ds, &mode, &opts).unwrap();
        let added = plan.pre_actions.iter().find_map(|op| match op {
            Operation::Alter(Alter { kind: AlterKind::AddColumn(field), .. }) => Some(field),
            _ => None,
        });
        assert!(added.is_some_and(|f| f.name == "note" && f.nullable));
    }

    #[test]
    fn test_cleanup_truncates_when_staging_not_created() {
        let mode = IngestMode::AppendOnly(AppendOnly::builder().build().unwrap());
        let mut opts = options();
        opts.create_staging_dataset = false;
        let plan = plan(&datasets(None), &mode, &opts).unwrap();
        assert_eq!(plan.pre_actions.len(), 2);
        assert!(matches!(plan.post_actions.as_slice(), [Operation::Truncate(_)]));
    }

    #[test]
    fn test_show_plan() {
        let plan = plan_show(ShowKind::Schemas, None);
        assert!(matches!(
            plan.ingest.as_slice(),
            [Operation::Show(Show { kind: ShowKind::Schemas, dataset: None })]
        ));
    }
}
