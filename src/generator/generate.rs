//! The relational generator entry point

use std::sync::Arc;

use crate::dataset::{DatasetDefinition, Datasets};
use crate::error::{BuildError, Result};
use crate::ingest::{DataSplitRange, IngestMode};
use crate::plan::{LogicalPlan, ShowKind};
use crate::planner::{self, PlannerOptions};
use crate::sink::{CaseConversion, Capability, RelationalSink};
use crate::transformer::{TransformError, Transformer};

use super::clock::{Clock, SystemClock};
use super::result::GeneratorResult;

const DEFAULT_SAMPLE_ROW_COUNT: u64 = 20;

/// Plans an ingest mode and renders it for one sink.
///
/// A generator is immutable once built and can be reused for any number of
/// dataset pairs. Each batch reads the clock once; a split run is one
/// batch per range.
#[derive(Debug, Clone)]
pub struct RelationalGenerator {
    ingest_mode: IngestMode,
    sink: Arc<dyn RelationalSink>,
    clock: Arc<dyn Clock>,
    collect_statistics: bool,
    cleanup_staging_data: bool,
    create_staging_dataset: bool,
    enable_schema_evolution: bool,
    case_conversion: CaseConversion,
    sample_row_count: u64,
}

impl RelationalGenerator {
    pub fn builder() -> RelationalGeneratorBuilder {
        RelationalGeneratorBuilder::default()
    }

    pub fn ingest_mode(&self) -> &IngestMode {
        &self.ingest_mode
    }

    pub fn sink(&self) -> &dyn RelationalSink {
        self.sink.as_ref()
    }

    /// SQL for one ingest run over the whole staging dataset
    pub fn generate_operations(&self, datasets: &Datasets) -> Result<GeneratorResult> {
        self.validate(datasets)?;
        let plan = planner::plan(datasets, &self.ingest_mode, &self.planner_options())?;
        self.render(&plan, None)
    }

    /// SQL per data split range, in range order.
    ///
    /// Every range is a separate batch and reads the clock once.
    pub fn generate_operations_with_data_splits(
        &self,
        datasets: &Datasets,
        ranges: &[DataSplitRange],
    ) -> Result<Vec<GeneratorResult>> {
        self.validate(datasets)?;
        tracing::debug!(
            target: "relingest::generator",
            mode = self.ingest_mode.name(),
            splits = ranges.len(),
            "generating data splits"
        );
        ranges
            .iter()
            .map(|range| {
                let plan = planner::plan_data_split(
                    datasets,
                    &self.ingest_mode,
                    &self.planner_options(),
                    range,
                )?;
                self.render(&plan, Some(*range))
            })
            .collect()
    }

    /// Queries sampling staging rows that would fail the load
    pub fn generate_dry_run(&self, datasets: &Datasets) -> Result<GeneratorResult> {
        if !self.sink.supports(Capability::DryRun) {
            return Err(TransformError::Unsupported("DryRun").into());
        }
        let plan = planner::plan_dry_run(datasets, self.sample_row_count)?;
        self.render(&plan, None)
    }

    /// Bulk loading from files is not planned by any sink
    pub fn generate_bulk_load(&self, _datasets: &Datasets) -> Result<GeneratorResult> {
        Err(TransformError::Unsupported("Bulk Load").into())
    }

    pub fn generate_show(
        &self,
        kind: ShowKind,
        dataset: Option<&DatasetDefinition>,
    ) -> Result<GeneratorResult> {
        self.render(&planner::plan_show(kind, dataset), None)
    }

    fn planner_options(&self) -> PlannerOptions {
        let batch_start = self.clock.now().naive_utc();
        PlannerOptions {
            cleanup_staging_data: self.cleanup_staging_data,
            create_staging_dataset: self.create_staging_dataset,
            collect_statistics: self.collect_statistics,
            enable_schema_evolution: self.enable_schema_evolution,
            ..PlannerOptions::new(batch_start)
        }
        .with_capabilities(self.sink.capabilities())
    }

    /// Checks that depend on the sink rather than on the mode
    fn validate(&self, datasets: &Datasets) -> Result<(), TransformError> {
        if self.enable_schema_evolution && !self.sink.supports(Capability::AddColumn) {
            return Err(TransformError::MissingCapability {
                capability: Capability::AddColumn,
                sink: self.sink.name(),
            });
        }

        let Some(staging) = datasets.staging().schema() else {
            return Ok(());
        };
        let main = &datasets.main().schema;
        for field in staging.fields() {
            let Some(target) = main.field(&field.name) else {
                continue;
            };
            if !self.sink.is_type_compatible(&field.data_type, &target.data_type) {
                return Err(TransformError::IncompatibleType {
                    field: field.name.clone(),
                    staging_type: field.data_type.to_string(),
                    main_type: target.data_type.to_string(),
                });
            }
        }
        Ok(())
    }

    fn render(&self, plan: &LogicalPlan, data_split: Option<DataSplitRange>) -> Result<GeneratorResult> {
        tracing::debug!(
            target: "relingest::generator",
            sink = self.sink.name(),
            mode = self.ingest_mode.name(),
            operations = plan.operation_count(),
            "generating sql"
        );
        let rendered = Transformer::new(self.sink.as_ref(), self.case_conversion).transform_and_render(plan)?;
        Ok(GeneratorResult::new(rendered, data_split))
    }
}

/// Builder for [`RelationalGenerator`]; `ingest_mode` and `relational_sink`
/// are required
#[derive(Debug, Default)]
pub struct RelationalGeneratorBuilder {
    ingest_mode: Option<IngestMode>,
    sink: Option<Arc<dyn RelationalSink>>,
    clock: Option<Arc<dyn Clock>>,
    collect_statistics: bool,
    cleanup_staging_data: Option<bool>,
    create_staging_dataset: Option<bool>,
    enable_schema_evolution: bool,
    case_conversion: CaseConversion,
    sample_row_count: Option<u64>,
}

impl RelationalGeneratorBuilder {
    pub fn ingest_mode(mut self, mode: impl Into<IngestMode>) -> Self {
        self.ingest_mode = Some(mode.into());
        self
    }

    pub fn relational_sink(mut self, sink: impl RelationalSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    pub fn shared_sink(mut self, sink: Arc<dyn RelationalSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn execution_timestamp_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn collect_statistics(mut self, collect: bool) -> Self {
        self.collect_statistics = collect;
        self
    }

    pub fn cleanup_staging_data(mut self, cleanup: bool) -> Self {
        self.cleanup_staging_data = Some(cleanup);
        self
    }

    pub fn create_staging_dataset(mut self, create: bool) -> Self {
        self.create_staging_dataset = Some(create);
        self
    }

    pub fn enable_schema_evolution(mut self, enable: bool) -> Self {
        self.enable_schema_evolution = enable;
        self
    }

    pub fn case_conversion(mut self, conversion: CaseConversion) -> Self {
        self.case_conversion = conversion;
        self
    }

    pub fn sample_row_count(mut self, count: u64) -> Self {
        self.sample_row_count = Some(count);
        self
    }

    pub fn build(self) -> Result<RelationalGenerator, BuildError> {
        let mut missing = Vec::new();
        if self.ingest_mode.is_none() {
            missing.push("ingestMode");
        }
        if self.sink.is_none() {
            missing.push("relationalSink");
        }
        let (Some(ingest_mode), Some(sink)) = (self.ingest_mode, self.sink) else {
            return Err(BuildError::missing("RelationalGenerator", missing));
        };

        Ok(RelationalGenerator {
            ingest_mode,
            sink,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            collect_statistics: self.collect_statistics,
            cleanup_staging_data: self.cleanup_staging_data.unwrap_or(true),
            create_staging_dataset: self.create_staging_dataset.unwrap_or(true),
            enable_schema_evolution: self.enable_schema_evolution,
            case_conversion: self.case_conversion,
            sample_row_count: self.sample_row_count.unwrap_or(DEFAULT_SAMPLE_ROW_COUNT),
        })
    }
}
