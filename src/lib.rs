//! relingest - Compile declarative ingestion modes into dialect-specific SQL
//!
//! This library provides:
//! - Dataset and schema definition types (DatasetDefinition, Field, DataType)
//! - Ingest mode descriptions (AppendOnly, NontemporalDelta, NontemporalSnapshot)
//! - Logical planning of an ingest run into phased operations
//! - Lowering of logical plans into a SQL-DOM per dialect (ANSI, H2, MemSQL, Snowflake)
//! - SQL rendering and result packaging
//! - YAML configuration parsing
//!
//! # Architecture
//!
//! **Noun modules** (data structures):
//! - `dataset/` - tables, fields and the main/staging pairing
//! - `ingest/` - ingest modes, auditing and deduplication strategies, data splits
//! - `plan/` - logical plan types (Operation, Condition, Value, LogicalPlan)
//! - `sqldom/` - renderable SQL statements (Statement, SqlCondition, SqlValue)
//!
//! **Verb modules** (transformations):
//! - `parser/` - YAML → IngestSpec
//! - `planner/` - Datasets + IngestMode → LogicalPlan
//! - `sink/` - per-dialect lowering rules
//! - `transformer/` - LogicalPlan + sink → SQL-DOM → SQL text
//! - `generator/` - the whole pipeline behind one builder
//!
//! # Example
//!
//! ```ignore
//! use relingest::{Datasets, H2Sink, NontemporalDelta, RelationalGenerator};
//!
//! let mode = NontemporalDelta::builder().digest_field("digest").build()?;
//! let generator = RelationalGenerator::builder()
//!     .ingest_mode(mode)
//!     .relational_sink(H2Sink)
//!     .build()?;
//! let result = generator.generate_operations(&Datasets::of(main, staging))?;
//! for sql in result.all_sql() {
//!     println!("{sql};");
//! }
//! ```

pub mod dataset;
pub mod ingest;
pub mod plan;
pub mod sqldom;
pub mod planner;
pub mod sink;
pub mod transformer;
pub mod generator;
pub mod executor;
pub mod parser;
pub mod error;

// Re-export commonly used types
pub use dataset::{DataType, Dataset, DatasetDefinition, Datasets, DerivedDataset, Field, SchemaDefinition};
pub use ingest::{
    AppendOnly, AuditingStrategy, DataSplitRange, DateTimeAuditing, DeduplicationStrategy,
    IngestMode, NontemporalDelta, NontemporalSnapshot,
};
pub use plan::{LogicalPlan, ShowKind, StatisticName};
pub use planner::{plan, plan_with_data_splits, PlanError, PlannerOptions};
pub use sink::{AnsiSink, Capability, CaseConversion, H2Sink, MemSqlSink, RelationalSink, SnowflakeSink};
pub use transformer::{TransformError, Transformer};
pub use generator::{
    Clock, FixedClock, GeneratorResult, IncrementalClock, RelationalGenerator, SystemClock,
};
pub use executor::{Executor, SqlPlan, TabularData};
pub use parser::{IngestSpec, GeneratorOptions};
pub use error::{BuildError, Error, ParseError, Result};
