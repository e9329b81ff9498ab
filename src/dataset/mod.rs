//! Dataset model (noun module)
//!
//! Typed description of tables, their fields, and the views an ingest run
//! can read from.

mod dataset;
mod schema;
mod types;

pub use dataset::{
    Dataset, DatasetDefinition, DatasetFilter, Datasets, DatasetsBuilder, DerivedDataset,
    FilterOperator, FilterValue, FilteredDataset,
};
pub use schema::{Field, SchemaDefinition};
pub use types::{DataType, ParseDataTypeError};
