//! Planner errors

use crate::error::BuildError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// Merge-based modes key on the primary key
    #[error("Primary key list must not be empty")]
    EmptyPrimaryKeys,
    #[error("Field [{field}] not found in {dataset} dataset")]
    FieldNotFound {
        field: String,
        dataset: &'static str,
    },
    #[error("DataSplits not supported for {0} mode")]
    DataSplitsNotSupported(&'static str),
    #[error("Data split field must be specified when data split ranges are supplied")]
    MissingDataSplitField,
    #[error("cleanupStagingData cannot be turned on when using DerivedDataset or FilteredDataset")]
    CleanupOnDerivedStaging,
    #[error("Staging dataset must be a table, derived or filtered dataset")]
    UnsupportedStaging,
    #[error(transparent)]
    Build(#[from] BuildError),
}
