//! Deduplication strategies

use serde::{Deserialize, Serialize};

/// Policy for staging rows that duplicate each other or rows already in main
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeduplicationStrategy {
    /// Ingest every staging row as is
    #[default]
    AllowDuplicates,
    /// Emit checks that must return zero before the load proceeds
    FailOnDuplicates,
    /// Skip rows that are already present
    FilterDuplicates,
}
