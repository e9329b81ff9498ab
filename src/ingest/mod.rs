//! Ingest strategies (noun module)
//!
//! Auditing, deduplication and ingest-mode descriptions plus data-split ranges.

mod auditing;
mod deduplication;
mod mode;
mod split;

pub use auditing::{AuditingStrategy, DateTimeAuditing, DateTimeAuditingBuilder};
pub use deduplication::DeduplicationStrategy;
pub use mode::{
    AppendOnly, AppendOnlyBuilder, DeleteIndicator, IngestMode, NontemporalDelta,
    NontemporalDeltaBuilder, NontemporalSnapshot,
};
pub use split::DataSplitRange;
