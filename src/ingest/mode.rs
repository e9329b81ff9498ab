//! Ingest modes
//!
//! Modes are plain data. How each one maps to operations is decided by the
//! planner.

use super::auditing::AuditingStrategy;
use super::deduplication::DeduplicationStrategy;
use crate::error::BuildError;

/// How staging rows are moved into the main dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestMode {
    AppendOnly(AppendOnly),
    NontemporalDelta(NontemporalDelta),
    NontemporalSnapshot(NontemporalSnapshot),
}

impl IngestMode {
    pub fn name(&self) -> &'static str {
        match self {
            IngestMode::AppendOnly(_) => "AppendOnly",
            IngestMode::NontemporalDelta(_) => "NontemporalDelta",
            IngestMode::NontemporalSnapshot(_) => "NontemporalSnapshot",
        }
    }

    pub fn auditing_strategy(&self) -> &AuditingStrategy {
        match self {
            IngestMode::AppendOnly(m) => &m.auditing_strategy,
            IngestMode::NontemporalDelta(m) => &m.auditing_strategy,
            IngestMode::NontemporalSnapshot(m) => &m.auditing_strategy,
        }
    }

    pub fn digest_field(&self) -> Option<&str> {
        match self {
            IngestMode::AppendOnly(m) => m.digest_field.as_deref(),
            IngestMode::NontemporalDelta(m) => Some(&m.digest_field),
            IngestMode::NontemporalSnapshot(_) => None,
        }
    }

    pub fn data_split_field(&self) -> Option<&str> {
        match self {
            IngestMode::AppendOnly(m) => m.data_split_field.as_deref(),
            IngestMode::NontemporalDelta(m) => m.data_split_field.as_deref(),
            IngestMode::NontemporalSnapshot(_) => None,
        }
    }

    pub fn delete_indicator(&self) -> Option<&DeleteIndicator> {
        match self {
            IngestMode::NontemporalDelta(m) => m.delete_indicator.as_ref(),
            _ => None,
        }
    }
}

/// Insert every staging row, optionally deduplicated and audited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendOnly {
    pub digest_field: Option<String>,
    pub deduplication_strategy: DeduplicationStrategy,
    pub auditing_strategy: AuditingStrategy,
    pub data_split_field: Option<String>,
}

impl AppendOnly {
    pub fn builder() -> AppendOnlyBuilder {
        AppendOnlyBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct AppendOnlyBuilder {
    digest_field: Option<String>,
    deduplication_strategy: DeduplicationStrategy,
    auditing_strategy: AuditingStrategy,
    data_split_field: Option<String>,
}

impl AppendOnlyBuilder {
    pub fn digest_field(mut self, field: impl Into<String>) -> Self {
        self.digest_field = Some(field.into());
        self
    }

    pub fn deduplication_strategy(mut self, strategy: DeduplicationStrategy) -> Self {
        self.deduplication_strategy = strategy;
        self
    }

    pub fn auditing_strategy(mut self, strategy: impl Into<AuditingStrategy>) -> Self {
        self.auditing_strategy = strategy.into();
        self
    }

    pub fn data_split_field(mut self, field: impl Into<String>) -> Self {
        self.data_split_field = Some(field.into());
        self
    }

    pub fn build(self) -> Result<AppendOnly, BuildError> {
        Ok(AppendOnly {
            digest_field: self.digest_field,
            deduplication_strategy: self.deduplication_strategy,
            auditing_strategy: self.auditing_strategy,
            data_split_field: self.data_split_field,
        })
    }
}

/// Staging rows flagged with one of `values` in `field` are deleted from main
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteIndicator {
    pub field: String,
    pub values: Vec<String>,
}

/// Merge staging into main by primary key, updating rows whose digest changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NontemporalDelta {
    pub digest_field: String,
    pub auditing_strategy: AuditingStrategy,
    pub delete_indicator: Option<DeleteIndicator>,
    pub data_split_field: Option<String>,
}

impl NontemporalDelta {
    pub fn builder() -> NontemporalDeltaBuilder {
        NontemporalDeltaBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct NontemporalDeltaBuilder {
    digest_field: Option<String>,
    auditing_strategy: AuditingStrategy,
    delete_indicator_field: Option<String>,
    delete_indicator_values: Vec<String>,
    data_split_field: Option<String>,
}

impl NontemporalDeltaBuilder {
    pub fn digest_field(mut self, field: impl Into<String>) -> Self {
        self.digest_field = Some(field.into());
        self
    }

    pub fn auditing_strategy(mut self, strategy: impl Into<AuditingStrategy>) -> Self {
        self.auditing_strategy = strategy.into();
        self
    }

    pub fn delete_indicator_field(mut self, field: impl Into<String>) -> Self {
        self.delete_indicator_field = Some(field.into());
        self
    }

    pub fn delete_indicator_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.delete_indicator_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn data_split_field(mut self, field: impl Into<String>) -> Self {
        self.data_split_field = Some(field.into());
        self
    }

    pub fn build(self) -> Result<NontemporalDelta, BuildError> {
        let mut missing = Vec::new();
        if self.digest_field.is_none() {
            missing.push("digestField");
        }
        if self.delete_indicator_field.is_some() && self.delete_indicator_values.is_empty() {
            missing.push("deleteIndicatorValues");
        }
        let Some(digest_field) = self.digest_field else {
            return Err(BuildError::missing("NontemporalDelta", missing));
        };
        if !missing.is_empty() {
            return Err(BuildError::missing("NontemporalDelta", missing));
        }

        let delete_indicator = self.delete_indicator_field.map(|field| DeleteIndicator {
            field,
            values: self.delete_indicator_values,
        });

        Ok(NontemporalDelta {
            digest_field,
            auditing_strategy: self.auditing_strategy,
            delete_indicator,
            data_split_field: self.data_split_field,
        })
    }
}

/// Replace main with the contents of staging
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NontemporalSnapshot {
    pub auditing_strategy: AuditingStrategy,
}

impl NontemporalSnapshot {
    pub fn new(auditing_strategy: impl Into<AuditingStrategy>) -> Self {
        Self {
            auditing_strategy: auditing_strategy.into(),
        }
    }
}

impl From<AppendOnly> for IngestMode {
    fn from(mode: AppendOnly) -> Self {
        IngestMode::AppendOnly(mode)
    }
}

impl From<NontemporalDelta> for IngestMode {
    fn from(mode: NontemporalDelta) -> Self {
        IngestMode::NontemporalDelta(mode)
    }
}

impl From<NontemporalSnapshot> for IngestMode {
    fn from(mode: NontemporalSnapshot) -> Self {
        IngestMode::NontemporalSnapshot(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::DateTimeAuditing;

    #[test]
    fn test_delta_requires_digest() {
        let err = NontemporalDelta::builder().build().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot build NontemporalDelta, some of required attributes are not set [digestField]"
        );
    }

    #[test]
    fn test_delete_indicator_requires_values() {
        let err = NontemporalDelta::builder()
            .delete_indicator_field("delete_indicator")
            .build()
            .unwrap_err();
        assert!(err.to_string().ends_with("[digestField, deleteIndicatorValues]"));

        let err = NontemporalDelta::builder()
            .digest_field("digest")
            .delete_indicator_field("delete_indicator")
            .build()
            .unwrap_err();
        assert!(err.to_string().ends_with("[deleteIndicatorValues]"));
    }

    #[test]
    fn test_delta_with_delete_indicator() {
        let mode = NontemporalDelta::builder()
            .digest_field("digest")
            .delete_indicator_field("delete_indicator")
            .delete_indicator_values(["yes", "1", "true"])
            .build()
            .unwrap();
        let mode = IngestMode::from(mode);
        let indicator = mode.delete_indicator().unwrap();
        assert_eq!(indicator.values, vec!["yes", "1", "true"]);
        assert_eq!(mode.digest_field(), Some("digest"));
    }

    #[test]
    fn test_append_only_defaults() {
        let mode = AppendOnly::builder().build().unwrap();
        assert_eq!(mode.deduplication_strategy, DeduplicationStrategy::AllowDuplicates);
        assert_eq!(mode.auditing_strategy, AuditingStrategy::NoAuditing);
    }

    #[test]
    fn test_mode_accessors() {
        let auditing = DateTimeAuditing::builder().date_time_field("batch_update_time").build().unwrap();
        let mode = IngestMode::from(NontemporalSnapshot::new(auditing));
        assert_eq!(mode.name(), "NontemporalSnapshot");
        assert_eq!(mode.auditing_strategy().date_time_field(), Some("batch_update_time"));
        assert_eq!(mode.data_split_field(), None);
        assert_eq!(mode.digest_field(), None);
    }
}
