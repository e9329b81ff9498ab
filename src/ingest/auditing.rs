//! Auditing strategies

use crate::error::BuildError;

/// Policy for stamping ingested rows with the batch time
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuditingStrategy {
    #[default]
    NoAuditing,
    DateTimeAuditing(DateTimeAuditing),
}

impl AuditingStrategy {
    /// Name of the audit column, if any
    pub fn date_time_field(&self) -> Option<&str> {
        match self {
            AuditingStrategy::NoAuditing => None,
            AuditingStrategy::DateTimeAuditing(auditing) => Some(&auditing.date_time_field),
        }
    }
}

/// Writes the batch start timestamp into `date_time_field` of every ingested row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeAuditing {
    pub date_time_field: String,
}

impl DateTimeAuditing {
    pub fn builder() -> DateTimeAuditingBuilder {
        DateTimeAuditingBuilder::default()
    }
}

impl From<DateTimeAuditing> for AuditingStrategy {
    fn from(auditing: DateTimeAuditing) -> Self {
        AuditingStrategy::DateTimeAuditing(auditing)
    }
}

#[derive(Debug, Default)]
pub struct DateTimeAuditingBuilder {
    date_time_field: Option<String>,
}

impl DateTimeAuditingBuilder {
    pub fn date_time_field(mut self, field: impl Into<String>) -> Self {
        self.date_time_field = Some(field.into());
        self
    }

    pub fn build(self) -> Result<DateTimeAuditing, BuildError> {
        let date_time_field = self
            .date_time_field
            .ok_or_else(|| BuildError::missing("DateTimeAuditing", vec!["dateTimeField"]))?;
        Ok(DateTimeAuditing { date_time_field })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_without_field_fails() {
        let err = DateTimeAuditing::builder().build().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot build DateTimeAuditing, some of required attributes are not set [dateTimeField]"
        );
    }

    #[test]
    fn test_date_time_field() {
        let strategy: AuditingStrategy = DateTimeAuditing::builder()
            .date_time_field("batch_update_time")
            .build()
            .unwrap()
            .into();
        assert_eq!(strategy.date_time_field(), Some("batch_update_time"));
        assert_eq!(AuditingStrategy::NoAuditing.date_time_field(), None);
    }
}
