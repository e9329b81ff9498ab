//! Resolved inputs shared by the per-mode planners

use chrono::NaiveDateTime;

use crate::dataset::{
    DataType, Dataset, DatasetDefinition, DerivedDataset, Field, FilteredDataset, SchemaDefinition,
};
use crate::ingest::{AuditingStrategy, DataSplitRange, IngestMode};
use crate::plan::{Condition, Pair, FieldValue, Selection, Value};

use super::error::PlanError;

pub const MAIN_ALIAS: &str = "sink";
pub const STAGING_ALIAS: &str = "stage";

/// Everything a mode planner needs, validated once up front
#[derive(Debug, Clone)]
pub struct PlanContext {
    /// Main dataset, aliased and enriched with the audit field
    pub main: DatasetDefinition,
    pub staging: Dataset,
    /// Staging fields that are copied into main
    pub data_fields: Vec<Field>,
    /// Keys shared by main and staging, in staging order
    pub primary_keys: Vec<String>,
    pub digest_field: Option<String>,
    pub audit_field: Option<String>,
    pub batch_start: NaiveDateTime,
    pub data_split: Option<(String, DataSplitRange)>,
}

impl PlanContext {
    pub fn new(
        main: &DatasetDefinition,
        staging: &Dataset,
        mode: &IngestMode,
        batch_start: NaiveDateTime,
        data_split: Option<&DataSplitRange>,
    ) -> Result<Self, PlanError> {
        let staging_schema = staging.schema().ok_or(PlanError::UnsupportedStaging)?;
        let main = default_alias(main, MAIN_ALIAS);
        let staging = aliased(staging, STAGING_ALIAS);

        let split_field = mode.data_split_field();
        let delete_field = mode.delete_indicator().map(|d| d.field.as_str());
        let audit_field = mode.auditing_strategy().date_time_field();

        for field in [split_field, delete_field].into_iter().flatten() {
            require(staging_schema, field, "staging")?;
        }
        if let Some(digest) = mode.digest_field() {
            require(&main.schema, digest, "main")?;
            require(staging_schema, digest, "staging")?;
        }

        let primary_keys: Vec<String> = staging_schema
            .primary_keys()
            .into_iter()
            .filter(|f| main.schema.field(&f.name).is_some_and(|m| m.primary_key))
            .map(|f| f.name.clone())
            .collect();

        let data_fields: Vec<Field> = staging_schema
            .fields()
            .iter()
            .filter(|f| {
                Some(f.name.as_str()) != split_field
                    && Some(f.name.as_str()) != delete_field
                    && Some(f.name.as_str()) != audit_field
            })
            .cloned()
            .collect();

        let main = enrich_with_audit_field(&main, mode)?;

        Ok(Self {
            main,
            staging,
            data_fields,
            primary_keys,
            digest_field: mode.digest_field().map(str::to_string),
            audit_field: audit_field.map(str::to_string),
            batch_start,
            data_split: split_field
                .zip(data_split)
                .map(|(field, range)| (field.to_string(), *range)),
        })
    }

    pub fn main_alias(&self) -> &str {
        self.main.alias.as_deref().unwrap_or(MAIN_ALIAS)
    }

    pub fn staging_alias(&self) -> &str {
        self.staging.alias().unwrap_or(STAGING_ALIAS)
    }

    pub fn main_field(&self, name: &str) -> Value {
        Value::field(self.main_alias(), name)
    }

    pub fn staging_field(&self, name: &str) -> Value {
        Value::field(self.staging_alias(), name)
    }

    pub fn batch_start_value(&self) -> Value {
        Value::DateTime(self.batch_start)
    }

    /// `sink.f = stage.f` for every primary key
    pub fn primary_key_match(&self) -> Option<Condition> {
        let eqs = self.equalities(self.primary_keys.iter().map(String::as_str));
        (!eqs.is_empty()).then(|| Condition::all(eqs))
    }

    pub fn digest_match(&self) -> Option<Condition> {
        self.digest_field
            .as_deref()
            .map(|d| Condition::Equals(self.main_field(d), self.staging_field(d)))
    }

    /// Primary key and digest equality, falling back to every data field
    pub fn row_match(&self) -> Condition {
        let parts: Vec<Condition> = [self.primary_key_match(), self.digest_match()]
            .into_iter()
            .flatten()
            .collect();
        if parts.is_empty() {
            Condition::all(self.equalities(self.data_fields.iter().map(|f| f.name.as_str())))
        } else {
            Condition::all(parts)
        }
    }

    fn equalities<'a>(&self, names: impl Iterator<Item = &'a str>) -> Vec<Condition> {
        names
            .map(|n| Condition::Equals(self.main_field(n), self.staging_field(n)))
            .collect()
    }

    /// `(stage.split >= lower) AND (stage.split <= upper)`
    pub fn data_split_filter(&self) -> Option<Condition> {
        self.data_split.as_ref().map(|(field, range)| {
            Condition::And(vec![
                Condition::GreaterThanEqualTo(self.staging_field(field), Value::Integer(range.lower())),
                Condition::LessThanEqualTo(self.staging_field(field), Value::Integer(range.upper())),
            ])
        })
    }

    /// Staging as a merge source: the dataset itself, or an aliased
    /// sub-select when a data split applies
    pub fn staging_source(&self) -> Dataset {
        match self.data_split_filter() {
            Some(filter) => Selection::all_from(self.staging.clone())
                .filter(filter)
                .with_alias(self.staging_alias())
                .into(),
            None => self.staging.clone(),
        }
    }

    /// Target column names of an insert, data fields then the audit field
    pub fn insert_fields(&self) -> Vec<String> {
        self.data_fields
            .iter()
            .map(|f| f.name.clone())
            .chain(self.audit_field.clone())
            .collect()
    }

    /// Staging values matching [`insert_fields`](Self::insert_fields)
    pub fn insert_values(&self) -> Vec<Value> {
        self.data_fields
            .iter()
            .map(|f| self.staging_field(&f.name))
            .chain(self.audit_field.as_ref().map(|_| self.batch_start_value()))
            .collect()
    }

    /// `sink.f = stage.f` for every data field, plus the audit stamp
    pub fn update_pairs(&self) -> Vec<Pair> {
        self.insert_fields()
            .into_iter()
            .zip(self.insert_values())
            .map(|(name, value)| Pair::new(FieldValue::new(self.main_alias(), name), value))
            .collect()
    }
}

fn require(schema: &SchemaDefinition, field: &str, dataset: &'static str) -> Result<(), PlanError> {
    if schema.contains(field) {
        Ok(())
    } else {
        Err(PlanError::FieldNotFound {
            field: field.to_string(),
            dataset,
        })
    }
}

fn default_alias(dataset: &DatasetDefinition, alias: &str) -> DatasetDefinition {
    match dataset.alias {
        Some(_) => dataset.clone(),
        None => dataset.clone().with_alias(alias),
    }
}

pub(super) fn aliased(dataset: &Dataset, alias: &str) -> Dataset {
    match dataset {
        Dataset::Definition(def) => default_alias(def, alias).into(),
        Dataset::Derived(derived) => DerivedDataset {
            base: default_alias(&derived.base, alias),
            filters: derived.filters.clone(),
        }
        .into(),
        Dataset::Filtered(filtered) => FilteredDataset {
            base: default_alias(&filtered.base, alias),
            condition: filtered.condition.clone(),
        }
        .into(),
        Dataset::Selection(selection) => match selection.alias {
            Some(_) => dataset.clone(),
            None => (**selection).clone().with_alias(alias).into(),
        },
    }
}

/// Add the audit column to main when it is missing.
///
/// Append-only rows are never updated, so the stamp joins the primary key
/// there; merge modes overwrite it and keep it nullable.
fn enrich_with_audit_field(
    main: &DatasetDefinition,
    mode: &IngestMode,
) -> Result<DatasetDefinition, PlanError> {
    let AuditingStrategy::DateTimeAuditing(auditing) = mode.auditing_strategy() else {
        return Ok(main.clone());
    };
    if main.schema.contains(&auditing.date_time_field) {
        return Ok(main.clone());
    }

    let mut field = Field::new(auditing.date_time_field.clone(), DataType::DateTime);
    if let IngestMode::AppendOnly(_) = mode {
        field = if main.schema.primary_keys().is_empty() {
            field.not_null()
        } else {
            field.primary_key()
        };
    }
    Ok(main.with_schema(main.schema.with_field(field)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{AppendOnly, DateTimeAuditing, NontemporalDelta};
    use chrono::NaiveDate;

    fn batch_start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2000, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    fn schema(extra: &[&str]) -> SchemaDefinition {
        let mut fields = vec![
            Field::new("id", DataType::Integer).primary_key(),
            Field::new("amount", DataType::Double),
        ];
        fields.extend(extra.iter().map(|n| Field::new(*n, DataType::Varchar(None))));
        SchemaDefinition::new(fields).unwrap()
    }

    fn auditing() -> DateTimeAuditing {
        DateTimeAuditing::builder().date_time_field("batch_update_time").build().unwrap()
    }

    #[test]
    fn test_aliases_default_to_sink_and_stage() {
        let main = DatasetDefinition::new("main", schema(&[]));
        let staging: Dataset = DatasetDefinition::new("staging", schema(&[])).into();
        let mode = IngestMode::AppendOnly(AppendOnly::builder().build().unwrap());
        let ctx = PlanContext::new(&main, &staging, &mode, batch_start(), None).unwrap();
        assert_eq!(ctx.main_alias(), "sink");
        assert_eq!(ctx.staging_alias(), "stage");
        assert_eq!(ctx.primary_keys, vec!["id".to_string()]);
    }

    #[test]
    fn test_split_and_delete_fields_are_not_data() {
        let main = DatasetDefinition::new("main", schema(&["digest"]));
        let staging: Dataset =
            DatasetDefinition::new("staging", schema(&["digest", "flag", "split"])).into();
        let mode = IngestMode::NontemporalDelta(
            NontemporalDelta::builder()
                .digest_field("digest")
                .delete_indicator_field("flag")
                .delete_indicator_values(["Y"])
                .data_split_field("split")
                .build()
                .unwrap(),
        );
        let ctx = PlanContext::new(&main, &staging, &mode, batch_start(), None).unwrap();
        let names: Vec<&str> = ctx.data_fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "amount", "digest"]);
    }

    #[test]
    fn test_missing_digest_in_main() {
        let main = DatasetDefinition::new("main", schema(&[]));
        let staging: Dataset = DatasetDefinition::new("staging", schema(&["digest"])).into();
        let mode = IngestMode::NontemporalDelta(
            NontemporalDelta::builder().digest_field("digest").build().unwrap(),
        );
        let err = PlanContext::new(&main, &staging, &mode, batch_start(), None).unwrap_err();
        assert_eq!(err.to_string(), "Field [digest] not found in main dataset");
    }

    #[test]
    fn test_append_only_audit_field_joins_primary_key() {
        let main = DatasetDefinition::new("main", schema(&[]));
        let staging: Dataset = DatasetDefinition::new("staging", schema(&[])).into();
        let mode = IngestMode::AppendOnly(AppendOnly::builder().auditing_strategy(auditing()).build().unwrap());
        let ctx = PlanContext::new(&main, &staging, &mode, batch_start(), None).unwrap();
        let audit = ctx.main.schema.field("batch_update_time").unwrap();
        assert!(audit.primary_key);
        assert_eq!(ctx.insert_fields().last().map(String::as_str), Some("batch_update_time"));
    }

    #[test]
    fn test_delta_audit_field_is_nullable() {
        let main = DatasetDefinition::new("main", schema(&["digest"]));
        let staging: Dataset = DatasetDefinition::new("staging", schema(&["digest"])).into();
        let mode = IngestMode::NontemporalDelta(
            NontemporalDelta::builder()
                .digest_field("digest")
                .auditing_strategy(auditing())
                .build()
                .unwrap(),
        );
        let ctx = PlanContext::new(&main, &staging, &mode, batch_start(), None).unwrap();
        let audit = ctx.main.schema.field("batch_update_time").unwrap();
        assert!(!audit.primary_key && audit.nullable);
    }
}
