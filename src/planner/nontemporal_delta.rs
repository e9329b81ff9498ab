//! Non-temporal delta ingest

use crate::ingest::NontemporalDelta;
use crate::plan::{Condition, Merge, Operation, Value};

use super::context::PlanContext;
use super::error::PlanError;

/// One merge keyed on the primary key, updating rows whose digest changed.
///
/// With a delete indicator, flagged staging rows delete their match and
/// are never inserted.
pub(super) fn plan_ingest(ctx: &PlanContext, mode: &NontemporalDelta) -> Result<Vec<Operation>, PlanError> {
    let on = ctx.primary_key_match().ok_or(PlanError::EmptyPrimaryKeys)?;
    let digest = &mode.digest_field;

    let (delete_condition, unmatched_condition) = match &mode.delete_indicator {
        Some(indicator) => {
            let flag = ctx.staging_field(&indicator.field);
            let values: Vec<Value> = indicator.values.iter().map(|v| Value::string(v.clone())).collect();
            (
                Some(Condition::In(flag.clone(), values.clone())),
                Some(Condition::NotIn(flag, values)),
            )
        }
        None => (None, None),
    };

    Ok(vec![Operation::Merge(Merge {
        target: ctx.main.clone(),
        source: ctx.staging_source(),
        on,
        matched_condition: Some(Condition::NotEquals(
            ctx.main_field(digest),
            ctx.staging_field(digest),
        )),
        matched_pairs: ctx.update_pairs(),
        unmatched_fields: ctx.insert_fields(),
        unmatched_values: ctx.insert_values(),
        unmatched_condition,
        delete_condition,
    })])
}
