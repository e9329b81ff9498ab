//! Non-temporal snapshot ingest

use crate::plan::{Condition, Delete, Merge, Operation, Selection};

use super::context::PlanContext;
use super::error::PlanError;

/// Delete main rows absent from staging, then merge staging in without a
/// change check
pub(super) fn plan_ingest(ctx: &PlanContext) -> Result<Vec<Operation>, PlanError> {
    let on = ctx.primary_key_match().ok_or(PlanError::EmptyPrimaryKeys)?;

    let absent_from_staging =
        Condition::exists(Selection::all_from(ctx.staging.clone()).filter(on.clone())).negate();

    Ok(vec![
        Operation::Delete(Delete {
            dataset: ctx.main.clone(),
            condition: Some(absent_from_staging),
        }),
        Operation::Merge(Merge {
            target: ctx.main.clone(),
            source: ctx.staging.clone(),
            on,
            matched_condition: None,
            matched_pairs: ctx.update_pairs(),
            unmatched_fields: ctx.insert_fields(),
            unmatched_values: ctx.insert_values(),
            unmatched_condition: None,
            delete_condition: None,
        }),
    ])
}
