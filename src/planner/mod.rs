//! Ingest planner (verb module)
//!
//! Turns datasets and an ingest mode into a phased
//! [`LogicalPlan`](crate::plan::LogicalPlan).

mod append_only;
mod build;
mod context;
mod error;
mod metadata;
mod nontemporal_delta;
mod nontemporal_snapshot;
mod statistics;

pub use build::{
    plan, plan_data_split, plan_dry_run, plan_show, plan_with_data_splits, PlannerOptions,
};
pub use error::PlanError;
pub use metadata::{metadata_dataset, METADATA_TABLE};
