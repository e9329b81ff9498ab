//! Logical plan to SQL-DOM lowering

use std::collections::BTreeMap;

use crate::plan::{LogicalPlan, Operation, StatisticName};
use crate::sink::{CaseConversion, RelationalSink};
use crate::sqldom::{RenderContext, RenderError, Statement};

use super::error::TransformError;
use super::optimizer::CaseOptimizer;

/// A logical plan lowered for one sink, phase by phase
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SqlDomPlan {
    pub pre_actions: Vec<Statement>,
    pub initialize_load: Vec<Statement>,
    pub ingest: Vec<Statement>,
    pub post_actions: Vec<Statement>,
    pub metadata_ingest: Vec<Statement>,
    pub statistics: BTreeMap<StatisticName, Statement>,
}

/// SQL text of a [`SqlDomPlan`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedPlan {
    pub pre_actions: Vec<String>,
    pub initialize_load: Vec<String>,
    pub ingest: Vec<String>,
    pub post_actions: Vec<String>,
    pub metadata_ingest: Vec<String>,
    pub statistics: BTreeMap<StatisticName, String>,
}

impl SqlDomPlan {
    fn statements_mut(&mut self) -> impl Iterator<Item = &mut Statement> {
        self.pre_actions
            .iter_mut()
            .chain(self.initialize_load.iter_mut())
            .chain(self.ingest.iter_mut())
            .chain(self.post_actions.iter_mut())
            .chain(self.metadata_ingest.iter_mut())
            .chain(self.statistics.values_mut())
    }

    pub fn render(&self, ctx: &RenderContext) -> Result<RenderedPlan, RenderError> {
        let phase = |statements: &[Statement]| {
            statements.iter().map(|s| s.render(ctx)).collect::<Result<Vec<_>, _>>()
        };
        Ok(RenderedPlan {
            pre_actions: phase(&self.pre_actions)?,
            initialize_load: phase(&self.initialize_load)?,
            ingest: phase(&self.ingest)?,
            post_actions: phase(&self.post_actions)?,
            metadata_ingest: phase(&self.metadata_ingest)?,
            statistics: self
                .statistics
                .iter()
                .map(|(name, s)| Ok((*name, s.render(ctx)?)))
                .collect::<Result<_, RenderError>>()?,
        })
    }
}

/// Lowers logical plans through a sink
pub struct Transformer<'a> {
    sink: &'a dyn RelationalSink,
    optimizer: Option<CaseOptimizer>,
}

impl<'a> Transformer<'a> {
    pub fn new(sink: &'a dyn RelationalSink, case_conversion: CaseConversion) -> Self {
        Self {
            sink,
            optimizer: sink.case_optimizer(case_conversion),
        }
    }

    pub fn sink(&self) -> &dyn RelationalSink {
        self.sink
    }

    /// Lower every phase, then apply case conversion
    pub fn transform(&self, plan: &LogicalPlan) -> Result<SqlDomPlan, TransformError> {
        let mut lowered = SqlDomPlan {
            pre_actions: self.lower_all(&plan.pre_actions)?,
            initialize_load: self.lower_all(&plan.initialize_load)?,
            ingest: self.lower_all(&plan.ingest)?,
            post_actions: self.lower_all(&plan.post_actions)?,
            metadata_ingest: self.lower_all(&plan.metadata_ingest)?,
            statistics: plan
                .statistics
                .iter()
                .map(|(name, selection)| {
                    Ok((*name, Statement::Select(self.sink.lower_selection(selection)?)))
                })
                .collect::<Result<_, TransformError>>()?,
        };

        if let Some(optimizer) = self.optimizer {
            lowered.statements_mut().for_each(|s| optimizer.apply(s));
        }

        tracing::debug!(
            target: "relingest::transformer",
            sink = self.sink.name(),
            ingest_statements = lowered.ingest.len(),
            "lowered logical plan"
        );
        Ok(lowered)
    }

    /// Lower and render in one step
    pub fn transform_and_render(&self, plan: &LogicalPlan) -> Result<RenderedPlan, TransformError> {
        let lowered = self.transform(plan)?;
        Ok(lowered.render(&self.sink.render_context())?)
    }

    fn lower_all(&self, operations: &[Operation]) -> Result<Vec<Statement>, TransformError> {
        let mut statements = Vec::with_capacity(operations.len());
        for operation in operations {
            statements.extend(self.lower(operation)?);
        }
        Ok(statements)
    }

    // -----------------------------------------------------------------------
    // Node dispatch
    // -----------------------------------------------------------------------

    fn lower(&self, operation: &Operation) -> Result<Vec<Statement>, TransformError> {
        let sink = self.sink;
        let statement = match operation {
            Operation::Create(create) => sink.lower_create(create)?,
            Operation::Drop(drop) => sink.lower_drop(drop)?,
            Operation::Insert(insert) => sink.lower_insert(insert)?,
            Operation::Update(update) => sink.lower_update(update)?,
            Operation::Delete(delete) => sink.lower_delete(delete)?,
            Operation::Merge(merge) => return sink.lower_merge(merge),
            Operation::Alter(alter) => sink.lower_alter(alter)?,
            Operation::Truncate(truncate) => sink.lower_truncate(truncate)?,
            Operation::Show(show) => sink.lower_show(show)?,
            Operation::Select(selection) => Statement::Select(sink.lower_selection(selection)?),
        };
        Ok(vec![statement])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DataType, DatasetDefinition, Field, SchemaDefinition};
    use crate::plan::{Create, Drop, Modifier, Selection, Truncate, Value};
    use crate::sink::AnsiSink;

    fn staging() -> DatasetDefinition {
        let schema = SchemaDefinition::new(vec![
            Field::new("id", DataType::Integer).primary_key(),
            Field::new("name", DataType::Varchar(None)),
        ])
        .unwrap();
        DatasetDefinition::new("staging", schema).with_database("mydb").with_alias("stage")
    }

    fn plan() -> LogicalPlan {
        let mut plan = LogicalPlan {
            pre_actions: vec![Operation::Create(Create::if_not_exists(staging()))],
            post_actions: vec![
                Operation::Drop(Drop {
                    dataset: staging(),
                    modifier: Some(Modifier::IfExists),
                    cascade: true,
                }),
                Operation::Truncate(Truncate { dataset: staging() }),
            ],
            ..Default::default()
        };
        plan.statistics.insert(
            StatisticName::IncomingRecordCount,
            Selection::new(vec![Value::count_all().with_alias("incomingRecordCount")])
                .source(staging()),
        );
        plan
    }

    #[test]
    fn test_phases_are_kept_apart() {
        let rendered = Transformer::new(&AnsiSink, CaseConversion::None)
            .transform_and_render(&plan())
            .unwrap();
        assert_eq!(rendered.pre_actions.len(), 1);
        assert!(rendered.ingest.is_empty());
        assert_eq!(
            rendered.post_actions,
            vec![
                "DROP TABLE IF EXISTS \"mydb\".\"staging\" CASCADE".to_string(),
                "TRUNCATE TABLE \"mydb\".\"staging\"".to_string(),
            ]
        );
        assert_eq!(
            rendered.statistics[&StatisticName::IncomingRecordCount],
            "SELECT COUNT(*) as \"incomingRecordCount\" FROM \"mydb\".\"staging\" as stage"
        );
    }

    #[test]
    fn test_case_conversion_reaches_statistics() {
        let rendered = Transformer::new(&AnsiSink, CaseConversion::ToUpper)
            .transform_and_render(&plan())
            .unwrap();
        assert_eq!(
            rendered.statistics[&StatisticName::IncomingRecordCount],
            "SELECT COUNT(*) as \"incomingRecordCount\" FROM \"MYDB\".\"STAGING\" as stage"
        );
        assert_eq!(
            rendered.pre_actions[0],
            "CREATE TABLE IF NOT EXISTS \"MYDB\".\"STAGING\"(\"ID\" INTEGER NOT NULL,\"NAME\" VARCHAR,PRIMARY KEY (\"ID\"))"
        );
    }
}
