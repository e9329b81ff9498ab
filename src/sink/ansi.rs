//! ANSI lowering
//!
//! The structural base every sink starts from. Each function is generic over
//! the calling sink so nested lowering goes back through the sink's own
//! (possibly overridden) methods.

use crate::dataset::{
    DataType, Dataset, DatasetDefinition, DatasetFilter, Field, FilterOperator, FilterValue,
};
use crate::plan::{
    Alter, AlterKind, ArithmeticOperator, Condition, Create, Delete, Drop, FieldValue, FunctionName,
    Insert, Merge, Modifier, Pair, Quantifier, Selection, Show, ShowKind, Truncate, Update, Value,
    WindowFunctionName,
};
use crate::sqldom::{
    AlterOperation, AlterTable, Column, ColumnDef, ComparisonOperator, CreateTable,
    DeleteStatement, DropTable, InsertStatement, MergeStatement, SelectStatement, ShowCommand,
    ShowObject, SqlCondition, SqlValue, Statement, Table, TableLike, TruncateTable,
    UpdateStatement,
};
use crate::transformer::TransformError;

use super::{Capability, RelationalSink};

/// Format used for datetime literals
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Plain ANSI SQL
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiSink;

impl RelationalSink for AnsiSink {
    fn name(&self) -> &'static str {
        "ANSI"
    }

    fn capabilities(&self) -> &'static [Capability] {
        &[Capability::Merge, Capability::AliasInHaving]
    }
}

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

pub fn type_name(data_type: &DataType) -> String {
    data_type.to_string()
}

pub fn function_name(function: FunctionName) -> &'static str {
    match function {
        FunctionName::Count => "COUNT",
        FunctionName::Sum => "SUM",
        FunctionName::Max => "MAX",
        FunctionName::Min => "MIN",
        FunctionName::Coalesce => "COALESCE",
        FunctionName::Upper => "UPPER",
        FunctionName::Lower => "LOWER",
        FunctionName::CurrentTimestamp => "CURRENT_TIMESTAMP",
        FunctionName::Md5 => "MD5",
        FunctionName::Concat => "CONCAT",
    }
}

pub fn window_function_name(function: WindowFunctionName) -> &'static str {
    match function {
        WindowFunctionName::RowNumber => "ROW_NUMBER",
        WindowFunctionName::Rank => "RANK",
        WindowFunctionName::DenseRank => "DENSE_RANK",
    }
}

// ---------------------------------------------------------------------------
// Datasets
// ---------------------------------------------------------------------------

pub fn lower_table(dataset: &DatasetDefinition) -> Table {
    Table {
        database: dataset.database.clone(),
        schema: dataset.group.clone(),
        name: dataset.name.clone(),
        alias: dataset.alias.clone(),
    }
}

/// Derived and filtered datasets become `(SELECT * FROM base as a WHERE ..) as a`
pub fn lower_dataset<S: RelationalSink + ?Sized>(
    sink: &S,
    dataset: &Dataset,
) -> Result<TableLike, TransformError> {
    match dataset {
        Dataset::Definition(def) => Ok(TableLike::Table(sink.lower_table(def))),
        Dataset::Derived(derived) => {
            let alias = sub_query_alias(derived.base.alias.as_deref())?;
            let conditions = derived
                .filters
                .iter()
                .map(|f| filter_condition(&alias, f))
                .collect::<Vec<_>>();
            let condition = (!conditions.is_empty()).then(|| Condition::all(conditions));
            wrap_base(sink, &derived.base, condition.as_ref(), alias)
        }
        Dataset::Filtered(filtered) => {
            let alias = sub_query_alias(filtered.base.alias.as_deref())?;
            wrap_base(sink, &filtered.base, Some(&filtered.condition), alias)
        }
        Dataset::Selection(selection) => {
            let alias = sub_query_alias(selection.alias.as_deref())?;
            Ok(TableLike::SubQuery {
                select: Box::new(sink.lower_selection(selection)?),
                alias,
            })
        }
    }
}

fn sub_query_alias(alias: Option<&str>) -> Result<String, TransformError> {
    alias.map(str::to_string).ok_or(TransformError::UnaliasedSubQuery)
}

fn wrap_base<S: RelationalSink + ?Sized>(
    sink: &S,
    base: &DatasetDefinition,
    condition: Option<&Condition>,
    alias: String,
) -> Result<TableLike, TransformError> {
    let select = SelectStatement {
        from: Some(TableLike::Table(sink.lower_table(base))),
        condition: condition.map(|c| sink.lower_condition(c)).transpose()?,
        ..Default::default()
    };
    Ok(TableLike::SubQuery {
        select: Box::new(select),
        alias,
    })
}

fn filter_condition(alias: &str, filter: &DatasetFilter) -> Condition {
    let field = Value::field(alias, &filter.field);
    let value = match &filter.value {
        FilterValue::Integer(i) => Value::Integer(*i),
        FilterValue::String(s) => Value::string(s.clone()),
    };
    match filter.op {
        FilterOperator::Eq => Condition::Equals(field, value),
        FilterOperator::Ne => Condition::NotEquals(field, value),
        FilterOperator::Gt => Condition::GreaterThan(field, value),
        FilterOperator::Ge => Condition::GreaterThanEqualTo(field, value),
        FilterOperator::Lt => Condition::LessThan(field, value),
        FilterOperator::Le => Condition::LessThanEqualTo(field, value),
    }
}

// ---------------------------------------------------------------------------
// Values and conditions
// ---------------------------------------------------------------------------

fn column(field: &FieldValue) -> Column {
    Column::new(field.dataset_alias.clone(), field.name.clone())
}

pub fn lower_value<S: RelationalSink + ?Sized>(
    sink: &S,
    value: &Value,
) -> Result<SqlValue, TransformError> {
    let lowered = match value {
        Value::Field(field) => SqlValue::Column(column(field)),
        Value::All => SqlValue::All,
        Value::String(s) => SqlValue::StringLiteral(s.clone()),
        Value::Integer(i) => SqlValue::Integer(*i),
        Value::Float(f) => SqlValue::Float(*f),
        Value::Boolean(b) => SqlValue::Boolean(*b),
        Value::Null => SqlValue::Null,
        Value::DateTime(ts) => SqlValue::StringLiteral(ts.format(DATE_TIME_FORMAT).to_string()),
        Value::Function(function) => SqlValue::Function {
            name: sink.function_name(function.name).to_string(),
            args: lower_values(sink, &function.args)?,
        },
        Value::Window(window) => SqlValue::Window {
            function: sink.window_function_name(window.name).to_string(),
            partition_by: lower_values(sink, &window.partition_by)?,
            order_by: window
                .order_by
                .iter()
                .map(|o| Ok((sink.lower_value(&o.value)?, o.descending)))
                .collect::<Result<Vec<_>, TransformError>>()?,
        },
        Value::Case(case) => SqlValue::Case {
            when_then: case
                .when_then
                .iter()
                .map(|(when, then)| Ok((sink.lower_condition(when)?, sink.lower_value(then)?)))
                .collect::<Result<Vec<_>, TransformError>>()?,
            else_value: case
                .else_value
                .as_deref()
                .map(|v| sink.lower_value(v).map(Box::new))
                .transpose()?,
        },
        Value::Select(selection) => SqlValue::SubQuery(Box::new(sink.lower_selection(selection)?)),
        Value::Arithmetic { op, left, right } => SqlValue::Arithmetic {
            op: match op {
                ArithmeticOperator::Plus => "+",
                ArithmeticOperator::Minus => "-",
            },
            left: Box::new(sink.lower_value(left)?),
            right: Box::new(sink.lower_value(right)?),
        },
        Value::Aliased { value, alias } => SqlValue::Aliased {
            value: Box::new(sink.lower_value(value)?),
            alias: alias.clone(),
        },
    };
    Ok(lowered)
}

fn lower_values<S: RelationalSink + ?Sized>(
    sink: &S,
    values: &[Value],
) -> Result<Vec<SqlValue>, TransformError> {
    values.iter().map(|v| sink.lower_value(v)).collect()
}

pub fn lower_condition<S: RelationalSink + ?Sized>(
    sink: &S,
    condition: &Condition,
) -> Result<SqlCondition, TransformError> {
    let compare = |left: &Value, op: ComparisonOperator, right: &Value| {
        Ok::<_, TransformError>(SqlCondition::Comparison {
            left: sink.lower_value(left)?,
            op,
            right: sink.lower_value(right)?,
        })
    };

    match condition {
        Condition::And(parts) => Ok(SqlCondition::And(lower_conditions(sink, parts)?)),
        Condition::Or(parts) => Ok(SqlCondition::Or(lower_conditions(sink, parts)?)),
        Condition::Not(inner) => Ok(SqlCondition::Not(Box::new(sink.lower_condition(inner)?))),
        Condition::Equals(l, r) => compare(l, ComparisonOperator::Eq, r),
        Condition::NotEquals(l, r) => compare(l, ComparisonOperator::NotEq, r),
        Condition::GreaterThan(l, r) => compare(l, ComparisonOperator::Gt, r),
        Condition::GreaterThanEqualTo(l, r) => compare(l, ComparisonOperator::GtEq, r),
        Condition::LessThan(l, r) => compare(l, ComparisonOperator::Lt, r),
        Condition::LessThanEqualTo(l, r) => compare(l, ComparisonOperator::LtEq, r),
        Condition::In(value, list) => Ok(SqlCondition::In {
            value: sink.lower_value(value)?,
            list: lower_values(sink, list)?,
            negated: false,
        }),
        Condition::NotIn(value, list) => Ok(SqlCondition::In {
            value: sink.lower_value(value)?,
            list: lower_values(sink, list)?,
            negated: true,
        }),
        Condition::IsNull(value) => Ok(SqlCondition::IsNull(sink.lower_value(value)?)),
        Condition::IsNotNull(value) => Ok(SqlCondition::IsNotNull(sink.lower_value(value)?)),
        Condition::Exists(selection) => {
            Ok(SqlCondition::Exists(Box::new(sink.lower_selection(selection)?)))
        }
    }
}

fn lower_conditions<S: RelationalSink + ?Sized>(
    sink: &S,
    conditions: &[Condition],
) -> Result<Vec<SqlCondition>, TransformError> {
    conditions.iter().map(|c| sink.lower_condition(c)).collect()
}

/// Logical negation, folded into the node where SQL has a direct form
pub fn negate(condition: SqlCondition) -> SqlCondition {
    match condition {
        SqlCondition::In { value, list, negated } => SqlCondition::In {
            value,
            list,
            negated: !negated,
        },
        SqlCondition::IsNull(v) => SqlCondition::IsNotNull(v),
        SqlCondition::IsNotNull(v) => SqlCondition::IsNull(v),
        SqlCondition::Not(inner) => *inner,
        other => SqlCondition::Not(Box::new(other)),
    }
}

fn all(mut conditions: Vec<SqlCondition>) -> SqlCondition {
    if conditions.len() == 1 {
        conditions.remove(0)
    } else {
        SqlCondition::And(conditions)
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

pub fn lower_selection<S: RelationalSink + ?Sized>(
    sink: &S,
    selection: &Selection,
) -> Result<SelectStatement, TransformError> {
    Ok(SelectStatement {
        distinct: selection.quantifier == Some(Quantifier::Distinct),
        items: lower_values(sink, &selection.fields)?,
        from: selection.source.as_ref().map(|d| sink.lower_dataset(d)).transpose()?,
        condition: selection.condition.as_ref().map(|c| sink.lower_condition(c)).transpose()?,
        group_by: lower_values(sink, &selection.group_by)?,
        having: selection.having.as_ref().map(|c| sink.lower_condition(c)).transpose()?,
        limit: selection.limit,
    })
}

// ---------------------------------------------------------------------------
// DDL
// ---------------------------------------------------------------------------

pub fn lower_field<S: RelationalSink + ?Sized>(sink: &S, field: &Field) -> ColumnDef {
    ColumnDef {
        name: field.name.clone(),
        data_type: sink.type_name(&field.data_type),
        not_null: field.is_not_null(),
        unique: field.unique,
    }
}

pub fn create_table<S: RelationalSink + ?Sized>(sink: &S, create: &Create) -> CreateTable {
    let schema = &create.dataset.schema;
    CreateTable {
        table: sink.lower_table(&create.dataset),
        reference: false,
        if_not_exists: create.modifier == Some(Modifier::IfNotExists),
        columns: schema.fields().iter().map(|f| sink.lower_field(f)).collect(),
        primary_keys: schema.primary_keys().into_iter().map(|f| f.name.clone()).collect(),
    }
}

pub fn lower_drop(drop: &Drop) -> Statement {
    Statement::DropTable(DropTable {
        table: lower_table(&drop.dataset),
        if_exists: drop.modifier == Some(Modifier::IfExists),
        cascade: drop.cascade,
    })
}

pub fn lower_truncate(truncate: &Truncate) -> Statement {
    Statement::Truncate(TruncateTable {
        table: lower_table(&truncate.dataset),
    })
}

pub fn lower_alter<S: RelationalSink + ?Sized>(sink: &S, alter: &Alter) -> Statement {
    let operation = match &alter.kind {
        AlterKind::AddColumn(field) => AlterOperation::AddColumn(sink.lower_field(field)),
    };
    Statement::AlterTable(AlterTable {
        table: sink.lower_table(&alter.dataset),
        operation,
    })
}

/// `SHOW TABLES FROM db.group LIKE 'name'` or `SHOW SCHEMAS FROM db LIKE 'group'`
pub fn show_command(show: &Show) -> ShowCommand {
    let (object, scope, like) = match (show.kind, &show.dataset) {
        (ShowKind::Tables, Some(d)) => (
            ShowObject::Tables,
            d.database.iter().chain(d.group.iter()).cloned().collect(),
            Some(d.name.clone()),
        ),
        (ShowKind::Schemas, Some(d)) => {
            (ShowObject::Schemas, d.database.iter().cloned().collect(), d.group.clone())
        }
        (ShowKind::Tables, None) => (ShowObject::Tables, Vec::new(), None),
        (ShowKind::Schemas, None) => (ShowObject::Schemas, Vec::new(), None),
    };
    ShowCommand {
        object,
        scope_keyword: "FROM",
        scope,
        like,
        like_before_scope: false,
    }
}

// ---------------------------------------------------------------------------
// DML
// ---------------------------------------------------------------------------

pub fn lower_insert<S: RelationalSink + ?Sized>(
    sink: &S,
    insert: &Insert,
) -> Result<Statement, TransformError> {
    Ok(Statement::Insert(InsertStatement {
        table: sink.lower_table(&insert.target),
        columns: insert.fields.clone(),
        select: sink.lower_selection(&insert.source)?,
    }))
}

fn lower_pairs<S: RelationalSink + ?Sized>(
    sink: &S,
    pairs: &[Pair],
) -> Result<Vec<(Column, SqlValue)>, TransformError> {
    pairs
        .iter()
        .map(|p| Ok((column(&p.field), sink.lower_value(&p.value)?)))
        .collect()
}

pub fn lower_update<S: RelationalSink + ?Sized>(
    sink: &S,
    update: &Update,
) -> Result<Statement, TransformError> {
    Ok(Statement::Update(UpdateStatement {
        table: sink.lower_table(&update.dataset),
        join: None,
        set: lower_pairs(sink, &update.pairs)?,
        condition: update.condition.as_ref().map(|c| sink.lower_condition(c)).transpose()?,
    }))
}

pub fn lower_delete<S: RelationalSink + ?Sized>(
    sink: &S,
    delete: &Delete,
) -> Result<Statement, TransformError> {
    Ok(Statement::Delete(DeleteStatement {
        table: sink.lower_table(&delete.dataset),
        condition: delete.condition.as_ref().map(|c| sink.lower_condition(c)).transpose()?,
    }))
}

pub fn lower_native_merge<S: RelationalSink + ?Sized>(
    sink: &S,
    merge: &Merge,
) -> Result<Statement, TransformError> {
    let lower_opt = |c: &Option<Condition>| c.as_ref().map(|c| sink.lower_condition(c)).transpose();

    Ok(Statement::Merge(MergeStatement {
        target: sink.lower_table(&merge.target),
        source: sink.lower_dataset(&merge.source)?,
        on: sink.lower_condition(&merge.on)?,
        delete_condition: lower_opt(&merge.delete_condition)?,
        matched_condition: lower_opt(&merge.matched_condition)?,
        matched_pairs: lower_pairs(sink, &merge.matched_pairs)?,
        unmatched_condition: lower_opt(&merge.unmatched_condition)?,
        unmatched_columns: merge.unmatched_fields.clone(),
        unmatched_values: lower_values(sink, &merge.unmatched_values)?,
    }))
}

/// Merge for sinks without `MERGE INTO`, in execution order:
///
/// 1. `UPDATE main INNER JOIN staging ON <on> AND <matched> [AND NOT <del>] SET ..`
/// 2. `INSERT INTO main (..) (SELECT .. FROM staging WHERE [NOT <del> AND] NOT EXISTS (..))`
/// 3. `DELETE FROM main WHERE EXISTS (SELECT * FROM staging WHERE <on> AND <del>)`
pub fn lower_merge_as_statements<S: RelationalSink + ?Sized>(
    sink: &S,
    merge: &Merge,
) -> Result<Vec<Statement>, TransformError> {
    let target = sink.lower_table(&merge.target);
    let source = sink.lower_dataset(&merge.source)?;
    let on = sink.lower_condition(&merge.on)?;
    let delete = merge.delete_condition.as_ref().map(|c| sink.lower_condition(c)).transpose()?;
    let mut statements = Vec::new();

    if !merge.matched_pairs.is_empty() {
        let mut join_on = vec![on.clone()];
        if let Some(matched) = &merge.matched_condition {
            join_on.push(sink.lower_condition(matched)?);
        }
        if let Some(delete) = &delete {
            join_on.push(negate(delete.clone()));
        }
        statements.push(Statement::Update(UpdateStatement {
            table: target.clone(),
            join: Some((source.clone(), all(join_on))),
            set: lower_pairs(sink, &merge.matched_pairs)?,
            condition: None,
        }));
    }

    if !merge.unmatched_fields.is_empty() {
        let target_rows = SelectStatement {
            from: Some(TableLike::Table(target.clone())),
            condition: Some(on.clone()),
            ..Default::default()
        };
        let not_exists = SqlCondition::Not(Box::new(SqlCondition::Exists(Box::new(target_rows))));
        let condition = match &merge.unmatched_condition {
            Some(guard) => SqlCondition::And(vec![sink.lower_condition(guard)?, not_exists]),
            None => not_exists,
        };
        statements.push(Statement::Insert(InsertStatement {
            table: target.clone(),
            columns: merge.unmatched_fields.clone(),
            select: SelectStatement {
                items: lower_values(sink, &merge.unmatched_values)?,
                from: Some(source.clone()),
                condition: Some(condition),
                ..Default::default()
            },
        }));
    }

    if let Some(delete) = delete {
        let flagged = SelectStatement {
            from: Some(source),
            condition: Some(SqlCondition::And(vec![on, delete])),
            ..Default::default()
        };
        statements.push(Statement::Delete(DeleteStatement {
            table: target,
            condition: Some(SqlCondition::Exists(Box::new(flagged))),
        }));
    }

    Ok(statements)
}
