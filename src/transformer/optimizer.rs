//! Case-conversion pass
//!
//! Rewrites every identifier in a lowered statement. String literals and
//! aliases are left alone.

use crate::sqldom::{
    AlterOperation, Column, ColumnDef, SelectStatement, SqlCondition, SqlValue, Statement, Table,
    TableLike,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseOptimizer {
    UpperCase,
    LowerCase,
}

impl CaseOptimizer {
    fn fold(&self, s: &mut String) {
        *s = match self {
            CaseOptimizer::UpperCase => s.to_uppercase(),
            CaseOptimizer::LowerCase => s.to_lowercase(),
        };
    }

    fn fold_all(&self, names: &mut [String]) {
        for name in names {
            self.fold(name);
        }
    }

    pub fn apply(&self, statement: &mut Statement) {
        match statement {
            Statement::CreateTable(create) => {
                self.table(&mut create.table);
                create.columns.iter_mut().for_each(|c| self.column_def(c));
                self.fold_all(&mut create.primary_keys);
            }
            Statement::DropTable(drop) => self.table(&mut drop.table),
            Statement::Truncate(truncate) => self.table(&mut truncate.table),
            Statement::AlterTable(alter) => {
                self.table(&mut alter.table);
                match &mut alter.operation {
                    AlterOperation::AddColumn(def) => self.column_def(def),
                }
            }
            Statement::Show(show) => {
                self.fold_all(&mut show.scope);
                if let Some(pattern) = &mut show.like {
                    self.fold(pattern);
                }
            }
            Statement::Select(select) => self.select(select),
            Statement::Insert(insert) => {
                self.table(&mut insert.table);
                self.fold_all(&mut insert.columns);
                self.select(&mut insert.select);
            }
            Statement::Delete(delete) => {
                self.table(&mut delete.table);
                if let Some(c) = &mut delete.condition {
                    self.condition(c);
                }
            }
            Statement::Update(update) => {
                self.table(&mut update.table);
                if let Some((other, on)) = &mut update.join {
                    self.table_like(other);
                    self.condition(on);
                }
                self.pairs(&mut update.set);
                if let Some(c) = &mut update.condition {
                    self.condition(c);
                }
            }
            Statement::Merge(merge) => {
                self.table(&mut merge.target);
                self.table_like(&mut merge.source);
                self.condition(&mut merge.on);
                for c in [
                    &mut merge.delete_condition,
                    &mut merge.matched_condition,
                    &mut merge.unmatched_condition,
                ]
                .into_iter()
                .flatten()
                {
                    self.condition(c);
                }
                self.pairs(&mut merge.matched_pairs);
                self.fold_all(&mut merge.unmatched_columns);
                merge.unmatched_values.iter_mut().for_each(|v| self.value(v));
            }
        }
    }

    fn table(&self, table: &mut Table) {
        for part in [&mut table.database, &mut table.schema].into_iter().flatten() {
            self.fold(part);
        }
        self.fold(&mut table.name);
    }

    fn table_like(&self, table: &mut TableLike) {
        match table {
            TableLike::Table(t) => self.table(t),
            TableLike::SubQuery { select, .. } => self.select(select),
        }
    }

    fn column(&self, column: &mut Column) {
        self.fold(&mut column.name);
    }

    fn column_def(&self, def: &mut ColumnDef) {
        self.fold(&mut def.name);
    }

    fn pairs(&self, pairs: &mut [(Column, SqlValue)]) {
        for (column, value) in pairs {
            self.column(column);
            self.value(value);
        }
    }

    fn select(&self, select: &mut SelectStatement) {
        select.items.iter_mut().for_each(|v| self.value(v));
        if let Some(from) = &mut select.from {
            self.table_like(from);
        }
        if let Some(c) = &mut select.condition {
            self.condition(c);
        }
        if let Some(c) = &mut select.having {
            let aliases: Vec<String> = select
                .items
                .iter()
                .filter_map(|v| match v {
                    SqlValue::Aliased { alias, .. } => Some(alias.clone()),
                    _ => None,
                })
                .collect();
            self.having(c, &aliases);
        }
        select.group_by.iter_mut().for_each(|v| self.value(v));
    }

    /// HAVING may name select-list aliases, which keep their case
    fn having(&self, condition: &mut SqlCondition, aliases: &[String]) {
        match condition {
            SqlCondition::And(parts) | SqlCondition::Or(parts) => {
                parts.iter_mut().for_each(|c| self.having(c, aliases))
            }
            SqlCondition::Not(inner) => self.having(inner, aliases),
            SqlCondition::Comparison { left, right, .. } => {
                self.having_value(left, aliases);
                self.having_value(right, aliases);
            }
            other => self.condition(other),
        }
    }

    fn having_value(&self, value: &mut SqlValue, aliases: &[String]) {
        match value {
            SqlValue::Column(c) if c.table_alias.is_none() && aliases.contains(&c.name) => {}
            other => self.value(other),
        }
    }

    fn value(&self, value: &mut SqlValue) {
        match value {
            SqlValue::Column(c) => self.column(c),
            SqlValue::Function { args, .. } => args.iter_mut().for_each(|v| self.value(v)),
            SqlValue::Window { partition_by, order_by, .. } => {
                partition_by.iter_mut().for_each(|v| self.value(v));
                order_by.iter_mut().for_each(|(v, _)| self.value(v));
            }
            SqlValue::Case { when_then, else_value } => {
                for (when, then) in when_then {
                    self.condition(when);
                    self.value(then);
                }
                if let Some(v) = else_value {
                    self.value(v);
                }
            }
            SqlValue::SubQuery(select) => self.select(select),
            SqlValue::Arithmetic { left, right, .. } => {
                self.value(left);
                self.value(right);
            }
            SqlValue::Aliased { value, .. } => self.value(value),
            SqlValue::All
            | SqlValue::StringLiteral(_)
            | SqlValue::Integer(_)
            | SqlValue::Float(_)
            | SqlValue::Boolean(_)
            | SqlValue::Null => {}
        }
    }

    fn condition(&self, condition: &mut SqlCondition) {
        match condition {
            SqlCondition::And(parts) | SqlCondition::Or(parts) => {
                parts.iter_mut().for_each(|c| self.condition(c))
            }
            SqlCondition::Not(inner) => self.condition(inner),
            SqlCondition::Comparison { left, right, .. } => {
                self.value(left);
                self.value(right);
            }
            SqlCondition::In { value, list, .. } => {
                self.value(value);
                list.iter_mut().for_each(|v| self.value(v));
            }
            SqlCondition::IsNull(v) | SqlCondition::IsNotNull(v) => self.value(v),
            SqlCondition::Exists(select) => self.select(select),
        }
    }
}
