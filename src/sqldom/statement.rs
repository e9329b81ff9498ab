//! SQL statements
//!
//! Each statement is built from explicit fields, validated, then rendered.

use super::error::RenderError;
use super::expr::{quote_string, render_values, Column, RenderContext, SqlCondition, SqlValue, Table, TableLike};

/// A top-level SQL statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable(CreateTable),
    DropTable(DropTable),
    Insert(InsertStatement),
    Merge(MergeStatement),
    Select(SelectStatement),
    Show(ShowCommand),
    Delete(DeleteStatement),
    Update(UpdateStatement),
    Truncate(TruncateTable),
    AlterTable(AlterTable),
}

impl Statement {
    /// Validate and render to SQL text
    pub fn render(&self, ctx: &RenderContext) -> Result<String, RenderError> {
        match self {
            Statement::CreateTable(s) => s.render(ctx),
            Statement::DropTable(s) => s.render(ctx),
            Statement::Insert(s) => s.render(ctx),
            Statement::Merge(s) => s.render(ctx),
            Statement::Select(s) => Ok(s.render(ctx)),
            Statement::Show(s) => Ok(s.render(ctx)),
            Statement::Delete(s) => s.render(ctx),
            Statement::Update(s) => s.render(ctx),
            Statement::Truncate(s) => s.render(ctx),
            Statement::AlterTable(s) => s.render(ctx),
        }
    }
}

fn require_table(table: &Table, command: &'static str) -> Result<(), RenderError> {
    if table.name.is_empty() {
        return Err(RenderError::MissingTable(command));
    }
    Ok(())
}

fn render_column_list(columns: &[String], ctx: &RenderContext) -> String {
    columns
        .iter()
        .map(|c| ctx.quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_pairs(pairs: &[(Column, SqlValue)], ctx: &RenderContext) -> String {
    pairs
        .iter()
        .map(|(col, val)| format!("{} = {}", col.render(ctx), val.render(ctx)))
        .collect::<Vec<_>>()
        .join(",")
}

// ---------------------------------------------------------------------------
// DDL
// ---------------------------------------------------------------------------

/// Column definition inside CREATE TABLE / ALTER TABLE
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: String,
    pub not_null: bool,
    pub unique: bool,
}

impl ColumnDef {
    pub fn render(&self, ctx: &RenderContext) -> String {
        let mut sql = format!("{} {}", ctx.quote_identifier(&self.name), self.data_type);
        if self.not_null {
            sql.push_str(" NOT NULL");
        }
        if self.unique {
            sql.push_str(" UNIQUE");
        }
        sql
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub table: Table,
    /// `CREATE REFERENCE TABLE`, replicated to every node
    pub reference: bool,
    pub if_not_exists: bool,
    pub columns: Vec<ColumnDef>,
    pub primary_keys: Vec<String>,
}

impl CreateTable {
    const COMMAND: &'static str = "Create Table Command";

    pub fn render(&self, ctx: &RenderContext) -> Result<String, RenderError> {
        require_table(&self.table, Self::COMMAND)?;
        if self.columns.is_empty() {
            return Err(RenderError::MissingColumns(Self::COMMAND));
        }

        let mut parts: Vec<String> = self.columns.iter().map(|c| c.render(ctx)).collect();
        if !self.primary_keys.is_empty() {
            parts.push(format!("PRIMARY KEY ({})", render_column_list(&self.primary_keys, ctx)));
        }

        let kind = if self.reference { "REFERENCE TABLE" } else { "TABLE" };
        let modifier = if self.if_not_exists { "IF NOT EXISTS " } else { "" };
        Ok(format!(
            "CREATE {} {}{}({})",
            kind,
            modifier,
            self.table.render_name(ctx),
            parts.join(",")
        ))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropTable {
    pub table: Table,
    pub if_exists: bool,
    pub cascade: bool,
}

impl DropTable {
    pub fn render(&self, ctx: &RenderContext) -> Result<String, RenderError> {
        require_table(&self.table, "Drop Table Command")?;
        let mut sql = String::from("DROP TABLE ");
        if self.if_exists {
            sql.push_str("IF EXISTS ");
        }
        sql.push_str(&self.table.render_name(ctx));
        if self.cascade {
            sql.push_str(" CASCADE");
        }
        Ok(sql)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TruncateTable {
    pub table: Table,
}

impl TruncateTable {
    pub fn render(&self, ctx: &RenderContext) -> Result<String, RenderError> {
        require_table(&self.table, "Truncate Table Command")?;
        Ok(format!("TRUNCATE TABLE {}", self.table.render_name(ctx)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlterOperation {
    AddColumn(ColumnDef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterTable {
    pub table: Table,
    pub operation: AlterOperation,
}

impl AlterTable {
    pub fn render(&self, ctx: &RenderContext) -> Result<String, RenderError> {
        require_table(&self.table, "Alter Table Command")?;
        let op = match &self.operation {
            AlterOperation::AddColumn(col) => format!("ADD COLUMN {}", col.render(ctx)),
        };
        Ok(format!("ALTER TABLE {} {}", self.table.render_name(ctx), op))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowObject {
    Schemas,
    Tables,
}

/// `SHOW {SCHEMAS | TABLES} [<scope_keyword> scope] [LIKE 'pattern']`
#[derive(Debug, Clone, PartialEq)]
pub struct ShowCommand {
    pub object: ShowObject,
    /// Keyword before the scope, `FROM` in ANSI
    pub scope_keyword: &'static str,
    /// Database/schema path the listing is restricted to
    pub scope: Vec<String>,
    pub like: Option<String>,
    /// Render `LIKE` ahead of the scope, e.g. `SHOW TABLES LIKE 'x' IN db`
    pub like_before_scope: bool,
}

impl ShowCommand {
    pub fn render(&self, ctx: &RenderContext) -> String {
        let mut sql = match self.object {
            ShowObject::Schemas => String::from("SHOW SCHEMAS"),
            ShowObject::Tables => String::from("SHOW TABLES"),
        };
        let like = self.like.as_deref().map(|p| format!(" LIKE {}", quote_string(p)));
        let scope = if self.scope.is_empty() {
            None
        } else {
            let path: Vec<String> = self.scope.iter().map(|s| ctx.quote_identifier(s)).collect();
            Some(format!(" {} {}", self.scope_keyword, path.join(".")))
        };
        let (first, second) = if self.like_before_scope { (like, scope) } else { (scope, like) };
        sql.extend(first);
        sql.extend(second);
        sql
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectStatement {
    pub distinct: bool,
    /// Empty renders as `*`
    pub items: Vec<SqlValue>,
    pub from: Option<TableLike>,
    pub condition: Option<SqlCondition>,
    pub group_by: Vec<SqlValue>,
    pub having: Option<SqlCondition>,
    pub limit: Option<u64>,
}

impl SelectStatement {
    pub fn render(&self, ctx: &RenderContext) -> String {
        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        if self.items.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&render_values(&self.items, ",", ctx));
        }
        if let Some(from) = &self.from {
            sql.push_str(&format!(" FROM {}", from.render(ctx)));
        }
        if let Some(cond) = &self.condition {
            sql.push_str(&format!(" WHERE {}", cond.render(ctx)));
        }
        if !self.group_by.is_empty() {
            sql.push_str(&format!(" GROUP BY {}", render_values(&self.group_by, ", ", ctx)));
        }
        if let Some(having) = &self.having {
            sql.push_str(&format!(" HAVING {}", having.render(ctx)));
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        sql
    }
}

// ---------------------------------------------------------------------------
// DML
// ---------------------------------------------------------------------------

/// `INSERT INTO table (columns) (select)`
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table: Table,
    pub columns: Vec<String>,
    pub select: SelectStatement,
}

impl InsertStatement {
    const COMMAND: &'static str = "Insert Command";

    pub fn render(&self, ctx: &RenderContext) -> Result<String, RenderError> {
        require_table(&self.table, Self::COMMAND)?;
        if !self.columns.is_empty()
            && !self.select.items.is_empty()
            && self.columns.len() != self.select.items.len()
        {
            return Err(RenderError::SizeMismatch(Self::COMMAND));
        }

        let mut sql = format!("INSERT INTO {}", self.table.render_name(ctx));
        if !self.columns.is_empty() {
            sql.push_str(&format!(" ({})", render_column_list(&self.columns, ctx)));
        }
        sql.push_str(&format!(" ({})", self.select.render(ctx)));
        Ok(sql)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub table: Table,
    pub condition: Option<SqlCondition>,
}

impl DeleteStatement {
    pub fn render(&self, ctx: &RenderContext) -> Result<String, RenderError> {
        require_table(&self.table, "Delete Command")?;
        let mut sql = format!("DELETE FROM {}", self.table.render(ctx));
        if let Some(cond) = &self.condition {
            sql.push_str(&format!(" WHERE {}", cond.render(ctx)));
        }
        Ok(sql)
    }
}

/// `UPDATE table [INNER JOIN other ON cond] SET .. [WHERE cond]`
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub table: Table,
    pub join: Option<(TableLike, SqlCondition)>,
    pub set: Vec<(Column, SqlValue)>,
    pub condition: Option<SqlCondition>,
}

impl UpdateStatement {
    const COMMAND: &'static str = "Update Command";

    pub fn render(&self, ctx: &RenderContext) -> Result<String, RenderError> {
        require_table(&self.table, Self::COMMAND)?;
        if self.set.is_empty() {
            return Err(RenderError::MissingColumns(Self::COMMAND));
        }

        let mut sql = format!("UPDATE {}", self.table.render(ctx));
        if let Some((other, on)) = &self.join {
            sql.push_str(&format!(" INNER JOIN {} ON {}", other.render(ctx), on.render(ctx)));
        }
        sql.push_str(&format!(" SET {}", render_pairs(&self.set, ctx)));
        if let Some(cond) = &self.condition {
            sql.push_str(&format!(" WHERE {}", cond.render(ctx)));
        }
        Ok(sql)
    }
}

/// `MERGE INTO target USING source ON cond ...`
///
/// Clause order is fixed: delete branch, update branch, insert branch.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeStatement {
    pub target: Table,
    pub source: TableLike,
    pub on: SqlCondition,
    pub delete_condition: Option<SqlCondition>,
    pub matched_condition: Option<SqlCondition>,
    pub matched_pairs: Vec<(Column, SqlValue)>,
    pub unmatched_condition: Option<SqlCondition>,
    pub unmatched_columns: Vec<String>,
    pub unmatched_values: Vec<SqlValue>,
}

impl MergeStatement {
    const COMMAND: &'static str = "Merge Command";

    pub fn render(&self, ctx: &RenderContext) -> Result<String, RenderError> {
        require_table(&self.target, Self::COMMAND)?;
        if self.unmatched_columns.len() != self.unmatched_values.len() {
            return Err(RenderError::SizeMismatch(Self::COMMAND));
        }

        let mut sql = format!(
            "MERGE INTO {} USING {} ON {}",
            self.target.render(ctx),
            self.source.render(ctx),
            self.on.render(ctx)
        );

        if let Some(del) = &self.delete_condition {
            sql.push_str(&format!(" WHEN MATCHED AND {} THEN DELETE", del.render(ctx)));
        }

        if !self.matched_pairs.is_empty() {
            sql.push_str(" WHEN MATCHED");
            if let Some(cond) = &self.matched_condition {
                sql.push_str(&format!(" AND {}", cond.render(ctx)));
            }
            sql.push_str(&format!(" THEN UPDATE SET {}", render_pairs(&self.matched_pairs, ctx)));
        }

        if !self.unmatched_columns.is_empty() {
            sql.push_str(" WHEN NOT MATCHED");
            if let Some(cond) = &self.unmatched_condition {
                sql.push_str(&format!(" AND {}", cond.render(ctx)));
            }
            sql.push_str(&format!(
                " THEN INSERT ({}) VALUES ({})",
                render_column_list(&self.unmatched_columns, ctx),
                render_values(&self.unmatched_values, ",", ctx)
            ));
        }

        Ok(sql)
    }
}
