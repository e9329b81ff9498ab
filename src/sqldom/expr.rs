//! SQL-level tables, values and conditions

use super::statement::SelectStatement;

/// Dialect settings needed while rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    pub quote: &'static str,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self { quote: "\"" }
    }
}

impl RenderContext {
    pub fn new(quote: &'static str) -> Self {
        Self { quote }
    }

    /// Quote an identifier, doubling any embedded quote characters
    pub fn quote_identifier(&self, name: &str) -> String {
        let q = self.quote;
        let escaped = name.replace(q, &format!("{q}{q}"));
        format!("{q}{escaped}{q}")
    }
}

pub(crate) fn quote_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// A physical table reference
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub database: Option<String>,
    pub schema: Option<String>,
    pub name: String,
    pub alias: Option<String>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            database: None,
            schema: None,
            name: name.into(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// `"db"."schema"."name"` without alias
    pub fn render_name(&self, ctx: &RenderContext) -> String {
        [self.database.as_deref(), self.schema.as_deref(), Some(self.name.as_str())]
            .into_iter()
            .flatten()
            .map(|part| ctx.quote_identifier(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Name followed by `as <alias>` when an alias is set
    pub fn render(&self, ctx: &RenderContext) -> String {
        match &self.alias {
            Some(alias) => format!("{} as {}", self.render_name(ctx), alias),
            None => self.render_name(ctx),
        }
    }
}

/// Anything usable in a FROM or USING clause
#[derive(Debug, Clone, PartialEq)]
pub enum TableLike {
    Table(Table),
    SubQuery {
        select: Box<SelectStatement>,
        alias: String,
    },
}

impl TableLike {
    pub fn render(&self, ctx: &RenderContext) -> String {
        match self {
            TableLike::Table(table) => table.render(ctx),
            TableLike::SubQuery { select, alias } => format!("({}) as {}", select.render(ctx), alias),
        }
    }
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// Column reference, optionally qualified by a table alias
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub table_alias: Option<String>,
    pub name: String,
}

impl Column {
    pub fn new(table_alias: Option<String>, name: impl Into<String>) -> Self {
        Self {
            table_alias,
            name: name.into(),
        }
    }

    pub fn render(&self, ctx: &RenderContext) -> String {
        match &self.table_alias {
            Some(alias) => format!("{}.{}", alias, ctx.quote_identifier(&self.name)),
            None => ctx.quote_identifier(&self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Column(Column),
    All,
    StringLiteral(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
    /// Function call with a dialect-spelled name
    Function {
        name: String,
        args: Vec<SqlValue>,
    },
    Window {
        function: String,
        partition_by: Vec<SqlValue>,
        order_by: Vec<(SqlValue, bool)>,
    },
    Case {
        when_then: Vec<(SqlCondition, SqlValue)>,
        else_value: Option<Box<SqlValue>>,
    },
    SubQuery(Box<SelectStatement>),
    Arithmetic {
        op: &'static str,
        left: Box<SqlValue>,
        right: Box<SqlValue>,
    },
    Aliased {
        value: Box<SqlValue>,
        alias: String,
    },
}

impl SqlValue {
    pub fn render(&self, ctx: &RenderContext) -> String {
        match self {
            SqlValue::Column(col) => col.render(ctx),
            SqlValue::All => "*".to_string(),
            SqlValue::StringLiteral(s) => quote_string(s),
            SqlValue::Integer(i) => i.to_string(),
            SqlValue::Float(f) => format!("{}", f),
            SqlValue::Boolean(b) => if *b { "TRUE".to_string() } else { "FALSE".to_string() },
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Function { name, args } => {
                format!("{}({})", name, render_values(args, ",", ctx))
            }
            SqlValue::Window { function, partition_by, order_by } => {
                let mut over = Vec::new();
                if !partition_by.is_empty() {
                    over.push(format!("PARTITION BY {}", render_values(partition_by, ",", ctx)));
                }
                if !order_by.is_empty() {
                    let keys: Vec<String> = order_by
                        .iter()
                        .map(|(v, desc)| {
                            let dir = if *desc { "DESC" } else { "ASC" };
                            format!("{} {}", v.render(ctx), dir)
                        })
                        .collect();
                    over.push(format!("ORDER BY {}", keys.join(",")));
                }
                format!("{}() OVER ({})", function, over.join(" "))
            }
            SqlValue::Case { when_then, else_value } => {
                let mut sql = String::from("CASE");
                for (cond, then) in when_then {
                    sql.push_str(&format!(" WHEN {} THEN {}", cond.render(ctx), then.render(ctx)));
                }
                if let Some(el) = else_value {
                    sql.push_str(&format!(" ELSE {}", el.render(ctx)));
                }
                sql.push_str(" END");
                sql
            }
            SqlValue::SubQuery(select) => format!("({})", select.render(ctx)),
            SqlValue::Arithmetic { op, left, right } => {
                format!("{}{}{}", left.render(ctx), op, right.render(ctx))
            }
            SqlValue::Aliased { value, alias } => {
                format!("{} as {}", value.render(ctx), ctx.quote_identifier(alias))
            }
        }
    }
}

pub(crate) fn render_values(values: &[SqlValue], sep: &str, ctx: &RenderContext) -> String {
    values.iter().map(|v| v.render(ctx)).collect::<Vec<_>>().join(sep)
}

// ---------------------------------------------------------------------------
// Conditions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Eq,
    NotEq,
    Gt,
    GtEq,
    Lt,
    LtEq,
}

impl ComparisonOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "=",
            ComparisonOperator::NotEq => "<>",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::GtEq => ">=",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::LtEq => "<=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlCondition {
    And(Vec<SqlCondition>),
    Or(Vec<SqlCondition>),
    Not(Box<SqlCondition>),
    Comparison {
        left: SqlValue,
        op: ComparisonOperator,
        right: SqlValue,
    },
    In {
        value: SqlValue,
        list: Vec<SqlValue>,
        negated: bool,
    },
    IsNull(SqlValue),
    IsNotNull(SqlValue),
    Exists(Box<SelectStatement>),
}

impl SqlCondition {
    pub fn render(&self, ctx: &RenderContext) -> String {
        match self {
            SqlCondition::And(parts) => render_junction(parts, "AND", ctx),
            SqlCondition::Or(parts) => render_junction(parts, "OR", ctx),
            SqlCondition::Not(inner) => format!("NOT ({})", inner.render(ctx)),
            SqlCondition::Comparison { left, op, right } => {
                format!("{} {} {}", left.render(ctx), op.as_str(), right.render(ctx))
            }
            SqlCondition::In { value, list, negated } => {
                let kw = if *negated { "NOT IN" } else { "IN" };
                format!("{} {} ({})", value.render(ctx), kw, render_values(list, ",", ctx))
            }
            SqlCondition::IsNull(v) => format!("{} IS NULL", v.render(ctx)),
            SqlCondition::IsNotNull(v) => format!("{} IS NOT NULL", v.render(ctx)),
            SqlCondition::Exists(select) => format!("EXISTS ({})", select.render(ctx)),
        }
    }
}

/// Every operand is parenthesised so precedence never depends on the dialect
fn render_junction(parts: &[SqlCondition], kw: &str, ctx: &RenderContext) -> String {
    if parts.len() == 1 {
        return parts[0].render(ctx);
    }
    parts
        .iter()
        .map(|p| format!("({})", p.render(ctx)))
        .collect::<Vec<_>>()
        .join(&format!(" {} ", kw))
}
