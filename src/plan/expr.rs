//! Logical values and conditions

use chrono::NaiveDateTime;

use super::node::Selection;

/// Reference to a column, optionally qualified by a dataset alias
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    pub dataset_alias: Option<String>,
    pub name: String,
}

impl FieldValue {
    pub fn new(dataset_alias: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            dataset_alias: Some(dataset_alias.into()),
            name: name.into(),
        }
    }

    pub fn unqualified(name: impl Into<String>) -> Self {
        Self {
            dataset_alias: None,
            name: name.into(),
        }
    }
}

/// Scalar and aggregate functions the sinks know how to spell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionName {
    Count,
    Sum,
    Max,
    Min,
    Coalesce,
    Upper,
    Lower,
    CurrentTimestamp,
    /// Row hash used to compute digests
    Md5,
    Concat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: FunctionName,
    pub args: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowFunctionName {
    RowNumber,
    Rank,
    DenseRank,
}

/// Sort key inside a window specification
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedValue {
    pub value: Value,
    pub descending: bool,
}

/// `<fn>() OVER (PARTITION BY .. ORDER BY ..)`
#[derive(Debug, Clone, PartialEq)]
pub struct WindowFunction {
    pub name: WindowFunctionName,
    pub partition_by: Vec<Value>,
    pub order_by: Vec<OrderedValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub when_then: Vec<(Condition, Value)>,
    pub else_value: Option<Box<Value>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOperator {
    Plus,
    Minus,
}

/// A value in the logical plan
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Field(FieldValue),
    /// `*`
    All,
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
    DateTime(NaiveDateTime),
    Function(Function),
    Window(WindowFunction),
    Case(Case),
    /// Scalar sub-select
    Select(Box<Selection>),
    Arithmetic {
        op: ArithmeticOperator,
        left: Box<Value>,
        right: Box<Value>,
    },
    Aliased {
        value: Box<Value>,
        alias: String,
    },
}

impl Value {
    pub fn field(dataset_alias: &str, name: &str) -> Self {
        Value::Field(FieldValue::new(dataset_alias, name))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn function(name: FunctionName, args: Vec<Value>) -> Self {
        Value::Function(Function { name, args })
    }

    /// `COUNT(*)`
    pub fn count_all() -> Self {
        Value::function(FunctionName::Count, vec![Value::All])
    }

    pub fn plus(self, other: Value) -> Self {
        Value::Arithmetic {
            op: ArithmeticOperator::Plus,
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    pub fn with_alias(self, alias: impl Into<String>) -> Self {
        Value::Aliased {
            value: Box::new(self),
            alias: alias.into(),
        }
    }
}

/// A predicate in the logical plan
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
    Equals(Value, Value),
    NotEquals(Value, Value),
    GreaterThan(Value, Value),
    GreaterThanEqualTo(Value, Value),
    LessThan(Value, Value),
    LessThanEqualTo(Value, Value),
    In(Value, Vec<Value>),
    NotIn(Value, Vec<Value>),
    IsNull(Value),
    IsNotNull(Value),
    Exists(Box<Selection>),
}

impl Condition {
    /// Conjunction that collapses to the single operand when there is only one
    pub fn all(mut conditions: Vec<Condition>) -> Condition {
        if conditions.len() == 1 {
            conditions.remove(0)
        } else {
            Condition::And(conditions)
        }
    }

    pub fn negate(self) -> Condition {
        Condition::Not(Box::new(self))
    }

    pub fn exists(selection: Selection) -> Condition {
        Condition::Exists(Box::new(selection))
    }
}
