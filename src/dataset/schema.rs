//! Fields and schema definitions

use serde::{Deserialize, Serialize};

use super::types::DataType;
use crate::error::BuildError;

/// A single column of a dataset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default, rename = "primaryKey")]
    pub primary_key: bool,
    #[serde(default)]
    pub unique: bool,
}

fn default_nullable() -> bool {
    true
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            primary_key: false,
            unique: false,
        }
    }

    /// Mark the field as part of the primary key. Key fields are never nullable.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// True when the rendered column carries `NOT NULL`
    pub fn is_not_null(&self) -> bool {
        self.primary_key || !self.nullable
    }
}

/// Ordered, name-unique list of fields
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Field>", into = "Vec<Field>")]
pub struct SchemaDefinition {
    fields: Vec<Field>,
}

impl SchemaDefinition {
    pub fn new(fields: Vec<Field>) -> Result<Self, BuildError> {
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(BuildError::DuplicateField(field.name.clone()));
            }
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Zero-based ordinal position of a field
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Primary key fields in declaration order
    pub fn primary_keys(&self) -> Vec<&Field> {
        self.fields.iter().filter(|f| f.primary_key).collect()
    }

    /// Return a copy with `field` appended. Fails if the name is taken.
    pub fn with_field(&self, field: Field) -> Result<Self, BuildError> {
        let mut fields = self.fields.clone();
        fields.push(field);
        Self::new(fields)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl TryFrom<Vec<Field>> for SchemaDefinition {
    type Error = BuildError;

    fn try_from(fields: Vec<Field>) -> Result<Self, Self::Error> {
        SchemaDefinition::new(fields)
    }
}

impl From<SchemaDefinition> for Vec<Field> {
    fn from(schema: SchemaDefinition) -> Self {
        schema.fields
    }
}
