//! Structural validation of remote responses.
//!
//! Every flow declares the shape its response must satisfy. A response with a
//! missing or mistyped required field fails with a `SchemaViolation` instead
//! of turning into a silently-defaulted partial object.

use crate::error::ASError;
use crate::Result;
use serde_json::Value;

#[derive(Clone, Debug)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Array(Box<FieldType>),
    Object(Schema),
}

#[derive(Clone, Debug)]
struct Field {
    name: String,
    kind: FieldType,
    required: bool,
}

#[derive(Clone, Debug, Default)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new() -> Self {
        Schema::default()
    }

    pub fn required(mut self, name: &str, kind: FieldType) -> Self {
        self.fields.push(Field {
            name: name.to_string(),
            kind,
            required: true,
        });
        self
    }

    pub fn optional(mut self, name: &str, kind: FieldType) -> Self {
        self.fields.push(Field {
            name: name.to_string(),
            kind,
            required: false,
        });
        self
    }

    pub fn validate(&self, value: &Value) -> Result<()> {
        self.validate_at(value, "$")
    }

    fn validate_at(&self, value: &Value, path: &str) -> Result<()> {
        let obj = value.as_object().ok_or_else(|| {
            ASError::SchemaViolation(format!("{}: expected an object", path))
        })?;
        for field in &self.fields {
            let field_path = format!("{}.{}", path, field.name);
            match obj.get(&field.name) {
                Some(field_value) => check_type(field_value, &field.kind, &field_path)?,
                None if field.required => {
                    return Err(ASError::SchemaViolation(format!(
                        "{}: required field is missing",
                        field_path
                    ))
                    .into());
                }
                None => {}
            }
        }
        Ok(())
    }
}

fn check_type(value: &Value, kind: &FieldType, path: &str) -> Result<()> {
    match kind {
        FieldType::String => {
            if !value.is_string() {
                return Err(type_violation(path, "string", value));
            }
        }
        FieldType::Number => {
            if !value.is_number() {
                return Err(type_violation(path, "number", value));
            }
        }
        FieldType::Boolean => {
            if !value.is_boolean() {
                return Err(type_violation(path, "boolean", value));
            }
        }
        FieldType::Array(element) => {
            let items = value
                .as_array()
                .ok_or_else(|| type_violation(path, "array", value))?;
            for (index, item) in items.iter().enumerate() {
                check_type(item, element, &format!("{}[{}]", path, index))?;
            }
        }
        FieldType::Object(schema) => schema.validate_at(value, path)?,
    }
    Ok(())
}

fn type_violation(path: &str, expected: &str, value: &Value) -> crate::Error {
    let actual = match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    ASError::SchemaViolation(format!("{}: expected {}, got {}", path, expected, actual)).into()
}
