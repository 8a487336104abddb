// Project Gate - Tool Input Shapes
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Each tool declares its arguments once. The same declaration produces the
// MCP inputSchema advertised in tools/list and validates incoming calls
// (requiredness, primitive type, enum membership, defaults).

use crate::error::ToolError;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

/// Accepted primitive shape for one argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Boolean,
    Object,
    /// String restricted to a fixed set
    OneOf(&'static [&'static str]),
}

impl FieldType {
    fn schema(&self) -> Value {
        match self {
            Self::String => json!({"type": "string"}),
            Self::Boolean => json!({"type": "boolean"}),
            Self::Object => json!({"type": "object"}),
            Self::OneOf(allowed) => json!({"type": "string", "enum": allowed}),
        }
    }

    fn check(&self, name: &str, value: &Value) -> Result<(), ToolError> {
        let ok = match self {
            Self::String => value.is_string(),
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object(),
            Self::OneOf(allowed) => {
                let Some(s) = value.as_str() else {
                    return Err(type_error(name, "string", value));
                };
                if !allowed.contains(&s) {
                    return Err(ToolError::Shape(format!(
                        "Field `{}` must be one of: {}; got {:?}",
                        name,
                        allowed.join(", "),
                        s
                    )));
                }
                true
            }
        };
        if ok {
            Ok(())
        } else {
            Err(type_error(name, self.label(), value))
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::String | Self::OneOf(_) => "string",
            Self::Boolean => "boolean",
            Self::Object => "object",
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn type_error(name: &str, expected: &str, got: &Value) -> ToolError {
    ToolError::Shape(format!("Field `{}` expected {}, got {}", name, expected, json_type(got)))
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldType,
    pub description: &'static str,
    pub required: bool,
    pub default: Option<Value>,
}

impl Field {
    pub fn required(name: &'static str, kind: FieldType, description: &'static str) -> Self {
        Self { name, kind, description, required: true, default: None }
    }

    pub fn optional(name: &'static str, kind: FieldType, description: &'static str) -> Self {
        Self { name, kind, description, required: false, default: None }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// Name, description and input shape of one tool
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub fields: Vec<Field>,
}

impl ToolSpec {
    pub fn new(name: &'static str, description: &'static str, fields: Vec<Field>) -> Self {
        Self { name, description, fields }
    }

    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            let mut prop = field.kind.schema();
            if let Some(obj) = prop.as_object_mut() {
                obj.insert("description".to_string(), json!(field.description));
                if let Some(default) = &field.default {
                    obj.insert("default".to_string(), default.clone());
                }
            }
            properties.insert(field.name.to_string(), prop);
        }
        let required: Vec<&str> = self.fields.iter().filter(|f| f.required).map(|f| f.name).collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// MCP tool definition as advertised in tools/list
    pub fn definition(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema(),
        })
    }

    /// Check `args` against the declared shape.
    /// Returns only declared fields, with defaults filled in. Unknown keys
    /// are dropped; `null` counts as absent.
    pub fn validate(&self, args: &Value) -> Result<Map<String, Value>, ToolError> {
        let empty = Map::new();
        let input = match args {
            Value::Null => &empty,
            Value::Object(map) => map,
            other => {
                return Err(ToolError::Shape(format!(
                    "Arguments for {} must be an object, got {}",
                    self.name,
                    json_type(other)
                )))
            }
        };

        let mut out = Map::new();
        for field in &self.fields {
            match input.get(field.name).filter(|v| !v.is_null()) {
                Some(value) => {
                    field.kind.check(field.name, value)?;
                    out.insert(field.name.to_string(), value.clone());
                }
                None if field.required => {
                    return Err(ToolError::Shape(format!("Missing required field `{}`", field.name)));
                }
                None => {
                    if let Some(default) = &field.default {
                        out.insert(field.name.to_string(), default.clone());
                    }
                }
            }
        }
        Ok(out)
    }
}

/// Deserialize validated arguments into a handler's typed argument struct
pub fn parse_args<T: DeserializeOwned>(args: Map<String, Value>) -> Result<T, ToolError> {
    serde_json::from_value(Value::Object(args))
        .map_err(|e| ToolError::Shape(format!("Invalid arguments: {}", e)))
}

// ============================================================================
// TESTS
// ============================================================================
