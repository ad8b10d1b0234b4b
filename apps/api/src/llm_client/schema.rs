//! Local enforcement of structured-output schemas.
//!
//! Response schemas are written in the generation service's OpenAPI subset
//! (`OBJECT`, `ARRAY`, `STRING`, ...). `validate` translates one into standard
//! JSON Schema and checks the parsed response with `jsonschema`.
//!
//! Optional properties may come back as `null`; required ones may not.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("response violates schema: {}", .errors.join("; "))]
pub struct SchemaViolation {
    /// One entry per failed check, `"{json pointer}: {message}"`.
    pub errors: Vec<String>,
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid response schema: {0}")]
    Invalid(String),

    #[error(transparent)]
    Violation(#[from] SchemaViolation),
}

/// Validates `value` against a response schema.
pub fn validate(value: &Value, schema: &Value) -> Result<(), SchemaError> {
    let validator = jsonschema::validator_for(&to_json_schema(schema))
        .map_err(|e| SchemaError::Invalid(e.to_string()))?;

    let errors: Vec<String> = validator
        .iter_errors(value)
        .map(|e| {
            let pointer = e.instance_path.to_string();
            let location = if pointer.is_empty() { "/" } else { pointer.as_str() };
            format!("{location}: {e}")
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SchemaViolation { errors }.into())
    }
}

/// Lowercases `type` names and lets non-required properties be `null`.
fn to_json_schema(schema: &Value) -> Value {
    let Value::Object(node) = schema else {
        return schema.clone();
    };

    let mut out = serde_json::Map::with_capacity(node.len());
    for (key, child) in node {
        let converted = match (key.as_str(), child) {
            ("type", Value::String(kind)) => Value::String(kind.to_ascii_lowercase()),
            ("properties", Value::Object(properties)) => Value::Object(
                properties
                    .iter()
                    .map(|(name, property)| (name.clone(), to_json_schema(property)))
                    .collect(),
            ),
            ("items", _) => to_json_schema(child),
            _ => child.clone(),
        };
        out.insert(key.clone(), converted);
    }

    let required: Vec<String> = out
        .get("required")
        .and_then(Value::as_array)
        .map(|r| r.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default();
    if let Some(Value::Object(properties)) = out.get_mut("properties") {
        for (name, property) in properties.iter_mut() {
            if required.contains(name) {
                continue;
            }
            if let Some(kind) = property.get("type").and_then(Value::as_str) {
                let nullable = serde_json::json!([kind, "null"]);
                property["type"] = nullable;
            }
            if let Some(Value::Array(allowed)) = property.get_mut("enum") {
                allowed.push(Value::Null);
            }
        }
    }

    Value::Object(out)
}
