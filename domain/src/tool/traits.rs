//! Tool domain traits
//!
//! Contains pure domain logic for argument validation.
//! The async ToolExecutorPort is defined in the application layer (ports).

use super::entities::{RAW_ARGUMENTS_KEY, ToolArguments, ToolDescriptor};
use serde_json::Value;

/// Validator for tool arguments
///
/// This is a pure domain trait that checks arguments against a
/// descriptor's parameter schema without any I/O operations.
pub trait ArgumentValidator {
    /// Validate arguments against a descriptor
    fn validate(&self, arguments: &ToolArguments, descriptor: &ToolDescriptor)
    -> Result<(), String>;
}

/// Validator covering the subset of JSON schema that tool descriptors use:
/// `required`, declared `properties` (with `additionalProperties`) and
/// primitive `type` checks.
#[derive(Debug, Clone, Default)]
pub struct SchemaArgumentValidator;

impl ArgumentValidator for SchemaArgumentValidator {
    fn validate(
        &self,
        arguments: &ToolArguments,
        descriptor: &ToolDescriptor,
    ) -> Result<(), String> {
        let properties = descriptor.properties();

        // Unparseable model output only passes if the schema asks for it
        if let Some(raw) = arguments.raw_fallback()
            && !properties.is_some_and(|p| p.contains_key(RAW_ARGUMENTS_KEY))
        {
            return Err(format!("arguments are not a JSON object: {}", raw));
        }

        for name in descriptor.required_parameters() {
            if !arguments.contains_key(name) {
                return Err(format!("missing required argument '{}'", name));
            }
        }

        let Some(properties) = properties else {
            return Ok(());
        };

        for key in arguments.keys() {
            match properties.get(key) {
                Some(schema) => {
                    if let Some(value) = arguments.get(key)
                        && !matches_declared_type(value, schema)
                    {
                        return Err(format!(
                            "argument '{}' should be of type {}",
                            key,
                            describe_type(schema)
                        ));
                    }
                }
                None if !descriptor.allows_additional_properties() => {
                    return Err(format!("unexpected argument '{}'", key));
                }
                None => {}
            }
        }

        Ok(())
    }
}

fn matches_declared_type(value: &Value, schema: &Value) -> bool {
    match schema.get("type") {
        Some(Value::String(t)) => matches_type_name(value, t),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(|t| t.as_str())
            .any(|t| matches_type_name(value, t)),
        _ => true,
    }
}

fn matches_type_name(value: &Value, type_name: &str) -> bool {
    match type_name {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => {
            value.is_i64()
                || value.is_u64()
                || value.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        // Unknown type keywords are not ours to reject
        _ => true,
    }
}

fn describe_type(schema: &Value) -> String {
    match schema.get("type") {
        Some(Value::String(t)) => t.clone(),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(" | "),
        _ => "any".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn save_descriptor() -> ToolDescriptor {
        ToolDescriptor::new("file.save", "Save a file")
            .with_property("path", "string", "Relative path", true)
            .with_property("content", "string", "Text to write", true)
    }

    #[test]
    fn test_validator_missing_required() {
        let args = ToolArguments::new().with("path", "a.txt");
        let err = SchemaArgumentValidator
            .validate(&args, &save_descriptor())
            .unwrap_err();
        assert!(err.contains("missing required argument 'content'"));
    }

    #[test]
    fn test_validator_unknown_param() {
        let args = ToolArguments::new()
            .with("path", "a.txt")
            .with("content", "x")
            .with("mode", "append");
        let err = SchemaArgumentValidator
            .validate(&args, &save_descriptor())
            .unwrap_err();
        assert!(err.contains("unexpected argument 'mode'"));
    }

    #[test]
    fn test_validator_additional_properties_allowed() {
        let descriptor = ToolDescriptor::new("x.y", "").with_parameters(serde_json::json!({
            "type": "object",
            "properties": {},
            "additionalProperties": true
        }));
        let args = ToolArguments::new().with("anything", 1);
        assert!(SchemaArgumentValidator.validate(&args, &descriptor).is_ok());
    }

    #[test]
    fn test_validator_type_mismatch() {
        let descriptor = ToolDescriptor::new("directory.tree", "")
            .with_property("path", "string", "", false)
            .with_property("max_depth", "integer", "", false);

        let args = ToolArguments::new().with("max_depth", "three");
        let err = SchemaArgumentValidator.validate(&args, &descriptor).unwrap_err();
        assert!(err.contains("'max_depth' should be of type integer"));

        let args = ToolArguments::new().with("max_depth", 2.0);
        assert!(SchemaArgumentValidator.validate(&args, &descriptor).is_ok());
    }

    #[test]
    fn test_validator_union_types() {
        let descriptor = ToolDescriptor::new("state.set", "").with_parameters(serde_json::json!({
            "type": "object",
            "properties": { "value": { "type": ["string", "number"] } }
        }));
        assert!(SchemaArgumentValidator
            .validate(&ToolArguments::new().with("value", 3), &descriptor)
            .is_ok());
        assert!(SchemaArgumentValidator
            .validate(&ToolArguments::new().with("value", true), &descriptor)
            .is_err());
    }

    #[test]
    fn test_validator_untyped_property_accepts_anything() {
        let descriptor = ToolDescriptor::new("state.set", "").with_parameters(serde_json::json!({
            "type": "object",
            "properties": { "value": { "description": "any JSON value" } }
        }));
        let args = ToolArguments::new().with("value", serde_json::json!({"nested": [1]}));
        assert!(SchemaArgumentValidator.validate(&args, &descriptor).is_ok());
    }

    #[test]
    fn test_validator_raw_fallback_rejected() {
        let args = ToolArguments::new().with(RAW_ARGUMENTS_KEY, "{oops");
        let err = SchemaArgumentValidator
            .validate(&args, &save_descriptor())
            .unwrap_err();
        assert!(err.contains("not a JSON object"));
    }

    #[test]
    fn test_validator_valid_call() {
        let args = ToolArguments::new()
            .with("path", "a.txt")
            .with("content", "hello");
        assert!(SchemaArgumentValidator.validate(&args, &save_descriptor()).is_ok());
    }
}
