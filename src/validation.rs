//! Schema validation helpers.
//!
//! Validates a `serde_json::Value` against a [`Schema`] and reports every
//! problem as a [`Diagnostic`] pointing at the offending attribute.
//!
//! # Example
//!
//! ```
//! use sweet_provider::schema::{Attribute, Schema};
//! use sweet_provider::validation::validate;
//! use serde_json::json;
//!
//! let schema = Schema::v0()
//!     .with_attribute("account_id", Attribute::required_string())
//!     .with_attribute("regions", Attribute::optional_string_list());
//!
//! let diagnostics = validate(&schema, &json!({"account_id": "123456789012"}));
//! assert!(diagnostics.is_empty());
//!
//! let diagnostics = validate(&schema, &json!({"account_id": "1", "regions": "us-east-1"}));
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].attribute, Some("regions".to_string()));
//! ```

use crate::schema::{Attribute, AttributeType, Diagnostic, Schema};
use serde_json::Value;

/// Validate a JSON value against a schema.
///
/// Returns a list of diagnostics for any validation errors found.
/// An empty list means the value is valid.
///
/// # Validation Rules
///
/// - The value must be an object
/// - Required attributes must be present and non-null
/// - Computed-only attributes may not be set in configuration
/// - Attribute types must match the schema
/// - Attributes not declared in the schema are rejected
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let obj = match value {
        Value::Object(map) => map,
        _ => {
            diagnostics.push(
                Diagnostic::error("Expected object")
                    .with_detail(format!("Got {}", value_type_name(value))),
            );
            return diagnostics;
        },
    };

    for (name, attr) in &schema.attributes {
        validate_attribute(attr, obj.get(name), name, &mut diagnostics);
    }

    for name in obj.keys() {
        if !schema.attributes.contains_key(name) {
            diagnostics.push(
                Diagnostic::error(format!("Unsupported attribute '{}'", name))
                    .with_detail("An attribute with this name is not expected here")
                    .with_attribute(name.as_str()),
            );
        }
    }

    diagnostics
}

fn validate_attribute(
    attr: &Attribute,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match value {
        None | Some(Value::Null) => {
            if attr.flags.required {
                diagnostics.push(
                    Diagnostic::error(format!("Missing required attribute '{}'", path))
                        .with_detail("This attribute is required and must be provided")
                        .with_attribute(path),
                );
            }
        },
        Some(_) if attr.flags.is_computed_only() => {
            diagnostics.push(
                Diagnostic::error(format!("Value for unconfigurable attribute '{}'", path))
                    .with_detail("This attribute is set by the provider and cannot be configured")
                    .with_attribute(path),
            );
        },
        Some(v) => validate_attribute_type(&attr.attr_type, v, path, diagnostics),
    }
}

fn validate_attribute_type(
    attr_type: &AttributeType,
    value: &Value,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match attr_type {
        AttributeType::String => {
            if !value.is_string() {
                diagnostics.push(type_error(path, "string", value));
            }
        },
        AttributeType::List(element_type) => {
            if let Some(arr) = value.as_array() {
                for (i, elem) in arr.iter().enumerate() {
                    let elem_path = format!("{}.{}", path, i);
                    validate_attribute_type(element_type, elem, &elem_path, diagnostics);
                }
            } else {
                diagnostics.push(type_error(path, "list", value));
            }
        },
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn type_error(path: &str, expected: &str, got: &Value) -> Diagnostic {
    Diagnostic::error(format!("Invalid type for '{}'", path))
        .with_detail(format!(
            "Expected {}, got {}",
            expected,
            value_type_name(got)
        ))
        .with_attribute(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn account_schema() -> Schema {
        Schema::v0()
            .with_attribute("account_id", Attribute::required_string())
            .with_attribute("role_arn", Attribute::required_string())
            .with_attribute("external_id", Attribute::optional_string())
            .with_attribute("regions", Attribute::optional_string_list())
    }

    #[test]
    fn test_validate_required_string() {
        let diagnostics = validate(&account_schema(), &json!({"role_arn": "arn:aws:iam::1:role/x"}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("account_id"));
        assert!(diagnostics[0].summary.contains("Missing required"));

        let diagnostics = validate(
            &account_schema(),
            &json!({"account_id": null, "role_arn": "arn"}),
        );
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_validate_optional_attributes_may_be_absent() {
        let input = json!({"account_id": "123456789012", "role_arn": "arn", "external_id": null});
        assert!(validate(&account_schema(), &input).is_empty());
    }

    #[test]
    fn test_validate_string_list() {
        let input = json!({
            "account_id": "123456789012",
            "role_arn": "arn",
            "regions": ["us-east-1", 7]
        });
        let diagnostics = validate(&account_schema(), &input);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("regions.1"));

        let input = json!({"account_id": "1", "role_arn": "arn", "regions": "us-east-1"});
        let diagnostics = validate(&account_schema(), &input);
        assert_eq!(diagnostics[0].detail.as_deref(), Some("Expected list, got string"));
    }

    #[test]
    fn test_validate_computed_attribute_cannot_be_configured() {
        let schema = Schema::v0()
            .with_attribute("description", Attribute::required_string())
            .with_attribute("secret", Attribute::computed_string().sensitive());

        assert!(validate(&schema, &json!({"description": "ci"})).is_empty());

        let diagnostics = validate(&schema, &json!({"description": "ci", "secret": "s3cr3t"}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("secret"));
    }

    #[test]
    fn test_validate_unknown_attribute() {
        let input = json!({"account_id": "1", "role_arn": "arn", "region": "us-east-1"});
        let diagnostics = validate(&account_schema(), &input);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Unsupported attribute 'region'"));
    }

    #[test]
    fn test_validate_multiple_errors() {
        let diagnostics = validate(&account_schema(), &json!({"regions": [1]}));
        assert_eq!(diagnostics.len(), 3);
    }

    #[test]
    fn test_validate_root_not_object() {
        let diagnostics = validate(&account_schema(), &json!(["not", "an", "object"]));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Expected object");
        assert!(diagnostics[0].attribute.is_none());
    }
}
