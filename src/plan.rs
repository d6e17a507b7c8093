//! Schema-driven planning.
//!
//! Given a resource schema, the prior state (if the resource exists) and the
//! proposed state from configuration, computes the planned state, the list of
//! attribute changes and whether the change requires a replacement.

use serde_json::{Map, Value};

use crate::schema::Schema;
use crate::types::{AttributeChange, PlanResult};

/// Plan a change for a single resource instance.
///
/// - No prior state: plans a create. Computed-only attributes are `null`
///   (unknown until the resource is created).
/// - Proposed state `null`: plans a destroy.
/// - Otherwise: plans an update, which becomes a replacement when any
///   `force_new` attribute differs from the prior state. Computed-only
///   attributes keep their prior values unless the resource is replaced.
pub fn plan_resource(schema: &Schema, prior: Option<&Value>, proposed: &Value) -> PlanResult {
    let prior = prior.and_then(Value::as_object);

    if proposed.is_null() {
        return plan_destroy(schema, prior);
    }

    let empty = Map::new();
    let proposed = proposed.as_object().unwrap_or(&empty);

    let mut planned = Map::new();
    for (name, attr) in &schema.attributes {
        if attr.flags.is_computed_only() {
            continue;
        }
        let mut value = attribute_value(proposed, name);
        if value.is_null() {
            if let Some(default) = &attr.default {
                value = default.clone();
            }
        }
        planned.insert(name.clone(), value);
    }

    let requires_replace = prior.is_some_and(|prior| {
        schema.attributes.iter().any(|(name, attr)| {
            attr.force_new
                && !attr.flags.is_computed_only()
                && attribute_value(prior, name) != attribute_value(&planned, name)
        })
    });

    for (name, attr) in &schema.attributes {
        if !attr.flags.is_computed_only() {
            continue;
        }
        let value = match prior {
            Some(prior) if !requires_replace => attribute_value(prior, name),
            _ => Value::Null,
        };
        planned.insert(name.clone(), value);
    }

    let mut changes = Vec::new();
    for name in schema.attributes.keys() {
        let before = prior
            .map(|prior| attribute_value(prior, name))
            .unwrap_or(Value::Null);
        let after = attribute_value(&planned, name);
        if let Some(change) = diff(name, before, after) {
            changes.push(change);
        }
    }

    PlanResult::with_changes(Value::Object(planned), changes, requires_replace)
}

fn plan_destroy(schema: &Schema, prior: Option<&Map<String, Value>>) -> PlanResult {
    let changes = match prior {
        Some(prior) => schema
            .attributes
            .keys()
            .filter_map(|name| diff(name, attribute_value(prior, name), Value::Null))
            .collect(),
        None => Vec::new(),
    };
    PlanResult::with_changes(Value::Null, changes, false)
}

fn diff(name: &str, before: Value, after: Value) -> Option<AttributeChange> {
    if before == after {
        return None;
    }
    Some(match (before.is_null(), after.is_null()) {
        (true, _) => AttributeChange::added(name, after),
        (_, true) => AttributeChange::removed(name, before),
        _ => AttributeChange::modified(name, before, after),
    })
}

fn attribute_value(obj: &Map<String, Value>, name: &str) -> Value {
    obj.get(name).cloned().unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Attribute;
    use serde_json::json;

    fn api_key_schema() -> Schema {
        Schema::v0()
            .with_attribute("api_key", Attribute::computed_string().sensitive())
            .with_attribute("secret", Attribute::computed_string().sensitive())
            .with_attribute("description", Attribute::required_string().with_force_new())
            .with_attribute(
                "roles",
                Attribute::optional_string_list().with_force_new(),
            )
    }

    fn account_schema() -> Schema {
        Schema::v0()
            .with_attribute("account_id", Attribute::required_string().with_force_new())
            .with_attribute("role_arn", Attribute::required_string())
            .with_attribute("external_id", Attribute::optional_string())
            .with_attribute("regions", Attribute::optional_string_list())
    }

    #[test]
    fn test_plan_create_marks_computed_unknown() {
        let plan = plan_resource(
            &api_key_schema(),
            None,
            &json!({"description": "ci pipeline", "roles": ["admin"]}),
        );

        assert!(!plan.requires_replace);
        assert!(plan.planned_state["api_key"].is_null());
        assert!(plan.planned_state["secret"].is_null());
        assert_eq!(plan.planned_state["description"], "ci pipeline");

        let paths: Vec<_> = plan.changes.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["description", "roles"]);
    }

    #[test]
    fn test_plan_update_in_place() {
        let prior = json!({
            "account_id": "123456789012",
            "role_arn": "arn:aws:iam::123456789012:role/x",
            "external_id": null,
            "regions": ["us-east-1"]
        });
        let proposed = json!({
            "account_id": "123456789012",
            "role_arn": "arn:aws:iam::123456789012:role/x",
            "regions": ["us-east-1", "eu-west-1"]
        });

        let plan = plan_resource(&account_schema(), Some(&prior), &proposed);
        assert!(!plan.requires_replace);
        assert_eq!(plan.changes.len(), 1);
        assert_eq!(plan.changes[0].path, "regions");
        assert_eq!(plan.planned_state["regions"], json!(["us-east-1", "eu-west-1"]));
    }

    #[test]
    fn test_plan_identity_change_requires_replace() {
        let prior = json!({"account_id": "111111111111", "role_arn": "arn"});
        let proposed = json!({"account_id": "222222222222", "role_arn": "arn"});

        let plan = plan_resource(&account_schema(), Some(&prior), &proposed);
        assert!(plan.requires_replace);
        assert_eq!(
            plan.changes,
            vec![AttributeChange::modified(
                "account_id",
                json!("111111111111"),
                json!("222222222222")
            )]
        );
    }

    #[test]
    fn test_plan_replace_resets_computed_attributes() {
        let prior = json!({
            "api_key": "key-1",
            "secret": "secret-1",
            "description": "old",
            "roles": null
        });
        let proposed = json!({"description": "new"});

        let plan = plan_resource(&api_key_schema(), Some(&prior), &proposed);
        assert!(plan.requires_replace);
        assert!(plan.planned_state["api_key"].is_null());
        assert!(plan.planned_state["secret"].is_null());
    }

    #[test]
    fn test_plan_no_change_keeps_computed_attributes() {
        let prior = json!({
            "api_key": "key-1",
            "secret": "secret-1",
            "description": "ci",
            "roles": ["viewer"]
        });
        let proposed = json!({"description": "ci", "roles": ["viewer"]});

        let plan = plan_resource(&api_key_schema(), Some(&prior), &proposed);
        assert!(plan.changes.is_empty());
        assert!(!plan.requires_replace);
        assert_eq!(plan.planned_state, prior);
    }

    #[test]
    fn test_plan_destroy() {
        let prior = json!({"account_id": "1", "role_arn": "arn", "external_id": null});
        let plan = plan_resource(&account_schema(), Some(&prior), &Value::Null);

        assert!(plan.is_destroy());
        let paths: Vec<_> = plan.changes.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["account_id", "role_arn"]);
    }

    #[test]
    fn test_plan_applies_defaults() {
        let schema = Schema::v0()
            .with_attribute("env", Attribute::optional_string().with_default(json!("prod")));
        let plan = plan_resource(&schema, None, &json!({}));
        assert_eq!(plan.planned_state["env"], "prod");
    }
}
