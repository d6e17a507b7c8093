//! Convenience types over the raw protobuf messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A change to a single attribute during a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// The attribute name.
    pub path: String,
    /// The value before the change (None if the attribute is being added).
    pub before: Option<Value>,
    /// The value after the change (None if the attribute is being removed).
    pub after: Option<Value>,
}

impl AttributeChange {
    /// Create a new attribute change.
    pub fn new(path: impl Into<String>, before: Option<Value>, after: Option<Value>) -> Self {
        Self {
            path: path.into(),
            before,
            after,
        }
    }

    /// Create a change for a new attribute.
    pub fn added(path: impl Into<String>, value: Value) -> Self {
        Self::new(path, None, Some(value))
    }

    /// Create a change for a removed attribute.
    pub fn removed(path: impl Into<String>, value: Value) -> Self {
        Self::new(path, Some(value), None)
    }

    /// Create a change for a modified attribute.
    pub fn modified(path: impl Into<String>, before: Value, after: Value) -> Self {
        Self::new(path, Some(before), Some(after))
    }
}

fn decode_optional(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        None
    } else {
        serde_json::from_slice(bytes).ok()
    }
}

fn encode_optional(value: Option<Value>) -> Vec<u8> {
    value
        .and_then(|v| serde_json::to_vec(&v).ok())
        .unwrap_or_default()
}

impl From<crate::generated::AttributeChange> for AttributeChange {
    fn from(proto: crate::generated::AttributeChange) -> Self {
        Self {
            path: proto.path,
            before: decode_optional(&proto.before),
            after: decode_optional(&proto.after),
        }
    }
}

impl From<AttributeChange> for crate::generated::AttributeChange {
    fn from(change: AttributeChange) -> Self {
        Self {
            path: change.path,
            before: encode_optional(change.before),
            after: encode_optional(change.after),
        }
    }
}

/// The result of a plan operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// The planned state after apply. `null` plans a destroy, and `null`
    /// attribute values are unknown until apply.
    pub planned_state: Value,
    /// The list of attribute changes.
    pub changes: Vec<AttributeChange>,
    /// Whether the resource must be destroyed and created again.
    pub requires_replace: bool,
}

impl PlanResult {
    /// Create a plan result with changes.
    pub fn with_changes(
        planned_state: Value,
        changes: Vec<AttributeChange>,
        requires_replace: bool,
    ) -> Self {
        Self {
            planned_state,
            changes,
            requires_replace,
        }
    }

    /// Whether this plan destroys the resource.
    pub fn is_destroy(&self) -> bool {
        self.planned_state.is_null()
    }
}

/// An imported resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedResource {
    /// The resource type.
    pub resource_type: String,
    /// The imported state, holding only the identity attribute.
    pub state: Value,
}

impl ImportedResource {
    /// Create a new imported resource.
    pub fn new(resource_type: impl Into<String>, state: Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            state,
        }
    }
}

/// Provider metadata returned by GetMetadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    /// Provider type name, used as the prefix of every resource type name.
    pub type_name: String,
    /// Provider release version.
    pub version: String,
    /// List of resource type names.
    pub resources: Vec<String>,
    /// Server capabilities.
    pub capabilities: ServerCapabilities,
}

/// Server capability flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ServerCapabilities {
    /// Whether the provider supports planning destroy operations.
    pub plan_destroy: bool,
}

/// The protocol version for the handshake.
pub const PROTOCOL_VERSION: u32 = 1;

/// The handshake prefix written to stdout on startup.
pub const HANDSHAKE_PREFIX: &str = "PROVIDER_PLUGIN";

/// Format the handshake line announced on stdout.
pub fn handshake_line(addr: std::net::SocketAddr) -> String {
    format!("{}|{}|{}", HANDSHAKE_PREFIX, PROTOCOL_VERSION, addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attribute_change_constructors() {
        let added = AttributeChange::added("account_id", json!("123456789012"));
        assert!(added.before.is_none());
        assert_eq!(added.after, Some(json!("123456789012")));

        let removed = AttributeChange::removed("external_id", json!("ext"));
        assert_eq!(removed.before, Some(json!("ext")));
        assert!(removed.after.is_none());

        let modified =
            AttributeChange::modified("regions", json!(["us-east-1"]), json!(["eu-west-1"]));
        assert_eq!(modified.before, Some(json!(["us-east-1"])));
        assert_eq!(modified.after, Some(json!(["eu-west-1"])));
    }

    #[test]
    fn test_attribute_change_proto_keeps_absent_sides_empty() {
        let proto: crate::generated::AttributeChange =
            AttributeChange::added("role_arn", json!("arn:aws:iam::1:role/x")).into();
        assert_eq!(proto.path, "role_arn");
        assert!(proto.before.is_empty());
        assert!(!proto.after.is_empty());

        let back: AttributeChange = proto.into();
        assert!(back.before.is_none());
        assert_eq!(back.after, Some(json!("arn:aws:iam::1:role/x")));
    }

    #[test]
    fn test_plan_result() {
        let update = PlanResult::with_changes(
            json!({"account_id": "1", "role_arn": "arn:aws:iam::1:role/y"}),
            vec![AttributeChange::modified(
                "role_arn",
                json!("arn:aws:iam::1:role/x"),
                json!("arn:aws:iam::1:role/y"),
            )],
            false,
        );
        assert!(!update.is_destroy());

        let destroy = PlanResult::with_changes(
            Value::Null,
            vec![AttributeChange::removed("account_id", json!("1"))],
            false,
        );
        assert!(destroy.is_destroy());
    }

    #[test]
    fn test_handshake_line() {
        let addr: std::net::SocketAddr = "127.0.0.1:50051".parse().unwrap();
        assert_eq!(handshake_line(addr), "PROVIDER_PLUGIN|1|127.0.0.1:50051");
    }
}
