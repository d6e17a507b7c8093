//! Wire models exchanged with the Sweet API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Body of the create API key call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApiKeyRequest<'a> {
    /// Key description.
    pub description: &'a str,
    /// Roles attached to the key.
    pub roles: &'a [String],
}

/// An API key as returned by the create call.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    /// Server-assigned key.
    pub api_key: String,
    /// Server-assigned secret.
    pub secret: String,
    /// Key description.
    #[serde(default)]
    pub description: String,
    /// Roles attached to the key.
    #[serde(default)]
    pub roles: Vec<String>,
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("api_key", &"<redacted>")
            .field("secret", &"<redacted>")
            .field("description", &self.description)
            .field("roles", &self.roles)
            .finish()
    }
}

/// An AWS account integration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsAccount {
    /// AWS account id.
    pub account_id: String,
    /// Role assumed by Sweet in the account.
    pub role_arn: String,
    /// External id used when assuming the role; empty when unset.
    #[serde(default)]
    pub external_id: String,
    /// Regions to monitor; empty means all.
    #[serde(default)]
    pub regions: Vec<String>,
}

/// An AWS organization integration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsOrganization {
    /// Root account id of the organization.
    pub account_id: String,
    /// Role assumed by Sweet in the root account.
    pub role_arn: String,
    /// ARN of the SSM parameter holding the member role name.
    pub role_name_parameter_arn: String,
    /// External id used when assuming the role; empty when unset.
    #[serde(default)]
    pub external_id: String,
    /// Regions to monitor; empty means all.
    #[serde(default)]
    pub regions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_organization_wire_shape() {
        let org = AwsOrganization {
            account_id: "123456789012".to_string(),
            role_arn: "arn:aws:iam::123456789012:role/sweet".to_string(),
            role_name_parameter_arn: "arn:aws:ssm:us-east-1:123456789012:parameter/role".to_string(),
            external_id: String::new(),
            regions: vec!["us-east-1".to_string()],
        };

        assert_eq!(
            serde_json::to_value(&org).unwrap(),
            json!({
                "accountId": "123456789012",
                "roleArn": "arn:aws:iam::123456789012:role/sweet",
                "roleNameParameterArn": "arn:aws:ssm:us-east-1:123456789012:parameter/role",
                "externalId": "",
                "regions": ["us-east-1"]
            })
        );
    }

    #[test]
    fn test_account_missing_optional_fields() {
        let account: AwsAccount = serde_json::from_value(json!({
            "accountId": "123456789012",
            "roleArn": "arn"
        }))
        .unwrap();
        assert!(account.external_id.is_empty());
        assert!(account.regions.is_empty());
    }

    #[test]
    fn test_api_key_debug_redacts() {
        let key = ApiKey {
            api_key: "ak-123".to_string(),
            secret: "sk-456".to_string(),
            description: "ci".to_string(),
            roles: vec![],
        };
        let debug = format!("{:?}", key);
        assert!(!debug.contains("ak-123"));
        assert!(!debug.contains("sk-456"));
        assert!(debug.contains("ci"));
    }
}
