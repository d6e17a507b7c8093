//! `sweet_aws_account`: connects a single AWS account to Sweet.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::{decode_state, encode_state, Resource};
use crate::client::{AwsAccount, SweetApi};
use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};

/// State model of `sweet_aws_account`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsAccountModel {
    /// AWS account id.
    pub account_id: String,
    /// Role assumed by Sweet.
    pub role_arn: String,
    /// Optional external id.
    #[serde(default)]
    pub external_id: Option<String>,
    /// Optional regions, in configuration order.
    #[serde(default)]
    pub regions: Option<Vec<String>>,
}

impl AwsAccountModel {
    fn to_wire(&self) -> AwsAccount {
        AwsAccount {
            account_id: self.account_id.clone(),
            role_arn: self.role_arn.clone(),
            external_id: self.external_id.clone().unwrap_or_default(),
            regions: self.regions.clone().unwrap_or_default(),
        }
    }
}

/// Handler for `sweet_aws_account`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsAccountResource;

fn decode(value: Value) -> Result<AwsAccountModel, ProviderError> {
    decode_state(value, "aws account", &["regions"])
}

#[async_trait::async_trait]
impl Resource for AwsAccountResource {
    fn type_suffix(&self) -> &'static str {
        "_aws_account"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Aws Account resource")
            .with_attribute(
                "account_id",
                Attribute::required_string()
                    .with_description("Aws Account Id")
                    .with_force_new(),
            )
            .with_attribute(
                "role_arn",
                Attribute::required_string().with_description("Aws Role Arn"),
            )
            .with_attribute(
                "external_id",
                Attribute::optional_string().with_description("Aws External Id"),
            )
            .with_attribute(
                "regions",
                Attribute::optional_string_list().with_description("Aws Regions"),
            )
    }

    fn identity_attribute(&self) -> &'static str {
        "account_id"
    }

    async fn create(&self, client: &dyn SweetApi, planned: Value) -> Result<Value, ProviderError> {
        let model = decode(planned)?;

        client
            .add_aws_account(&model.to_wire())
            .await
            .map_err(|e| ProviderError::api("Cannot add account", e))?;
        info!(account_id = %model.account_id, "AWS account added");

        encode_state(&model)
    }

    async fn read(&self, _client: &dyn SweetApi, current: Value) -> Result<Value, ProviderError> {
        // No drift check: the state is echoed, so an imported account keeps
        // only its id until the next apply.
        Ok(current)
    }

    async fn update(
        &self,
        client: &dyn SweetApi,
        _prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let model = decode(planned)?;

        client
            .update_aws_account(&model.to_wire())
            .await
            .map_err(|e| ProviderError::api("Cannot update account", e))?;
        info!(account_id = %model.account_id, "AWS account updated");

        encode_state(&model)
    }

    async fn delete(&self, client: &dyn SweetApi, current: Value) -> Result<(), ProviderError> {
        let model = decode(current)?;

        client
            .delete_aws_account(&model.account_id)
            .await
            .map_err(|e| ProviderError::api("Cannot delete account", e))?;
        info!(account_id = %model.account_id, "AWS account deleted");

        Ok(())
    }
}
