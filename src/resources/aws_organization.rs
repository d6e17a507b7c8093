//! `sweet_aws_organization`: connects an AWS organization through its root account.
//!
//! Unlike the other resources, Read refreshes state from the API so drift in
//! the remote integration shows up in the next plan.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::{decode_state, encode_state, Resource};
use crate::client::{AwsOrganization, SweetApi};
use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};

/// State model of `sweet_aws_organization`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsOrganizationModel {
    /// Root account id.
    pub account_id: String,
    /// Role assumed by Sweet in the root account.
    #[serde(default)]
    pub role_arn: String,
    /// ARN of the parameter holding the member role name.
    #[serde(default)]
    pub role_name_parameter_arn: String,
    /// Optional external id.
    #[serde(default)]
    pub external_id: Option<String>,
    /// Optional regions, in configuration order.
    #[serde(default)]
    pub regions: Option<Vec<String>>,
}

impl AwsOrganizationModel {
    fn to_wire(&self) -> AwsOrganization {
        AwsOrganization {
            account_id: self.account_id.clone(),
            role_arn: self.role_arn.clone(),
            role_name_parameter_arn: self.role_name_parameter_arn.clone(),
            external_id: self.external_id.clone().unwrap_or_default(),
            regions: self.regions.clone().unwrap_or_default(),
        }
    }

    /// Overwrite this model with the server's view.
    ///
    /// Empty optional values from the server stay `null` when they were
    /// `null` before, so an unset attribute does not show a diff.
    fn refresh_from(self, remote: AwsOrganization) -> Self {
        let external_id = match (self.external_id, remote.external_id) {
            (None, value) if value.is_empty() => None,
            (_, value) => Some(value),
        };
        let regions = match (self.regions, remote.regions) {
            (None, value) if value.is_empty() => None,
            (_, value) => Some(value),
        };

        Self {
            account_id: remote.account_id,
            role_arn: remote.role_arn,
            role_name_parameter_arn: remote.role_name_parameter_arn,
            external_id,
            regions,
        }
    }
}

/// Handler for `sweet_aws_organization`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsOrganizationResource;

fn decode(value: Value) -> Result<AwsOrganizationModel, ProviderError> {
    decode_state(value, "aws organization", &["regions"])
}

#[async_trait::async_trait]
impl Resource for AwsOrganizationResource {
    fn type_suffix(&self) -> &'static str {
        "_aws_organization"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Aws Organization resource")
            .with_attribute(
                "account_id",
                Attribute::required_string()
                    .with_description("Aws Root Account Id")
                    .with_force_new(),
            )
            .with_attribute(
                "role_arn",
                Attribute::required_string().with_description("Aws Role Arn"),
            )
            .with_attribute(
                "role_name_parameter_arn",
                Attribute::required_string().with_description("Aws Role Name Parameter Arn"),
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
            .add_aws_organization(&model.to_wire())
            .await
            .map_err(|e| ProviderError::api("Cannot add organization", e))?;
        info!(account_id = %model.account_id, "AWS organization added");

        encode_state(&model)
    }

    async fn read(&self, client: &dyn SweetApi, current: Value) -> Result<Value, ProviderError> {
        if current.is_null() {
            return Ok(Value::Null);
        }
        let model = decode(current)?;

        let remote = match client.get_aws_organization(&model.account_id).await {
            Ok(remote) => remote,
            Err(e) if e.is_not_found() => {
                warn!(account_id = %model.account_id, "AWS organization no longer exists, removing from state");
                return Ok(Value::Null);
            },
            Err(e) => return Err(ProviderError::api("Cannot read organization", e)),
        };

        encode_state(&model.refresh_from(remote))
    }

    async fn update(
        &self,
        client: &dyn SweetApi,
        _prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let model = decode(planned)?;

        client
            .update_aws_organization(&model.to_wire())
            .await
            .map_err(|e| ProviderError::api("Cannot update organization", e))?;
        info!(account_id = %model.account_id, "AWS organization updated");

        encode_state(&model)
    }

    async fn delete(&self, client: &dyn SweetApi, current: Value) -> Result<(), ProviderError> {
        let model = decode(current)?;

        client
            .delete_aws_organization(&model.account_id)
            .await
            .map_err(|e| ProviderError::api("Cannot delete organization", e))?;
        info!(account_id = %model.account_id, "AWS organization deleted");

        Ok(())
    }
}
