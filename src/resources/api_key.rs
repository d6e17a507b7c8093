//! `sweet_api_key`: a Sweet API key with a server-generated key and secret.
//!
//! Every configurable attribute forces replacement, so Update only carries
//! the planned state through.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::{decode_state, encode_state, Resource};
use crate::client::SweetApi;
use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};

/// State model of `sweet_api_key`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyModel {
    /// Server-assigned key; unknown until created.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Server-assigned secret; unknown until created.
    #[serde(default)]
    pub secret: Option<String>,
    /// Key description.
    #[serde(default)]
    pub description: String,
    /// Attached roles, in configuration order.
    #[serde(default)]
    pub roles: Option<Vec<String>>,
}

impl std::fmt::Debug for ApiKeyModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyModel")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("description", &self.description)
            .field("roles", &self.roles)
            .finish()
    }
}

/// Handler for `sweet_api_key`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiKeyResource;

fn decode(value: Value) -> Result<ApiKeyModel, ProviderError> {
    decode_state(value, "api key", &["roles"])
}

#[async_trait::async_trait]
impl Resource for ApiKeyResource {
    fn type_suffix(&self) -> &'static str {
        "_api_key"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Api key")
            .with_attribute(
                "api_key",
                Attribute::computed_string()
                    .with_description("Api Key")
                    .sensitive(),
            )
            .with_attribute(
                "secret",
                Attribute::computed_string()
                    .with_description("Api Secret")
                    .sensitive(),
            )
            .with_attribute(
                "description",
                Attribute::required_string()
                    .with_description("Key Description")
                    .with_force_new(),
            )
            .with_attribute(
                "roles",
                Attribute::optional_string_list()
                    .with_description("Attach Roles")
                    .with_force_new(),
            )
    }

    fn identity_attribute(&self) -> &'static str {
        "api_key"
    }

    async fn create(&self, client: &dyn SweetApi, planned: Value) -> Result<Value, ProviderError> {
        let planned = decode(planned)?;
        let roles = planned.roles.clone().unwrap_or_default();

        let created = client
            .create_api_key(&planned.description, &roles)
            .await
            .map_err(|e| ProviderError::api("Cannot create api key", e))?;
        let description = if created.description.is_empty() {
            planned.description
        } else {
            created.description
        };
        info!(description = %description, roles = roles.len(), "API key created");
        let roles = match planned.roles {
            None if created.roles.is_empty() => None,
            _ => Some(created.roles),
        };

        encode_state(&ApiKeyModel {
            api_key: Some(created.api_key),
            secret: Some(created.secret),
            description,
            roles,
        })
    }

    async fn read(&self, _client: &dyn SweetApi, current: Value) -> Result<Value, ProviderError> {
        // Keys cannot be looked up, so the state is echoed.
        Ok(current)
    }

    async fn update(
        &self,
        _client: &dyn SweetApi,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let prior = decode(prior)?;
        let mut model = decode(planned)?;
        model.api_key = model.api_key.or(prior.api_key);
        model.secret = model.secret.or(prior.secret);
        encode_state(&model)
    }

    async fn delete(&self, client: &dyn SweetApi, current: Value) -> Result<(), ProviderError> {
        let model = decode(current)?;
        let api_key = model.api_key.ok_or_else(|| {
            ProviderError::conversion("Cannot delete api key", "state has no api_key")
        })?;

        client
            .delete_api_key(&api_key)
            .await
            .map_err(|e| ProviderError::api("Cannot delete api key", e))?;
        info!(description = %model.description, "API key deleted");

        Ok(())
    }
}
