//! The Sweet provider: configuration bootstrap and resource dispatch.

use std::sync::{Arc, OnceLock};

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::client::{HttpClient, SweetApi};
use crate::config::{defaults, ProviderConfig};
use crate::error::ProviderError;
use crate::plan::plan_resource;
use crate::resources::{self, Resource};
use crate::schema::{has_errors, Attribute, Diagnostic, ProviderSchema, Schema};
use crate::server::ProviderService;
use crate::types::{ImportedResource, PlanResult, ProviderMetadata};
use crate::validation::validate;

/// Type name of the provider and prefix of every resource type name.
pub const PROVIDER_TYPE_NAME: &str = "sweet";

/// Schema of the provider block.
pub fn provider_config_schema() -> Schema {
    Schema::v0()
        .with_attribute(
            "api_key",
            Attribute::required_string()
                .with_description("Sweet Api Key")
                .sensitive(),
        )
        .with_attribute(
            "secret",
            Attribute::required_string()
                .with_description("Sweet Api Secret")
                .sensitive(),
        )
        .with_attribute(
            "env",
            Attribute::optional_string()
                .with_description("Sweet environment to use")
                .with_default(json!(defaults::ENV)),
        )
        .with_attribute(
            "subenv",
            Attribute::optional_string()
                .with_description("Sweet sub environment to use")
                .with_default(json!(defaults::SUBENV)),
        )
}

/// The Sweet provider.
///
/// Holds one API client, created on the first `configure`, shared by every
/// resource operation.
pub struct SweetProvider {
    version: String,
    resources: Vec<Box<dyn Resource>>,
    client: OnceLock<Arc<dyn SweetApi>>,
}

impl SweetProvider {
    /// Create an unconfigured provider.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            resources: resources::all(),
            client: OnceLock::new(),
        }
    }

    /// Create a provider that is already configured with `client`.
    pub fn with_client(version: impl Into<String>, client: Arc<dyn SweetApi>) -> Self {
        let provider = Self::new(version);
        let _ = provider.client.set(client);
        provider
    }

    /// Whether `configure` has installed a client.
    pub fn is_configured(&self) -> bool {
        self.client.get().is_some()
    }

    fn resource(&self, resource_type: &str) -> Result<&dyn Resource, ProviderError> {
        self.resources
            .iter()
            .map(|r| r.as_ref())
            .find(|r| resources::type_name(PROVIDER_TYPE_NAME, *r) == resource_type)
            .ok_or_else(|| ProviderError::UnknownResource(resource_type.to_string()))
    }

    fn client(&self) -> Result<&dyn SweetApi, ProviderError> {
        self.client.get().map(|client| client.as_ref()).ok_or_else(|| {
            ProviderError::Configuration(
                "the provider must be configured before managing resources".to_string(),
            )
        })
    }
}

#[async_trait::async_trait]
impl ProviderService for SweetProvider {
    fn schema(&self) -> ProviderSchema {
        self.resources.iter().fold(
            ProviderSchema::new().with_provider_config(provider_config_schema()),
            |schema, resource| {
                schema.with_resource(
                    resources::type_name(PROVIDER_TYPE_NAME, resource.as_ref()),
                    resource.schema(),
                )
            },
        )
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            type_name: PROVIDER_TYPE_NAME.to_string(),
            version: self.version.clone(),
            resources: self.schema().resources.keys().cloned().collect(),
            capabilities: Default::default(),
        }
    }

    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validate(&provider_config_schema(), &config))
    }

    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let diagnostics = validate(&provider_config_schema(), &config);
        if has_errors(&diagnostics) {
            return Ok(diagnostics);
        }

        if self.is_configured() {
            warn!("Provider already configured, ignoring new configuration");
            return Ok(vec![Diagnostic::warning("Provider already configured")
                .with_detail("the existing API client is kept")]);
        }

        let config = ProviderConfig::from_value(config)?;
        let client = HttpClient::new(&config).map_err(|e| {
            ProviderError::Configuration(format!("cannot build API client: {}", e))
        })?;
        info!(
            env = %config.env(),
            subenv = %config.subenv(),
            base_url = %client.base_url(),
            "Provider configured"
        );

        if self.client.set(Arc::new(client)).is_err() {
            // Lost a race with a concurrent configure.
            return Ok(vec![Diagnostic::warning("Provider already configured")]);
        }
        Ok(diagnostics)
    }

    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let resource = self.resource(resource_type)?;
        Ok(validate(&resource.schema(), &config))
    }

    async fn upgrade_resource_state(
        &self,
        resource_type: &str,
        version: i64,
        state: Value,
    ) -> Result<Value, ProviderError> {
        let schema = self.resource(resource_type)?.schema();
        if version > schema.version as i64 {
            return Err(ProviderError::Validation(format!(
                "state version {} of {} is newer than schema version {}",
                version, resource_type, schema.version
            )));
        }
        Ok(state)
    }

    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        _config: Value,
    ) -> Result<PlanResult, ProviderError> {
        let resource = self.resource(resource_type)?;
        let plan = plan_resource(&resource.schema(), prior_state.as_ref(), &proposed_state);
        debug!(
            resource_type,
            changes = plan.changes.len(),
            requires_replace = plan.requires_replace,
            "Planned resource change"
        );
        Ok(plan)
    }

    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        resource.create(self.client()?, planned_state).await
    }

    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        resource.read(self.client()?, current_state).await
    }

    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        resource
            .update(self.client()?, prior_state, planned_state)
            .await
    }

    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        let resource = self.resource(resource_type)?;
        resource.delete(self.client()?, current_state).await
    }

    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let resource = self.resource(resource_type)?;
        if id.is_empty() {
            return Err(ProviderError::Validation(format!(
                "import of {} needs a non-empty {}",
                resource_type,
                resource.identity_attribute()
            )));
        }
        Ok(vec![ImportedResource::new(resource_type, resource.import(id))])
    }
}
