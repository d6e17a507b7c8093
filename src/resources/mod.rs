//! Managed resource handlers.
//!
//! Each handler declares its schema and maps its typed state model to and
//! from [`SweetApi`] calls. State travels as JSON objects whose keys are the
//! schema attribute names.

mod api_key;
mod aws_account;
mod aws_organization;

pub use api_key::{ApiKeyModel, ApiKeyResource};
pub use aws_account::{AwsAccountModel, AwsAccountResource};
pub use aws_organization::{AwsOrganizationModel, AwsOrganizationResource};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::client::SweetApi;
use crate::error::ProviderError;
use crate::schema::Schema;

/// The contract every managed resource implements.
#[async_trait::async_trait]
pub trait Resource: Send + Sync {
    /// Suffix appended to the provider type name, e.g. `_api_key`.
    fn type_suffix(&self) -> &'static str;

    /// The resource schema.
    fn schema(&self) -> Schema;

    /// The attribute that identifies an instance and is used for import.
    fn identity_attribute(&self) -> &'static str;

    /// Create the remote entity and return the resulting state.
    async fn create(&self, client: &dyn SweetApi, planned: Value) -> Result<Value, ProviderError>;

    /// Refresh the state of an existing entity. `null` means it no longer exists.
    async fn read(&self, client: &dyn SweetApi, current: Value) -> Result<Value, ProviderError>;

    /// Apply an in-place update and return the resulting state.
    async fn update(
        &self,
        client: &dyn SweetApi,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError>;

    /// Delete the remote entity.
    async fn delete(&self, client: &dyn SweetApi, current: Value) -> Result<(), ProviderError>;

    /// State produced by import: only the identity attribute is populated.
    fn import(&self, id: &str) -> Value {
        let mut state = serde_json::Map::new();
        state.insert(
            self.identity_attribute().to_string(),
            Value::String(id.to_string()),
        );
        Value::Object(state)
    }
}

/// Full resource type name: the provider type name plus the resource suffix.
pub fn type_name(provider_type_name: &str, resource: &dyn Resource) -> String {
    format!("{}{}", provider_type_name, resource.type_suffix())
}

/// Every resource served by the provider.
pub fn all() -> Vec<Box<dyn Resource>> {
    vec![
        Box::new(ApiKeyResource),
        Box::new(AwsAccountResource),
        Box::new(AwsOrganizationResource),
    ]
}

/// Decode a state value into a typed model.
///
/// A list attribute that fails to decode is reported under
/// `Cannot convert <attribute>`, anything else under `Cannot convert <what>`.
pub(crate) fn decode_state<T: DeserializeOwned>(
    value: Value,
    what: &str,
    list_attributes: &[&str],
) -> Result<T, ProviderError> {
    for name in list_attributes {
        if let Some(list) = value.get(*name) {
            let valid = list.is_null()
                || list
                    .as_array()
                    .is_some_and(|items| items.iter().all(Value::is_string));
            if !valid {
                return Err(ProviderError::conversion(
                    format!("Cannot convert {}", name),
                    format!("expected a list of strings, got {}", list),
                ));
            }
        }
    }

    serde_json::from_value(value)
        .map_err(|e| ProviderError::conversion(format!("Cannot convert {}", what), e))
}

/// Encode a typed model back into a state value.
pub(crate) fn encode_state<T: Serialize>(model: &T) -> Result<Value, ProviderError> {
    Ok(serde_json::to_value(model)?)
}
