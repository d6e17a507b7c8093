//! Sweet API client.
//!
//! Resource handlers only see the [`SweetApi`] trait. [`HttpClient`] is the
//! production implementation. Tests use
//! [`FakeSweetApi`](crate::testing::FakeSweetApi).

mod http;
mod models;

pub use http::HttpClient;
pub use models::{ApiKey, AwsAccount, AwsOrganization, CreateApiKeyRequest};

use thiserror::Error;

/// Errors returned by the Sweet API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error (status {status}): {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body or a description of the failure.
        message: String,
    },

    /// The addressed entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An identifier cannot be used as a single URL path segment.
    #[error("invalid identifier: {0:?}")]
    InvalidId(String),

    /// A credential cannot be sent as an HTTP header value.
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

impl ApiError {
    /// Whether the API reported the entity as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Operations offered by the Sweet API.
///
/// One call per operation, no retries. Implementations are shared between
/// concurrently running resource operations.
#[async_trait::async_trait]
pub trait SweetApi: Send + Sync {
    /// Create an API key with the given description and roles.
    async fn create_api_key(&self, description: &str, roles: &[String])
        -> Result<ApiKey, ApiError>;

    /// Delete an API key.
    async fn delete_api_key(&self, api_key: &str) -> Result<(), ApiError>;

    /// Connect an AWS account.
    async fn add_aws_account(&self, account: &AwsAccount) -> Result<AwsAccount, ApiError>;

    /// Replace the settings of a connected AWS account.
    async fn update_aws_account(&self, account: &AwsAccount) -> Result<AwsAccount, ApiError>;

    /// Disconnect an AWS account.
    async fn delete_aws_account(&self, account_id: &str) -> Result<(), ApiError>;

    /// Connect an AWS organization.
    async fn add_aws_organization(
        &self,
        organization: &AwsOrganization,
    ) -> Result<AwsOrganization, ApiError>;

    /// Replace the settings of a connected AWS organization.
    async fn update_aws_organization(
        &self,
        organization: &AwsOrganization,
    ) -> Result<AwsOrganization, ApiError>;

    /// Disconnect an AWS organization.
    async fn delete_aws_organization(&self, account_id: &str) -> Result<(), ApiError>;

    /// Fetch a connected AWS organization by its root account id.
    async fn get_aws_organization(&self, account_id: &str) -> Result<AwsOrganization, ApiError>;
}
