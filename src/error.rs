//! Error types for the Sweet provider.

use thiserror::Error;

use crate::client::ApiError;
use crate::schema::Diagnostic;

/// Errors that can occur while serving a provider operation.
///
/// Every variant carries a short summary (see [`ProviderError::summary`]) that
/// becomes the diagnostic label shown to the user, while the `Display` output
/// becomes the diagnostic detail.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A validation error occurred.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The provider is missing configuration or was configured incorrectly.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// A state value could not be converted into the typed model.
    #[error("{summary}: {detail}")]
    Conversion {
        /// Short label, e.g. `Cannot convert regions`.
        summary: String,
        /// The underlying conversion failure.
        detail: String,
    },

    /// A call to the Sweet API failed.
    #[error("{summary}: {source}")]
    Api {
        /// Short label, e.g. `Cannot add account`.
        summary: String,
        /// The client error.
        #[source]
        source: ApiError,
    },

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A gRPC transport error occurred.
    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// Operation not implemented.
    #[error("Unimplemented: {0}")]
    Unimplemented(String),
}

impl ProviderError {
    /// Wrap an API client failure under a short operation label.
    pub fn api(summary: impl Into<String>, source: ApiError) -> Self {
        Self::Api {
            summary: summary.into(),
            source,
        }
    }

    /// Build a conversion failure under a short label.
    pub fn conversion(summary: impl Into<String>, detail: impl ToString) -> Self {
        Self::Conversion {
            summary: summary.into(),
            detail: detail.to_string(),
        }
    }

    /// The short, user-facing label for this error.
    pub fn summary(&self) -> &str {
        match self {
            Self::Validation(_) => "Invalid configuration",
            Self::Configuration(_) => "Provider configuration error",
            Self::UnknownResource(_) => "Unknown resource type",
            Self::Conversion { summary, .. } => summary,
            Self::Api { summary, .. } => summary,
            Self::Serialization(_) => "Serialization error",
            Self::Transport(_) => "Transport error",
            Self::Unimplemented(_) => "Unimplemented",
        }
    }

    /// Convert into an error diagnostic carrying the label and the full error text.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.summary()).with_detail(self.to_string())
    }
}

impl From<ProviderError> for tonic::Status {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Validation(msg) => tonic::Status::invalid_argument(msg),
            ProviderError::Configuration(msg) => tonic::Status::failed_precondition(msg),
            ProviderError::UnknownResource(msg) => tonic::Status::not_found(msg),
            ProviderError::Serialization(err) => {
                tonic::Status::invalid_argument(format!("Serialization error: {}", err))
            },
            ProviderError::Transport(err) => {
                tonic::Status::unavailable(format!("Transport error: {}", err))
            },
            ProviderError::Unimplemented(msg) => tonic::Status::unimplemented(msg),
            err @ (ProviderError::Conversion { .. } | ProviderError::Api { .. }) => {
                tonic::Status::internal(err.to_string())
            },
        }
    }
}
