//! Sweet Security provider
//!
//! An infrastructure-as-code provider that manages Sweet Security API keys
//! and AWS integrations. The host spawns the provider binary, reads the
//! handshake line from stdout and then drives it over gRPC.
//!
//! # Resources
//!
//! | Type | Identity | Notes |
//! |---|---|---|
//! | `sweet_api_key` | `api_key` | key and secret are generated by the server; every change replaces it |
//! | `sweet_aws_account` | `account_id` | read echoes state |
//! | `sweet_aws_organization` | `account_id` | read refreshes from the API |
//!
//! # Quick Start
//!
//! ```ignore
//! use sweet_provider::{init_logging, serve, SweetProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging();
//!     serve(SweetProvider::new(env!("CARGO_PKG_VERSION"))).await
//! }
//! ```
//!
//! # Handshake Protocol
//!
//! When the provider starts via [`serve`], it outputs a handshake string to stdout:
//!
//! ```text
//! PROVIDER_PLUGIN|1|127.0.0.1:50051
//! ```
//!
//! Format: `PROVIDER_PLUGIN|<protocol_version>|<address>`
//!
//! # Provider Protocol
//!
//! - **GetMetadata**: Returns the provider type name, version and resource names
//! - **GetSchema**: Returns full schema for provider config and resources
//! - **ValidateProviderConfig**: Validates provider configuration
//! - **Configure**: Configures the provider with credentials
//! - **Stop**: Gracefully shuts down the provider
//! - **ValidateResourceConfig**: Validates resource configuration
//! - **UpgradeResourceState**: Migrates state from older schema versions
//! - **Plan**: Calculates required changes
//! - **Create/Read/Update/Delete**: CRUD operations for resources
//! - **ImportResourceState**: Imports existing infrastructure

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod plan;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod server;
pub mod testing;
pub mod types;
pub mod validation;

#[allow(missing_docs)]
#[allow(clippy::all)]
pub mod generated;

pub use client::{ApiError, HttpClient, SweetApi};
pub use config::ProviderConfig;
pub use error::ProviderError;
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::{SweetProvider, PROVIDER_TYPE_NAME};
pub use schema::ProviderSchema;
pub use server::{serve, serve_with_options, ProviderService, ServeOptions};
pub use types::{
    AttributeChange, ImportedResource, PlanResult, ProviderMetadata, ServerCapabilities,
    HANDSHAKE_PREFIX, PROTOCOL_VERSION,
};
pub use validation::validate;
