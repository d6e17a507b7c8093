//! Testing utilities for the provider.
//!
//! [`ProviderTester`] drives a [`ProviderService`] without a gRPC server, and
//! [`FakeSweetApi`] is an in-memory stand-in for the Sweet API that records
//! every call.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sweet_provider::testing::{FakeSweetApi, ProviderTester};
//! use sweet_provider::SweetProvider;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_create_account() {
//!     let api = Arc::new(FakeSweetApi::new());
//!     let tester = ProviderTester::new(SweetProvider::with_client("test", api.clone()));
//!
//!     let state = tester
//!         .lifecycle_create("sweet_aws_account", json!({
//!             "account_id": "123456789012",
//!             "role_arn": "arn:aws:iam::123456789012:role/x"
//!         }))
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(state["account_id"], "123456789012");
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use crate::client::{ApiError, ApiKey, AwsAccount, AwsOrganization, SweetApi};
use crate::error::ProviderError;
use crate::schema::{has_errors, Diagnostic, DiagnosticSeverity, ProviderSchema};
use crate::server::ProviderService;
use crate::types::{ImportedResource, PlanResult};

/// A test harness for provider implementations.
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    /// Create a new tester for the given provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Get a reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Get the provider's schema.
    pub fn schema(&self) -> ProviderSchema {
        self.provider.schema()
    }

    /// Get the list of resource type names.
    pub fn resource_types(&self) -> Vec<String> {
        self.provider.metadata().resources
    }

    /// Validate provider configuration.
    pub async fn validate_provider_config(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.validate_provider_config(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Configure the provider.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.configure(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Stop the provider.
    pub async fn stop(&self) -> Result<(), ProviderError> {
        self.provider.stop().await
    }

    /// Validate a resource configuration.
    pub async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_resource_config(resource_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Plan a resource creation (no prior state).
    pub async fn plan_create(
        &self,
        resource_type: &str,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, None, proposed_state.clone(), proposed_state)
            .await
    }

    /// Plan a change to an existing resource.
    pub async fn plan_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(
                resource_type,
                Some(prior_state),
                proposed_state.clone(),
                proposed_state,
            )
            .await
    }

    /// Plan a resource deletion.
    pub async fn plan_delete(
        &self,
        resource_type: &str,
        prior_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior_state), Value::Null, Value::Null)
            .await
    }

    /// Create a new resource.
    pub async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError> {
        self.provider.create(resource_type, planned_state).await
    }

    /// Read the current state of a resource.
    pub async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, ProviderError> {
        self.provider.read(resource_type, current_state).await
    }

    /// Update an existing resource.
    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .update(resource_type, prior_state, planned_state)
            .await
    }

    /// Delete a resource.
    pub async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        self.provider.delete(resource_type, current_state).await
    }

    /// Import an existing resource.
    pub async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        self.provider.import_resource(resource_type, id).await
    }

    /// Run a full create lifecycle: plan → create → read.
    pub async fn lifecycle_create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let plan = self.plan_create(resource_type, config).await?;
        let created = self.create(resource_type, plan.planned_state).await?;
        self.read(resource_type, created).await
    }

    /// Run a full change lifecycle: plan → update (or delete + create) → read.
    ///
    /// A plan that requires replacement is applied the way the host applies
    /// it: the prior instance is destroyed before the new one is created.
    pub async fn lifecycle_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        proposed_state: Value,
    ) -> Result<Value, ProviderError> {
        let plan = self
            .plan_update(resource_type, prior_state.clone(), proposed_state)
            .await?;

        let applied = if plan.requires_replace {
            self.delete(resource_type, prior_state).await?;
            self.create(resource_type, plan.planned_state).await?
        } else if plan.changes.is_empty() {
            plan.planned_state
        } else {
            self.update(resource_type, prior_state, plan.planned_state)
                .await?
        };

        self.read(resource_type, applied).await
    }

    /// Run a full delete lifecycle: plan → delete.
    pub async fn lifecycle_delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        let _ = self
            .plan_delete(resource_type, current_state.clone())
            .await?;
        self.delete(resource_type, current_state).await
    }

    /// Run a full CRUD lifecycle: create → update → delete.
    ///
    /// Returns the state after the update (before delete).
    pub async fn lifecycle_crud(
        &self,
        resource_type: &str,
        initial_config: Value,
        updated_config: Value,
    ) -> Result<Value, ProviderError> {
        let created = self.lifecycle_create(resource_type, initial_config).await?;
        let updated = self
            .lifecycle_update(resource_type, created, updated_config)
            .await?;
        self.lifecycle_delete(resource_type, updated.clone()).await?;
        Ok(updated)
    }
}

/// Error type for test operations that may fail with diagnostics.
#[derive(Debug)]
pub enum TestError {
    /// The operation failed with diagnostics.
    Diagnostics(Vec<Diagnostic>),
    /// The operation failed with a provider error.
    Provider(ProviderError),
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::Diagnostics(diags) => {
                writeln!(f, "Operation failed with {} diagnostic(s):", diags.len())?;
                for diag in diags {
                    write!(f, "  [{:?}] {}", diag.severity, diag.summary)?;
                    if let Some(detail) = &diag.detail {
                        write!(f, ": {}", detail)?;
                    }
                    if let Some(attr) = &diag.attribute {
                        write!(f, " (at {})", attr)?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            },
            TestError::Provider(e) => write!(f, "Provider error: {}", e),
        }
    }
}

impl std::error::Error for TestError {}

impl From<ProviderError> for TestError {
    fn from(e: ProviderError) -> Self {
        TestError::Provider(e)
    }
}

fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    if has_errors(&diagnostics) {
        Err(TestError::Diagnostics(
            diagnostics.into_iter().filter(Diagnostic::is_error).collect(),
        ))
    } else {
        Ok(())
    }
}

// =========================================================================
// Fake Sweet API
// =========================================================================

/// A call recorded by [`FakeSweetApi`], keyed by the identity it addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    /// `create_api_key` with this description.
    CreateApiKey(String),
    /// `delete_api_key` for this key.
    DeleteApiKey(String),
    /// `add_aws_account` for this account id.
    AddAwsAccount(String),
    /// `update_aws_account` for this account id.
    UpdateAwsAccount(String),
    /// `delete_aws_account` for this account id.
    DeleteAwsAccount(String),
    /// `add_aws_organization` for this account id.
    AddAwsOrganization(String),
    /// `update_aws_organization` for this account id.
    UpdateAwsOrganization(String),
    /// `delete_aws_organization` for this account id.
    DeleteAwsOrganization(String),
    /// `get_aws_organization` for this account id.
    GetAwsOrganization(String),
}

#[derive(Default)]
struct FakeState {
    api_keys: BTreeMap<String, ApiKey>,
    accounts: BTreeMap<String, AwsAccount>,
    organizations: BTreeMap<String, AwsOrganization>,
    calls: Vec<ApiCall>,
    next_failure: Option<String>,
    issued_keys: u32,
}

/// In-memory Sweet API.
///
/// Adds of an existing identity answer 409, and operations on a missing one
/// answer not-found, mirroring the real API.
#[derive(Default)]
pub struct FakeSweetApi {
    state: Mutex<FakeState>,
}

impl FakeSweetApi {
    /// Create an empty fake.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    /// Make the next call fail with a 500 carrying `message`.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.lock().next_failure = Some(message.into());
    }

    /// Stored API key, if any.
    pub fn api_key(&self, api_key: &str) -> Option<ApiKey> {
        self.lock().api_keys.get(api_key).cloned()
    }

    /// Stored AWS account, if any.
    pub fn aws_account(&self, account_id: &str) -> Option<AwsAccount> {
        self.lock().accounts.get(account_id).cloned()
    }

    /// Stored AWS organization, if any.
    pub fn aws_organization(&self, account_id: &str) -> Option<AwsOrganization> {
        self.lock().organizations.get(account_id).cloned()
    }

    /// Change an organization behind the provider's back, simulating drift.
    pub fn put_aws_organization(&self, organization: AwsOrganization) {
        self.lock()
            .organizations
            .insert(organization.account_id.clone(), organization);
    }

    fn begin(&self, call: ApiCall) -> Result<MutexGuard<'_, FakeState>, ApiError> {
        let mut state = self.lock();
        state.calls.push(call);
        match state.next_failure.take() {
            Some(message) => Err(ApiError::Status {
                status: 500,
                message,
            }),
            None => Ok(state),
        }
    }
}

fn conflict(what: &str, id: &str) -> ApiError {
    ApiError::Status {
        status: 409,
        message: format!("{} {} already exists", what, id),
    }
}

fn missing(what: &str, id: &str) -> ApiError {
    ApiError::NotFound(format!("{} {}", what, id))
}

#[async_trait::async_trait]
impl SweetApi for FakeSweetApi {
    async fn create_api_key(&self, description: &str, roles: &[String]) -> Result<ApiKey, ApiError> {
        let mut state = self.begin(ApiCall::CreateApiKey(description.to_string()))?;
        state.issued_keys += 1;
        let key = ApiKey {
            api_key: format!("ak-{}", state.issued_keys),
            secret: format!("sk-{}", state.issued_keys),
            description: description.to_string(),
            roles: roles.to_vec(),
        };
        state.api_keys.insert(key.api_key.clone(), key.clone());
        Ok(key)
    }

    async fn delete_api_key(&self, api_key: &str) -> Result<(), ApiError> {
        let mut state = self.begin(ApiCall::DeleteApiKey(api_key.to_string()))?;
        state
            .api_keys
            .remove(api_key)
            .map(|_| ())
            .ok_or_else(|| missing("api key", api_key))
    }

    async fn add_aws_account(&self, account: &AwsAccount) -> Result<AwsAccount, ApiError> {
        let mut state = self.begin(ApiCall::AddAwsAccount(account.account_id.clone()))?;
        if state.accounts.contains_key(&account.account_id) {
            return Err(conflict("aws account", &account.account_id));
        }
        state
            .accounts
            .insert(account.account_id.clone(), account.clone());
        Ok(account.clone())
    }

    async fn update_aws_account(&self, account: &AwsAccount) -> Result<AwsAccount, ApiError> {
        let mut state = self.begin(ApiCall::UpdateAwsAccount(account.account_id.clone()))?;
        match state.accounts.get_mut(&account.account_id) {
            Some(stored) => {
                *stored = account.clone();
                Ok(account.clone())
            },
            None => Err(missing("aws account", &account.account_id)),
        }
    }

    async fn delete_aws_account(&self, account_id: &str) -> Result<(), ApiError> {
        let mut state = self.begin(ApiCall::DeleteAwsAccount(account_id.to_string()))?;
        state
            .accounts
            .remove(account_id)
            .map(|_| ())
            .ok_or_else(|| missing("aws account", account_id))
    }

    async fn add_aws_organization(
        &self,
        organization: &AwsOrganization,
    ) -> Result<AwsOrganization, ApiError> {
        let mut state =
            self.begin(ApiCall::AddAwsOrganization(organization.account_id.clone()))?;
        if state.organizations.contains_key(&organization.account_id) {
            return Err(conflict("aws organization", &organization.account_id));
        }
        state
            .organizations
            .insert(organization.account_id.clone(), organization.clone());
        Ok(organization.clone())
    }

    async fn update_aws_organization(
        &self,
        organization: &AwsOrganization,
    ) -> Result<AwsOrganization, ApiError> {
        let mut state =
            self.begin(ApiCall::UpdateAwsOrganization(organization.account_id.clone()))?;
        match state.organizations.get_mut(&organization.account_id) {
            Some(stored) => {
                *stored = organization.clone();
                Ok(organization.clone())
            },
            None => Err(missing("aws organization", &organization.account_id)),
        }
    }

    async fn delete_aws_organization(&self, account_id: &str) -> Result<(), ApiError> {
        let mut state = self.begin(ApiCall::DeleteAwsOrganization(account_id.to_string()))?;
        state
            .organizations
            .remove(account_id)
            .map(|_| ())
            .ok_or_else(|| missing("aws organization", account_id))
    }

    async fn get_aws_organization(&self, account_id: &str) -> Result<AwsOrganization, ApiError> {
        let state = self.begin(ApiCall::GetAwsOrganization(account_id.to_string()))?;
        state
            .organizations
            .get(account_id)
            .cloned()
            .ok_or_else(|| missing("aws organization", account_id))
    }
}

// =========================================================================
// Assertion Helpers
// =========================================================================

/// Assert that a plan result indicates the resource will be created.
///
/// # Panics
///
/// Panics if the plan has no changes or requires replacement.
pub fn assert_plan_creates(plan: &PlanResult) {
    assert!(
        !plan.changes.is_empty(),
        "Expected plan to have changes for create, but got no changes"
    );
    assert!(
        !plan.requires_replace,
        "Expected plan to create, not replace"
    );
}

/// Assert that a plan result indicates no changes.
///
/// # Panics
///
/// Panics if the plan has any changes.
pub fn assert_plan_no_changes(plan: &PlanResult) {
    assert!(
        plan.changes.is_empty(),
        "Expected no changes, but got {} change(s): {:?}",
        plan.changes.len(),
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that a plan requires resource replacement.
///
/// # Panics
///
/// Panics if the plan does not require replacement.
pub fn assert_plan_replaces(plan: &PlanResult) {
    assert!(
        plan.requires_replace,
        "Expected plan to require replacement, but it does not"
    );
}

/// Assert that a plan does not require resource replacement.
///
/// # Panics
///
/// Panics if the plan requires replacement.
pub fn assert_plan_updates_in_place(plan: &PlanResult) {
    assert!(
        !plan.requires_replace,
        "Expected plan to update in place, but it requires replacement"
    );
}

/// Assert that a plan has a change for a specific attribute.
///
/// # Panics
///
/// Panics if the plan does not change the attribute.
pub fn assert_plan_changes_attribute(plan: &PlanResult, path: &str) {
    let has_change = plan.changes.iter().any(|c| c.path == path);
    assert!(
        has_change,
        "Expected plan to change attribute '{}', but it was not changed. Changed attributes: {:?}",
        path,
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain no errors.
///
/// # Panics
///
/// Panics if there are any error diagnostics.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors: Vec<_> = diagnostics.iter().filter(|d| d.is_error()).collect();

    assert!(
        errors.is_empty(),
        "Expected no errors, but got {} error(s): {:?}",
        errors.len(),
        errors.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain an error with the given summary substring.
///
/// # Panics
///
/// Panics if no error diagnostic contains the given substring.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    let has_matching_error = diagnostics
        .iter()
        .any(|d| matches!(d.severity, DiagnosticSeverity::Error) && d.summary.contains(substring));

    assert!(
        has_matching_error,
        "Expected an error containing '{}', but no matching error found. Errors: {:?}",
        substring,
        diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| &d.summary)
            .collect::<Vec<_>>()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_records_calls_in_order() {
        let api = FakeSweetApi::new();
        let account = AwsAccount {
            account_id: "123456789012".to_string(),
            role_arn: "arn".to_string(),
            ..Default::default()
        };

        api.add_aws_account(&account).await.unwrap();
        api.delete_aws_account("123456789012").await.unwrap();

        assert_eq!(
            api.calls(),
            vec![
                ApiCall::AddAwsAccount("123456789012".to_string()),
                ApiCall::DeleteAwsAccount("123456789012".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_fake_conflict_and_missing() {
        let api = FakeSweetApi::new();
        let account = AwsAccount {
            account_id: "1".to_string(),
            ..Default::default()
        };

        api.add_aws_account(&account).await.unwrap();
        let err = api.add_aws_account(&account).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 409, .. }));

        let err = api.delete_aws_account("2").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_fake_failure_injection_is_one_shot() {
        let api = FakeSweetApi::new();
        api.fail_next("boom");

        tokio_test::assert_err!(api.create_api_key("ci", &[]).await);
        let key = tokio_test::assert_ok!(api.create_api_key("ci", &[]).await);
        assert_eq!(key.api_key, "ak-1");
    }

    #[test]
    fn test_assert_no_errors_accepts_warnings() {
        assert_no_errors(&[Diagnostic::warning("Provider already configured")]);
    }

    #[test]
    #[should_panic(expected = "Expected no errors")]
    fn test_assert_no_errors_fails() {
        assert_no_errors(&[Diagnostic::error("Cannot add account")]);
    }

    #[test]
    fn test_assert_error_contains() {
        let diagnostics = vec![Diagnostic::error("Cannot delete organization")];
        assert_error_contains(&diagnostics, "organization");
    }

    #[test]
    fn test_test_error_display() {
        let err = TestError::Diagnostics(vec![
            Diagnostic::error("Missing required attribute 'secret'").with_attribute("secret"),
            Diagnostic::error("Invalid type for 'env'").with_detail("Expected string, got number"),
        ]);

        let display = format!("{}", err);
        assert!(display.contains("Missing required attribute"));
        assert!(display.contains("(at secret)"));
        assert!(display.contains("Expected string, got number"));
    }
}
