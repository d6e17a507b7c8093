//! reqwest-backed implementation of [`SweetApi`].

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::models::{ApiKey, AwsAccount, AwsOrganization, CreateApiKeyRequest};
use super::{ApiError, SweetApi};
use crate::config::ProviderConfig;

const API_KEYS: &str = "/v1/api-keys";
const AWS_ACCOUNTS: &str = "/v1/integrations/aws/accounts";
const AWS_ORGANIZATIONS: &str = "/v1/integrations/aws/organizations";

/// Sweet API client over HTTPS.
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a client for the environment named in the configuration.
    pub fn new(config: &ProviderConfig) -> Result<Self, ApiError> {
        let base_url = config.base_url();
        Self::with_base_url(config, base_url)
    }

    /// Create a client against an explicit base URL (e.g. a mock server).
    ///
    /// Fails when a credential is not a valid header value or the TLS
    /// backend cannot be initialised.
    pub fn with_base_url(
        config: &ProviderConfig,
        base_url: impl Into<String>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .default_headers(default_headers(config)?)
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// URL of one entity in `collection`. The id always stays a single path
    /// segment.
    fn item_url(&self, collection: &str, id: &str) -> Result<String, ApiError> {
        if id.is_empty() || id == "." || id == ".." {
            return Err(ApiError::InvalidId(id.to_string()));
        }
        Ok(format!(
            "{}{}/{}",
            self.base_url,
            collection,
            urlencoding::encode(id)
        ))
    }

    async fn send(&self, builder: RequestBuilder, context: &str) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), context, "Sweet API responded");

        if status.as_u16() == 404 {
            return Err(ApiError::NotFound(context.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                format!("failed to {}", context)
            } else {
                body
            };
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        context: &str,
    ) -> Result<T, ApiError> {
        Ok(self.send(builder, context).await?.json().await?)
    }
}

fn default_headers(config: &ProviderConfig) -> Result<HeaderMap, ApiError> {
    let mut api_key = HeaderValue::from_str(&config.api_key)?;
    api_key.set_sensitive(true);
    let mut secret = HeaderValue::from_str(&config.secret)?;
    secret.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert("X-Api-Key", api_key);
    headers.insert("X-Api-Secret", secret);
    headers.insert("X-Sweet-Subenv", HeaderValue::from_str(config.subenv())?);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Ok(headers)
}

#[async_trait::async_trait]
impl SweetApi for HttpClient {
    async fn create_api_key(
        &self,
        description: &str,
        roles: &[String],
    ) -> Result<ApiKey, ApiError> {
        let body = CreateApiKeyRequest { description, roles };
        let request = self.client.post(self.url(API_KEYS)).json(&body);
        self.send_json(request, "create api key").await
    }

    async fn delete_api_key(&self, api_key: &str) -> Result<(), ApiError> {
        let request = self.client.delete(self.item_url(API_KEYS, api_key)?);
        self.send(request, "delete api key").await?;
        Ok(())
    }

    async fn add_aws_account(&self, account: &AwsAccount) -> Result<AwsAccount, ApiError> {
        let request = self.client.post(self.url(AWS_ACCOUNTS)).json(account);
        self.send_json(request, &format!("add aws account {}", account.account_id))
            .await
    }

    async fn update_aws_account(&self, account: &AwsAccount) -> Result<AwsAccount, ApiError> {
        let request = self
            .client
            .put(self.item_url(AWS_ACCOUNTS, &account.account_id)?)
            .json(account);
        self.send_json(request, &format!("update aws account {}", account.account_id))
            .await
    }

    async fn delete_aws_account(&self, account_id: &str) -> Result<(), ApiError> {
        let request = self.client.delete(self.item_url(AWS_ACCOUNTS, account_id)?);
        self.send(request, &format!("delete aws account {}", account_id))
            .await?;
        Ok(())
    }

    async fn add_aws_organization(
        &self,
        organization: &AwsOrganization,
    ) -> Result<AwsOrganization, ApiError> {
        let request = self
            .client
            .post(self.url(AWS_ORGANIZATIONS))
            .json(organization);
        self.send_json(
            request,
            &format!("add aws organization {}", organization.account_id),
        )
        .await
    }

    async fn update_aws_organization(
        &self,
        organization: &AwsOrganization,
    ) -> Result<AwsOrganization, ApiError> {
        let request = self
            .client
            .put(self.item_url(AWS_ORGANIZATIONS, &organization.account_id)?)
            .json(organization);
        self.send_json(
            request,
            &format!("update aws organization {}", organization.account_id),
        )
        .await
    }

    async fn delete_aws_organization(&self, account_id: &str) -> Result<(), ApiError> {
        let request = self
            .client
            .delete(self.item_url(AWS_ORGANIZATIONS, account_id)?);
        self.send(request, &format!("delete aws organization {}", account_id))
            .await?;
        Ok(())
    }

    async fn get_aws_organization(&self, account_id: &str) -> Result<AwsOrganization, ApiError> {
        let request = self.client.get(self.item_url(AWS_ORGANIZATIONS, account_id)?);
        self.send_json(request, &format!("get aws organization {}", account_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpClient {
        let config = ProviderConfig::new("test-key", "test-secret").with_subenv("eu");
        HttpClient::with_base_url(&config, server.uri()).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = ProviderConfig::new("k", "s");
        let client = HttpClient::with_base_url(&config, "http://localhost:8080/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_credentials_must_be_header_safe() {
        let config = ProviderConfig::new("test-key\nX-Injected: 1", "test-secret");
        let err = HttpClient::with_base_url(&config, "http://localhost:8080").unwrap_err();
        assert!(matches!(err, ApiError::InvalidHeader(_)));

        let config = ProviderConfig::new("test-key", "test-secret").with_subenv("eu\r\n");
        assert!(HttpClient::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_create_api_key() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/api-keys"))
            .and(header("X-Api-Key", "test-key"))
            .and(header("X-Api-Secret", "test-secret"))
            .and(header("X-Sweet-Subenv", "eu"))
            .and(body_json(json!({"description": "ci", "roles": ["admin"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "apiKey": "ak-1",
                "secret": "sk-1",
                "description": "ci",
                "roles": ["admin"]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let key = client
            .create_api_key("ci", &["admin".to_string()])
            .await
            .unwrap();

        assert_eq!(key.api_key, "ak-1");
        assert_eq!(key.secret, "sk-1");
        assert_eq!(key.roles, vec!["admin".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_api_key() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/v1/api-keys/ak-1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        tokio_test::assert_ok!(client.delete_api_key("ak-1").await);
    }

    #[tokio::test]
    async fn test_add_aws_account_sends_full_record() {
        let mock_server = MockServer::start().await;
        let account = AwsAccount {
            account_id: "123456789012".to_string(),
            role_arn: "arn:aws:iam::123456789012:role/x".to_string(),
            external_id: String::new(),
            regions: vec!["us-east-1".to_string(), "eu-west-1".to_string()],
        };

        Mock::given(method("POST"))
            .and(path("/v1/integrations/aws/accounts"))
            .and(body_json(json!({
                "accountId": "123456789012",
                "roleArn": "arn:aws:iam::123456789012:role/x",
                "externalId": "",
                "regions": ["us-east-1", "eu-west-1"]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(&account))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let created = client.add_aws_account(&account).await.unwrap();
        assert_eq!(created, account);
    }

    #[tokio::test]
    async fn test_update_aws_account_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/v1/integrations/aws/accounts/123456789012"))
            .respond_with(ResponseTemplate::new(500).set_body_string("role cannot be assumed"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let err = client
            .update_aws_account(&AwsAccount {
                account_id: "123456789012".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();

        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "role cannot be assumed");
            },
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_error_body_uses_context() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/v1/integrations/aws/accounts/123456789012"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let err = client
            .delete_aws_account("123456789012")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "API error (status 403): failed to delete aws account 123456789012"
        );
    }

    #[tokio::test]
    async fn test_get_aws_organization() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/integrations/aws/organizations/210987654321"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accountId": "210987654321",
                "roleArn": "arn:aws:iam::210987654321:role/sweet",
                "roleNameParameterArn": "arn:aws:ssm:us-east-1:210987654321:parameter/sweet",
                "externalId": "ext-1",
                "regions": ["us-east-1"]
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let org = client.get_aws_organization("210987654321").await.unwrap();
        assert_eq!(org.external_id, "ext-1");
        assert_eq!(org.regions, vec!["us-east-1".to_string()]);
    }

    #[tokio::test]
    async fn test_get_missing_aws_organization() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/integrations/aws/organizations/210987654321"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let err = client
            .get_aws_organization("210987654321")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_ids_stay_within_their_collection() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path(
                "/v1/api-keys/..%2Fintegrations%2Faws%2Faccounts%2F123456789012",
            ))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/v1/integrations/aws/accounts/123456789012"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        tokio_test::assert_ok!(
            client
                .delete_api_key("../integrations/aws/accounts/123456789012")
                .await
        );
    }

    #[tokio::test]
    async fn test_dot_segment_ids_rejected() {
        let mock_server = MockServer::start().await;
        let client = client_for(&mock_server);

        for id in ["", ".", ".."] {
            let err = client.delete_aws_account(id).await.unwrap_err();
            assert!(matches!(err, ApiError::InvalidId(_)), "{:?}", err);
        }
        let err = client.get_aws_organization("..").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidId(_)));
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }
}
