//! Directory lookup against the Microsoft Graph endpoint.
//!
//! Token acquisition and user lookup are explicitly ordered: a lookup
//! borrows the [`GraphToken`] that only a successful acquisition
//! produces, so an unauthenticated request can never be sent. A failed
//! acquisition is a reported error, never a silently unset token.

use anyhow::{Context, Result};
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;

use apim_core::errors::AccessError;

use crate::auth::{build_http_client, request_token, scope_for};
use crate::consts;
use crate::creds::AzureCredentials;

/// The default directory endpoint.
pub const DEFAULT_GRAPH_ENDPOINT: &str = "https://graph.microsoft.com";

/// Proof of a completed token acquisition.
///
/// Holds the raw bearer token privately; the only way to get one is
/// [`GraphClient::acquire_token`] succeeding.
pub struct GraphToken(String);

/// A directory user record.
#[derive(Clone, Debug, Deserialize)]
pub struct DirectoryUser {
    /// Directory object id.
    pub id: String,
    /// Display name.
    #[serde(rename = "displayName")]
    pub display_name: String,
    /// User principal name.
    #[serde(rename = "userPrincipalName")]
    pub user_principal_name: String,
    /// Primary email address, when set.
    #[serde(default)]
    pub mail: Option<String>,
}

/// Client for directory user lookups.
pub struct GraphClient {
    credentials: AzureCredentials,
    graph_endpoint: String,
    http_client: ClientWithMiddleware,
}

impl GraphClient {
    /// Validate the credentials and set up a client against the
    /// default directory endpoint.
    pub fn new(credentials: AzureCredentials) -> Result<Self> {
        Self::with_endpoint(credentials, DEFAULT_GRAPH_ENDPOINT)
    }

    /// As [`GraphClient::new`], against an explicit endpoint.
    pub fn with_endpoint(credentials: AzureCredentials, graph_endpoint: &str) -> Result<Self> {
        credentials.validate()?;
        Ok(Self {
            credentials,
            graph_endpoint: graph_endpoint.trim_end_matches('/').to_owned(),
            http_client: build_http_client(),
        })
    }

    /// Acquire a directory token. Must complete before any lookup can
    /// be issued; failure is reported to the caller.
    pub async fn acquire_token(&self) -> Result<GraphToken, AccessError> {
        request_token(
            &self.http_client,
            &self.credentials,
            &scope_for(&self.graph_endpoint),
        )
        .await
        .map(GraphToken)
        .map_err(AccessError::Authentication)
    }

    /// Fetch a directory user record by email.
    pub async fn get_user(
        &self,
        token: &GraphToken,
        email: &str,
    ) -> Result<DirectoryUser, AccessError> {
        self.fetch_user(token, email).await.map_err(AccessError::Query)
    }

    async fn fetch_user(&self, token: &GraphToken, email: &str) -> Result<DirectoryUser> {
        let url = format!(
            "{}/v1.0/users/{}",
            self.graph_endpoint,
            urlencoding::encode(email)
        );

        self.http_client
            .get(url)
            .header(consts::AUTH_HEADER, format!("Bearer {}", token.0))
            .header(consts::ACCEPT_HEADER, "application/json")
            .header(consts::USER_AGENT_HEADER, consts::USER_AGENT)
            .send()
            .await
            .context("couldn't send user lookup")?
            .error_for_status()?
            .json::<DirectoryUser>()
            .await
            .context("couldn't parse user record")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_credentials(authority: &str) -> AzureCredentials {
        AzureCredentials {
            tenant_id: "44444444-4444-4444-4444-444444444444".to_owned(),
            client_id: "client".to_owned(),
            client_secret: "secret".to_owned(),
            authority: Some(authority.to_owned()),
        }
    }

    async fn mount_token_endpoint(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path(
                "/44444444-4444-4444-4444-444444444444/oauth2/v2.0/token",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"token_type":"Bearer","expires_in":3599,"access_token":"graph-token"}"#,
            ))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn lookup_carries_the_acquired_token() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1.0/users/user%40contoso.com"))
            .and(header("Authorization", "Bearer graph-token"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"id":"11111111-1111-1111-1111-111111111111","displayName":"A User","userPrincipalName":"user@contoso.com","mail":"user@contoso.com"}"#,
            ))
            .mount(&server)
            .await;

        let client =
            GraphClient::with_endpoint(test_credentials(&server.uri()), &server.uri()).unwrap();
        let token = client.acquire_token().await.unwrap();
        let user = client.get_user(&token, "user@contoso.com").await.unwrap();

        assert_eq!(user.display_name, "A User");
        assert_eq!(user.id, "11111111-1111-1111-1111-111111111111");
    }

    #[tokio::test]
    async fn acquisition_failure_is_reported_not_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_scope"}"#),
            )
            .mount(&server)
            .await;

        let client =
            GraphClient::with_endpoint(test_credentials(&server.uri()), &server.uri()).unwrap();
        let res = client.acquire_token().await;
        assert!(matches!(res, Err(AccessError::Authentication(_))));
    }

    #[tokio::test]
    async fn unknown_user_is_a_query_error() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string(
                r#"{"error":{"code":"Request_ResourceNotFound"}}"#,
            ))
            .mount(&server)
            .await;

        let client =
            GraphClient::with_endpoint(test_credentials(&server.uri()), &server.uri()).unwrap();
        let token = client.acquire_token().await.unwrap();
        let res = client.get_user(&token, "missing@contoso.com").await;
        assert!(matches!(res, Err(AccessError::Query(_))));
    }
}
