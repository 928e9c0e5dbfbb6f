//! AAD client-credential token acquisition.
//!

use anyhow::{Context, Result};
use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::Deserialize;

use apim_core::errors::AccessError;
use apim_core::interfaces::{CredentialProvider, TokenClaims};

use crate::creds::AzureCredentials;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Claims read out of an AAD access token.
///
/// Signature validation is skipped: the token was just issued to us
/// over TLS and is only read for its identifiers, never accepted as an
/// inbound credential.
#[derive(Deserialize)]
struct AadClaims {
    oid: String,
    #[serde(default)]
    upn: Option<String>,
    #[serde(default)]
    app_displayname: Option<String>,
}

/// Retrying HTTP client shared by the Azure collaborators.
pub(crate) fn build_http_client() -> ClientWithMiddleware {
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);
    ClientBuilder::new(reqwest::Client::new())
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build()
}

/// The `.default` scope for a resource endpoint.
pub fn scope_for(endpoint: &str) -> String {
    format!("{}/.default", endpoint.trim_end_matches('/'))
}

/// One client-credentials grant against the AAD token endpoint.
pub(crate) async fn request_token(
    http_client: &ClientWithMiddleware,
    credentials: &AzureCredentials,
    scope: &str,
) -> Result<String> {
    let url = format!(
        "{}/{}/oauth2/v2.0/token",
        credentials.authority_url().trim_end_matches('/'),
        credentials.tenant_id
    );
    let params = [
        ("grant_type", "client_credentials"),
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.client_secret.as_str()),
        ("scope", scope),
    ];

    let response = http_client
        .post(url)
        .form(&params)
        .send()
        .await
        .context("couldn't send token request")?
        .error_for_status()
        .context("token endpoint rejected the request")?;

    let token = response
        .json::<TokenResponse>()
        .await
        .context("couldn't parse token response")?;
    Ok(token.access_token)
}

/// Pull the principal identifiers out of an access token.
pub(crate) fn claims_from_token(token: &str) -> Result<TokenClaims> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.set_required_spec_claims::<&str>(&[]);

    let data = decode::<AadClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .context("decoding token claims")?;
    let claims = data.claims;

    // A user token carries a UPN; an application token carries the app
    // display name at best. Fall back to the object id so the option
    // label is never empty.
    let user_id = claims
        .upn
        .or(claims.app_displayname)
        .unwrap_or_else(|| claims.oid.to_owned());
    Ok(TokenClaims {
        user_id,
        object_id: claims.oid,
    })
}

/// Resolves the signed-in principal with the client-credentials grant.
///
/// Built once per workflow invocation; holds no token cache.
pub struct ClientCredentialProvider {
    credentials: AzureCredentials,
    scope: String,
    http_client: ClientWithMiddleware,
}

impl ClientCredentialProvider {
    /// Validate the credentials and set up the provider for the given
    /// resource scope.
    pub fn new(credentials: AzureCredentials, scope: String) -> Result<Self> {
        credentials.validate()?;
        Ok(Self {
            credentials,
            scope,
            http_client: build_http_client(),
        })
    }

    /// Acquire a raw bearer token for constructing resource clients.
    pub async fn bearer_token(&self) -> Result<String, AccessError> {
        request_token(&self.http_client, &self.credentials, &self.scope)
            .await
            .map_err(AccessError::Authentication)
    }
}

#[async_trait]
impl CredentialProvider for ClientCredentialProvider {
    async fn get_token(&self) -> Result<TokenClaims, AccessError> {
        let token = self.bearer_token().await?;
        claims_from_token(&token).map_err(AccessError::Authentication)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fake_jwt(payload: &str) -> String {
        let header = base64::encode_config(
            r#"{"alg":"RS256","typ":"JWT"}"#,
            base64::URL_SAFE_NO_PAD,
        );
        let payload = base64::encode_config(payload, base64::URL_SAFE_NO_PAD);
        format!("{header}.{payload}.c2ln")
    }

    fn test_credentials(authority: &str) -> AzureCredentials {
        AzureCredentials {
            tenant_id: "44444444-4444-4444-4444-444444444444".to_owned(),
            client_id: "client".to_owned(),
            client_secret: "secret".to_owned(),
            authority: Some(authority.to_owned()),
        }
    }

    #[test]
    fn user_token_claims_prefer_upn() {
        let token = fake_jwt(
            r#"{"oid":"11111111-1111-1111-1111-111111111111","upn":"user@contoso.com"}"#,
        );
        let claims = claims_from_token(&token).unwrap();
        assert_eq!(claims.user_id, "user@contoso.com");
        assert_eq!(claims.object_id, "11111111-1111-1111-1111-111111111111");
    }

    #[test]
    fn app_token_claims_fall_back_to_oid() {
        let token = fake_jwt(r#"{"oid":"11111111-1111-1111-1111-111111111111"}"#);
        let claims = claims_from_token(&token).unwrap();
        assert_eq!(claims.user_id, "11111111-1111-1111-1111-111111111111");
    }

    #[test]
    fn scope_has_single_slash() {
        assert_eq!(
            scope_for("https://management.azure.com/"),
            "https://management.azure.com/.default"
        );
    }

    #[tokio::test]
    async fn get_token_resolves_principal() {
        let server = MockServer::start().await;
        let jwt = fake_jwt(
            r#"{"oid":"11111111-1111-1111-1111-111111111111","upn":"user@contoso.com"}"#,
        );
        Mock::given(method("POST"))
            .and(path(
                "/44444444-4444-4444-4444-444444444444/oauth2/v2.0/token",
            ))
            .and(body_string_contains("client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"{{"token_type":"Bearer","expires_in":3599,"access_token":"{jwt}"}}"#
            )))
            .mount(&server)
            .await;

        let provider = ClientCredentialProvider::new(
            test_credentials(&server.uri()),
            scope_for("https://management.azure.com/"),
        )
        .unwrap();
        let claims = provider.get_token().await.unwrap();
        assert_eq!(claims.user_id, "user@contoso.com");
    }

    #[tokio::test]
    async fn rejected_grant_is_an_authentication_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string(r#"{"error":"invalid_client"}"#),
            )
            .mount(&server)
            .await;

        let provider = ClientCredentialProvider::new(
            test_credentials(&server.uri()),
            scope_for("https://management.azure.com/"),
        )
        .unwrap();
        let res = provider.get_token().await;
        assert!(matches!(res, Err(AccessError::Authentication(_))));
    }

    #[test]
    fn empty_creds_fail_to_validate() {
        assert!(
            ClientCredentialProvider::new(AzureCredentials::default(), "scope".to_owned())
                .is_err()
        );
    }
}
