//! API Management control-plane client.
//!
//! Serves as both the service descriptor (does the service have a
//! managed identity?) and the policy store (record and verify the
//! grant) for one authorization.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use serde_json::json;

use apim_core::errors::AccessError;
use apim_core::identity::AccessPolicyRequest;
use apim_core::interfaces::{PolicyStore, ServiceDescriptor, ServiceMetadata};
use apim_core::profile::AzureProfile;

use crate::auth::build_http_client;
use crate::consts;

#[derive(Deserialize)]
struct ServiceResource {
    name: String,
    #[serde(default)]
    identity: Option<ServiceIdentity>,
}

#[derive(Deserialize)]
struct ServiceIdentity {
    #[serde(rename = "principalId")]
    principal_id: Option<String>,
}

/// Client for one API Management service's ARM surface.
///
/// Constructed per workflow invocation with a freshly acquired bearer
/// token.
pub struct ApimClient {
    base_url: String,
    subscription_id: String,
    resource_group: String,
    service_name: String,
    authorization_provider: String,
    authorization_name: String,
    token: String,
    http_client: ClientWithMiddleware,
}

impl ApimClient {
    /// Point a client at the service named by the profile.
    pub fn new(profile: &AzureProfile, token: String) -> Self {
        Self {
            base_url: profile.management_endpoint.trim_end_matches('/').to_owned(),
            subscription_id: profile.subscription_id.to_owned(),
            resource_group: profile.resource_group.to_owned(),
            service_name: profile.service_name.to_owned(),
            authorization_provider: profile.authorization_provider.to_owned(),
            authorization_name: profile.authorization_name.to_owned(),
            token,
            http_client: build_http_client(),
        }
    }

    fn service_url(&self) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.ApiManagement/service/{}",
            self.base_url, self.subscription_id, self.resource_group, self.service_name
        )
    }

    fn access_policies_url(&self) -> String {
        format!(
            "{}/authorizationProviders/{}/authorizations/{}/accessPolicies",
            self.service_url(),
            self.authorization_provider,
            self.authorization_name
        )
    }

    fn get_request(&self, url: String) -> reqwest_middleware::RequestBuilder {
        self.http_client
            .get(format!("{url}?api-version={}", consts::ARM_API_VERSION))
            .header(consts::AUTH_HEADER, format!("Bearer {}", self.token))
            .header(consts::ACCEPT_HEADER, "application/json")
            .header(consts::USER_AGENT_HEADER, consts::USER_AGENT)
    }

    async fn fetch_service(&self) -> Result<ServiceMetadata> {
        let service = self
            .get_request(self.service_url())
            .send()
            .await
            .context("couldn't send service request")?
            .error_for_status()?
            .json::<ServiceResource>()
            .await
            .context("couldn't parse service resource")?;

        Ok(ServiceMetadata {
            name: service.name,
            principal_id: service.identity.and_then(|i| i.principal_id),
        })
    }

    async fn put_access_policy(&self, request: &AccessPolicyRequest) -> Result<()> {
        let url = format!(
            "{}/{}?api-version={}",
            self.access_policies_url(),
            urlencoding::encode(&request.policy_name),
            consts::ARM_API_VERSION
        );
        let body = json!({
            "properties": {
                "objectId": request.principal.object_id(),
                "tenantId": request.principal.tenant_id(),
            }
        });

        self.http_client
            .put(url)
            .json(&body)
            .header(consts::AUTH_HEADER, format!("Bearer {}", self.token))
            .header(consts::CONTENT_TYPE_HEADER, "application/json")
            .header(consts::ACCEPT_HEADER, "application/json")
            .header(consts::USER_AGENT_HEADER, consts::USER_AGENT)
            .send()
            .await
            .context("couldn't send access policy request")?
            .error_for_status()?;
        Ok(())
    }

    async fn list_access_policies(&self) -> Result<()> {
        self.get_request(self.access_policies_url())
            .send()
            .await
            .context("couldn't send access policy list request")?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl ServiceDescriptor for ApimClient {
    async fn get_service(&self) -> Result<ServiceMetadata, AccessError> {
        self.fetch_service().await.map_err(AccessError::Query)
    }
}

#[async_trait]
impl PolicyStore for ApimClient {
    async fn create_access_policy(
        &self,
        request: &AccessPolicyRequest,
    ) -> Result<(), AccessError> {
        self.put_access_policy(request)
            .await
            .map_err(AccessError::Submission)
    }

    async fn refresh(&self) -> Result<(), AccessError> {
        self.list_access_policies().await.map_err(AccessError::Query)
    }
}
