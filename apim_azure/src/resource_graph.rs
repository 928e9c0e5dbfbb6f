//! Resource Graph client for tenant-wide managed-identity queries.
//!

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use serde_json::json;

use apim_core::errors::AccessError;
use apim_core::identity::IdentityRecord;
use apim_core::interfaces::IdentityQuery;
use apim_core::profile::AzureProfile;

use crate::auth::build_http_client;
use crate::consts;

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    data: Vec<IdentityRecord>,
}

/// Client for the Resource Graph query endpoint.
///
/// Constructed fresh for each workflow invocation; holds nothing
/// beyond the token and subscription it queries under.
pub struct ResourceGraphClient {
    base_url: String,
    subscription_id: String,
    token: String,
    http_client: ClientWithMiddleware,
}

impl ResourceGraphClient {
    /// Point a client at the profile's subscription.
    pub fn new(profile: &AzureProfile, token: String) -> Self {
        Self {
            base_url: profile.management_endpoint.trim_end_matches('/').to_owned(),
            subscription_id: profile.subscription_id.to_owned(),
            token,
            http_client: build_http_client(),
        }
    }

    /// Run one canned query and deserialize its rows.
    async fn query(&self, query: &str) -> Result<Vec<IdentityRecord>> {
        let url = format!(
            "{}/providers/Microsoft.ResourceGraph/resources?api-version={}",
            self.base_url,
            consts::RESOURCE_GRAPH_API_VERSION
        );
        let body = json!({
            "subscriptions": [self.subscription_id],
            "query": query,
        });

        let response = self
            .http_client
            .post(url)
            .json(&body)
            .header(consts::AUTH_HEADER, format!("Bearer {}", self.token))
            .header(consts::CONTENT_TYPE_HEADER, "application/json")
            .header(consts::ACCEPT_HEADER, "application/json")
            .header(consts::USER_AGENT_HEADER, consts::USER_AGENT)
            .send()
            .await
            .context("couldn't send resource graph query")?
            .error_for_status()?
            .json::<QueryResponse>()
            .await
            .context("couldn't parse resource graph response")?;

        Ok(response.data)
    }
}

#[async_trait]
impl IdentityQuery for ResourceGraphClient {
    async fn list_system_assigned_identities(&self) -> Result<Vec<IdentityRecord>, AccessError> {
        self.query(consts::SYSTEM_ASSIGNED_QUERY)
            .await
            .map_err(AccessError::Query)
    }

    async fn list_user_assigned_identities(&self) -> Result<Vec<IdentityRecord>, AccessError> {
        self.query(consts::USER_ASSIGNED_QUERY)
            .await
            .map_err(AccessError::Query)
    }
}
