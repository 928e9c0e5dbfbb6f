use std::collections::HashSet;

use anyhow::{anyhow, Result};
use serde::Deserialize;

use apim_core::profile::CredentialsMap;

/// The default AAD authority.
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Credentials for authenticating to Azure.
///
/// The user sets these up by registering an application and pasting
/// its client id and secret into the credentials file.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AzureCredentials {
    /// The directory tenant to authenticate against.
    pub tenant_id: String,
    /// Application (client) id.
    pub client_id: String,
    /// Client secret.
    pub client_secret: String,
    /// AAD authority override. Defaults to the public cloud authority.
    pub authority: Option<String>,
}

impl AzureCredentials {
    /// Build credentials from the credentials config map, reporting
    /// any missing required fields.
    pub fn from_map(map: &CredentialsMap) -> Result<Self> {
        let mut creds = AzureCredentials::default();
        let mut required_fields: HashSet<_> = ["tenant_id", "client_id", "client_secret"]
            .into_iter()
            .collect();

        for (k, v) in map.iter() {
            match k.as_ref() {
                "tenant_id" => creds.tenant_id = v.to_string(),
                "client_id" => creds.client_id = v.to_string(),
                "client_secret" => creds.client_secret = v.to_string(),
                "authority" => creds.authority = Some(v.to_string()),
                _ => (),
            }

            required_fields.remove::<str>(k);
        }

        if !required_fields.is_empty() {
            Err(anyhow!(
                "Azure credentials missing required fields: {:#?}",
                required_fields
            ))
        } else {
            Ok(creds)
        }
    }

    /// Perform simple field validation to catch bad input.
    pub fn validate(&self) -> Result<()> {
        if self.tenant_id.is_empty() || self.client_id.is_empty() || self.client_secret.is_empty()
        {
            return Err(anyhow!(
                "Credentials are missing. Please make sure your azure_credentials.yaml file \
                is correct. Credentials received: {:#?}",
                self
            ));
        }
        Ok(())
    }

    /// The authority to request tokens from.
    pub fn authority_url(&self) -> String {
        self.authority
            .to_owned()
            .unwrap_or_else(|| DEFAULT_AUTHORITY.to_owned())
    }
}
