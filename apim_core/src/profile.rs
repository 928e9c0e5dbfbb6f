//! Profile and credentials configuration.
//!
//! The profile pins the workflow to one authorization on one API
//! Management service; credentials live in a separate file outside the
//! project directory.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use yaml_peg::serde as yaml;

/// The production ARM endpoint. The tenant-wide managed-identity
/// expansion is only offered against this endpoint; other clouds do
/// not support the underlying query.
pub const PRODUCTION_MANAGEMENT_ENDPOINT: &str = "https://management.azure.com/";

/// Struct representing the azure_profile.yaml file.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct AzureProfile {
    /// The directory tenant the subscription lives in.
    pub tenant_id: String,
    /// The subscription holding the API Management service.
    pub subscription_id: String,
    /// Resource group of the service.
    pub resource_group: String,
    /// The API Management service name.
    pub service_name: String,
    /// The authorization provider the policies belong to.
    pub authorization_provider: String,
    /// The authorization the policies grant access to.
    pub authorization_name: String,
    /// ARM endpoint. Defaults to the production cloud.
    #[serde(default = "default_management_endpoint")]
    pub management_endpoint: String,
}

fn default_management_endpoint() -> String {
    PRODUCTION_MANAGEMENT_ENDPOINT.to_owned()
}

impl AzureProfile {
    /// Ingest a profile from the given path.
    pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<AzureProfile> {
        let profile_raw = fs::read_to_string(&path).context("Reading file")?;
        let mut profile =
            yaml::from_str::<AzureProfile>(&profile_raw).context("Deserializing profile")?;
        let profile = profile
            .pop()
            .ok_or_else(|| anyhow!("empty profile file"))?;
        profile.validate()?;
        Ok(profile)
    }

    /// Catch missing fields before any network call is made.
    pub fn validate(&self) -> Result<()> {
        if self.tenant_id.is_empty()
            || self.subscription_id.is_empty()
            || self.resource_group.is_empty()
            || self.service_name.is_empty()
            || self.authorization_provider.is_empty()
            || self.authorization_name.is_empty()
            || self.management_endpoint.is_empty()
        {
            bail!(
                "Profile fields are missing. Please make sure your azure_profile.yaml \
                file is complete. Profile received: {:#?}",
                self
            );
        }
        Ok(())
    }

    /// Whether the tenant-wide identity expansion may be offered.
    pub fn is_production_endpoint(&self) -> bool {
        self.management_endpoint == PRODUCTION_MANAGEMENT_ENDPOINT
    }
}

/// Alias for HashMap to hold credentials information.
pub type CredentialsMap = HashMap<String, String>;

/// Fetch the credentials from the credentials config file.
pub fn fetch_credentials(path: PathBuf) -> Result<CredentialsMap> {
    debug!("Trying to read credentials from {:?}", path);
    let credentials_raw = fs::read_to_string(path)?;
    let mut credentials = yaml::from_str::<CredentialsMap>(&credentials_raw)?;

    credentials
        .pop()
        .ok_or_else(|| anyhow!("failed to read credentials"))
}
