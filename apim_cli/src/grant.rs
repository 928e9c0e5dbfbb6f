//! Command implementations: the grant workflow plus the
//! credential-facing helpers.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use colored::Colorize;

use apim_azure::auth::scope_for;
use apim_azure::creds::AzureCredentials;
use apim_azure::{ApimClient, ClientCredentialProvider, GraphClient, ResourceGraphClient};
use apim_core::interfaces::CredentialProvider;
use apim_core::logging::info;
use apim_core::profile::AzureProfile;
use apim_core::{fetch_credentials, project, AccessPolicyAssigner, Outcome};

use crate::progress::IndicatifReporter;
use crate::prompt::InquirePicker;

fn load_profile(path: &Option<PathBuf>) -> Result<AzureProfile> {
    let path = path
        .to_owned()
        .unwrap_or_else(project::profile_cfg_path_local);
    AzureProfile::read_from_file(&path).map_err(|_| {
        anyhow!(
            "unable to read {} - create a profile file or point at one with --profile",
            path.display()
        )
    })
}

fn load_credentials() -> Result<AzureCredentials> {
    let creds = fetch_credentials(project::credentials_cfg_path()).map_err(|_| {
        anyhow!(
            "unable to find {} - set up your application credentials there",
            project::credentials_cfg_path().display()
        )
    })?;
    AzureCredentials::from_map(&creds)
}

/// Run the full identity-resolution and policy-assignment workflow.
pub(crate) async fn grant(profile_path: &Option<PathBuf>) -> Result<()> {
    let profile = load_profile(profile_path)?;
    let credentials = load_credentials()?;

    let provider =
        ClientCredentialProvider::new(credentials, scope_for(&profile.management_endpoint))?;
    let token = provider.bearer_token().await?;
    let apim = ApimClient::new(&profile, token.to_owned());
    let query = ResourceGraphClient::new(&profile, token);

    // Every collaborator is scoped to this invocation; nothing carries
    // over to the next run.
    let assigner = AccessPolicyAssigner::new(
        &provider,
        &apim,
        &query,
        &apim,
        &InquirePicker,
        &IndicatifReporter,
    );

    match assigner.run(&profile).await? {
        Outcome::Created { policy_name } => {
            println!(
                "{}",
                format!("Created Access Policy '{policy_name}' successfully.").green()
            );
        }
        Outcome::Cancelled => info!("no access policy was created"),
    }
    Ok(())
}

/// Print the principal the configured credential resolves to.
pub(crate) async fn whoami(profile_path: &Option<PathBuf>) -> Result<()> {
    let profile = load_profile(profile_path)?;
    let credentials = load_credentials()?;
    let provider =
        ClientCredentialProvider::new(credentials, scope_for(&profile.management_endpoint))?;

    let claims = provider.get_token().await?;
    println!(
        "{} {}",
        claims.user_id.bold(),
        format!("({})", claims.object_id).dimmed()
    );
    Ok(())
}

/// Fetch and print a directory user record.
pub(crate) async fn lookup(email: &str) -> Result<()> {
    let credentials = load_credentials()?;
    let client = GraphClient::new(credentials)?;

    // Acquire first; a lookup cannot be issued without the token the
    // acquisition returns.
    let token = client.acquire_token().await?;
    let user = client.get_user(&token, email).await?;

    println!(
        "{} {}",
        user.display_name.bold(),
        format!("({})", user.id).dimmed()
    );
    println!("  upn: {}", user.user_principal_name);
    if let Some(mail) = user.mail {
        println!("  mail: {mail}");
    }
    Ok(())
}
