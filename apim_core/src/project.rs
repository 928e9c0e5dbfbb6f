//! Path utilities for locating the profile and credentials files.
//!
//! The expected layout is:
//!
//! ```text
//! pwd
//!  └── azure_profile.yaml
//! ~
//!  └── .apim
//!       └── azure_credentials.yaml
//! ```

use std::path::PathBuf;

use dirs::home_dir;
use lazy_static::lazy_static;

lazy_static! {
    static ref PROFILE_CFG: PathBuf = PathBuf::from("azure_profile.yaml");
    static ref CREDENTIALS_CFG: PathBuf = PathBuf::from("azure_credentials.yaml");
    static ref CREDENTIALS_CFG_DIR: PathBuf = PathBuf::from(".apim");
}

/// Local path for the profile config.
pub fn profile_cfg_path_local() -> PathBuf {
    PROFILE_CFG.to_owned()
}

/// The path to the credentials file, kept out of the project directory
/// so it cannot be committed by accident.
pub fn credentials_cfg_path() -> PathBuf {
    home_dir()
        .unwrap_or_default()
        .join(CREDENTIALS_CFG_DIR.as_path())
        .join(CREDENTIALS_CFG.as_path())
}
