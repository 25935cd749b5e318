// Process-wide npm settings
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::command::Escalation;

/// npm executable looked up on PATH
pub const DEFAULT_NPM_BIN: &str = "npm";

/// Working directory of every global operation
pub const DEFAULT_GLOBAL_PREFIX: &str = "/var/lib/npm";

/// Account global operations run as
pub const DEFAULT_SERVICE_ACCOUNT: &str = "npm";

/// Group granting access to the global prefix
pub const DEFAULT_GROUP: &str = "npm";

/// Deployment stage flag used for manifest installs (`--production`)
pub const DEFAULT_MANIFEST_STAGE: &str = "production";

/// Manifest file expected in a manifest install directory
pub const MANIFEST_FILE: &str = "package.json";

/// Settings shared by the installer and the group helper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NpmSettings {
    pub npm_bin: String,
    pub global_prefix: PathBuf,
    pub service_account: String,
    pub group: String,
    pub escalation: Escalation,
}

impl Default for NpmSettings {
    fn default() -> Self {
        Self {
            npm_bin: DEFAULT_NPM_BIN.to_string(),
            global_prefix: PathBuf::from(DEFAULT_GLOBAL_PREFIX),
            service_account: DEFAULT_SERVICE_ACCOUNT.to_string(),
            group: DEFAULT_GROUP.to_string(),
            escalation: Escalation::default(),
        }
    }
}
