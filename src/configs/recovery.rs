use serde::{Deserialize, Serialize};

use crate::recovery::ClientProfile;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RecoveryConfig {
    /// Substring of the block reason that marks an age restriction.
    #[serde(default = "default_age_restriction_marker")]
    pub age_restriction_marker: String,
    /// Client identity used when the video is age restricted.
    #[serde(default = "default_restricted_client")]
    pub restricted_client: ClientProfile,
    /// Client identity used for every other block reason.
    #[serde(default = "default_client")]
    pub default_client: ClientProfile,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            age_restriction_marker: default_age_restriction_marker(),
            restricted_client: default_restricted_client(),
            default_client: default_client(),
        }
    }
}

fn default_age_restriction_marker() -> String {
    "age-restricted".to_string()
}

fn default_restricted_client() -> ClientProfile {
    ClientProfile::new("TVHTML5_SIMPLY_EMBEDDED_PLAYER", "2.0")
}

fn default_client() -> ClientProfile {
    ClientProfile::new("WEB", "2.20230607.06.00")
}
