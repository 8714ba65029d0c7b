use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Client identity the widget presents to the video backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProfile {
    pub name: String,
    pub version: String,
}

impl ClientProfile {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// The page's player configuration, as handed to the widget on load.
///
/// Every rewrite produces a new value with a higher `revision`; the widget
/// is reinitialized from that value rather than from shared page state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PageConfig {
    #[serde(default)]
    pub revision: u64,
    pub innertube_client_name: String,
    pub innertube_client_version: String,
    pub player_vars: PlayerVars,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerVars {
    /// JSON document, stored encoded exactly as the page carries it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedded_player_response: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PageConfig {
    pub fn client(&self) -> ClientProfile {
        ClientProfile::new(&self.innertube_client_name, &self.innertube_client_version)
    }

    /// Next revision with `client` and `embedded_player_response` swapped in.
    pub fn rewritten(&self, client: &ClientProfile, embedded_player_response: String) -> Self {
        let mut next = self.clone();
        next.revision = self.revision + 1;
        next.innertube_client_name = client.name.clone();
        next.innertube_client_version = client.version.clone();
        next.player_vars.embedded_player_response = Some(embedded_player_response);
        next
    }
}

/// Page-global home of the player configuration.
pub trait PageConfigStore: Send + Sync {
    fn load(&self) -> PageConfig;
    fn store(&self, config: PageConfig);
}

pub struct InMemoryPageConfig {
    inner: RwLock<PageConfig>,
}

impl InMemoryPageConfig {
    pub fn new(config: PageConfig) -> Self {
        Self {
            inner: RwLock::new(config),
        }
    }

    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(payload)?))
    }
}

impl PageConfigStore for InMemoryPageConfig {
    fn load(&self) -> PageConfig {
        self.inner.read().clone()
    }

    fn store(&self, config: PageConfig) {
        *self.inner.write() = config;
    }
}
