use std::sync::Arc;

use parking_lot::RwLock;

/// A thread-safe, read-write shared component.
pub type SharedRw<T> = Arc<RwLock<T>>;

/// A generic boxed error type.
pub type AnyError = Box<dyn std::error::Error + Send + Sync>;

/// A convenient Result alias returning `AnyError`.
pub type AnyResult<T> = std::result::Result<T, AnyError>;

/// Identifier of a watchable video, as carried in `v=` query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::ops::Deref for VideoId {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Widget-native quality identifier, e.g. `"hd1080"` or `"medium"`.
///
/// Always stored lowercase; comparisons against widget reports are exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct QualityLevel(pub String);

impl QualityLevel {
    pub const AUTO: &'static str = "auto";

    pub fn new(s: impl AsRef<str>) -> Self {
        Self(s.as_ref().to_lowercase())
    }

    /// True for the widget's self-selecting sentinel and for the empty string.
    pub fn is_auto(&self) -> bool {
        self.0.is_empty() || self.0 == Self::AUTO
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for QualityLevel {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
