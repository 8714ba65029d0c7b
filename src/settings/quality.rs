use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::common::{errors::QualityTableError, types::QualityLevel};

/// The `PlayerQuality` mapping: symbolic quality name to settings value.
///
/// Both directions are unique, and so are the lowercased names, which is
/// what makes widget-native lookups (`"hd720"` -> `HD720`) unambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "HashMap<String, i32>", into = "HashMap<String, i32>")]
pub struct QualityTable {
    /// Sorted by value.
    entries: Vec<(String, i32)>,
}

impl QualityTable {
    pub fn new<S, I>(entries: I) -> Result<Self, QualityTableError>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, i32)>,
    {
        let mut entries: Vec<(String, i32)> =
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        if entries.is_empty() {
            return Err(QualityTableError::Empty);
        }

        entries.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        for pair in entries.windows(2) {
            if pair[0].1 == pair[1].1 {
                return Err(QualityTableError::DuplicateValue {
                    value: pair[0].1,
                    first: pair[0].0.clone(),
                    second: pair[1].0.clone(),
                });
            }
        }

        let mut seen: HashMap<String, &str> = HashMap::with_capacity(entries.len());
        for (name, _) in &entries {
            if seen.insert(name.to_lowercase(), name).is_some() {
                return Err(QualityTableError::DuplicateName(name.clone()));
            }
        }

        Ok(Self { entries })
    }

    /// Symbolic name for a settings value.
    pub fn name_of(&self, value: i32) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(name, _)| name.as_str())
    }

    /// Widget-native identifier for a settings value.
    pub fn native_of(&self, value: i32) -> Option<QualityLevel> {
        self.name_of(value).map(QualityLevel::new)
    }

    /// Settings value for a widget-reported identifier.
    pub fn value_of_native(&self, native: &str) -> Option<i32> {
        self.entries
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(native))
            .map(|(_, v)| *v)
    }
}

impl Default for QualityTable {
    fn default() -> Self {
        Self {
            entries: [
                "Auto", "HighRes", "HD2160", "HD1440", "HD1080", "HD720", "Large", "Medium",
                "Small", "Tiny",
            ]
            .into_iter()
            .zip(0..)
            .map(|(name, value)| (name.to_string(), value))
            .collect(),
        }
    }
}

impl TryFrom<HashMap<String, i32>> for QualityTable {
    type Error = QualityTableError;

    fn try_from(map: HashMap<String, i32>) -> Result<Self, Self::Error> {
        Self::new(map)
    }
}

impl From<QualityTable> for HashMap<String, i32> {
    fn from(table: QualityTable) -> Self {
        table.entries.into_iter().collect()
    }
}
