use std::time::Duration;

use thiserror::Error;

/// Construction failures of the `PlayerQuality` table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QualityTableError {
    #[error("quality table is empty")]
    Empty,
    #[error("quality name `{0}` appears more than once")]
    DuplicateName(String),
    #[error("quality value {value} is shared by `{first}` and `{second}`")]
    DuplicateValue {
        value: i32,
        first: String,
        second: String,
    },
}

/// Ways a bounded capability poll can give up.
///
/// An unbounded poll never returns either of these.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PollError {
    #[error("capability did not appear within {0:?}")]
    Timeout(Duration),
    #[error("capability did not appear after {0} attempts")]
    Exhausted(u32),
}

/// Failures of a single unplayable-recovery attempt.
///
/// None of these leave the page configuration modified.
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("embedded player response is not valid JSON: {0}")]
    MalformedPayload(#[from] serde_json::Error),
    #[error("embedded player response has no `{0}` field")]
    MissingField(&'static str),
    #[error("player vars carry no embedded player response")]
    MissingResponse,
}

/// Errors reported by a widget control surface.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WidgetError {
    /// The widget has not exposed the named method yet.
    #[error("widget method `{0}` is not available yet")]
    NotReady(&'static str),
    #[error("widget rejected the call: {0}")]
    Rejected(String),
}
