//! The embedded player's control surface.
//!
//! The widget appears some time after page load and exposes its quality
//! methods later still, after an internal initialization that emits no
//! signal. Everything here is a non-owning view; the page owns the widget.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    common::{errors::WidgetError, types::QualityLevel},
    recovery::PageConfig,
};

#[cfg(test)]
pub(crate) mod testing;

/// Payload of the widget's volume-changed notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeChange {
    pub volume: i32,
    pub muted: bool,
}

/// Appearance of the widget's error-state panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorPanel {
    pub message: Option<String>,
}

pub trait Widget: Send + Sync {
    fn set_volume(&self, volume: i32);
    fn play(&self);
    fn pause(&self);
    fn seek_to(&self, seconds: f64);

    /// `None` while the widget has not exposed the query method yet.
    /// An exposed method may still report an empty list.
    fn available_quality_levels(&self) -> Option<Vec<QualityLevel>>;

    /// Whether the quality-range mutator has been exposed yet.
    fn supports_quality_range(&self) -> bool;

    fn set_playback_quality_range(
        &self,
        min: &QualityLevel,
        max: &QualityLevel,
    ) -> Result<(), WidgetError>;

    /// Reinitialize playback from a full page configuration.
    fn reload(&self, config: PageConfig);

    /// Subscribe to volume-changed notifications.
    fn volume_changes(&self) -> flume::Receiver<VolumeChange>;

    /// Subscribe to quality-changed notifications. Values are widget-native.
    fn quality_changes(&self) -> flume::Receiver<QualityLevel>;
}

/// Where the page hands out the widget and its error panel.
#[async_trait]
pub trait WidgetSource: Send + Sync {
    /// Resolves once the widget exists. Never resolves if it never appears.
    async fn widget(&self) -> Arc<dyn Widget>;

    /// Every appearance of the error panel, in order.
    fn error_panels(&self) -> flume::Receiver<ErrorPanel>;
}
