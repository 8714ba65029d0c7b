//! One-shot repair of a widget that refuses to play.
//!
//! When the widget shows its error panel, the embedded player response in
//! the page configuration is inspected. A blocked video gets its
//! playability status forced to playable, the client identity switched to
//! one that is allowed to play it, and the widget reloaded from the
//! rewritten configuration. This happens at most once per session.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use serde_json::{Map, Value};
use tracing::{Instrument, debug, info, info_span, warn};

use super::page_config::{ClientProfile, PageConfig, PageConfigStore};
use crate::{
    common::errors::RecoveryError,
    configs::RecoveryConfig,
    widget::{Widget, WidgetSource},
};

const PLAYABILITY_STATUS: &str = "previewPlayabilityStatus";
const STATUS_OK: &str = "OK";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryOutcome {
    /// The configuration was rewritten and the widget reloaded.
    Reloaded { age_restricted: bool, revision: u64 },
    /// The response already says the video is playable; nothing to fix.
    AlreadyPlayable,
    /// This session already spent its attempt.
    AlreadyAttempted,
}

pub struct RecoveryPatch {
    config: RecoveryConfig,
    attempted: AtomicBool,
}

impl RecoveryPatch {
    pub fn new(config: RecoveryConfig) -> Self {
        Self {
            config,
            attempted: AtomicBool::new(false),
        }
    }

    pub fn attempted(&self) -> bool {
        self.attempted.load(Ordering::SeqCst)
    }

    /// Compute the repaired configuration without touching anything.
    ///
    /// `Ok(None)` when the response is already playable.
    pub fn patch(&self, page: &PageConfig) -> Result<Option<(PageConfig, bool)>, RecoveryError> {
        let raw = page
            .player_vars
            .embedded_player_response
            .as_deref()
            .ok_or(RecoveryError::MissingResponse)?;
        let mut response: Value = serde_json::from_str(raw)?;

        let status = response
            .get(PLAYABILITY_STATUS)
            .and_then(Value::as_object)
            .ok_or(RecoveryError::MissingField(PLAYABILITY_STATUS))?;

        if status.get("status").and_then(Value::as_str) == Some(STATUS_OK) {
            return Ok(None);
        }

        let reason = status.get("reason").and_then(Value::as_str).unwrap_or("");
        let age_restricted = reason.contains(&self.config.age_restriction_marker);
        let client: &ClientProfile = if age_restricted {
            &self.config.restricted_client
        } else {
            &self.config.default_client
        };
        debug!(
            "blocked ({}), switching client to {} {}",
            reason, client.name, client.version
        );

        let mut repaired = Map::new();
        if let Some(context_params) = status.get("contextParams") {
            repaired.insert("contextParams".into(), context_params.clone());
        }
        repaired.insert("playableInEmbed".into(), Value::Bool(true));
        repaired.insert("status".into(), Value::from(STATUS_OK));

        // `response` is a JSON object here, the status lookup above proved it.
        if let Some(root) = response.as_object_mut() {
            root.insert(PLAYABILITY_STATUS.into(), Value::Object(repaired));
        }

        let encoded = serde_json::to_string(&response)?;
        Ok(Some((page.rewritten(client, encoded), age_restricted)))
    }

    /// Spend this session's attempt: patch the stored configuration and
    /// reload the widget from it.
    ///
    /// A failed attempt still counts, and leaves the store untouched.
    pub fn recover(
        &self,
        widget: &dyn Widget,
        page: &dyn PageConfigStore,
    ) -> Result<RecoveryOutcome, RecoveryError> {
        if self.attempted.swap(true, Ordering::SeqCst) {
            return Ok(RecoveryOutcome::AlreadyAttempted);
        }

        let Some((patched, age_restricted)) = self.patch(&page.load())? else {
            return Ok(RecoveryOutcome::AlreadyPlayable);
        };

        let revision = patched.revision;
        page.store(patched.clone());
        widget.reload(patched);

        Ok(RecoveryOutcome::Reloaded {
            age_restricted,
            revision,
        })
    }

    /// React to every error panel the page reports. Only the first one does
    /// anything; the rest are logged and dropped.
    pub async fn watch(self: Arc<Self>, source: Arc<dyn WidgetSource>, page: Arc<dyn PageConfigStore>) {
        let panels = source.error_panels();

        async move {
            while let Ok(panel) = panels.recv_async().await {
                if self.attempted() {
                    debug!("error panel reappeared, recovery already spent");
                    continue;
                }

                let widget = source.widget().await;
                match self.recover(widget.as_ref(), page.as_ref()) {
                    Ok(RecoveryOutcome::Reloaded {
                        age_restricted,
                        revision,
                    }) => info!(
                        "widget reloaded from page config r{} (age restricted: {}, panel: {:?})",
                        revision, age_restricted, panel.message
                    ),
                    Ok(outcome) => debug!("no recovery needed: {:?}", outcome),
                    Err(e) => warn!("recovery failed, giving up for this session: {}", e),
                }
            }
        }
        .instrument(info_span!("recovery"))
        .await;
    }
}
