//! Two-way synchronization between the settings bridge and the widget.
//!
//! Settings flow into the widget once, at setup. After that the widget is
//! the source of truth and its change notifications flow back into the
//! settings, guarded so that a notification matching what is already
//! stored never causes a write.

use std::{future::Future, sync::Arc};

use parking_lot::RwLock;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

use super::{
    poller::{PollLimits, poll_until},
    resolver::{Resolution, Selection, resolve_preference, select_available},
    setup::SetupStep,
};
use crate::{
    common::{
        errors::WidgetError,
        types::{QualityLevel, SharedRw},
    },
    configs::QualityConfig,
    page::PageParams,
    settings::{QualityTable, SettingsBridge},
    widget::{VolumeChange, Widget, WidgetSource},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    WaitingForWidget,
    Seeding,
    QualityPolling,
    QualitySettled,
}

pub struct SyncEngine {
    limits: PollLimits,
    params: PageParams,
    state_tx: Arc<watch::Sender<EngineState>>,
}

impl SyncEngine {
    pub fn new(limits: PollLimits, params: PageParams) -> Self {
        let (state_tx, _) = watch::channel(EngineState::Uninitialized);
        Self {
            limits,
            params,
            state_tx: Arc::new(state_tx),
        }
    }

    pub fn from_config(config: &QualityConfig, params: PageParams) -> Self {
        Self::new(config.poll_limits(), params)
    }

    pub fn state(&self) -> watch::Receiver<EngineState> {
        self.state_tx.subscribe()
    }

    fn enter(&self, state: EngineState) {
        debug!("sync engine -> {:?}", state);
        self.state_tx.send_replace(state);
    }

    /// Drive one embedding session: wait for the bridge and the widget, run
    /// the setup protocol, and leave the listeners running.
    ///
    /// Consumes the engine, so setup can only ever run once.
    pub async fn run<B>(self, bridge: B, source: &dyn WidgetSource) -> SyncSession
    where
        B: Future<Output = Arc<dyn SettingsBridge>>,
    {
        let settings = bridge.await;
        debug!(
            "page params: start_at={:?} h264_only={} no_60fps={}",
            self.params.start_at, self.params.h264_only, self.params.no_60fps
        );
        self.enter(EngineState::WaitingForWidget);

        let widget = source.widget().await;
        self.enter(EngineState::Seeding);

        let snapshot = settings.snapshot();
        let mut session = SyncSession {
            widget: widget.clone(),
            target: Arc::new(RwLock::new(None)),
            resolution: Resolution::Auto,
            listeners: Vec::new(),
            negotiation: None,
        };

        for step in SetupStep::SEQUENCE {
            debug!("setup step: {}", step.name());
            match step {
                SetupStep::SeedVolume => widget.set_volume(snapshot.preferred_volume),
                SetupStep::SeekToStart => {
                    if let Some(seconds) = self.params.start_at {
                        widget.seek_to(seconds);
                    }
                }
                SetupStep::Pause => widget.pause(),
                SetupStep::AttachVolumeListener => {
                    if snapshot.volume_from_player {
                        session.listeners.push(tokio::spawn(forward_volume(
                            widget.volume_changes(),
                            settings.clone(),
                        )));
                    }
                }
                SetupStep::ResolveQuality => {
                    let resolution = resolve_preference(
                        &snapshot.player_quality,
                        snapshot.preferred_quality,
                    );
                    if let Resolution::Unmapped(value) = &resolution {
                        warn!(
                            "preferred quality {} is not in PlayerQuality; letting the player choose",
                            value
                        );
                    }
                    *session.target.write() = resolution.target().cloned();
                    session.resolution = resolution;
                }
                SetupStep::AttachQualityListener => {
                    if snapshot.quality_from_player {
                        session.listeners.push(tokio::spawn(forward_quality(
                            widget.quality_changes(),
                            settings.clone(),
                            snapshot.player_quality.clone(),
                            session.target.clone(),
                        )));
                    }
                }
                SetupStep::NegotiateQuality => match session.resolution.target().cloned() {
                    None => {
                        widget.play();
                        self.enter(EngineState::QualitySettled);
                    }
                    Some(wanted) => {
                        self.enter(EngineState::QualityPolling);
                        session.negotiation = Some(tokio::spawn(negotiate(
                            widget.clone(),
                            wanted,
                            session.target.clone(),
                            self.limits.clone(),
                            self.state_tx.clone(),
                        )));
                    }
                },
            }
        }

        info!("player session set up ({:?})", session.resolution);
        session
    }
}

/// A set-up session. Listeners keep running until `shutdown`.
pub struct SyncSession {
    widget: Arc<dyn Widget>,
    target: SharedRw<Option<QualityLevel>>,
    resolution: Resolution,
    listeners: Vec<JoinHandle<()>>,
    negotiation: Option<JoinHandle<()>>,
}

impl SyncSession {
    pub fn widget(&self) -> &Arc<dyn Widget> {
        &self.widget
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    /// The level currently targeted, after any fallback.
    pub fn target(&self) -> Option<QualityLevel> {
        self.target.read().clone()
    }

    /// Wait for quality negotiation to finish, if it is still running.
    pub async fn settled(&mut self) {
        if let Some(task) = self.negotiation.take() {
            let _ = task.await;
        }
    }

    pub fn shutdown(self) {
        for task in self.listeners.iter().chain(self.negotiation.iter()) {
            task.abort();
        }
    }
}

async fn forward_volume(changes: flume::Receiver<VolumeChange>, settings: Arc<dyn SettingsBridge>) {
    while let Ok(change) = changes.recv_async().await {
        if change.muted || change.volume == settings.preferred_volume() {
            continue;
        }
        debug!("player volume {} -> settings", change.volume);
        settings.set_preferred_volume(change.volume);
    }
}

async fn forward_quality(
    changes: flume::Receiver<QualityLevel>,
    settings: Arc<dyn SettingsBridge>,
    table: QualityTable,
    target: SharedRw<Option<QualityLevel>>,
) {
    while let Ok(level) = changes.recv_async().await {
        if target.read().as_ref() == Some(&level) {
            continue;
        }

        let Some(value) = table.value_of_native(level.as_str()) else {
            debug!("player reported unknown quality {}", level);
            continue;
        };

        if value != settings.preferred_quality() {
            debug!("player quality {} -> settings", level);
            settings.set_preferred_quality(value);
        }
    }
}

/// Try to pin `level`. `None` means the widget is not ready for it yet.
fn try_pin(widget: &dyn Widget, selection: Selection) -> Option<Selection> {
    if selection.level.is_auto() {
        return Some(selection);
    }

    match widget.set_playback_quality_range(&selection.level, &selection.level) {
        Ok(()) => Some(selection),
        Err(WidgetError::NotReady(method)) => {
            debug!("{} not ready, retrying", method);
            None
        }
        Err(e) => {
            warn!("player refused quality {}: {}", selection.level, e);
            // Nothing was pinned, so the comparison target stays as resolved.
            Some(Selection {
                fell_back: false,
                ..selection
            })
        }
    }
}

async fn negotiate(
    widget: Arc<dyn Widget>,
    wanted: QualityLevel,
    target: SharedRw<Option<QualityLevel>>,
    limits: PollLimits,
    state_tx: Arc<watch::Sender<EngineState>>,
) {
    let probe_widget = widget.clone();
    let outcome = poll_until(&limits, move || {
        if !probe_widget.supports_quality_range() {
            return None;
        }
        let available = probe_widget.available_quality_levels()?;
        let selection = select_available(&wanted, &available)?;
        try_pin(probe_widget.as_ref(), selection)
    })
    .await;

    match outcome {
        Ok(selection) => {
            if selection.fell_back {
                info!(
                    "preferred quality unavailable, falling back to {}",
                    selection.level
                );
                *target.write() = Some(selection.level.clone());
            }
            debug!("quality settled on {}", selection.level);
        }
        Err(e) => warn!("quality negotiation abandoned: {}", e),
    }

    widget.play();
    debug!("sync engine -> {:?}", EngineState::QualitySettled);
    state_tx.send_replace(EngineState::QualitySettled);
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        settings::{Settings, SettingsStore},
        widget::testing::{Call, FakeSource, FakeWidget},
    };

    fn three_levels() -> QualityTable {
        QualityTable::new([("LOW", 0), ("MEDIUM", 1), ("HIGH", 2)]).expect("table is bijective")
    }

    fn store(preferred_quality: i32, volume: i32) -> Arc<SettingsStore> {
        Arc::new(SettingsStore::new(Settings {
            preferred_volume: volume,
            preferred_quality,
            volume_from_player: true,
            quality_from_player: true,
            player_quality: three_levels(),
        }))
    }

    async fn start(
        store: &Arc<SettingsStore>,
        widget: &Arc<FakeWidget>,
        params: PageParams,
    ) -> SyncSession {
        let source = FakeSource::new(widget.clone());
        let bridge: Arc<dyn SettingsBridge> = store.clone();
        SyncEngine::new(PollLimits::default(), params)
            .run(async move { bridge }, &source)
            .await
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_matching_volume_reports_never_write() {
        let store = store(1, 40);
        let widget = FakeWidget::with_levels(vec![Some(vec!["medium"])]);
        let _session = start(&store, &widget, PageParams::default()).await;

        for _ in 0..5 {
            widget.emit_volume(40, false);
        }
        settle().await;
        assert_eq!(store.write_count(), 0);

        widget.emit_volume(55, false);
        widget.emit_volume(55, false);
        settle().await;
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.preferred_volume(), 55);
    }

    #[tokio::test(start_paused = true)]
    async fn test_muted_reports_are_ignored() {
        let store = store(1, 40);
        let widget = FakeWidget::with_levels(vec![Some(vec!["medium"])]);
        let _session = start(&store, &widget, PageParams::default()).await;

        widget.emit_volume(0, true);
        settle().await;
        assert_eq!(store.write_count(), 0);
        assert_eq!(store.preferred_volume(), 40);
    }

    #[tokio::test(start_paused = true)]
    async fn test_seeding_runs_once_before_listeners() {
        let store = store(1, 30);
        let widget = FakeWidget::with_levels(vec![Some(vec!["medium"])]);
        let mut session = start(&store, &widget, PageParams {
            start_at: Some(12.0),
            ..PageParams::default()
        }).await;
        session.settled().await;

        let calls = widget.calls();
        assert_eq!(
            &calls[..5],
            &[
                Call::SetVolume(30),
                Call::SeekTo(12.0),
                Call::Pause,
                Call::SubscribeVolume,
                Call::SubscribeQuality,
            ]
        );
        assert_eq!(widget.count(&Call::SetVolume(30)), 1);
        assert_eq!(widget.count(&Call::Pause), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_preference_plays_without_pinning() {
        let store = Arc::new(SettingsStore::new(Settings {
            preferred_quality: 0,
            quality_from_player: true,
            ..Settings::default()
        }));
        let widget = FakeWidget::with_levels(vec![Some(vec!["hd720", "medium"])]);
        let source = FakeSource::new(widget.clone());
        let engine = SyncEngine::new(PollLimits::default(), PageParams::default());
        let state = engine.state();
        let bridge: Arc<dyn SettingsBridge> = store.clone();

        let session = engine.run(async move { bridge }, &source).await;
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(*state.borrow(), EngineState::QualitySettled);
        assert_eq!(session.resolution(), &Resolution::Auto);
        assert!(widget.pin_calls().is_empty());
        assert_eq!(widget.queries(), 0);
        assert_eq!(widget.count(&Call::SubscribeQuality), 1);
        assert_eq!(widget.calls().last(), Some(&Call::Play));
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_preference_still_records_player_choice() {
        let store = Arc::new(SettingsStore::new(Settings {
            preferred_quality: 0,
            quality_from_player: true,
            ..Settings::default()
        }));
        let widget = FakeWidget::with_levels(vec![Some(vec!["hd1080", "hd720"])]);
        let session = start(&store, &widget, PageParams::default()).await;
        assert_eq!(session.target(), None);

        widget.emit_quality("auto");
        settle().await;
        assert_eq!(store.write_count(), 0);

        widget.emit_quality("hd1080");
        settle().await;
        assert_eq!(store.preferred_quality(), 4);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_fallback_keeps_resolved_target() {
        let store = store(2, 50);
        let widget = FakeWidget::with_levels(vec![Some(vec!["medium", "low"])]);
        widget.reject_pins("range locked");
        let mut session = start(&store, &widget, PageParams::default()).await;
        session.settled().await;

        assert_eq!(session.target(), Some(QualityLevel::new("high")));
        assert_eq!(widget.pin_calls().len(), 1);
        assert_eq!(widget.count(&Call::Play), 1);

        widget.emit_quality("medium");
        settle().await;
        assert_eq!(store.preferred_quality(), 1);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmapped_preference_is_treated_as_auto() {
        let store = store(42, 50);
        let widget = FakeWidget::with_levels(vec![Some(vec!["medium"])]);
        let session = start(&store, &widget, PageParams::default()).await;

        assert_eq!(session.resolution(), &Resolution::Unmapped(42));
        assert_eq!(session.target(), None);
        assert!(widget.pin_calls().is_empty());
        assert_eq!(widget.count(&Call::Play), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_offer_never_pins() {
        let store = store(2, 50);
        let widget = FakeWidget::with_levels(vec![Some(vec![])]);
        let source = FakeSource::new(widget.clone());
        let engine = SyncEngine::new(PollLimits::default(), PageParams::default());
        let state = engine.state();
        let bridge: Arc<dyn SettingsBridge> = store.clone();
        let _session = engine.run(async move { bridge }, &source).await;

        tokio::time::sleep(Duration::from_secs(30)).await;

        assert!(widget.queries() >= 299);
        assert!(widget.pin_calls().is_empty());
        assert_eq!(widget.count(&Call::Play), 0);
        assert_eq!(*state.borrow(), EngineState::QualityPolling);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pins_after_three_empty_cycles_then_stops() {
        let store = store(1, 50);
        let widget = FakeWidget::with_levels(vec![
            Some(vec![]),
            Some(vec![]),
            Some(vec![]),
            Some(vec!["medium", "high"]),
        ]);
        let mut session = start(&store, &widget, PageParams::default()).await;
        session.settled().await;

        assert_eq!(widget.queries(), 4);
        assert_eq!(
            widget.pin_calls(),
            vec![("medium".to_string(), "medium".to_string())]
        );
        assert_eq!(widget.calls().last(), Some(&Call::Play));

        widget.script_levels(vec![Some(vec!["low"])]);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(widget.queries(), 4);
        assert_eq!(widget.pin_calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_becomes_comparison_target() {
        let store = store(2, 50);
        let widget = FakeWidget::with_levels(vec![Some(vec!["medium", "low"])]);
        let mut session = start(&store, &widget, PageParams::default()).await;
        session.settled().await;

        assert_eq!(session.target(), Some(QualityLevel::new("medium")));
        assert_eq!(
            widget.pin_calls(),
            vec![("medium".to_string(), "medium".to_string())]
        );

        widget.emit_quality("medium");
        settle().await;
        assert_eq!(store.write_count(), 0);
        assert_eq!(store.preferred_quality(), 2);

        widget.emit_quality("low");
        settle().await;
        assert_eq!(store.preferred_quality(), 0);

        widget.emit_quality("ultra");
        settle().await;
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_still_resumes_playback() {
        let store = store(2, 50);
        let widget = FakeWidget::with_levels(vec![None]);
        let source = FakeSource::new(widget.clone());
        let limits = PollLimits {
            timeout: Some(Duration::from_millis(500)),
            ..PollLimits::default()
        };
        let engine = SyncEngine::new(limits, PageParams::default());
        let state = engine.state();
        let bridge: Arc<dyn SettingsBridge> = store.clone();

        let mut session = engine.run(async move { bridge }, &source).await;
        session.settled().await;

        assert!(widget.pin_calls().is_empty());
        assert_eq!(widget.count(&Call::Play), 1);
        assert_eq!(*state.borrow(), EngineState::QualitySettled);
        assert_eq!(session.target(), Some(QualityLevel::new("high")));
    }
}
