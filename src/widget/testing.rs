use std::{collections::VecDeque, sync::Arc};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{ErrorPanel, VolumeChange, Widget, WidgetSource};
use crate::{
    common::{errors::WidgetError, types::QualityLevel},
    recovery::PageConfig,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetVolume(i32),
    Play,
    Pause,
    SeekTo(f64),
    SetQualityRange(String, String),
    Reload(u64),
    SubscribeVolume,
    SubscribeQuality,
}

/// Widget stand-in that records every mutator call.
///
/// Quality queries replay `levels` front to back; the last entry sticks.
pub struct FakeWidget {
    calls: Mutex<Vec<Call>>,
    levels: Mutex<VecDeque<Option<Vec<QualityLevel>>>>,
    queries: Mutex<usize>,
    rejection: Mutex<Option<String>>,
    volume_subs: Mutex<Vec<flume::Sender<VolumeChange>>>,
    quality_subs: Mutex<Vec<flume::Sender<QualityLevel>>>,
    reloads: Mutex<Vec<PageConfig>>,
}

impl FakeWidget {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            levels: Mutex::new(VecDeque::from([None])),
            queries: Mutex::new(0),
            rejection: Mutex::new(None),
            volume_subs: Mutex::new(Vec::new()),
            quality_subs: Mutex::new(Vec::new()),
            reloads: Mutex::new(Vec::new()),
        })
    }

    pub fn with_levels(script: Vec<Option<Vec<&str>>>) -> Arc<Self> {
        let widget = Self::new();
        widget.script_levels(script);
        widget
    }

    pub fn script_levels(&self, script: Vec<Option<Vec<&str>>>) {
        *self.levels.lock() = script
            .into_iter()
            .map(|entry| entry.map(|levels| levels.into_iter().map(QualityLevel::new).collect()))
            .collect();
    }

    /// Make every later quality-range call fail with `reason`.
    pub fn reject_pins(&self, reason: &str) {
        *self.rejection.lock() = Some(reason.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn count(&self, wanted: &Call) -> usize {
        self.calls.lock().iter().filter(|c| *c == wanted).count()
    }

    pub fn pin_calls(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::SetQualityRange(min, max) => Some((min.clone(), max.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn queries(&self) -> usize {
        *self.queries.lock()
    }

    pub fn reloads(&self) -> Vec<PageConfig> {
        self.reloads.lock().clone()
    }

    pub fn emit_volume(&self, volume: i32, muted: bool) {
        self.volume_subs
            .lock()
            .retain(|tx| tx.send(VolumeChange { volume, muted }).is_ok());
    }

    pub fn emit_quality(&self, level: &str) {
        let level = QualityLevel::new(level);
        self.quality_subs
            .lock()
            .retain(|tx| tx.send(level.clone()).is_ok());
    }

    fn push(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

impl Widget for FakeWidget {
    fn set_volume(&self, volume: i32) {
        self.push(Call::SetVolume(volume));
    }

    fn play(&self) {
        self.push(Call::Play);
    }

    fn pause(&self) {
        self.push(Call::Pause);
    }

    fn seek_to(&self, seconds: f64) {
        self.push(Call::SeekTo(seconds));
    }

    fn available_quality_levels(&self) -> Option<Vec<QualityLevel>> {
        *self.queries.lock() += 1;
        let mut levels = self.levels.lock();
        if levels.len() > 1 {
            levels.pop_front().flatten()
        } else {
            levels.front().cloned().flatten()
        }
    }

    fn supports_quality_range(&self) -> bool {
        self.levels.lock().iter().any(Option::is_some)
    }

    fn set_playback_quality_range(
        &self,
        min: &QualityLevel,
        max: &QualityLevel,
    ) -> Result<(), WidgetError> {
        self.push(Call::SetQualityRange(
            min.as_str().to_string(),
            max.as_str().to_string(),
        ));
        match self.rejection.lock().clone() {
            Some(reason) => Err(WidgetError::Rejected(reason)),
            None => Ok(()),
        }
    }

    fn reload(&self, config: PageConfig) {
        self.push(Call::Reload(config.revision));
        self.reloads.lock().push(config);
    }

    fn volume_changes(&self) -> flume::Receiver<VolumeChange> {
        let (tx, rx) = flume::unbounded();
        self.push(Call::SubscribeVolume);
        self.volume_subs.lock().push(tx);
        rx
    }

    fn quality_changes(&self) -> flume::Receiver<QualityLevel> {
        let (tx, rx) = flume::unbounded();
        self.push(Call::SubscribeQuality);
        self.quality_subs.lock().push(tx);
        rx
    }
}

/// Page stand-in that hands out one `FakeWidget` and a scripted error panel.
pub struct FakeSource {
    pub widget: Arc<FakeWidget>,
    errors_tx: flume::Sender<ErrorPanel>,
    errors_rx: flume::Receiver<ErrorPanel>,
}

impl FakeSource {
    pub fn new(widget: Arc<FakeWidget>) -> Self {
        let (errors_tx, errors_rx) = flume::unbounded();
        Self {
            widget,
            errors_tx,
            errors_rx,
        }
    }

    pub fn show_error(&self, message: &str) {
        let _ = self.errors_tx.send(ErrorPanel {
            message: Some(message.to_string()),
        });
    }
}

#[async_trait]
impl WidgetSource for FakeSource {
    async fn widget(&self) -> Arc<dyn Widget> {
        self.widget.clone()
    }

    fn error_panels(&self) -> flume::Receiver<ErrorPanel> {
        self.errors_rx.clone()
    }
}
