use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::quality::QualityTable;

pub const VOLUME_MIN: i32 = 0;
pub const VOLUME_MAX: i32 = 100;

/// Settings fields the engine reads and writes, as exposed by the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_volume")]
    pub preferred_volume: i32,
    #[serde(default)]
    pub preferred_quality: i32,
    #[serde(default)]
    pub volume_from_player: bool,
    #[serde(default)]
    pub quality_from_player: bool,
    #[serde(rename = "PlayerQuality", default)]
    pub player_quality: QualityTable,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preferred_volume: default_volume(),
            preferred_quality: 0,
            volume_from_player: false,
            quality_from_player: false,
            player_quality: QualityTable::default(),
        }
    }
}

fn default_volume() -> i32 {
    VOLUME_MAX
}

/// A write performed through the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsChange {
    PreferredVolume(i32),
    PreferredQuality(i32),
}

/// The host-provided settings object.
///
/// Writes must be visible to the host's persistence layer with no further
/// action from the caller.
pub trait SettingsBridge: Send + Sync {
    fn snapshot(&self) -> Settings;
    fn preferred_volume(&self) -> i32;
    fn set_preferred_volume(&self, volume: i32);
    fn preferred_quality(&self) -> i32;
    fn set_preferred_quality(&self, quality: i32);
}

/// In-process settings object backed by a lock, publishing every write to
/// each live change-feed subscriber.
pub struct SettingsStore {
    inner: RwLock<Settings>,
    writes: AtomicU64,
    subscribers: Mutex<Vec<flume::Sender<SettingsChange>>>,
}

impl SettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: RwLock::new(settings),
            writes: AtomicU64::new(0),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Parse the bridge's camelCase JSON payload.
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(payload)?))
    }

    /// Number of writes performed so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Subscribe to writes made from now on. Dropping the receiver
    /// unsubscribes.
    pub fn changes(&self) -> flume::Receiver<SettingsChange> {
        let (tx, rx) = flume::unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    fn record(&self, change: SettingsChange) {
        self.writes.fetch_add(1, Ordering::Relaxed);
        debug!("settings write: {:?}", change);
        self.subscribers
            .lock()
            .retain(|tx| tx.send(change).is_ok());
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl SettingsBridge for SettingsStore {
    fn snapshot(&self) -> Settings {
        self.inner.read().clone()
    }

    fn preferred_volume(&self) -> i32 {
        self.inner.read().preferred_volume
    }

    fn set_preferred_volume(&self, volume: i32) {
        let volume = volume.clamp(VOLUME_MIN, VOLUME_MAX);
        self.inner.write().preferred_volume = volume;
        self.record(SettingsChange::PreferredVolume(volume));
    }

    fn preferred_quality(&self) -> i32 {
        self.inner.read().preferred_quality
    }

    fn set_preferred_quality(&self, quality: i32) {
        self.inner.write().preferred_quality = quality;
        self.record(SettingsChange::PreferredQuality(quality));
    }
}
