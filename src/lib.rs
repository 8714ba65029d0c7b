//! Keeps an embedded video player widget and a host-persisted settings
//! object in agreement.
//!
//! The settings seed the widget once (volume, playback quality); after
//! that, user changes made in the widget are written back. A widget that
//! refuses to play gets one repair attempt through its page configuration.

pub mod common;
pub mod configs;
pub mod engine;
pub mod page;
pub mod recovery;
pub mod session;
pub mod settings;
pub mod widget;

pub use common::types::{QualityLevel, VideoId};
pub use configs::Config;
pub use engine::{EngineState, SyncEngine, SyncSession};
pub use page::{InterfaceBridge, PageParams};
pub use recovery::{PageConfig, PageConfigStore, RecoveryPatch};
pub use session::PlayerSession;
pub use settings::{QualityTable, Settings, SettingsBridge, SettingsStore};
pub use widget::{Widget, WidgetSource};
