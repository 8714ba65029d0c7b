//! One embedding session: the sync engine and the recovery patch, sharing
//! the same widget source.

use std::{future::Future, sync::Arc};

use tokio::{sync::watch, task::JoinHandle};
use tracing::{Instrument, info_span};

use crate::{
    configs::Config,
    engine::{EngineState, SyncEngine, SyncSession},
    page::PageParams,
    recovery::{PageConfigStore, RecoveryPatch},
    settings::SettingsBridge,
    widget::WidgetSource,
};

pub struct PlayerSession {
    pub sync: SyncSession,
    pub recovery: Arc<RecoveryPatch>,
    recovery_task: JoinHandle<()>,
}

impl PlayerSession {
    /// Start recovery watching right away, then run the sync engine once the
    /// bridge connects.
    pub async fn start<B>(
        config: &Config,
        params: PageParams,
        bridge: B,
        source: Arc<dyn WidgetSource>,
        page: Arc<dyn PageConfigStore>,
    ) -> Self
    where
        B: Future<Output = Arc<dyn SettingsBridge>>,
    {
        Self::start_with_state(config, params, bridge, source, page).await.0
    }

    /// Like `start`, also handing back the engine state feed.
    pub async fn start_with_state<B>(
        config: &Config,
        params: PageParams,
        bridge: B,
        source: Arc<dyn WidgetSource>,
        page: Arc<dyn PageConfigStore>,
    ) -> (Self, watch::Receiver<EngineState>)
    where
        B: Future<Output = Arc<dyn SettingsBridge>>,
    {
        let recovery = Arc::new(RecoveryPatch::new(config.recovery.clone()));
        let recovery_task = tokio::spawn(recovery.clone().watch(source.clone(), page));

        let engine = SyncEngine::from_config(&config.quality, params);
        let state = engine.state();
        let sync = engine
            .run(bridge, source.as_ref())
            .instrument(info_span!("session"))
            .await;

        (
            Self {
                sync,
                recovery,
                recovery_task,
            },
            state,
        )
    }

    /// Page unload.
    pub fn shutdown(self) {
        self.recovery_task.abort();
        self.sync.shutdown();
    }
}
