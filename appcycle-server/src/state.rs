//! Application state shared across all request handlers.

use appcycle_core::keys::KeyCache;
use appcycle_core::{Dispatcher, LifecycleHandler};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::LoadedConfig;

/// Cloneable handle to the current dispatcher.
///
/// A reload swaps the dispatcher; requests already running keep the one they
/// started with.
#[derive(Clone)]
pub struct AppState {
    dispatcher: Arc<RwLock<Arc<Dispatcher>>>,
    handler: Arc<dyn LifecycleHandler>,
}

impl AppState {
    pub fn new(config: LoadedConfig, handler: Arc<dyn LifecycleHandler>) -> Self {
        let dispatcher = Dispatcher::new(config.definition, handler.clone(), config.dispatcher);
        Self {
            dispatcher: Arc::new(RwLock::new(Arc::new(dispatcher))),
            handler,
        }
    }

    /// The dispatcher serving new requests.
    pub async fn dispatcher(&self) -> Arc<Dispatcher> {
        self.dispatcher.read().await.clone()
    }

    /// Replace the dispatcher (used during SIGHUP reload).
    ///
    /// Cached keys survive the reload unless the key server changed.
    pub async fn update_config(&self, config: LoadedConfig) {
        let mut current = self.dispatcher.write().await;
        let keys: Option<Arc<KeyCache>> = (current.config().keyserver_url
            == config.dispatcher.keyserver_url)
            .then(|| current.key_cache().clone());

        let mut dispatcher =
            Dispatcher::new(config.definition, self.handler.clone(), config.dispatcher);
        if let Some(keys) = keys {
            dispatcher = dispatcher.with_key_cache(keys);
        }
        *current = Arc::new(dispatcher);
    }
}
