use std::{fmt, sync::Arc};

use shoplens_core::{Detector, EventStore};

use crate::infra::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub store: EventStore,
    pub detector: Arc<Detector>,
    pub config: Arc<Config>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        store: EventStore,
        detector: Arc<Detector>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            store,
            detector,
            config,
        }
    }

    /// Fire-and-forget a detector run for a raw subject string.
    pub fn spawn_check(&self, input: &str) {
        let detector = Arc::clone(&self.detector);
        let input = input.to_owned();
        tokio::spawn(async move {
            detector.run(&input).await;
        });
    }
}
