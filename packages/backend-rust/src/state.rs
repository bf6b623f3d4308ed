use std::sync::Arc;
use std::time::{Instant, SystemTime};

use bkt_algo::BktEngine;

use crate::config::Config;
use crate::params_store::{load_parameter_set, ParamsStoreError};

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    engine: Arc<BktEngine>,
}

impl AppState {
    pub fn new(engine: Arc<BktEngine>) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            engine,
        }
    }

    /// Build the shared engine from configuration, loading the per-skill table if configured
    pub fn create_engine(config: &Config) -> Result<Arc<BktEngine>, ParamsStoreError> {
        let params = load_parameter_set(config.params_json.as_deref(), config.default_params)?;
        Ok(Arc::new(BktEngine::new(params, config.engine)))
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn engine(&self) -> Arc<BktEngine> {
        Arc::clone(&self.engine)
    }
}
