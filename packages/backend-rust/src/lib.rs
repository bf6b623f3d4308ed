pub mod client;
pub mod config;
pub mod dto;
pub mod logging;
pub mod params_store;
pub mod response;
pub mod routes;
pub mod simulation;
pub mod state;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::params_store::ParamsStoreError;
use crate::state::AppState;

/// Router with the HTTP layers applied
pub fn app(state: AppState) -> axum::Router {
    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub fn create_app(config: &Config) -> Result<axum::Router, ParamsStoreError> {
    let engine = AppState::create_engine(config)?;
    Ok(app(AppState::new(engine)))
}
