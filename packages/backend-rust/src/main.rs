use bkt_backend_rust::config::Config;
use bkt_backend_rust::logging;
use bkt_backend_rust::state::AppState;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = logging::init_tracing(&config.log);
    for warning in &config.warnings {
        tracing::warn!("{warning}");
    }

    let engine = match AppState::create_engine(&config) {
        Ok(engine) => engine,
        Err(err) => {
            tracing::error!(error = %err, "failed to load BKT parameter table");
            std::process::exit(1);
        }
    };

    let defaults = engine.params().defaults();
    let engine_config = engine.config();
    tracing::info!(
        transition = defaults.transition,
        guess = defaults.guess,
        slip = defaults.slip,
        prior = defaults.prior,
        skills = engine.params().skill_count(),
        target_low = engine_config.target_range.low,
        target_high = engine_config.target_range.high,
        difficulty_scale = engine_config.difficulty_scale,
        "BKT engine configured"
    );

    let app = bkt_backend_rust::app(AppState::new(engine));

    let addr = config.bind_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(%addr, error = %err, "bind listener failed");
            std::process::exit(1);
        }
    };
    tracing::info!(%addr, "bkt-backend listening");

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    if let Err(e) = server.await {
        tracing::error!(error = %e, "server error");
    }

    tracing::info!("Graceful shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
