use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/info", get(info))
        .route("/live", get(live))
}

async fn root() -> Json<StatusResponse> {
    Json(StatusResponse { status: "ok" })
}

async fn info(State(state): State<AppState>) -> Response {
    let engine = state.engine();
    let band = engine.config().target_range;

    let response = HealthInfoResponse {
        service: "bkt-backend",
        version: env!("CARGO_PKG_VERSION"),
        start_time: system_time_iso(state.started_at_system()),
        uptime: state.uptime_seconds(),
        skills: engine.params().skill_count(),
        target_range: [band.low, band.high],
    };

    Json(response).into_response()
}

async fn live(State(state): State<AppState>) -> Response {
    let memory_healthy = check_memory_health(0.9);
    let status = if memory_healthy { "healthy" } else { "unhealthy" };

    let response = LivenessResponse {
        status,
        timestamp: now_iso(),
        uptime: state.uptime_seconds(),
        checks: LivenessChecks {
            memory: memory_healthy,
        },
    };

    let status_code = if memory_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response)).into_response()
}

fn system_time_iso(time: std::time::SystemTime) -> String {
    let datetime: chrono::DateTime<chrono::Utc> = time.into();
    datetime.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

// 1.4 GB soft ceiling
fn check_memory_health(threshold: f64) -> bool {
    let rss = read_proc_self_status_kb("VmRSS").unwrap_or(0) * 1024;
    if rss == 0 {
        return true;
    }
    (rss as f64) / 1_400_000_000f64 < threshold
}

fn read_proc_self_status_kb(prefix: &str) -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    status
        .lines()
        .map(str::trim_start)
        .find(|line| line.starts_with(prefix))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|value| value.parse().ok())
}

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthInfoResponse {
    service: &'static str,
    version: &'static str,
    start_time: String,
    uptime: u64,
    skills: usize,
    target_range: [f64; 2],
}

#[derive(Serialize)]
struct LivenessResponse {
    status: &'static str,
    timestamp: String,
    uptime: u64,
    checks: LivenessChecks,
}

#[derive(Serialize)]
struct LivenessChecks {
    memory: bool,
}
