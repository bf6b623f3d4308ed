use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use bkt_algo::ObservationRecord;

use crate::dto::{ObserveRequest, ObserveResponse};
use crate::response::AppError;
use crate::state::AppState;

pub async fn observe(
    State(state): State<AppState>,
    payload: Result<Json<ObserveRequest>, JsonRejection>,
) -> Result<Json<ObserveResponse>, AppError> {
    let Json(request) = payload?;
    request.validate().map_err(AppError::validation)?;

    let record = ObservationRecord::from(&request);
    let updated_l = state.engine().observe(&record);

    tracing::debug!(
        attempted = record.attempted,
        correct = ?record.correct,
        prior_l = record.prior_l,
        updated_l,
        "observation applied"
    );

    Ok(Json(ObserveResponse { updated_l }))
}
