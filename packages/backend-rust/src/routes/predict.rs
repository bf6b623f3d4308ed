use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::dto::{PredictRequest, PredictResponse};
use crate::response::AppError;
use crate::state::AppState;

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, AppError> {
    let Json(request) = payload?;
    request.validate().map_err(AppError::validation)?;

    let prediction = state.engine().predict(&request.as_input());
    let (theme_level, prior_l) = (prediction.theme_level, prediction.prior_l);

    let response = PredictResponse::from_prediction(&request, prediction)
        .ok_or_else(|| AppError::internal("prediction produced no chosen action"))?;

    tracing::debug!(
        theme_id = %response.theme_id,
        lesson_index = response.lesson_index,
        action_index = response.action_index,
        theme_level,
        prior_l,
        chosen = %response.chosen_action.action_id,
        success_prediction = response.chosen_action.success_prediction,
        "prediction computed"
    );

    Ok(Json(response))
}
