use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::params::daily_workout::IndexParams;
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::workout::{self as WorkoutApi, ParsedWorkout};
use domain::{daily_workouts::Model, Id};
use service::config::ApiVersion;

use log::*;

/// POST prescribe a workout to a linked student for a day
#[utoipa::path(
    post,
    path = "/daily_workouts",
    params(ApiVersion),
    request_body = domain::daily_workouts::Model,
    responses(
        (status = 201, description = "Successfully prescribed a workout", body = domain::daily_workouts::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not a teacher of this student"),
        (status = 422, description = "Workout is not a JSON object"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Json(daily_workout_model): Json<Model>,
) -> Result<impl IntoResponse, Error> {
    debug!(
        "POST workout for student {} on {}",
        daily_workout_model.student_id, daily_workout_model.date
    );

    let daily_workout =
        WorkoutApi::create(app_state.db_conn_ref(), &user, daily_workout_model).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::CREATED.into(),
        daily_workout,
    )))
}

/// GET a student's workouts for a day or a date range, already parsed
#[utoipa::path(
    get,
    path = "/daily_workouts",
    params(ApiVersion, IndexParams),
    responses(
        (status = 200, description = "Successfully retrieved workouts", body = [ParsedWorkout]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Neither the student nor their trainer"),
        (status = 422, description = "from_date is after to_date"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET workouts with {params:?}");

    let (from_date, to_date) = params.range();
    let workouts =
        WorkoutApi::find_parsed(app_state.db_conn_ref(), params.student_id, from_date, to_date)
            .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), workouts)))
}

/// DELETE a prescribed workout
#[utoipa::path(
    delete,
    path = "/daily_workouts/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of the workout to delete"),
    ),
    responses(
        (status = 200, description = "Successfully deleted the workout"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the teacher who prescribed it"),
        (status = 404, description = "Workout not found"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn delete(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE workout {id}");

    WorkoutApi::delete(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        serde_json::json!({ "id": id }),
    )))
}
