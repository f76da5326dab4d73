use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::params::trainer_request::{CreateParams, RespondParams};
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{student_trainer_requests, trainer_request as TrainerRequestApi, Id};
use service::config::ApiVersion;

use log::*;

/// POST a link request to a user of the opposite role
#[utoipa::path(
    post,
    path = "/trainer_requests",
    params(ApiVersion),
    request_body = CreateParams,
    responses(
        (status = 201, description = "Successfully sent a link request", body = student_trainer_requests::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Trainer plan limit reached"),
        (status = 404, description = "Target user not found"),
        (status = 409, description = "Already linked, or a pending request exists"),
        (status = 422, description = "Target has the same role as the sender"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Json(params): Json<CreateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST link request from {} to {}", user.id, params.target_id);

    let request = TrainerRequestApi::send(app_state.db_conn_ref(), &user, params.target_id).await?;

    Ok(Json(ApiResponse::new(StatusCode::CREATED.into(), request)))
}

/// PUT an answer to a pending link request
#[utoipa::path(
    put,
    path = "/trainer_requests/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of the request to answer"),
        RespondParams,
    ),
    responses(
        (status = 200, description = "Successfully answered the request", body = student_trainer_requests::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the target of the request, or trainer plan limit reached"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is no longer pending"),
        (status = 422, description = "Status must be accepted or rejected"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn update(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Query(params): Query<RespondParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT answer {} to link request {id}", params.status);

    let request =
        TrainerRequestApi::respond(app_state.db_conn_ref(), id, user.id, params.status).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), request)))
}

/// DELETE (withdraw) a pending link request
#[utoipa::path(
    delete,
    path = "/trainer_requests/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of the request to withdraw"),
    ),
    responses(
        (status = 200, description = "Successfully withdrew the request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the sender of the request"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is no longer pending"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn delete(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE link request {id}");

    TrainerRequestApi::cancel(app_state.db_conn_ref(), id, user.id).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        serde_json::json!({ "id": id }),
    )))
}
