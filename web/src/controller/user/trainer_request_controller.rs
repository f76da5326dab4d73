use crate::controller::ApiResponse;
use crate::extractors::compare_api_version::CompareApiVersion;
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::trainer_request::{self as TrainerRequestApi, RequestNotification};
use domain::{student_trainer_requests, Id};
use service::config::ApiVersion;

use log::*;

/// GET the link requests a user has sent
#[utoipa::path(
    get,
    path = "/users/{user_id}/trainer_requests/sent",
    params(
        ApiVersion,
        ("user_id" = Uuid, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "Successfully retrieved sent requests", body = [student_trainer_requests::Model]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn sent(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(user_id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    let requests = TrainerRequestApi::sent(app_state.db_conn_ref(), user_id).await?;

    debug!("User {user_id} has sent {} requests", requests.len());

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), requests)))
}

/// GET every link request addressed to a user, whatever its status
#[utoipa::path(
    get,
    path = "/users/{user_id}/trainer_requests/received",
    params(
        ApiVersion,
        ("user_id" = Uuid, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "Successfully retrieved received requests", body = [student_trainer_requests::Model]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn received(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(user_id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    let requests = TrainerRequestApi::received(app_state.db_conn_ref(), user_id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), requests)))
}

/// GET pending requests addressed to a user, with the sender's profile
#[utoipa::path(
    get,
    path = "/users/{user_id}/trainer_requests/pending",
    params(
        ApiVersion,
        ("user_id" = Uuid, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "Successfully retrieved pending notifications", body = [RequestNotification]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn pending(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(user_id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    let notifications =
        TrainerRequestApi::pending_notifications(app_state.db_conn_ref(), user_id).await?;

    debug!(
        "User {user_id} has {} pending requests",
        notifications.len()
    );

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), notifications)))
}
