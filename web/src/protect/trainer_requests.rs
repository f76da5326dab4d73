use crate::{extractors::authenticated_user::AuthenticatedUser, AppState};
use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::IntoResponse,
};
use domain::{trainer_request, Id};
use log::*;

/// Only the user a request was sent to may answer it.
pub(crate) async fn respond(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(request_id): Path<Id>,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    match trainer_request::find_by_id(app_state.db_conn_ref(), request_id).await {
        Ok(trainer_request) if trainer_request.target_id == user.id => next.run(request).await,
        Ok(_) => (StatusCode::FORBIDDEN, "FORBIDDEN").into_response(),
        Err(e) => {
            debug!("Trainer request {request_id} not found: {e:?}");
            (StatusCode::NOT_FOUND, "NOT FOUND").into_response()
        }
    }
}

/// Only the sender of a request may withdraw it.
pub(crate) async fn cancel(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(request_id): Path<Id>,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    match trainer_request::find_by_id(app_state.db_conn_ref(), request_id).await {
        Ok(trainer_request) if trainer_request.requester_id == user.id => next.run(request).await,
        Ok(_) => (StatusCode::FORBIDDEN, "FORBIDDEN").into_response(),
        Err(e) => {
            debug!("Trainer request {request_id} not found: {e:?}");
            (StatusCode::NOT_FOUND, "NOT FOUND").into_response()
        }
    }
}
