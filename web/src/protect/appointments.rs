use crate::{extractors::authenticated_user::AuthenticatedUser, AppState};
use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::IntoResponse,
};
use domain::{appointment, Id};
use log::*;

/// Checks that the appointment referenced by `id` exists and that the authenticated
/// user is its teacher or its student.
/// Intended to be given to axum::middleware::from_fn_with_state in the router
pub(crate) async fn read(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(appointment_id): Path<Id>,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    match appointment::find_by_id(app_state.db_conn_ref(), appointment_id).await {
        Ok(appointment) => {
            if appointment.teacher_id == user.id || appointment.student_id == user.id {
                next.run(request).await
            } else {
                (StatusCode::FORBIDDEN, "FORBIDDEN").into_response()
            }
        }
        Err(e) => {
            debug!("Appointment {appointment_id} not found: {e:?}");
            (StatusCode::NOT_FOUND, "NOT FOUND").into_response()
        }
    }
}

/// Checks that the appointment referenced by `id` exists and belongs to the
/// authenticated teacher. Guards update, status change and delete.
pub(crate) async fn owner(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(appointment_id): Path<Id>,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    match appointment::find_by_id(app_state.db_conn_ref(), appointment_id).await {
        Ok(appointment) if appointment.teacher_id == user.id => next.run(request).await,
        Ok(_) => (StatusCode::FORBIDDEN, "FORBIDDEN").into_response(),
        Err(e) => {
            debug!("Appointment {appointment_id} not found: {e:?}");
            (StatusCode::NOT_FOUND, "NOT FOUND").into_response()
        }
    }
}
