use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::params::appointment::{IndexParams, StatusParams};
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::appointment::{self as AppointmentApi, AppointmentWithStudent, TodaySchedule};
use domain::{appointments::Model, Id};
use service::config::ApiVersion;

use log::*;

/// POST schedule a new Appointment with one of the teacher's students
#[utoipa::path(
    post,
    path = "/appointments",
    params(ApiVersion),
    request_body = domain::appointments::Model,
    responses(
        (status = 201, description = "Successfully scheduled a new Appointment", body = domain::appointments::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not a teacher, or the student is not linked"),
        (status = 422, description = "Unprocessable Entity"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Json(appointment_model): Json<Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create a new Appointment from: {appointment_model:?}");

    let appointment =
        AppointmentApi::create(app_state.db_conn_ref(), &user, appointment_model).await?;

    debug!("New Appointment: {appointment:?}");

    Ok(Json(ApiResponse::new(StatusCode::CREATED.into(), appointment)))
}

/// GET the authenticated teacher's Appointments, with student profiles attached
#[utoipa::path(
    get,
    path = "/appointments",
    params(ApiVersion, IndexParams),
    responses(
        (status = 200, description = "Successfully retrieved Appointments", body = [AppointmentWithStudent]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only teachers list appointments here"),
        (status = 422, description = "from_date is after to_date"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Appointments for teacher {} with {params:?}", user.id);

    let db = app_state.db_conn_ref();
    let appointments = AppointmentApi::find_for_teacher(db, user.id, params.into()).await?;
    let appointments = AppointmentApi::with_students(db, appointments).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), appointments)))
}

/// GET the teacher's schedule for today, in the teacher's own timezone
#[utoipa::path(
    get,
    path = "/appointments/today",
    params(ApiVersion),
    responses(
        (status = 200, description = "Successfully retrieved today's schedule", body = TodaySchedule),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only teachers have a schedule"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn today(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    let schedule = AppointmentApi::today_for_teacher(app_state.db_conn_ref(), &user).await?;

    debug!(
        "Today ({}) for teacher {}: {:?}",
        schedule.date, user.id, schedule.summary
    );

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), schedule)))
}

/// GET a particular Appointment specified by its id
#[utoipa::path(
    get,
    path = "/appointments/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Appointment id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved an Appointment", body = domain::appointments::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Appointment not found"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn read(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Appointment by id: {id}");

    let appointment = AppointmentApi::find_by_id(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), appointment)))
}

/// PUT update the date, time, notes and status of an Appointment
#[utoipa::path(
    put,
    path = "/appointments/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of the Appointment to update"),
    ),
    request_body = domain::appointments::Model,
    responses(
        (status = 200, description = "Successfully updated an Appointment", body = domain::appointments::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the appointment's teacher"),
        (status = 404, description = "Appointment not found"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn update(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(appointment_model): Json<Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Update Appointment with id: {id}");

    let appointment = AppointmentApi::update(app_state.db_conn_ref(), id, appointment_model).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), appointment)))
}

/// PUT mark an Appointment as scheduled, completed, cancelled or missed
#[utoipa::path(
    put,
    path = "/appointments/{id}/status",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of the Appointment to update"),
        StatusParams,
    ),
    responses(
        (status = 200, description = "Successfully updated the Appointment status", body = domain::appointments::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the appointment's teacher"),
        (status = 404, description = "Appointment not found"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn update_status(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Query(params): Query<StatusParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Appointment {id} status to {}", params.status);

    let appointment =
        AppointmentApi::update_status(app_state.db_conn_ref(), id, params.status).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), appointment)))
}

/// DELETE an Appointment
#[utoipa::path(
    delete,
    path = "/appointments/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of the Appointment to delete"),
    ),
    responses(
        (status = 200, description = "Successfully deleted the Appointment"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the appointment's teacher"),
        (status = 404, description = "Appointment not found"),
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
    debug!("DELETE Appointment by id: {id}");

    AppointmentApi::delete(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        serde_json::json!({ "id": id }),
    )))
}
