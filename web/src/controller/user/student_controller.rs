use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::params::student::{SearchParams, StatsParams};
use crate::params::user::CreateParams;
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::roster::{self, PlanUsage};
use domain::student_stats::{self, StudentStatsEntry};
use domain::user::PublicProfile;
use domain::{users::Role, Id};
use service::config::ApiVersion;

use log::*;

/// GET the students linked to a teacher
#[utoipa::path(
    get,
    path = "/users/{user_id}/students",
    params(
        ApiVersion,
        ("user_id" = Uuid, Path, description = "Teacher's user ID"),
        SearchParams,
    ),
    responses(
        (status = 200, description = "Successfully retrieved linked students", body = [PublicProfile]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(user_id): Path<Id>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET students of {user_id}, search: {:?}", params.search);

    let students: Vec<PublicProfile> =
        roster::students_of(app_state.db_conn_ref(), user_id, params.term())
            .await?
            .iter()
            .map(PublicProfile::from)
            .collect();

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), students)))
}

/// POST create a student account that is linked to the teacher right away
#[utoipa::path(
    post,
    path = "/users/{user_id}/students",
    params(
        ApiVersion,
        ("user_id" = Uuid, Path, description = "Teacher's user ID"),
    ),
    request_body = CreateParams,
    responses(
        (status = 201, description = "Successfully created and linked a student", body = PublicProfile),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden, or the plan's student limit is reached"),
        (status = 409, description = "Email already registered"),
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
    Json(params): Json<CreateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST teacher {} creates student {}", user.id, params.email);

    let student = roster::create_student(
        app_state.db_conn_ref(),
        &user,
        params.into_model(Role::Student),
    )
    .await?;

    Ok(Json(ApiResponse::new(
        StatusCode::CREATED.into(),
        PublicProfile::from(&student),
    )))
}

/// DELETE remove the link between a teacher and one of their students
#[utoipa::path(
    delete,
    path = "/users/{user_id}/students/{student_id}",
    params(
        ApiVersion,
        ("user_id" = Uuid, Path, description = "Teacher's user ID"),
        ("student_id" = Uuid, Path, description = "Student's user ID"),
    ),
    responses(
        (status = 204, description = "Successfully unlinked the student"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Student is not linked"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn delete(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path((user_id, student_id)): Path<(Id, Id)>,
) -> Result<impl IntoResponse, Error> {
    roster::unlink(app_state.db_conn_ref(), user_id, student_id).await?;

    Ok(Json(ApiResponse::<()>::no_content(
        StatusCode::NO_CONTENT.into(),
    )))
}

/// GET students the teacher could still invite
#[utoipa::path(
    get,
    path = "/users/{user_id}/students/available",
    params(
        ApiVersion,
        ("user_id" = Uuid, Path, description = "Teacher's user ID"),
        SearchParams,
    ),
    responses(
        (status = 200, description = "Students neither linked nor already invited", body = [PublicProfile]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn available(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(user_id): Path<Id>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, Error> {
    let students: Vec<PublicProfile> =
        roster::available_students(app_state.db_conn_ref(), user_id, params.term())
            .await?
            .iter()
            .map(PublicProfile::from)
            .collect();

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), students)))
}

/// GET appointment counts for each linked student, optionally for a single month
#[utoipa::path(
    get,
    path = "/users/{user_id}/students/stats",
    params(
        ApiVersion,
        ("user_id" = Uuid, Path, description = "Teacher's user ID"),
        StatsParams,
    ),
    responses(
        (status = 200, description = "Successfully computed student stats", body = [StudentStatsEntry]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Incomplete or invalid period"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn stats(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(user_id): Path<Id>,
    Query(params): Query<StatsParams>,
) -> Result<impl IntoResponse, Error> {
    let period = params.period()?;
    debug!("GET student stats for {user_id}, period: {period:?}");

    let stats = student_stats::for_teacher(app_state.db_conn_ref(), user_id, period).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), stats)))
}

/// GET how many of the plan's student slots the teacher is using
#[utoipa::path(
    get,
    path = "/users/{user_id}/plan_usage",
    params(
        ApiVersion,
        ("user_id" = Uuid, Path, description = "Teacher's user ID"),
    ),
    responses(
        (status = 200, description = "Successfully computed plan usage", body = PlanUsage),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn plan_usage(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(user_id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    let usage = roster::plan_usage(app_state.db_conn_ref(), user_id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), usage)))
}
