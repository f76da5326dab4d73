use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::params::appointment::DateRangeParams;
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::appointment::{self as AppointmentApi, AppointmentFilter};
use domain::{appointments, users::Role, Id};
use service::config::ApiVersion;

use log::*;

/// GET a user's own Appointments, as the teacher who gives them or the student who attends
#[utoipa::path(
    get,
    path = "/users/{user_id}/appointments",
    params(
        ApiVersion,
        ("user_id" = Uuid, Path, description = "User ID"),
        DateRangeParams,
    ),
    responses(
        (status = 200, description = "Successfully retrieved Appointments", body = [appointments::Model]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
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
    Path(user_id): Path<Id>,
    Query(params): Query<DateRangeParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Appointments of {user_id} with {params:?}");

    let db = app_state.db_conn_ref();
    let appointments = match user.role {
        Role::Teacher => {
            let filter = AppointmentFilter::default().between(params.from_date, params.to_date);
            AppointmentApi::find_for_teacher(db, user_id, filter).await?
        }
        Role::Student => {
            AppointmentApi::find_for_student(db, user_id, params.from_date, params.to_date).await?
        }
    };

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), appointments)))
}
