use crate::controller::ApiResponse;
use crate::extractors::compare_api_version::CompareApiVersion;
use crate::params::student::SearchParams;
use crate::{AppState, Error};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::roster;
use domain::user::PublicProfile;
use service::config::ApiVersion;

use log::*;

/// GET every student account, for trainers looking for someone to invite
#[utoipa::path(
    get,
    path = "/students",
    params(ApiVersion, SearchParams),
    responses(
        (status = 200, description = "Successfully retrieved students", body = [PublicProfile]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only teachers may list students"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET all students, search: {:?}", params.search);

    let students: Vec<PublicProfile> = roster::all_students(app_state.db_conn_ref(), params.term())
        .await?
        .iter()
        .map(PublicProfile::from)
        .collect();

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), students)))
}
