use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::Error;
use axum::{http::StatusCode, response::IntoResponse, Json};
use domain::plan::{self, Plan};
use service::config::ApiVersion;

/// GET the plan catalog in display order
#[utoipa::path(
    get,
    path = "/plans",
    params(ApiVersion),
    responses(
        (status = 200, description = "Successfully retrieved the plan catalog", body = [Plan]),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(_user): AuthenticatedUser,
) -> Result<impl IntoResponse, Error> {
    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        plan::PLANS.to_vec(),
    )))
}
