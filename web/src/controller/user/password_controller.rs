use crate::extractors::compare_api_version::CompareApiVersion;
use crate::{controller::ApiResponse, params::user::UpdatePasswordParams};
use crate::{AppState, Error};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use domain::{user as UserApi, Id};
use service::config::ApiVersion;

/// update a user's password after checking their current one
#[utoipa::path(
    put,
    path = "/users/{user_id}/password",
    params(
        ApiVersion,
        ("user_id" = Uuid, Path, description = "User ID"),
    ),
    request_body = UpdatePasswordParams,
    responses(
        (status = 204, description = "Successfully updated a User's password"),
        (status = 401, description = "Unauthorized, or the current password does not match"),
        (status = 422, description = "New password is too short"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn update_password(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(user_id): Path<Id>,
    Json(params): Json<UpdatePasswordParams>,
) -> Result<impl IntoResponse, Error> {
    UserApi::update_password(
        app_state.db_conn_ref(),
        user_id,
        &params.current_password,
        params.password,
    )
    .await?;
    Ok(Json(ApiResponse::<()>::no_content(
        StatusCode::NO_CONTENT.into(),
    )))
}
