use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::{controller::ApiResponse, params::user::*};
use crate::{AppState, Error};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use domain::error::Error as DomainError;
use domain::{user as UserApi, users, Id};
use service::config::ApiVersion;

use log::*;

/// CREATE a new User (registration). No session is required.
#[utoipa::path(
    post,
    path = "/users",
    params(
        ApiVersion,
    ),
    request_body = CreateParams,
    responses(
        (status = 201, description = "Successfully created a new User", body = users::Model),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Invalid email, password, timezone or missing role"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Json(params): Json<CreateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("CREATE new User with email: {}", params.email);

    let role = params
        .role
        .ok_or_else(|| DomainError::invalid_input("role is required"))?;
    let user: users::Model =
        UserApi::create(app_state.db_conn_ref(), params.into_model(role)).await?;

    info!("Registered user {} as {}", user.id, user.role);

    Ok(Json(ApiResponse::new(StatusCode::CREATED.into(), user)))
}

/// GET a User's full profile
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "User id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved a User", body = users::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Neither the user nor their trainer"),
        (status = 404, description = "User not found"),
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
    debug!("GET User by id: {id}");

    let user = UserApi::find_by_id(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), user)))
}

/// UPDATE the authenticated User's own profile
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of the user to update"),
    ),
    request_body = UpdateParams,
    responses(
        (status = 200, description = "Successfully updated a User", body = users::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Invalid email or timezone"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn update(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Json(params): Json<UpdateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Update User {}", user.id);

    let updated = UserApi::update(app_state.db_conn_ref(), user.id, params).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), updated)))
}
