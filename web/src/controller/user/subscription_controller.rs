use crate::controller::ApiResponse;
use crate::extractors::compare_api_version::CompareApiVersion;
use crate::params::subscription::{ChangePlanParams, IndexParams, SortField};
use crate::params::WithSortDefaults;
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::subscription::{self as SubscriptionApi, CurrentPlan};
use domain::Id;
use service::config::ApiVersion;

use log::*;

/// GET the plan the user is currently on
#[utoipa::path(
    get,
    path = "/users/{user_id}/subscription",
    params(
        ApiVersion,
        ("user_id" = Uuid, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "Successfully retrieved the current plan", body = CurrentPlan),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn read(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(user_id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    let current = SubscriptionApi::current_plan(app_state.db_conn_ref(), user_id).await?;

    debug!("User {user_id} is on the {} plan", current.plan.id);

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), current)))
}

/// GET every subscription the user has had
#[utoipa::path(
    get,
    path = "/users/{user_id}/subscriptions",
    params(
        ApiVersion,
        ("user_id" = Uuid, Path, description = "User ID"),
        ("sort_by" = Option<crate::params::subscription::SortField>, Query, description = "Sort by field. Valid values: 'started_at', 'created_at', 'updated_at'.", example = "started_at"),
        ("sort_order" = Option<crate::params::sort::SortOrder>, Query, description = "Sort order. Valid values: 'asc', 'desc'.", example = "desc")
    ),
    responses(
        (status = 200, description = "Successfully retrieved the subscription history", body = [domain::subscriptions::Model]),
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
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, Error> {
    let mut params = params.with_user_id(user_id);
    IndexParams::apply_sort_defaults(
        &mut params.sort_by,
        &mut params.sort_order,
        SortField::StartedAt,
    );

    let history = SubscriptionApi::find_by(app_state.db_conn_ref(), params).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), history)))
}

/// PUT move the user to another plan
#[utoipa::path(
    put,
    path = "/users/{user_id}/subscription",
    params(
        ApiVersion,
        ("user_id" = Uuid, Path, description = "User ID"),
    ),
    request_body = ChangePlanParams,
    responses(
        (status = 200, description = "Successfully changed plan", body = CurrentPlan),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Unknown plan"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn update(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(user_id): Path<Id>,
    Json(params): Json<ChangePlanParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT User {user_id} plan to {}", params.plan_id);

    let current =
        SubscriptionApi::change_plan(app_state.db_conn_ref(), user_id, &params.plan_id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), current)))
}

/// POST upgrade the user straight to premium
#[utoipa::path(
    post,
    path = "/users/{user_id}/subscription/upgrade",
    params(
        ApiVersion,
        ("user_id" = Uuid, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "Successfully upgraded to premium", body = CurrentPlan),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn upgrade(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(user_id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    let current = SubscriptionApi::upgrade_to_premium(app_state.db_conn_ref(), user_id).await?;

    info!("User {user_id} upgraded to premium");

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), current)))
}

/// DELETE cancel the active subscription, dropping back to the free plan
#[utoipa::path(
    delete,
    path = "/users/{user_id}/subscription",
    params(
        ApiVersion,
        ("user_id" = Uuid, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "Successfully cancelled the subscription", body = CurrentPlan),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "No active subscription"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn delete(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(user_id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    let current = SubscriptionApi::cancel(app_state.db_conn_ref(), user_id).await?;

    info!("User {user_id} cancelled their subscription");

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), current)))
}
