use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::params::billing::{PreviewParams, StatementParams};
use crate::{AppState, Error};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::billing::{self as BillingApi, BillingPreview, BillingStatement};
use service::config::ApiVersion;

use log::*;

/// GET the lessons a student would be billed for over a period
#[utoipa::path(
    get,
    path = "/billing/preview",
    params(ApiVersion, PreviewParams),
    responses(
        (status = 200, description = "Successfully built a billing preview", body = BillingPreview),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not a teacher of this student"),
        (status = 422, description = "start_date after end_date, or a negative price"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn preview(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Query(params): Query<PreviewParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET billing preview for {params:?}");

    let period = params.period()?;
    let lesson_price_cents = params
        .lesson_price_cents
        .unwrap_or_else(|| app_state.config.default_lesson_price_cents());

    let preview = BillingApi::preview(
        app_state.db_conn_ref(),
        user.id,
        params.student_id,
        period,
        lesson_price_cents,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), preview)))
}

/// POST build a billing statement for a student over a period
#[utoipa::path(
    post,
    path = "/billing/statements",
    params(ApiVersion),
    request_body = StatementParams,
    responses(
        (status = 200, description = "Successfully built a billing statement", body = BillingStatement),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not a teacher of this student"),
        (status = 404, description = "Student not found"),
        (status = 422, description = "start_date after end_date, or a negative price"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn statement(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Json(params): Json<StatementParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST billing statement for student {}", params.student_id);

    let period = params.period()?;
    let student_id = params.student_id;
    let options = params.options(
        app_state.config.billing_app_name(),
        app_state.config.default_lesson_price_cents(),
    );

    let statement = BillingApi::statement(
        app_state.db_conn_ref(),
        &user,
        student_id,
        period,
        options,
    )
    .await?;

    info!(
        "Billing statement for student {student_id}: {}",
        statement.totals.formatted_amount
    );

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), statement)))
}
