use crate::controller::ApiResponse;
use crate::error::{Error as WebError, Result as WebResult};
use axum::{http::StatusCode, response::IntoResponse, Form, Json};
use domain::error::{DomainErrorKind, EntityErrorKind, Error as DomainError, InternalErrorKind};
use domain::user::{dashboard_path, AuthSession, Credentials, PublicProfile};
use log::*;
use serde::Serialize;
use utoipa::ToSchema;

/// What the client needs right after logging in: who the user is and where to send them.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub profile: PublicProfile,
    pub timezone: String,
    /// Client route of the dashboard for the user's role
    pub dashboard: &'static str,
}

fn unauthenticated(source: Option<Box<dyn std::error::Error + Send + Sync>>) -> WebError {
    WebError::from(DomainError {
        source,
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
            EntityErrorKind::Unauthenticated,
        )),
    })
}

/// Logs the user into the platform and returns a new session cookie.
///
/// Successful login will return a session cookie with id, e.g.:
/// set-cookie: id=07bbbe54-bd35-425f-8e63-618a8d8612df; HttpOnly; SameSite=Strict; Path=/; Max-Age=86399
///
/// After logging in successfully, you must pass the session id back to the server for
/// every API call, e.g.:
/// curl -v --header "Cookie: id=07bbbe54-bd35-425f-8e63-618a8d8612df" --request GET http://localhost:4000/plans
#[utoipa::path(
    post,
    path = "/login",
    request_body(content = domain::user::Credentials, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Logs in and returns session authentication cookie", body = LoginResponse),
        (status = 401, description = "Unauthorized"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn login(
    mut auth_session: AuthSession,
    Form(creds): Form<Credentials>,
) -> WebResult<impl IntoResponse> {
    let user = match auth_session.authenticate(creds.clone()).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!("Authentication failed, invalid user: {:?}", creds.email);
            return Err(unauthenticated(None));
        }
        Err(auth_error) => {
            warn!("Authentication failed with error: {auth_error:?}");
            return Err(unauthenticated(Some(Box::new(auth_error))));
        }
    };

    if let Err(login_error) = auth_session.login(&user).await {
        warn!("Session login failed: {login_error:?}");
        return Err(WebError::from(DomainError {
            source: Some(Box::new(login_error)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "Session login failed".to_string(),
            )),
        }));
    }

    let login_response = LoginResponse {
        profile: PublicProfile::from(&user),
        timezone: user.timezone.clone(),
        dashboard: dashboard_path(user.role),
    };

    debug!("Logged in user {} ({})", user.id, user.role);

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), login_response)))
}

/// Logs the user out of the platform by destroying their session.
/// Test this with curl: curl -v \
/// --header "Cookie: id=07bbbe54-bd35-425f-8e63-618a8d8612df" \
/// --request DELETE http://localhost:4000/delete
#[utoipa::path(
    delete,
    path = "/delete",
    responses(
        (status = 200, description = "Successfully logged out"),
        (status = 401, description = "Unauthorized"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn delete(mut auth_session: AuthSession) -> impl IntoResponse {
    trace!("UserSessionController::delete()");
    match auth_session.logout().await {
        Ok(_) => StatusCode::OK.into_response(),
        Err(e) => {
            error!("Logout failed: {e:?}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
