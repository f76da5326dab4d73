use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_login::AuthSession;

/// Rejects requests without a logged in user with 401 Unauthorized.
///
/// axum-login's `login_required!` redirects to a login page, which is of no use to a
/// JSON API client.
pub async fn require_auth(
    auth_session: AuthSession<domain::user::Backend>,
    request: Request,
    next: Next,
) -> Response {
    match auth_session.user {
        Some(_user) => next.run(request).await,
        None => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
    }
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware::from_fn,
        response::Response,
        routing::{get, post},
        Router,
    };
    use axum_login::{
        tower_sessions::{Expiry, MemoryStore, SessionManagerLayer},
        AuthManagerLayerBuilder,
    };
    use chrono::Utc;
    use domain::user::Backend;
    use domain::{users, Id};
    use password_auth::generate_hash;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;
    use time::Duration;
    use tower::ServiceExt;

    async fn test_handler() -> &'static str {
        "authenticated"
    }

    fn test_teacher() -> users::Model {
        let now = Utc::now();
        users::Model {
            id: Id::new_v4(),
            email: "carla@pocket.test".to_string(),
            full_name: "Carla Souza".to_string(),
            password: generate_hash("password2"),
            role: users::Role::Teacher,
            cpf: None,
            phone: None,
            birth_date: None,
            gender: None,
            goal: None,
            height_cm: None,
            weight_kg: None,
            body_fat_percent: None,
            timezone: "America/Sao_Paulo".to_string(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn app_with(db: DatabaseConnection) -> Router {
        let db = Arc::new(db);
        let session_layer = SessionManagerLayer::new(MemoryStore::default())
            .with_secure(false)
            .with_expiry(Expiry::OnInactivity(Duration::days(1)));
        let auth_layer = AuthManagerLayerBuilder::new(Backend::new(&db), session_layer).build();

        Router::new()
            .route(
                "/login",
                post(crate::controller::user_session_controller::login),
            )
            .merge(
                Router::new()
                    .route("/test", get(test_handler))
                    .route_layer(from_fn(require_auth)),
            )
            .layer(auth_layer)
    }

    #[tokio::test]
    async fn test_require_auth_returns_401_with_no_session() {
        let app = app_with(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response: Response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_require_auth_returns_401_with_invalid_session_cookie() {
        let app = app_with(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let request = Request::builder()
            .uri("/test")
            .header("cookie", "id=invalid-session-id")
            .body(Body::empty())
            .unwrap();
        let response: Response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_require_auth_allows_authenticated_request_to_proceed() {
        let teacher = test_teacher();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[teacher.clone()]]) // find_by_email during authenticate
            .append_query_results([[teacher.clone()]]) // session user lookup on the protected route
            .into_connection();
        let app = app_with(db);

        let login_request = Request::builder()
            .uri("/login")
            .method("POST")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("email=carla@pocket.test&password=password2"))
            .unwrap();
        let login_response = app.clone().oneshot(login_request).await.unwrap();
        assert_eq!(login_response.status(), StatusCode::OK);

        let cookie = login_response
            .headers()
            .get("set-cookie")
            .and_then(|c| c.to_str().ok())
            .expect("Login should return session cookie")
            .to_string();

        let protected_request = Request::builder()
            .uri("/test")
            .header("cookie", cookie)
            .body(Body::empty())
            .unwrap();
        let response: Response = app.oneshot(protected_request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_login_with_wrong_password_is_unauthorized() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_teacher()]])
            .into_connection();
        let app = app_with(db);

        let login_request = Request::builder()
            .uri("/login")
            .method("POST")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("email=carla@pocket.test&password=wrong"))
            .unwrap();
        let response = app.oneshot(login_request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
