use crate::extractors::RejectionType;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use axum_login::AuthSession;
use domain::users;
use log::*;
use tower_sessions::Session;

pub(crate) struct AuthenticatedUser(pub users::Model);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = RejectionType;

    // Wraps axum_login's AuthSession: yields the logged in user or 401. Every authenticated
    // request also touches the session so inactivity expiry is pushed forward.
    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session: domain::user::AuthSession = AuthSession::from_request_parts(parts, state)
            .await
            .map_err(|(status, msg)| (status, msg.to_string()))?;

        if let Ok(tower_session) = Session::from_request_parts(parts, state).await {
            if let Err(e) = tower_session.save().await {
                warn!("Failed to touch session for activity renewal: {e:?}");
            } else {
                trace!("Session touched for activity renewal");
            }
        }

        match session.user {
            Some(user) => Ok(AuthenticatedUser(user)),
            None => Err((StatusCode::UNAUTHORIZED, "Unauthorized".to_string())),
        }
    }
}
