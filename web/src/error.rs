use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use domain::error::{
    BusinessErrorKind, DomainErrorKind, EntityErrorKind, Error as DomainError, ExternalErrorKind,
    InternalErrorKind,
};

use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

impl Error {
    fn status_and_message(&self) -> (StatusCode, String) {
        match &self.0.error_kind {
            DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
                InternalErrorKind::Entity(entity_error_kind) => match entity_error_kind {
                    EntityErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT FOUND".into()),
                    EntityErrorKind::Invalid => (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "UNPROCESSABLE ENTITY".into(),
                    ),
                    EntityErrorKind::Unauthenticated => {
                        (StatusCode::UNAUTHORIZED, "UNAUTHORIZED".into())
                    }
                    EntityErrorKind::DbTransaction | EntityErrorKind::Other(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL SERVER ERROR".into(),
                    ),
                },
                InternalErrorKind::Config | InternalErrorKind::Other(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL SERVER ERROR".into(),
                ),
            },
            DomainErrorKind::External(external_error_kind) => match external_error_kind {
                ExternalErrorKind::Network => (StatusCode::BAD_GATEWAY, "BAD GATEWAY".into()),
                ExternalErrorKind::Other(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL SERVER ERROR".into(),
                ),
            },
            // Business rule violations carry a reason the client can show
            DomainErrorKind::Business(business_error_kind) => match business_error_kind {
                BusinessErrorKind::PlanLimitReached => {
                    (StatusCode::FORBIDDEN, "PLAN LIMIT REACHED".into())
                }
                BusinessErrorKind::InvalidInput(reason) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, reason.clone())
                }
                BusinessErrorKind::Conflict(reason) => (StatusCode::CONFLICT, reason.clone()),
                BusinessErrorKind::Forbidden(reason) => (StatusCode::FORBIDDEN, reason.clone()),
            },
        }
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!("Request failed: {:?}", self.0);
        } else {
            debug!("Request rejected with {status}: {message}");
        }
        (status, message).into_response()
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
