use crate::extractors::RejectionType;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use log::*;
use semver::Version;
use service::config::ApiVersion;

/// Rejects requests whose `x-version` header is missing or names an API version this
/// server does not expose.
pub(crate) struct CompareApiVersion(pub Version);

impl CompareApiVersion {
    fn check(header_value: Option<&str>) -> Result<Version, RejectionType> {
        let raw = header_value.ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                format!("Missing {} header", ApiVersion::field_name()),
            )
        })?;

        let version = Version::parse(raw.trim()).map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                format!("Invalid API version: {raw}"),
            )
        })?;

        if ApiVersion::versions()
            .iter()
            .any(|supported| Version::parse(supported).is_ok_and(|v| v == version))
        {
            Ok(version)
        } else {
            Err((
                StatusCode::BAD_REQUEST,
                format!("Unsupported API version: {version}"),
            ))
        }
    }
}

impl<S> FromRequestParts<S> for CompareApiVersion
where
    S: Send + Sync,
{
    type Rejection = RejectionType;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(ApiVersion::field_name())
            .and_then(|value| value.to_str().ok());

        match Self::check(header_value) {
            Ok(version) => Ok(CompareApiVersion(version)),
            Err(rejection) => {
                warn!("API version check failed: {}", rejection.1);
                Err(rejection)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_default_version() {
        let version = CompareApiVersion::check(Some(ApiVersion::default_version())).unwrap();
        assert_eq!(version.to_string(), ApiVersion::default_version());
    }

    #[test]
    fn rejects_a_missing_header() {
        let (status, _) = CompareApiVersion::check(None).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn rejects_unknown_or_malformed_versions() {
        assert!(CompareApiVersion::check(Some("9.9.9")).is_err());
        assert!(CompareApiVersion::check(Some("not-a-version")).is_err());
    }
}
