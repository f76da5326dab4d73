use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use domain::{request_status::RequestStatus, Id};

/// Body of POST `/trainer_requests`.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct CreateParams {
    /// The user being invited. Must have the opposite role of the sender.
    #[schema(value_type = Uuid)]
    pub(crate) target_id: Id,
}

/// Query parameters for PUT `/trainer_requests/{id}`.
#[derive(Debug, Deserialize, IntoParams)]
pub(crate) struct RespondParams {
    /// `accepted` or `rejected`
    pub(crate) status: RequestStatus,
}
