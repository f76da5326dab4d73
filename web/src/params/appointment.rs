use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use domain::{appointment::AppointmentFilter, appointment_status::AppointmentStatus, Id};

/// Query parameters for GET `/appointments`. Date bounds are inclusive.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub(crate) struct IndexParams {
    #[param(value_type = Option<Uuid>)]
    pub(crate) student_id: Option<Id>,
    #[param(value_type = Option<String>, format = Date)]
    pub(crate) from_date: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date)]
    pub(crate) to_date: Option<NaiveDate>,
    pub(crate) status: Option<AppointmentStatus>,
}

impl From<IndexParams> for AppointmentFilter {
    fn from(params: IndexParams) -> Self {
        AppointmentFilter {
            teacher_id: None,
            student_id: params.student_id,
            from_date: params.from_date,
            to_date: params.to_date,
            status: params.status,
        }
    }
}

/// Query parameters for GET `/users/{id}/appointments`.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub(crate) struct DateRangeParams {
    #[param(value_type = Option<String>, format = Date)]
    pub(crate) from_date: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date)]
    pub(crate) to_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub(crate) struct StatusParams {
    pub(crate) status: AppointmentStatus,
}
