use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle status of an appointment.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Hash,
    EnumIter,
    Deserialize,
    Default,
    Serialize,
    DeriveActiveEnum,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "appointment_status"
)]
pub enum AppointmentStatus {
    /// Booked and not yet held
    #[sea_orm(string_value = "scheduled")]
    #[default]
    Scheduled,
    /// The student attended
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    /// The student did not show up
    #[sea_orm(string_value = "missed")]
    Missed,
}

impl AppointmentStatus {
    /// Human readable (pt-BR) label shown to trainers and students.
    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Agendado",
            AppointmentStatus::Completed => "Concluído",
            AppointmentStatus::Cancelled => "Cancelado",
            AppointmentStatus::Missed => "Falta",
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(fmt, "scheduled"),
            AppointmentStatus::Completed => write!(fmt, "completed"),
            AppointmentStatus::Cancelled => write!(fmt, "cancelled"),
            AppointmentStatus::Missed => write!(fmt, "missed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_portuguese() {
        assert_eq!(AppointmentStatus::Scheduled.label(), "Agendado");
        assert_eq!(AppointmentStatus::Completed.label(), "Concluído");
        assert_eq!(AppointmentStatus::Cancelled.label(), "Cancelado");
        assert_eq!(AppointmentStatus::Missed.label(), "Falta");
    }

    #[test]
    fn deserializes_from_lowercase() {
        let status: AppointmentStatus = serde_json::from_str("\"missed\"").unwrap();
        assert_eq!(status, AppointmentStatus::Missed);
    }
}
