use crate::roles::Role;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Which side of a trainer/student link sent a request.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, EnumIter, Deserialize, Serialize, DeriveActiveEnum, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "requester_role")]
pub enum RequesterRole {
    #[sea_orm(string_value = "student")]
    Student,
    #[sea_orm(string_value = "trainer")]
    Trainer,
}

impl From<Role> for RequesterRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Teacher => RequesterRole::Trainer,
            Role::Student => RequesterRole::Student,
        }
    }
}

impl std::fmt::Display for RequesterRole {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequesterRole::Student => write!(fmt, "student"),
            RequesterRole::Trainer => write!(fmt, "trainer"),
        }
    }
}
