use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The two kinds of accounts on the platform. A `Teacher` (trainer) manages
/// students, appointments and billing; a `Student` receives training.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    EnumIter,
    Deserialize,
    Default,
    Serialize,
    DeriveActiveEnum,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "role")]
pub enum Role {
    #[sea_orm(string_value = "teacher")]
    Teacher,
    #[sea_orm(string_value = "student")]
    #[default]
    Student,
}

impl Role {
    /// The role a link request must target when sent by a user with this role.
    pub fn counterpart(self) -> Self {
        match self {
            Role::Teacher => Role::Student,
            Role::Student => Role::Teacher,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Teacher => write!(fmt, "teacher"),
            Role::Student => write!(fmt, "student"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counterpart_swaps_roles() {
        assert_eq!(Role::Teacher.counterpart(), Role::Student);
        assert_eq!(Role::Student.counterpart(), Role::Teacher);
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Teacher).unwrap(), "\"teacher\"");
    }
}
