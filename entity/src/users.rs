use crate::gender::Gender;
use crate::Id;
use axum_login::AuthUser;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use crate::roles::Role;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, ToSchema, Serialize, Deserialize)]
#[schema(as = entity::users::Model)] // OpenAPI schema
#[sea_orm(schema_name = "personal_pocket", table_name = "users")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,
    #[sea_orm(unique, indexed)]
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub cpf: Option<String>,
    pub phone: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub birth_date: Option<Date>,
    pub gender: Option<Gender>,
    pub goal: Option<String>,
    pub height_cm: Option<i32>,
    pub weight_kg: Option<f64>,
    pub body_fat_percent: Option<f64>,
    pub timezone: String,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)] // Applies to OpenAPI schema
    pub created_at: DateTimeWithTimeZone,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)] // Applies to OpenAPI schema
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::appointments::Entity")]
    Appointments,
    #[sea_orm(has_many = "super::subscriptions::Entity")]
    Subscriptions,
}

impl Related<super::appointments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Appointments.def()
    }
}

impl Related<super::subscriptions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subscriptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_teacher(&self) -> bool {
        self.role == Role::Teacher
    }

    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }
}

impl AuthUser for Model {
    type Id = Id;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn session_auth_hash(&self) -> &[u8] {
        // Changing the password invalidates every existing session for this user
        self.password.as_bytes()
    }
}
