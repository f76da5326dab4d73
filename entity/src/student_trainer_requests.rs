use crate::request_status::RequestStatus;
use crate::requester_role::RequesterRole;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An invitation from a trainer to a student (or the other way around) to
/// create a `trainer_students` link.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, ToSchema, Serialize, Deserialize)]
#[schema(as = entity::student_trainer_requests::Model)]
#[sea_orm(schema_name = "personal_pocket", table_name = "student_trainer_requests")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,
    #[schema(value_type = Uuid)]
    pub requester_id: Id,
    #[schema(value_type = Uuid)]
    pub target_id: Id,
    pub requester_role: RequesterRole,
    pub status: RequestStatus,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Returns `(trainer_id, student_id)` for the link this request would create.
    pub fn trainer_and_student(&self) -> (Id, Id) {
        match self.requester_role {
            RequesterRole::Trainer => (self.requester_id, self.target_id),
            RequesterRole::Student => (self.target_id, self.requester_id),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::RequesterId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Requesters,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::TargetId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Targets,
}

impl ActiveModelBehavior for ActiveModel {}
