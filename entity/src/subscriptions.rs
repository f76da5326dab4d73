use crate::subscription_status::SubscriptionStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, ToSchema, Serialize, Deserialize)]
#[schema(as = entity::subscriptions::Model)]
#[sea_orm(schema_name = "personal_pocket", table_name = "subscriptions")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,
    #[schema(value_type = Uuid)]
    pub user_id: Id,
    /// Plan identifier from the plan catalog (`free`, `basic`, `premium`).
    /// Stored as free text, so lookups trim it first.
    pub plan_type: String,
    pub status: SubscriptionStatus,
    #[schema(value_type = String, format = DateTime)]
    pub started_at: DateTimeWithTimeZone,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub expires_at: Option<DateTimeWithTimeZone>,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
