use super::error::{EntityApiErrorKind, Error};
use entity::subscription_status::SubscriptionStatus;
use entity::subscriptions::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    ConnectionTrait, QueryOrder,
};

/// The user's most recent active subscription, if any.
pub async fn find_active_by_user(
    db: &impl ConnectionTrait,
    user_id: Id,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::Status.eq(SubscriptionStatus::Active))
        .order_by_desc(Column::StartedAt)
        .one(db)
        .await?)
}

pub async fn find_by_user(db: &impl ConnectionTrait, user_id: Id) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::UserId.eq(user_id))
        .order_by_desc(Column::StartedAt)
        .all(db)
        .await?)
}

/// Inserts a new active subscription starting now.
pub async fn create(
    db: &impl ConnectionTrait,
    user_id: Id,
    plan_type: &str,
) -> Result<Model, Error> {
    debug!("New {plan_type} subscription for user {user_id}");

    let now = chrono::Utc::now();
    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        user_id: Set(user_id),
        plan_type: Set(plan_type.to_owned()),
        status: Set(SubscriptionStatus::Active),
        started_at: Set(now.into()),
        expires_at: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    Ok(active_model.insert(db).await?)
}

pub async fn update_plan_type(
    db: &impl ConnectionTrait,
    subscription: Model,
    plan_type: &str,
) -> Result<Model, Error> {
    debug!(
        "Subscription {} changing plan from {} to {plan_type}",
        subscription.id, subscription.plan_type
    );

    let active_model = ActiveModel {
        id: Unchanged(subscription.id),
        plan_type: Set(plan_type.to_owned()),
        updated_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?)
}

pub async fn update_status(
    db: &impl ConnectionTrait,
    subscription: Model,
    status: SubscriptionStatus,
) -> Result<Model, Error> {
    if subscription.status == status {
        return Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotUpdated,
        });
    }

    let active_model = ActiveModel {
        id: Unchanged(subscription.id),
        status: Set(status),
        updated_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn subscription_model(plan_type: &str) -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            user_id: Id::new_v4(),
            plan_type: plan_type.to_owned(),
            status: SubscriptionStatus::Active,
            started_at: now.into(),
            expires_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn find_active_by_user_returns_none_without_subscription() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Model>::new()])
            .into_connection();

        assert!(find_active_by_user(&db, Id::new_v4()).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn create_returns_an_active_subscription() -> Result<(), Error> {
        let subscription = subscription_model("premium");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[subscription.clone()]])
            .into_connection();

        let created = create(&db, subscription.user_id, "premium").await?;

        assert_eq!(created.plan_type, "premium");
        assert_eq!(created.status, SubscriptionStatus::Active);
        Ok(())
    }

    #[tokio::test]
    async fn update_status_to_the_same_status_is_not_an_update() {
        let subscription = subscription_model("basic");
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = update_status(&db, subscription, SubscriptionStatus::Active).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotUpdated
        );
    }
}
