//! Resolves which plan a user is on and moves users between plans.
use crate::error::Error;
use crate::plan::{self, Plan};
use crate::{subscription_status::SubscriptionStatus, subscriptions, Id};
use entity_api::{query, query::IntoQueryFilterMap, query::QuerySort, subscription};
use log::*;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde::Serialize;
use utoipa::ToSchema;

pub use entity_api::subscription::find_by_user;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CurrentPlan {
    pub subscription: Option<subscriptions::Model>,
    pub plan: Plan,
}

impl CurrentPlan {
    fn from_subscription(subscription: Option<subscriptions::Model>) -> Self {
        let plan = resolve_plan(subscription.as_ref());
        Self { subscription, plan }
    }
}

/// The plan granted by `subscription`. No subscription, or one naming a plan that is
/// not in the catalog, means the free plan.
pub fn resolve_plan(subscription: Option<&subscriptions::Model>) -> Plan {
    match subscription {
        Some(subscription) => plan::find_by_id(&subscription.plan_type).unwrap_or_else(|| {
            warn!(
                "Subscription {} has unknown plan type {:?}, falling back to the free plan",
                subscription.id, subscription.plan_type
            );
            plan::free_plan()
        }),
        None => plan::free_plan(),
    }
}

/// Subscription history matching `params`, sorted when the params ask for it.
pub async fn find_by<P>(
    db: &impl ConnectionTrait,
    params: P,
) -> Result<Vec<subscriptions::Model>, Error>
where
    P: IntoQueryFilterMap + QuerySort<subscriptions::Column>,
{
    Ok(query::find_by::<subscriptions::Entity, subscriptions::Column, P>(db, params).await?)
}

pub async fn current_plan(db: &impl ConnectionTrait, user_id: Id) -> Result<CurrentPlan, Error> {
    let subscription = subscription::find_active_by_user(db, user_id).await?;
    Ok(CurrentPlan::from_subscription(subscription))
}

pub async fn upgrade_to_premium(
    db: &DatabaseConnection,
    user_id: Id,
) -> Result<CurrentPlan, Error> {
    change_plan(db, user_id, plan::PREMIUM).await
}

/// Moves the user to `plan_id`, updating the active subscription in place or starting a new one.
pub async fn change_plan(
    db: &DatabaseConnection,
    user_id: Id,
    plan_id: &str,
) -> Result<CurrentPlan, Error> {
    let plan = plan::find_by_id(plan_id)
        .ok_or_else(|| Error::invalid_input(format!("unknown plan: {}", plan_id.trim())))?;

    let txn = db.begin().await?;

    let subscription = match subscription::find_active_by_user(&txn, user_id).await? {
        Some(existing) => subscription::update_plan_type(&txn, existing, plan.id).await?,
        None => subscription::create(&txn, user_id, plan.id).await?,
    };

    txn.commit().await?;

    info!("User {user_id} is now on the {} plan", plan.id);
    Ok(CurrentPlan {
        subscription: Some(subscription),
        plan,
    })
}

/// Cancels the active subscription. The user drops back to the free plan.
pub async fn cancel(db: &impl ConnectionTrait, user_id: Id) -> Result<CurrentPlan, Error> {
    let active = subscription::find_active_by_user(db, user_id)
        .await?
        .ok_or_else(Error::not_found)?;

    subscription::update_status(db, active, SubscriptionStatus::Cancelled).await?;
    info!("User {user_id} cancelled their subscription");

    Ok(CurrentPlan::from_subscription(None))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription_with(plan_type: &str) -> subscriptions::Model {
        let now = chrono::Utc::now();
        subscriptions::Model {
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

    #[test]
    fn no_subscription_resolves_to_free() {
        assert_eq!(resolve_plan(None).id, plan::FREE);
    }

    #[test]
    fn plan_type_with_a_trailing_newline_still_resolves() {
        let subscription = subscription_with("basic\n");
        assert_eq!(resolve_plan(Some(&subscription)).id, plan::BASIC);
    }

    #[test]
    fn unknown_plan_type_resolves_to_free() {
        let subscription = subscription_with("gold");
        assert_eq!(resolve_plan(Some(&subscription)).id, plan::FREE);
    }
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod mock_tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn change_plan_rejects_unknown_plans_before_touching_the_database() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = change_plan(&db, Id::new_v4(), "enterprise").await;

        assert!(result.is_err());
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn current_plan_without_subscription_is_free() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<subscriptions::Model>::new()])
            .into_connection();

        let current = current_plan(&db, Id::new_v4()).await?;

        assert!(current.subscription.is_none());
        assert_eq!(current.plan.id, plan::FREE);
        Ok(())
    }

    #[tokio::test]
    async fn find_by_returns_the_user_history() -> Result<(), Error> {
        let user_id = Id::new_v4();
        let now = chrono::Utc::now();
        let history = vec![subscriptions::Model {
            id: Id::new_v4(),
            user_id,
            plan_type: plan::BASIC.to_owned(),
            status: SubscriptionStatus::Cancelled,
            started_at: now.into(),
            expires_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        }];
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([history.clone()])
            .into_connection();

        let mut filters = crate::QueryFilterMap::new();
        filters.insert(
            "user_id".to_string(),
            Some(sea_orm::Value::Uuid(Some(Box::new(user_id)))),
        );
        let found = find_by(&db, crate::FilterOnly(filters)).await?;

        assert_eq!(found, history);
        Ok(())
    }
}
