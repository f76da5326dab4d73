use super::error::{EntityApiErrorKind, Error};
use entity::request_status::RequestStatus;
use entity::requester_role::RequesterRole;
use entity::student_trainer_requests::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    Condition, ConnectionTrait, QueryOrder,
};

pub async fn create(
    db: &impl ConnectionTrait,
    requester_id: Id,
    target_id: Id,
    requester_role: RequesterRole,
) -> Result<Model, Error> {
    debug!("New {requester_role} request from {requester_id} to {target_id}");

    let now = chrono::Utc::now();
    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        requester_id: Set(requester_id),
        target_id: Set(target_id),
        requester_role: Set(requester_role),
        status: Set(RequestStatus::Pending),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    Ok(active_model.insert(db).await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

/// Requests sent by `requester_id`, newest first.
pub async fn find_by_requester(
    db: &impl ConnectionTrait,
    requester_id: Id,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::RequesterId.eq(requester_id))
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?)
}

/// Requests received by `target_id`, newest first, optionally only those in `status`.
pub async fn find_by_target(
    db: &impl ConnectionTrait,
    target_id: Id,
    status: Option<RequestStatus>,
) -> Result<Vec<Model>, Error> {
    let mut query = Entity::find().filter(Column::TargetId.eq(target_id));
    if let Some(status) = status {
        query = query.filter(Column::Status.eq(status));
    }

    Ok(query.order_by_desc(Column::CreatedAt).all(db).await?)
}

/// A pending request between the two users, in either direction.
pub async fn find_pending_between(
    db: &impl ConnectionTrait,
    user_id: Id,
    other_user_id: Id,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::Status.eq(RequestStatus::Pending))
        .filter(
            Condition::any()
                .add(
                    Condition::all()
                        .add(Column::RequesterId.eq(user_id))
                        .add(Column::TargetId.eq(other_user_id)),
                )
                .add(
                    Condition::all()
                        .add(Column::RequesterId.eq(other_user_id))
                        .add(Column::TargetId.eq(user_id)),
                ),
        )
        .one(db)
        .await?)
}

/// Ids of the users `requester_id` has a pending request out to.
pub async fn find_pending_target_ids(
    db: &impl ConnectionTrait,
    requester_id: Id,
) -> Result<Vec<Id>, Error> {
    Ok(Entity::find()
        .filter(Column::RequesterId.eq(requester_id))
        .filter(Column::Status.eq(RequestStatus::Pending))
        .all(db)
        .await?
        .into_iter()
        .map(|request| request.target_id)
        .collect())
}

pub async fn update_status(
    db: &impl ConnectionTrait,
    request: Model,
    status: RequestStatus,
) -> Result<Model, Error> {
    debug!("Request {} moving from {} to {status}", request.id, request.status);

    let active_model = ActiveModel {
        id: Unchanged(request.id),
        requester_id: Unchanged(request.requester_id),
        target_id: Unchanged(request.target_id),
        requester_role: Unchanged(request.requester_role),
        status: Set(status),
        created_at: Unchanged(request.created_at),
        updated_at: Set(chrono::Utc::now().into()),
    };

    Ok(active_model.update(db).await?)
}

pub async fn delete(db: &impl ConnectionTrait, id: Id) -> Result<(), Error> {
    Entity::delete_by_id(id).exec(db).await?;
    Ok(())
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn request_model(status: RequestStatus) -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            requester_id: Id::new_v4(),
            target_id: Id::new_v4(),
            requester_role: RequesterRole::Trainer,
            status,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn create_returns_a_pending_request() -> Result<(), Error> {
        let request = request_model(RequestStatus::Pending);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[request.clone()]])
            .into_connection();

        let created = create(
            &db,
            request.requester_id,
            request.target_id,
            RequesterRole::Trainer,
        )
        .await?;

        assert_eq!(created.status, RequestStatus::Pending);
        assert_eq!(created.requester_id, request.requester_id);
        Ok(())
    }

    #[tokio::test]
    async fn update_status_returns_the_updated_request() -> Result<(), Error> {
        let request = request_model(RequestStatus::Pending);
        let accepted = Model {
            status: RequestStatus::Accepted,
            ..request.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[accepted.clone()]])
            .into_connection();

        let updated = update_status(&db, request, RequestStatus::Accepted).await?;

        assert_eq!(updated.status, RequestStatus::Accepted);
        Ok(())
    }

    #[tokio::test]
    async fn find_pending_target_ids_returns_targets() -> Result<(), Error> {
        let first = request_model(RequestStatus::Pending);
        let second = request_model(RequestStatus::Pending);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[first.clone(), second.clone()]])
            .into_connection();

        let ids = find_pending_target_ids(&db, first.requester_id).await?;

        assert_eq!(ids, vec![first.target_id, second.target_id]);
        Ok(())
    }

    #[tokio::test]
    async fn find_by_id_returns_record_not_found_when_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Model>::new()])
            .into_connection();

        let result = find_by_id(&db, Id::new_v4()).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
    }
}
