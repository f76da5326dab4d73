//! Invitations between trainers and students and the link they create when accepted.
use crate::error::Error;
use crate::roster;
use crate::user::PublicProfile;
use crate::{
    request_status::RequestStatus, requester_role::RequesterRole, student_trainer_requests,
    users, Id,
};
use entity_api::{trainer_request, trainer_student, user as user_api};
use log::*;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

pub use entity_api::trainer_request::find_by_id;

/// A pending request together with who sent it.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RequestNotification {
    pub request: student_trainer_requests::Model,
    pub requester: PublicProfile,
}

/// Returns `(trainer_id, student_id)` for a request from `requester` to `target`, or why it
/// cannot be sent.
pub fn link_participants(
    requester: &users::Model,
    target: &users::Model,
) -> Result<(Id, Id), Error> {
    if requester.id == target.id {
        return Err(Error::invalid_input("cannot send a request to yourself"));
    }
    if target.role != requester.role.counterpart() {
        return Err(Error::invalid_input(format!(
            "a {} can only send requests to a {}",
            requester.role,
            requester.role.counterpart()
        )));
    }

    Ok(if requester.is_teacher() {
        (requester.id, target.id)
    } else {
        (target.id, requester.id)
    })
}

pub async fn send(
    db: &impl ConnectionTrait,
    requester: &users::Model,
    target_id: Id,
) -> Result<student_trainer_requests::Model, Error> {
    let target = user_api::find_by_id(db, target_id).await?;
    let (trainer_id, student_id) = link_participants(requester, &target)?;

    if trainer_student::is_linked(db, trainer_id, student_id).await? {
        return Err(Error::conflict("trainer and student are already linked"));
    }
    if trainer_request::find_pending_between(db, requester.id, target_id)
        .await?
        .is_some()
    {
        return Err(Error::conflict("a pending request already exists"));
    }
    if requester.is_teacher() {
        roster::ensure_capacity(db, requester.id).await?;
    }

    let request = trainer_request::create(
        db,
        requester.id,
        target_id,
        RequesterRole::from(requester.role),
    )
    .await?;

    info!("Request {} sent from {} to {target_id}", request.id, requester.id);
    Ok(request)
}

pub async fn sent(
    db: &impl ConnectionTrait,
    user_id: Id,
) -> Result<Vec<student_trainer_requests::Model>, Error> {
    Ok(trainer_request::find_by_requester(db, user_id).await?)
}

pub async fn received(
    db: &impl ConnectionTrait,
    user_id: Id,
) -> Result<Vec<student_trainer_requests::Model>, Error> {
    Ok(trainer_request::find_by_target(db, user_id, None).await?)
}

/// Pending requests addressed to `user_id`, newest first, with the sender's profile.
pub async fn pending_notifications(
    db: &impl ConnectionTrait,
    user_id: Id,
) -> Result<Vec<RequestNotification>, Error> {
    let requests =
        trainer_request::find_by_target(db, user_id, Some(RequestStatus::Pending)).await?;
    let requester_ids = requests.iter().map(|request| request.requester_id).collect();
    let requesters: HashMap<Id, users::Model> = user_api::find_by_ids(db, requester_ids)
        .await?
        .into_iter()
        .map(|user| (user.id, user))
        .collect();

    Ok(requests
        .into_iter()
        .filter_map(|request| {
            let requester = requesters.get(&request.requester_id)?;
            Some(RequestNotification {
                requester: PublicProfile::from(requester),
                request,
            })
        })
        .collect())
}

/// Checks that `user_id` may answer `request` with `decision`.
pub fn check_response(
    request: &student_trainer_requests::Model,
    user_id: Id,
    decision: RequestStatus,
) -> Result<(), Error> {
    if decision == RequestStatus::Pending {
        return Err(Error::invalid_input("a request can only be accepted or rejected"));
    }
    if request.target_id != user_id {
        return Err(Error::forbidden("only the recipient can answer a request"));
    }
    if !request.is_pending() {
        return Err(Error::conflict("request was already answered"));
    }
    Ok(())
}

/// Accepts or rejects a request. Accepting creates the link in the same transaction,
/// subject to the trainer's plan limit.
pub async fn respond(
    db: &DatabaseConnection,
    request_id: Id,
    user_id: Id,
    decision: RequestStatus,
) -> Result<student_trainer_requests::Model, Error> {
    let txn = db.begin().await?;

    let request = trainer_request::find_by_id(&txn, request_id).await?;
    check_response(&request, user_id, decision)?;

    if decision == RequestStatus::Accepted {
        let (trainer_id, student_id) = request.trainer_and_student();
        roster::link(&txn, trainer_id, student_id, user_id).await?;
    }
    let updated = trainer_request::update_status(&txn, request, decision).await?;

    txn.commit().await?;

    info!("Request {request_id} {decision} by {user_id}");
    Ok(updated)
}

/// Withdraws a pending request. Only its sender may do so.
pub async fn cancel(db: &impl ConnectionTrait, request_id: Id, user_id: Id) -> Result<(), Error> {
    let request = trainer_request::find_by_id(db, request_id).await?;
    if request.requester_id != user_id {
        return Err(Error::forbidden("only the sender can cancel a request"));
    }
    if !request.is_pending() {
        return Err(Error::conflict("only pending requests can be cancelled"));
    }

    trainer_request::delete(db, request_id).await?;
    Ok(())
}


#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod mock_tests {
    use super::*;
    use crate::error::{BusinessErrorKind, DomainErrorKind};
    use crate::roles::Role;
    use crate::{subscriptions, trainer_students};
    use sea_orm::{DatabaseBackend, MockDatabase, Statement, Value};
    use std::collections::BTreeMap;

    fn user(role: Role) -> users::Model {
        let now = chrono::Utc::now();
        users::Model {
            id: Id::new_v4(),
            email: "user@pocket.com".to_owned(),
            full_name: "User".to_owned(),
            password: String::new(),
            role,
            cpf: None,
            phone: None,
            birth_date: None,
            gender: None,
            goal: None,
            height_cm: None,
            weight_kg: None,
            body_fat_percent: None,
            timezone: "UTC".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn request_from(
        requester: &users::Model,
        target: &users::Model,
    ) -> student_trainer_requests::Model {
        let now = chrono::Utc::now();
        student_trainer_requests::Model {
            id: Id::new_v4(),
            requester_id: requester.id,
            target_id: target.id,
            requester_role: RequesterRole::from(requester.role),
            status: RequestStatus::Pending,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    /// Results for a capacity check on a free plan trainer holding `links` students.
    fn with_capacity_check(db: MockDatabase, trainer: &users::Model, links: i64) -> MockDatabase {
        db.append_query_results([[trainer.clone()]])
            .append_query_results([Vec::<subscriptions::Model>::new()])
            .append_query_results([[BTreeMap::from([(
                "num_items",
                Value::BigInt(Some(links)),
            )])]])
    }

    fn logged_statements(db: sea_orm::DatabaseConnection) -> Vec<Statement> {
        db.into_transaction_log()
            .iter()
            .flat_map(|transaction| transaction.statements().to_vec())
            .collect()
    }

    fn plan_limit_reached(err: &Error) -> bool {
        matches!(
            err.error_kind,
            DomainErrorKind::Business(BusinessErrorKind::PlanLimitReached)
        )
    }

    #[tokio::test]
    async fn accepting_for_a_full_trainer_fails_and_rolls_back() {
        let trainer = user(Role::Teacher);
        let student = user(Role::Student);
        let request = request_from(&student, &trainer);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[request.clone()]])
            .append_query_results([Vec::<trainer_students::Model>::new()]);
        let db = with_capacity_check(db, &trainer, 1).into_connection();

        let err = respond(&db, request.id, trainer.id, RequestStatus::Accepted)
            .await
            .unwrap_err();

        assert!(plan_limit_reached(&err));
        let statements = logged_statements(db);
        assert_eq!(
            statements.last().map(|statement| statement.sql.as_str()),
            Some("ROLLBACK")
        );
        assert!(!statements
            .iter()
            .any(|statement| statement.sql.starts_with("INSERT")
                || statement.sql.starts_with("UPDATE")));
    }

    #[tokio::test]
    async fn accepting_links_with_the_accepting_user_as_creator() -> Result<(), Error> {
        let trainer = user(Role::Teacher);
        let student = user(Role::Student);
        let request = request_from(&trainer, &student);
        let link = trainer_students::Model {
            id: Id::new_v4(),
            trainer_id: trainer.id,
            student_id: student.id,
            created_by: student.id,
            created_at: chrono::Utc::now().into(),
        };
        let accepted = student_trainer_requests::Model {
            status: RequestStatus::Accepted,
            ..request.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[request.clone()]])
            .append_query_results([Vec::<trainer_students::Model>::new()]);
        let db = with_capacity_check(db, &trainer, 0)
            .append_query_results([[link]])
            .append_query_results([[accepted]])
            .into_connection();

        let updated = respond(&db, request.id, student.id, RequestStatus::Accepted).await?;

        assert_eq!(updated.status, RequestStatus::Accepted);
        let statements = logged_statements(db);
        assert_eq!(
            statements.last().map(|statement| statement.sql.as_str()),
            Some("COMMIT")
        );
        let insert = statements
            .iter()
            .find(|statement| statement.sql.starts_with("INSERT"))
            .and_then(|statement| statement.values.clone())
            .map(|values| values.0)
            .unwrap_or_default();
        // id, trainer_id, student_id, created_by, created_at
        assert_eq!(insert.get(1), Some(&Value::from(trainer.id)));
        assert_eq!(insert.get(2), Some(&Value::from(student.id)));
        assert_eq!(insert.get(3), Some(&Value::from(student.id)));
        Ok(())
    }

    #[tokio::test]
    async fn rejecting_does_not_check_the_plan() -> Result<(), Error> {
        let trainer = user(Role::Teacher);
        let student = user(Role::Student);
        let request = request_from(&student, &trainer);
        let rejected = student_trainer_requests::Model {
            status: RequestStatus::Rejected,
            ..request.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[request.clone()]])
            .append_query_results([[rejected]])
            .into_connection();

        let updated = respond(&db, request.id, trainer.id, RequestStatus::Rejected).await?;

        assert_eq!(updated.status, RequestStatus::Rejected);
        assert!(!logged_statements(db)
            .iter()
            .any(|statement| statement.sql.ends_with("FOR UPDATE")));
        Ok(())
    }

    #[tokio::test]
    async fn a_full_trainer_cannot_send_requests() {
        let trainer = user(Role::Teacher);
        let student = user(Role::Student);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[student.clone()]])
            .append_query_results([Vec::<trainer_students::Model>::new()])
            .append_query_results([Vec::<student_trainer_requests::Model>::new()]);
        let db = with_capacity_check(db, &trainer, 1).into_connection();

        let err = send(&db, &trainer, student.id).await.unwrap_err();

        assert!(plan_limit_reached(&err));
        assert!(!logged_statements(db)
            .iter()
            .any(|statement| statement.sql.starts_with("INSERT")));
    }

    #[tokio::test]
    async fn students_send_requests_without_a_plan_check() -> Result<(), Error> {
        let trainer = user(Role::Teacher);
        let student = user(Role::Student);
        let request = request_from(&student, &trainer);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[trainer.clone()]])
            .append_query_results([Vec::<trainer_students::Model>::new()])
            .append_query_results([Vec::<student_trainer_requests::Model>::new()])
            .append_query_results([[request.clone()]])
            .into_connection();

        let created = send(&db, &student, trainer.id).await?;

        assert_eq!(created.id, request.id);
        assert_eq!(created.requester_role, RequesterRole::Student);
        Ok(())
    }
}
