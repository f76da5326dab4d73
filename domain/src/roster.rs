//! Trainer to student links and the plan limits that govern them.
use crate::error::Error;
use crate::plan::Plan;
use crate::subscription;
use crate::{roles::Role, trainer_students, users, Id};
use entity_api::{trainer_request, trainer_student, user as user_api};
use log::*;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde::Serialize;
use std::collections::HashSet;
use utoipa::ToSchema;

pub use entity_api::trainer_student::{count_by_trainer, is_linked};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PlanUsage {
    pub plan: Plan,
    pub student_count: u64,
    pub max_students: u64,
    pub remaining: u64,
    pub limit_reached: bool,
}

impl PlanUsage {
    pub fn new(plan: Plan, student_count: u64) -> Self {
        Self {
            plan,
            student_count,
            max_students: plan.max_students,
            remaining: plan.remaining_slots(student_count),
            limit_reached: !plan.can_add_student(student_count),
        }
    }
}

pub async fn students_of(
    db: &impl ConnectionTrait,
    trainer_id: Id,
    search: Option<&str>,
) -> Result<Vec<users::Model>, Error> {
    Ok(trainer_student::find_students(db, trainer_id, search).await?)
}

pub async fn all_students(
    db: &impl ConnectionTrait,
    search: Option<&str>,
) -> Result<Vec<users::Model>, Error> {
    Ok(user_api::find_by_role(db, Role::Student, search).await?)
}

/// Students the trainer could still invite: not linked yet and not already invited.
pub async fn available_students(
    db: &impl ConnectionTrait,
    trainer_id: Id,
    search: Option<&str>,
) -> Result<Vec<users::Model>, Error> {
    let students = all_students(db, search).await?;
    let linked: HashSet<Id> = trainer_student::find_by_trainer(db, trainer_id)
        .await?
        .into_iter()
        .map(|link| link.student_id)
        .collect();
    let invited: HashSet<Id> = trainer_request::find_pending_target_ids(db, trainer_id)
        .await?
        .into_iter()
        .collect();

    Ok(exclude_unavailable(students, &linked, &invited))
}

pub fn exclude_unavailable(
    students: Vec<users::Model>,
    linked: &HashSet<Id>,
    invited: &HashSet<Id>,
) -> Vec<users::Model> {
    students
        .into_iter()
        .filter(|student| !linked.contains(&student.id) && !invited.contains(&student.id))
        .collect()
}

pub async fn plan_usage(db: &impl ConnectionTrait, trainer_id: Id) -> Result<PlanUsage, Error> {
    let current = subscription::current_plan(db, trainer_id).await?;
    let student_count = trainer_student::count_by_trainer(db, trainer_id).await?;
    Ok(PlanUsage::new(current.plan, student_count))
}

/// Fails with `PlanLimitReached` when the trainer has no free slot left.
///
/// The trainer row is locked before counting, so when `db` is a transaction two
/// concurrent links for the same trainer cannot both see the last free slot.
pub async fn ensure_capacity(
    db: &impl ConnectionTrait,
    trainer_id: Id,
) -> Result<PlanUsage, Error> {
    user_api::lock_by_id(db, trainer_id).await?;
    let usage = plan_usage(db, trainer_id).await?;
    if usage.limit_reached {
        info!(
            "Trainer {trainer_id} reached the {} plan limit of {} students",
            usage.plan.id, usage.max_students
        );
        return Err(Error::plan_limit_reached());
    }
    Ok(usage)
}

/// Fails with `Forbidden` unless the student is linked to the trainer.
pub async fn ensure_linked(
    db: &impl ConnectionTrait,
    trainer_id: Id,
    student_id: Id,
) -> Result<(), Error> {
    if trainer_student::is_linked(db, trainer_id, student_id).await? {
        Ok(())
    } else {
        Err(Error::forbidden("student is not linked to this trainer"))
    }
}

/// Creates a link after checking it does not exist and the trainer has room for it.
/// Callers that must be atomic pass a transaction as `db`.
pub async fn link(
    db: &impl ConnectionTrait,
    trainer_id: Id,
    student_id: Id,
    created_by: Id,
) -> Result<trainer_students::Model, Error> {
    if trainer_student::is_linked(db, trainer_id, student_id).await? {
        return Err(Error::conflict("student is already linked to this trainer"));
    }
    ensure_capacity(db, trainer_id).await?;

    Ok(trainer_student::create(db, trainer_id, student_id, created_by).await?)
}

pub async fn unlink(
    db: &impl ConnectionTrait,
    trainer_id: Id,
    student_id: Id,
) -> Result<(), Error> {
    trainer_student::delete(db, trainer_id, student_id).await?;
    info!("Student {student_id} unlinked from trainer {trainer_id}");
    Ok(())
}

/// Creates a student account on behalf of a trainer and links it, all or nothing.
pub async fn create_student(
    db: &DatabaseConnection,
    trainer: &users::Model,
    mut new_student: users::Model,
) -> Result<users::Model, Error> {
    if !trainer.is_teacher() {
        return Err(Error::forbidden("only teachers can create students"));
    }
    new_student.role = Role::Student;

    let txn = db.begin().await?;

    ensure_capacity(&txn, trainer.id).await?;
    let student = crate::user::create(&txn, new_student).await?;
    trainer_student::create(&txn, trainer.id, student.id, trainer.id).await?;

    txn.commit().await?;

    info!("Trainer {} created student {}", trainer.id, student.id);
    Ok(student)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan;

    fn student(full_name: &str) -> users::Model {
        let now = chrono::Utc::now();
        users::Model {
            id: Id::new_v4(),
            email: format!("{}@pocket.com", full_name.to_lowercase()),
            full_name: full_name.to_owned(),
            password: String::new(),
            role: Role::Student,
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

    #[test]
    fn plan_usage_reports_remaining_slots() {
        let usage = PlanUsage::new(plan::find_by_id(plan::BASIC).unwrap(), 7);
        assert_eq!(usage.max_students, 10);
        assert_eq!(usage.remaining, 3);
        assert!(!usage.limit_reached);
    }

    #[test]
    fn free_plan_with_one_student_is_full() {
        let usage = PlanUsage::new(plan::free_plan(), 1);
        assert_eq!(usage.remaining, 0);
        assert!(usage.limit_reached);
    }

    #[test]
    fn exclude_unavailable_drops_linked_and_invited_students() {
        let ana = student("Ana");
        let bruno = student("Bruno");
        let carla = student("Carla");
        let linked = HashSet::from([ana.id]);
        let invited = HashSet::from([bruno.id]);

        let available = exclude_unavailable(vec![ana, bruno, carla.clone()], &linked, &invited);

        assert_eq!(available, vec![carla]);
    }
}
