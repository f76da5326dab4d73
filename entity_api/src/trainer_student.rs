use super::error::{EntityApiErrorKind, Error};
use crate::user;
use entity::trainer_students::{ActiveModel, Column, Entity, Model};
use entity::{users, Id};
use log::*;
use sea_orm::{entity::prelude::*, ConnectionTrait, PaginatorTrait, QueryOrder, Set};

pub async fn create(
    db: &impl ConnectionTrait,
    trainer_id: Id,
    student_id: Id,
    created_by: Id,
) -> Result<Model, Error> {
    debug!("Linking student {student_id} to trainer {trainer_id} (created by {created_by})");

    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        trainer_id: Set(trainer_id),
        student_id: Set(student_id),
        created_by: Set(created_by),
        created_at: Set(chrono::Utc::now().into()),
    };

    Ok(active_model.insert(db).await?)
}

pub async fn find_by_trainer(
    db: &impl ConnectionTrait,
    trainer_id: Id,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::TrainerId.eq(trainer_id))
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn find_by_student(
    db: &impl ConnectionTrait,
    student_id: Id,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::StudentId.eq(student_id))
        .all(db)
        .await?)
}

pub async fn find_by_trainer_and_student(
    db: &impl ConnectionTrait,
    trainer_id: Id,
    student_id: Id,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::TrainerId.eq(trainer_id))
        .filter(Column::StudentId.eq(student_id))
        .one(db)
        .await?)
}

pub async fn is_linked(
    db: &impl ConnectionTrait,
    trainer_id: Id,
    student_id: Id,
) -> Result<bool, Error> {
    Ok(find_by_trainer_and_student(db, trainer_id, student_id)
        .await?
        .is_some())
}

pub async fn count_by_trainer(db: &impl ConnectionTrait, trainer_id: Id) -> Result<u64, Error> {
    Ok(Entity::find()
        .filter(Column::TrainerId.eq(trainer_id))
        .count(db)
        .await?)
}

/// The student accounts linked to `trainer_id`, optionally filtered by a search term.
pub async fn find_students(
    db: &impl ConnectionTrait,
    trainer_id: Id,
    search: Option<&str>,
) -> Result<Vec<users::Model>, Error> {
    let student_ids: Vec<Id> = find_by_trainer(db, trainer_id)
        .await?
        .into_iter()
        .map(|link| link.student_id)
        .collect();

    if student_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = users::Entity::find().filter(users::Column::Id.is_in(student_ids));
    if let Some(condition) = user::search_condition(search) {
        query = query.filter(condition);
    }

    Ok(query.order_by_asc(users::Column::FullName).all(db).await?)
}

/// Removes the link between a trainer and a student. The student account is untouched.
pub async fn delete(
    db: &impl ConnectionTrait,
    trainer_id: Id,
    student_id: Id,
) -> Result<(), Error> {
    let result = Entity::delete_many()
        .filter(Column::TrainerId.eq(trainer_id))
        .filter(Column::StudentId.eq(student_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        warn!("No link between trainer {trainer_id} and student {student_id} to delete");
        return Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        });
    }

    Ok(())
}
