use super::error::{EntityApiErrorKind, Error};
use chrono::NaiveDate;
use entity::daily_workouts::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, ConnectionTrait, QueryOrder, Set};

pub async fn create(
    db: &impl ConnectionTrait,
    teacher_id: Id,
    daily_workout_model: Model,
) -> Result<Model, Error> {
    debug!(
        "New Daily Workout for student {} on {}",
        daily_workout_model.student_id, daily_workout_model.date
    );

    let now = chrono::Utc::now();
    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        student_id: Set(daily_workout_model.student_id),
        teacher_id: Set(teacher_id),
        date: Set(daily_workout_model.date),
        workout: Set(daily_workout_model.workout),
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

/// A student's workouts, optionally bounded by inclusive dates, in date order.
pub async fn find_by_student(
    db: &impl ConnectionTrait,
    student_id: Id,
    from_date: Option<NaiveDate>,
    to_date: Option<NaiveDate>,
) -> Result<Vec<Model>, Error> {
    let mut query = Entity::find().filter(Column::StudentId.eq(student_id));
    if let Some(from_date) = from_date {
        query = query.filter(Column::Date.gte(from_date));
    }
    if let Some(to_date) = to_date {
        query = query.filter(Column::Date.lte(to_date));
    }

    Ok(query
        .order_by_asc(Column::Date)
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn find_by_student_and_date(
    db: &impl ConnectionTrait,
    student_id: Id,
    date: NaiveDate,
) -> Result<Vec<Model>, Error> {
    find_by_student(db, student_id, Some(date), Some(date)).await
}

pub async fn delete(db: &impl ConnectionTrait, id: Id) -> Result<(), Error> {
    Entity::delete_by_id(id).exec(db).await?;
    Ok(())
}
