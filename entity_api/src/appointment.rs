use super::error::{EntityApiErrorKind, Error};
use chrono::NaiveDate;
use entity::appointment_status::AppointmentStatus;
use entity::appointments::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    ConnectionTrait, QueryOrder,
};

/// Narrowing options for appointment listings. Date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentFilter {
    pub teacher_id: Option<Id>,
    pub student_id: Option<Id>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
}

impl AppointmentFilter {
    pub fn for_teacher(teacher_id: Id) -> Self {
        Self {
            teacher_id: Some(teacher_id),
            ..Default::default()
        }
    }

    pub fn for_student(student_id: Id) -> Self {
        Self {
            student_id: Some(student_id),
            ..Default::default()
        }
    }

    pub fn between(mut self, from_date: Option<NaiveDate>, to_date: Option<NaiveDate>) -> Self {
        self.from_date = from_date;
        self.to_date = to_date;
        self
    }
}

pub async fn create(
    db: &impl ConnectionTrait,
    teacher_id: Id,
    appointment_model: Model,
) -> Result<Model, Error> {
    debug!("New Appointment Model to be inserted: {appointment_model:?}");

    let now = chrono::Utc::now();
    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        teacher_id: Set(teacher_id),
        student_id: Set(appointment_model.student_id),
        date: Set(appointment_model.date),
        time: Set(appointment_model.time),
        status: Set(appointment_model.status),
        notes: Set(appointment_model.notes),
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

/// Appointments matching `filter`, ordered by date then time of day.
pub async fn find_by(
    db: &impl ConnectionTrait,
    filter: AppointmentFilter,
) -> Result<Vec<Model>, Error> {
    let mut query = Entity::find();

    if let Some(teacher_id) = filter.teacher_id {
        query = query.filter(Column::TeacherId.eq(teacher_id));
    }
    if let Some(student_id) = filter.student_id {
        query = query.filter(Column::StudentId.eq(student_id));
    }
    if let Some(from_date) = filter.from_date {
        query = query.filter(Column::Date.gte(from_date));
    }
    if let Some(to_date) = filter.to_date {
        query = query.filter(Column::Date.lte(to_date));
    }
    if let Some(status) = filter.status {
        query = query.filter(Column::Status.eq(status));
    }

    Ok(query
        .order_by_asc(Column::Date)
        .order_by_asc(Column::Time)
        .all(db)
        .await?)
}

/// Updates the editable fields of an appointment. The teacher and student never change.
pub async fn update(db: &impl ConnectionTrait, id: Id, model: Model) -> Result<Model, Error> {
    let appointment = find_by_id(db, id).await?;
    debug!("Existing Appointment model to be Updated: {appointment:?}");

    let active_model = ActiveModel {
        id: Unchanged(appointment.id),
        teacher_id: Unchanged(appointment.teacher_id),
        student_id: Unchanged(appointment.student_id),
        date: Set(model.date),
        time: Set(model.time),
        status: Set(model.status),
        notes: Set(model.notes),
        created_at: Unchanged(appointment.created_at),
        updated_at: Set(chrono::Utc::now().into()),
    };

    Ok(active_model.update(db).await?)
}

pub async fn update_status(
    db: &impl ConnectionTrait,
    id: Id,
    status: AppointmentStatus,
) -> Result<Model, Error> {
    let appointment = find_by_id(db, id).await?;
    debug!(
        "Appointment {id} status changing from {} to {status}",
        appointment.status
    );

    let active_model = ActiveModel {
        id: Unchanged(appointment.id),
        status: Set(status),
        updated_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?)
}

pub async fn delete(db: &impl ConnectionTrait, id: Id) -> Result<(), Error> {
    let result = Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        error!("Appointment with id {id} not found");
        return Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        });
    }
    Ok(())
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn appointment_model(status: AppointmentStatus) -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            teacher_id: Id::new_v4(),
            student_id: Id::new_v4(),
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            time: NaiveTime::from_hms_opt(7, 30, 0),
            status,
            notes: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn create_returns_a_new_appointment_model() -> Result<(), Error> {
        let appointment = appointment_model(AppointmentStatus::Scheduled);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[appointment.clone()]])
            .into_connection();

        let created = create(&db, appointment.teacher_id, appointment.clone()).await?;

        assert_eq!(created.id, appointment.id);
        assert_eq!(created.status, AppointmentStatus::Scheduled);
        Ok(())
    }

    #[tokio::test]
    async fn update_status_returns_the_updated_model() -> Result<(), Error> {
        let appointment = appointment_model(AppointmentStatus::Scheduled);
        let completed = Model {
            status: AppointmentStatus::Completed,
            ..appointment.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[appointment.clone()], [completed.clone()]])
            .into_connection();

        let updated = update_status(&db, appointment.id, AppointmentStatus::Completed).await?;

        assert_eq!(updated.status, AppointmentStatus::Completed);
        Ok(())
    }

    #[tokio::test]
    async fn update_returns_record_not_found_for_unknown_id() {
        let appointment = appointment_model(AppointmentStatus::Scheduled);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Model>::new()])
            .into_connection();

        let result = update(&db, Id::new_v4(), appointment).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
    }

    #[tokio::test]
    async fn find_by_returns_matching_appointments() -> Result<(), Error> {
        let first = appointment_model(AppointmentStatus::Completed);
        let second = appointment_model(AppointmentStatus::Missed);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[first.clone(), second.clone()]])
            .into_connection();

        let filter = AppointmentFilter::for_teacher(first.teacher_id).between(
            NaiveDate::from_ymd_opt(2025, 3, 1),
            NaiveDate::from_ymd_opt(2025, 3, 31),
        );
        let appointments = find_by(&db, filter).await?;

        assert_eq!(appointments, vec![first, second]);
        Ok(())
    }

    #[tokio::test]
    async fn delete_returns_record_not_found_when_nothing_deleted() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let result = delete(&db, Id::new_v4()).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
    }

    #[test]
    fn between_sets_both_bounds() {
        let filter = AppointmentFilter::for_student(Id::new_v4())
            .between(NaiveDate::from_ymd_opt(2025, 1, 1), None);

        assert_eq!(filter.from_date, NaiveDate::from_ymd_opt(2025, 1, 1));
        assert!(filter.to_date.is_none());
        assert!(filter.teacher_id.is_none());
    }
}
