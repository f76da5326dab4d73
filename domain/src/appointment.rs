//! Appointment scheduling, listings and the teacher's day overview.
use crate::error::Error;
use crate::roster;
use crate::user::PublicProfile;
use crate::{appointment_status::AppointmentStatus, appointments, users, Id};
use chrono::{DateTime, NaiveDate, Utc};
use entity_api::{appointment, user as user_api};
use log::*;
use sea_orm::ConnectionTrait;
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

pub use entity_api::appointment::{delete, find_by_id, update_status, AppointmentFilter};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AppointmentWithStudent {
    #[serde(flatten)]
    pub appointment: appointments::Model,
    #[schema(value_type = String, example = "Agendado")]
    pub status_label: &'static str,
    pub student: Option<PublicProfile>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct DaySummary {
    pub scheduled: u32,
    pub completed: u32,
    /// Missed and cancelled appointments together
    pub absences: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TodaySchedule {
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub appointments: Vec<AppointmentWithStudent>,
    pub summary: DaySummary,
}

pub fn status_label(status: AppointmentStatus) -> &'static str {
    status.label()
}

pub fn summarize_day(appointments: &[appointments::Model]) -> DaySummary {
    appointments
        .iter()
        .fold(DaySummary::default(), |mut summary, appointment| {
            match appointment.status {
                AppointmentStatus::Scheduled => summary.scheduled += 1,
                AppointmentStatus::Completed => summary.completed += 1,
                AppointmentStatus::Missed | AppointmentStatus::Cancelled => summary.absences += 1,
            }
            summary
        })
}

/// The calendar date at `now` in `timezone`. Unknown timezones fall back to UTC.
pub fn local_today(timezone: &str, now: DateTime<Utc>) -> NaiveDate {
    match timezone.parse::<chrono_tz::Tz>() {
        Ok(tz) => now.with_timezone(&tz).date_naive(),
        Err(_) => {
            warn!("Unknown timezone {timezone:?}, using UTC for today's date");
            now.date_naive()
        }
    }
}

fn validate_range(filter: &AppointmentFilter) -> Result<(), Error> {
    if let (Some(from_date), Some(to_date)) = (filter.from_date, filter.to_date) {
        if from_date > to_date {
            return Err(Error::invalid_input("from_date must not be after to_date"));
        }
    }
    Ok(())
}

/// Schedules an appointment for one of the teacher's students.
pub async fn create(
    db: &impl ConnectionTrait,
    teacher: &users::Model,
    appointment_model: appointments::Model,
) -> Result<appointments::Model, Error> {
    if !teacher.is_teacher() {
        return Err(Error::forbidden("only teachers can schedule appointments"));
    }
    roster::ensure_linked(db, teacher.id, appointment_model.student_id).await?;

    Ok(appointment::create(db, teacher.id, appointment_model).await?)
}

pub async fn update(
    db: &impl ConnectionTrait,
    id: Id,
    appointment_model: appointments::Model,
) -> Result<appointments::Model, Error> {
    Ok(appointment::update(db, id, appointment_model).await?)
}

pub async fn find_for_teacher(
    db: &impl ConnectionTrait,
    teacher_id: Id,
    mut filter: AppointmentFilter,
) -> Result<Vec<appointments::Model>, Error> {
    filter.teacher_id = Some(teacher_id);
    validate_range(&filter)?;
    Ok(appointment::find_by(db, filter).await?)
}

pub async fn find_for_student(
    db: &impl ConnectionTrait,
    student_id: Id,
    from_date: Option<NaiveDate>,
    to_date: Option<NaiveDate>,
) -> Result<Vec<appointments::Model>, Error> {
    let filter = AppointmentFilter::for_student(student_id).between(from_date, to_date);
    validate_range(&filter)?;
    Ok(appointment::find_by(db, filter).await?)
}

/// Attaches each appointment's student profile and pt-BR status label.
pub async fn with_students(
    db: &impl ConnectionTrait,
    appointments: Vec<appointments::Model>,
) -> Result<Vec<AppointmentWithStudent>, Error> {
    let mut student_ids: Vec<Id> = appointments.iter().map(|a| a.student_id).collect();
    student_ids.sort();
    student_ids.dedup();

    let students: HashMap<Id, PublicProfile> = user_api::find_by_ids(db, student_ids)
        .await?
        .iter()
        .map(|student| (student.id, PublicProfile::from(student)))
        .collect();

    Ok(appointments
        .into_iter()
        .map(|appointment| AppointmentWithStudent {
            status_label: status_label(appointment.status),
            student: students.get(&appointment.student_id).cloned(),
            appointment,
        })
        .collect())
}

/// The teacher's appointments for today in their own timezone, ordered by time.
pub async fn today_for_teacher(
    db: &impl ConnectionTrait,
    teacher: &users::Model,
) -> Result<TodaySchedule, Error> {
    let date = local_today(&teacher.timezone, Utc::now());
    let todays = find_for_teacher(
        db,
        teacher.id,
        AppointmentFilter::default().between(Some(date), Some(date)),
    )
    .await?;

    let summary = summarize_day(&todays);
    let appointments = with_students(db, todays).await?;

    Ok(TodaySchedule {
        date,
        appointments,
        summary,
    })
}
