//! Per-student appointment counts for a teacher, optionally limited to one calendar month.
use crate::error::Error;
use crate::user::PublicProfile;
use crate::{appointment_status::AppointmentStatus, appointments, Id};
use chrono::{Months, NaiveDate};
use entity_api::appointment::{self, AppointmentFilter};
use entity_api::trainer_student;
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

/// Appointment counts by status. Each appointment lands in exactly one counter, so
/// `scheduled` never includes cancelled appointments; those are counted in `cancelled`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct StudentStats {
    pub completed: u32,
    pub scheduled: u32,
    pub missed: u32,
    pub cancelled: u32,
}

impl StudentStats {
    fn record(&mut self, status: AppointmentStatus) {
        match status {
            AppointmentStatus::Completed => self.completed += 1,
            AppointmentStatus::Scheduled => self.scheduled += 1,
            AppointmentStatus::Missed => self.missed += 1,
            AppointmentStatus::Cancelled => self.cancelled += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.completed + self.scheduled + self.missed + self.cancelled
    }
}

/// A calendar month. `month` is 1 based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    /// First and last day of the month.
    pub fn bounds(&self) -> Result<(NaiveDate, NaiveDate), Error> {
        let first = NaiveDate::from_ymd_opt(self.year, self.month, 1).ok_or_else(|| {
            Error::invalid_input(format!("invalid month {}/{}", self.month, self.year))
        })?;
        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or_else(|| Error::invalid_input("month out of range"))?;
        Ok((first, last))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StudentStatsEntry {
    pub student: PublicProfile,
    pub stats: StudentStats,
}

/// Counts appointments by student and status. Only the status matters, never the date.
pub fn tally(appointments: &[appointments::Model]) -> HashMap<Id, StudentStats> {
    let mut by_student: HashMap<Id, StudentStats> = HashMap::new();
    for appointment in appointments {
        by_student
            .entry(appointment.student_id)
            .or_default()
            .record(appointment.status);
    }
    by_student
}

/// Stats for `student_id`, zeroed when they had no appointments.
pub fn stats_for(by_student: &HashMap<Id, StudentStats>, student_id: Id) -> StudentStats {
    by_student.get(&student_id).copied().unwrap_or_default()
}

/// One entry per linked student, in name order.
pub async fn for_teacher(
    db: &impl ConnectionTrait,
    teacher_id: Id,
    period: Option<Period>,
) -> Result<Vec<StudentStatsEntry>, Error> {
    let (from_date, to_date) = match period {
        Some(period) => {
            let (first, last) = period.bounds()?;
            (Some(first), Some(last))
        }
        None => (None, None),
    };

    let appointments = appointment::find_by(
        db,
        AppointmentFilter::for_teacher(teacher_id).between(from_date, to_date),
    )
    .await?;
    let by_student = tally(&appointments);

    Ok(trainer_student::find_students(db, teacher_id, None)
        .await?
        .iter()
        .map(|student| StudentStatsEntry {
            student: PublicProfile::from(student),
            stats: stats_for(&by_student, student.id),
        })
        .collect())
}
