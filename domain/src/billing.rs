//! Billing previews and statements built from a student's appointments.
//!
//! Amounts are integer cents. Attended lessons and absences are both charged when
//! selected; lessons that are still only scheduled show up as absences but are left
//! out of the default selection.
use crate::error::Error;
use crate::roster;
use crate::{appointment_status::AppointmentStatus, appointments, users, Id};
use chrono::{NaiveDate, NaiveTime};
use entity_api::appointment::{self, AppointmentFilter};
use entity_api::user as user_api;
use log::*;
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;

pub const DEFAULT_APP_NAME: &str = "Pocket Personal";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum BillingLineStatus {
    Presente,
    Falta,
}

impl From<AppointmentStatus> for BillingLineStatus {
    fn from(status: AppointmentStatus) -> Self {
        match status {
            AppointmentStatus::Completed => BillingLineStatus::Presente,
            AppointmentStatus::Missed
            | AppointmentStatus::Cancelled
            | AppointmentStatus::Scheduled => BillingLineStatus::Falta,
        }
    }
}

pub fn selected_by_default(status: AppointmentStatus) -> bool {
    status != AppointmentStatus::Scheduled
}

/// Inclusive date range a bill covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BillingPeriod {
    #[schema(value_type = String, format = Date)]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub end_date: NaiveDate,
}

impl BillingPeriod {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self, Error> {
        if start_date > end_date {
            return Err(Error::invalid_input("start_date must not be after end_date"));
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BillingEntry {
    #[schema(value_type = Uuid)]
    pub appointment_id: Id,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    #[schema(value_type = Option<String>)]
    pub time: Option<NaiveTime>,
    pub appointment_status: AppointmentStatus,
    pub status: BillingLineStatus,
    pub selected: bool,
}

impl From<&appointments::Model> for BillingEntry {
    fn from(appointment: &appointments::Model) -> Self {
        Self {
            appointment_id: appointment.id,
            date: appointment.date,
            time: appointment.time,
            appointment_status: appointment.status,
            status: appointment.status.into(),
            selected: selected_by_default(appointment.status),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct BillingTotals {
    pub present: u32,
    pub absent: u32,
    pub amount_cents: i64,
    /// Appointments inside the period, selected or not
    pub total_appointments: u32,
    pub selected_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BillingPreview {
    #[schema(value_type = Uuid)]
    pub student_id: Id,
    pub period: BillingPeriod,
    pub lesson_price_cents: i64,
    pub entries: Vec<BillingEntry>,
    pub totals: BillingTotals,
    pub formatted_amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BillingItem {
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub formatted_date: String,
    pub status: BillingLineStatus,
    pub price_cents: i64,
    pub formatted_price: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatementTotals {
    pub lessons: u32,
    pub present: u32,
    pub absent: u32,
    pub amount_cents: i64,
    pub formatted_amount: String,
}

/// Everything a renderer needs to lay out a billing document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BillingStatement {
    pub app_name: String,
    pub teacher_name: String,
    pub student_name: String,
    #[schema(value_type = String, format = Date)]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub end_date: NaiveDate,
    /// e.g. "Período: 01/03/2025 a 31/03/2025"
    pub period_label: String,
    pub items: Vec<BillingItem>,
    pub totals: StatementTotals,
}

/// Caller supplied knobs for a statement. Unset fields fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementOptions {
    pub app_name: Option<String>,
    pub lesson_price_cents: i64,
    /// Explicit appointment selection; `None` means the default selection
    pub selected_ids: Option<HashSet<Id>>,
}

/// Formats cents as Brazilian reais, e.g. `R$ 1.234,56`.
pub fn format_brl(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let reais = (cents / 100).to_string();

    let mut grouped = String::with_capacity(reais.len() + reais.len() / 3);
    for (index, digit) in reais.chars().enumerate() {
        if index > 0 && (reais.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    format!("{sign}R$ {grouped},{:02}", cents % 100)
}

pub fn format_date_pt_br(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

fn validate_price(lesson_price_cents: i64) -> Result<(), Error> {
    if lesson_price_cents < 0 {
        return Err(Error::invalid_input("lesson price must not be negative"));
    }
    Ok(())
}

fn charge(lessons: u32, lesson_price_cents: i64) -> Result<i64, Error> {
    lesson_price_cents
        .checked_mul(i64::from(lessons))
        .ok_or_else(|| Error::invalid_input("billing amount is too large"))
}

fn is_selected(entry: &BillingEntry, selected_ids: Option<&HashSet<Id>>) -> bool {
    match selected_ids {
        Some(ids) => ids.contains(&entry.appointment_id),
        None => entry.selected,
    }
}

/// Selected entries inside `period`, in their original order.
pub fn selected_entries<'a>(
    entries: &'a [BillingEntry],
    period: &BillingPeriod,
    selected_ids: Option<&HashSet<Id>>,
) -> Vec<&'a BillingEntry> {
    entries
        .iter()
        .filter(|entry| period.contains(entry.date) && is_selected(entry, selected_ids))
        .collect()
}

pub fn summarize(
    entries: &[BillingEntry],
    period: &BillingPeriod,
    selected_ids: Option<&HashSet<Id>>,
    lesson_price_cents: i64,
) -> Result<BillingTotals, Error> {
    let total_appointments = entries.iter().filter(|e| period.contains(e.date)).count() as u32;
    let selected = selected_entries(entries, period, selected_ids);

    let present = selected
        .iter()
        .filter(|entry| entry.status == BillingLineStatus::Presente)
        .count() as u32;
    let absent = selected.len() as u32 - present;

    Ok(BillingTotals {
        present,
        absent,
        amount_cents: charge(present + absent, lesson_price_cents)?,
        total_appointments,
        selected_count: selected.len() as u32,
    })
}

pub fn build_statement(
    app_name: Option<String>,
    teacher_name: &str,
    student_name: &str,
    period: BillingPeriod,
    entries: &[BillingEntry],
    selected_ids: Option<&HashSet<Id>>,
    lesson_price_cents: i64,
) -> Result<BillingStatement, Error> {
    let items: Vec<BillingItem> = selected_entries(entries, &period, selected_ids)
        .into_iter()
        .map(|entry| BillingItem {
            date: entry.date,
            formatted_date: format_date_pt_br(entry.date),
            status: entry.status,
            price_cents: lesson_price_cents,
            formatted_price: format_brl(lesson_price_cents),
        })
        .collect();

    let present = items
        .iter()
        .filter(|item| item.status == BillingLineStatus::Presente)
        .count() as u32;
    let lessons = items.len() as u32;
    let amount_cents = items
        .iter()
        .try_fold(0i64, |total, item| total.checked_add(item.price_cents))
        .ok_or_else(|| Error::invalid_input("billing amount is too large"))?;

    Ok(BillingStatement {
        app_name: app_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
        teacher_name: teacher_name.to_string(),
        student_name: student_name.to_string(),
        start_date: period.start_date,
        end_date: period.end_date,
        period_label: format!(
            "Período: {} a {}",
            format_date_pt_br(period.start_date),
            format_date_pt_br(period.end_date)
        ),
        items,
        totals: StatementTotals {
            lessons,
            present,
            absent: lessons - present,
            amount_cents,
            formatted_amount: format_brl(amount_cents),
        },
    })
}

async fn period_entries(
    db: &impl ConnectionTrait,
    teacher_id: Id,
    student_id: Id,
    period: &BillingPeriod,
) -> Result<Vec<BillingEntry>, Error> {
    roster::ensure_linked(db, teacher_id, student_id).await?;

    let filter = AppointmentFilter {
        teacher_id: Some(teacher_id),
        student_id: Some(student_id),
        ..Default::default()
    }
    .between(Some(period.start_date), Some(period.end_date));

    Ok(appointment::find_by(db, filter)
        .await?
        .iter()
        .map(BillingEntry::from)
        .collect())
}

pub async fn preview(
    db: &impl ConnectionTrait,
    teacher_id: Id,
    student_id: Id,
    period: BillingPeriod,
    lesson_price_cents: i64,
) -> Result<BillingPreview, Error> {
    validate_price(lesson_price_cents)?;
    let entries = period_entries(db, teacher_id, student_id, &period).await?;
    let totals = summarize(&entries, &period, None, lesson_price_cents)?;

    Ok(BillingPreview {
        student_id,
        period,
        lesson_price_cents,
        entries,
        formatted_amount: format_brl(totals.amount_cents),
        totals,
    })
}

pub async fn statement(
    db: &impl ConnectionTrait,
    teacher: &users::Model,
    student_id: Id,
    period: BillingPeriod,
    options: StatementOptions,
) -> Result<BillingStatement, Error> {
    validate_price(options.lesson_price_cents)?;
    let entries = period_entries(db, teacher.id, student_id, &period).await?;
    let student = user_api::find_by_id(db, student_id).await?;

    let statement = build_statement(
        options.app_name,
        &teacher.full_name,
        &student.full_name,
        period,
        &entries,
        options.selected_ids.as_ref(),
        options.lesson_price_cents,
    )?;

    debug!(
        "Statement for student {student_id}: {} lessons, {}",
        statement.totals.lessons, statement.totals.formatted_amount
    );
    Ok(statement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BusinessErrorKind, DomainErrorKind};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn entry(day: u32, status: AppointmentStatus) -> BillingEntry {
        let now = chrono::Utc::now();
        BillingEntry::from(&appointments::Model {
            id: Id::new_v4(),
            teacher_id: Id::new_v4(),
            student_id: Id::new_v4(),
            date: date(day),
            time: None,
            status,
            notes: None,
            created_at: now.into(),
            updated_at: now.into(),
        })
    }

    fn march() -> BillingPeriod {
        BillingPeriod::new(date(1), date(31)).unwrap()
    }

    #[test]
    fn status_mapping_and_default_selection() {
        let completed = entry(3, AppointmentStatus::Completed);
        let missed = entry(4, AppointmentStatus::Missed);
        let cancelled = entry(5, AppointmentStatus::Cancelled);
        let scheduled = entry(6, AppointmentStatus::Scheduled);

        assert_eq!(completed.status, BillingLineStatus::Presente);
        assert!(completed.selected);
        assert_eq!(missed.status, BillingLineStatus::Falta);
        assert!(missed.selected);
        assert_eq!(cancelled.status, BillingLineStatus::Falta);
        assert!(cancelled.selected);
        assert_eq!(scheduled.status, BillingLineStatus::Falta);
        assert!(!scheduled.selected);
    }

    #[test]
    fn summarize_charges_present_and_absent_lessons() {
        let entries = [
            entry(3, AppointmentStatus::Completed),
            entry(10, AppointmentStatus::Completed),
            entry(17, AppointmentStatus::Missed),
            entry(24, AppointmentStatus::Scheduled),
        ];

        let totals = summarize(&entries, &march(), None, 5000).unwrap();

        assert_eq!(
            totals,
            BillingTotals {
                present: 2,
                absent: 1,
                amount_cents: 15000,
                total_appointments: 4,
                selected_count: 3,
            }
        );
    }

    #[test]
    fn explicit_selection_overrides_the_default() {
        let entries = [
            entry(3, AppointmentStatus::Completed),
            entry(24, AppointmentStatus::Scheduled),
        ];
        let selected = HashSet::from([entries[1].appointment_id]);

        let totals = summarize(&entries, &march(), Some(&selected), 5000).unwrap();

        assert_eq!(totals.present, 0);
        assert_eq!(totals.absent, 1);
        assert_eq!(totals.amount_cents, 5000);
        assert_eq!(totals.selected_count, 1);
    }

    #[test]
    fn entries_outside_the_period_are_ignored() {
        let entries = [
            entry(3, AppointmentStatus::Completed),
            entry(20, AppointmentStatus::Completed),
        ];
        let first_half = BillingPeriod::new(date(1), date(15)).unwrap();

        let totals = summarize(&entries, &first_half, None, 1000).unwrap();

        assert_eq!(totals.total_appointments, 1);
        assert_eq!(totals.amount_cents, 1000);
    }

    #[test]
    fn start_after_end_is_invalid() {
        assert!(BillingPeriod::new(date(10), date(9)).is_err());
        assert!(BillingPeriod::new(date(9), date(9)).is_ok());
    }

    #[test]
    fn negative_prices_are_invalid() {
        assert!(validate_price(-1).is_err());
        assert!(validate_price(0).is_ok());
    }

    #[test]
    fn format_brl_groups_thousands() {
        assert_eq!(format_brl(0), "R$ 0,00");
        assert_eq!(format_brl(5), "R$ 0,05");
        assert_eq!(format_brl(2990), "R$ 29,90");
        assert_eq!(format_brl(123456), "R$ 1.234,56");
        assert_eq!(format_brl(123456789), "R$ 1.234.567,89");
        assert_eq!(format_brl(-15000), "-R$ 150,00");
    }

    #[test]
    fn format_date_pt_br_is_day_month_year() {
        assert_eq!(format_date_pt_br(date(7)), "07/03/2025");
    }

    #[test]
    fn build_statement_uses_defaults_and_totals() {
        let entries = [
            entry(3, AppointmentStatus::Completed),
            entry(10, AppointmentStatus::Cancelled),
            entry(17, AppointmentStatus::Scheduled),
        ];

        let statement = build_statement(
            None,
            "Carla Personal",
            "João Aluno",
            march(),
            &entries,
            None,
            8000,
        )
        .unwrap();

        assert_eq!(statement.app_name, DEFAULT_APP_NAME);
        assert_eq!(statement.period_label, "Período: 01/03/2025 a 31/03/2025");
        assert_eq!(statement.items.len(), 2);
        assert_eq!(statement.items[0].formatted_date, "03/03/2025");
        assert_eq!(
            statement.totals,
            StatementTotals {
                lessons: 2,
                present: 1,
                absent: 1,
                amount_cents: 16000,
                formatted_amount: "R$ 160,00".to_string(),
            }
        );
    }

    #[test]
    fn amounts_that_overflow_are_invalid_input() {
        let entries = [
            entry(3, AppointmentStatus::Completed),
            entry(10, AppointmentStatus::Missed),
        ];
        let price = i64::MAX / 2 + 1;

        let err = summarize(&entries, &march(), None, price).unwrap_err();
        assert!(matches!(
            err.error_kind,
            DomainErrorKind::Business(BusinessErrorKind::InvalidInput(_))
        ));

        let err = build_statement(None, "Carla", "João", march(), &entries, None, price)
            .unwrap_err();
        assert!(matches!(
            err.error_kind,
            DomainErrorKind::Business(BusinessErrorKind::InvalidInput(_))
        ));

        let totals = summarize(&entries, &march(), None, i64::MAX / 2).unwrap();
        assert_eq!(totals.amount_cents, i64::MAX - 1);
    }
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod mock_tests {
    use super::*;
    use crate::error::{BusinessErrorKind, DomainErrorKind};
    use crate::{roles::Role, trainer_students};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn teacher() -> users::Model {
        let now = chrono::Utc::now();
        users::Model {
            id: Id::new_v4(),
            email: "carla@pocket.com".to_owned(),
            full_name: "Carla Personal".to_owned(),
            password: String::new(),
            role: Role::Teacher,
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

    #[tokio::test]
    async fn statement_for_an_unlinked_student_is_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<trainer_students::Model>::new()])
            .into_connection();
        let period = BillingPeriod::new(
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        )
        .unwrap();
        let options = StatementOptions {
            lesson_price_cents: 5000,
            ..Default::default()
        };

        let err = statement(&db, &teacher(), Id::new_v4(), period, options)
            .await
            .unwrap_err();

        assert!(matches!(
            err.error_kind,
            DomainErrorKind::Business(BusinessErrorKind::Forbidden(_))
        ));
        assert_eq!(db.into_transaction_log().len(), 1);
    }
}
