use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashSet;
use utoipa::{IntoParams, ToSchema};

use domain::billing::{BillingPeriod, StatementOptions};
use domain::error::Error as DomainError;
use domain::Id;

/// Query parameters for GET `/billing/preview`.
#[derive(Debug, Deserialize, IntoParams)]
pub(crate) struct PreviewParams {
    #[param(value_type = Uuid)]
    pub(crate) student_id: Id,
    #[param(value_type = String, format = Date)]
    pub(crate) start_date: NaiveDate,
    #[param(value_type = String, format = Date)]
    pub(crate) end_date: NaiveDate,
    /// Price of one lesson in cents. Falls back to the configured default.
    pub(crate) lesson_price_cents: Option<i64>,
}

impl PreviewParams {
    pub(crate) fn period(&self) -> Result<BillingPeriod, DomainError> {
        BillingPeriod::new(self.start_date, self.end_date)
    }
}

/// Body of POST `/billing/statements`.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct StatementParams {
    #[schema(value_type = Uuid)]
    pub(crate) student_id: Id,
    #[schema(value_type = String, format = Date)]
    pub(crate) start_date: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub(crate) end_date: NaiveDate,
    pub(crate) lesson_price_cents: Option<i64>,
    /// Appointments to bill. Omit to bill the default selection.
    #[schema(value_type = Option<Vec<Uuid>>)]
    pub(crate) selected_ids: Option<Vec<Id>>,
    /// Overrides the configured name printed at the top of the statement
    pub(crate) app_name: Option<String>,
}

impl StatementParams {
    pub(crate) fn period(&self) -> Result<BillingPeriod, DomainError> {
        BillingPeriod::new(self.start_date, self.end_date)
    }

    pub(crate) fn options(
        self,
        default_app_name: &str,
        default_price_cents: i64,
    ) -> StatementOptions {
        StatementOptions {
            app_name: Some(
                self.app_name
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or_else(|| default_app_name.to_string()),
            ),
            lesson_price_cents: self.lesson_price_cents.unwrap_or(default_price_cents),
            selected_ids: self
                .selected_ids
                .map(|ids| ids.into_iter().collect::<HashSet<Id>>()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement_params(json: serde_json::Value) -> StatementParams {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn options_fall_back_to_configured_defaults() {
        let params = statement_params(serde_json::json!({
            "student_id": Id::new_v4(),
            "start_date": "2025-03-01",
            "end_date": "2025-03-31"
        }));
        let options = params.options("Pocket Personal", 8000);

        assert_eq!(options.app_name.as_deref(), Some("Pocket Personal"));
        assert_eq!(options.lesson_price_cents, 8000);
        assert_eq!(options.selected_ids, None);
    }

    #[test]
    fn explicit_selection_is_kept() {
        let chosen = Id::new_v4();
        let params = statement_params(serde_json::json!({
            "student_id": Id::new_v4(),
            "start_date": "2025-03-01",
            "end_date": "2025-03-31",
            "lesson_price_cents": 5000,
            "selected_ids": [chosen, chosen],
            "app_name": "Studio Fit"
        }));
        let options = params.options("Pocket Personal", 8000);

        assert_eq!(options.app_name.as_deref(), Some("Studio Fit"));
        assert_eq!(options.lesson_price_cents, 5000);
        assert_eq!(options.selected_ids.map(|ids| ids.len()), Some(1));
    }

    #[test]
    fn reversed_period_is_rejected() {
        let params = statement_params(serde_json::json!({
            "student_id": Id::new_v4(),
            "start_date": "2025-03-31",
            "end_date": "2025-03-01"
        }));
        assert!(params.period().is_err());
    }
}
