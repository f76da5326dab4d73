use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use domain::Id;

/// Query parameters for GET `/daily_workouts`: either a single `date` or an optional
/// `from_date`..`to_date` range.
#[derive(Debug, Deserialize, IntoParams)]
pub(crate) struct IndexParams {
    #[param(value_type = Uuid)]
    pub(crate) student_id: Id,
    #[param(value_type = Option<String>, format = Date)]
    pub(crate) date: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date)]
    pub(crate) from_date: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date)]
    pub(crate) to_date: Option<NaiveDate>,
}

impl IndexParams {
    /// The inclusive range to list; a single `date` wins over a range.
    pub(crate) fn range(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        match self.date {
            Some(date) => (Some(date), Some(date)),
            None => (self.from_date, self.to_date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_date_overrides_the_range() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let params = IndexParams {
            student_id: Id::new_v4(),
            date: Some(date),
            from_date: NaiveDate::from_ymd_opt(2025, 3, 1),
            to_date: None,
        };
        assert_eq!(params.range(), (Some(date), Some(date)));
    }
}
