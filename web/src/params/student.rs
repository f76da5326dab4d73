use serde::Deserialize;
use utoipa::IntoParams;

use domain::error::Error as DomainError;
use domain::student_stats::Period;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub(crate) struct SearchParams {
    /// Case-insensitive match against full name or email
    pub(crate) search: Option<String>,
}

impl SearchParams {
    pub(crate) fn term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}

/// Query parameters for GET `/users/{id}/students/stats`. Give both or neither.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub(crate) struct StatsParams {
    pub(crate) year: Option<i32>,
    /// 1 (January) to 12 (December)
    pub(crate) month: Option<u32>,
}

impl StatsParams {
    pub(crate) fn period(&self) -> Result<Option<Period>, DomainError> {
        match (self.year, self.month) {
            (Some(year), Some(month)) => Ok(Some(Period { year, month })),
            (None, None) => Ok(None),
            _ => Err(DomainError::invalid_input(
                "year and month must be given together",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_search_is_no_search() {
        let params = SearchParams {
            search: Some("   ".to_string()),
        };
        assert_eq!(params.term(), None);
    }

    #[test]
    fn period_needs_both_parts() {
        let half = StatsParams {
            year: Some(2025),
            month: None,
        };
        assert!(half.period().is_err());

        let full = StatsParams {
            year: Some(2025),
            month: Some(3),
        };
        assert_eq!(
            full.period().unwrap(),
            Some(Period {
                year: 2025,
                month: 3
            })
        );
        assert_eq!(StatsParams::default().period().unwrap(), None);
    }
}
