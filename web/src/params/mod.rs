//! This module holds typed parameters for various endpoint inputs.
//!
//! Query strings and JSON bodies are deserialized into these structs so handlers receive
//! typed, already shaped input. Conversions into domain types (`UpdateMap`,
//! `QueryFilterMap`, filters and periods) live next to each struct.

pub(crate) mod appointment;
pub(crate) mod billing;
pub(crate) mod daily_workout;
pub(crate) mod sort;
pub(crate) mod student;
pub(crate) mod subscription;
pub(crate) mod trainer_request;
pub(crate) mod user;

use sort::SortOrder;

/// Fills in sorting for index endpoints that were called without it.
///
/// With neither `sort_by` nor `sort_order` the default field is used, newest first.
/// A field without an order sorts ascending. An order without a field is left alone
/// and ignored by the query layer.
pub(crate) trait WithSortDefaults {
    type SortField;

    fn apply_sort_defaults(
        sort_by: &mut Option<Self::SortField>,
        sort_order: &mut Option<SortOrder>,
        default_field: Self::SortField,
    ) {
        match (sort_by.is_some(), sort_order.is_some()) {
            (false, false) => {
                *sort_by = Some(default_field);
                *sort_order = Some(SortOrder::Desc);
            }
            (true, false) => *sort_order = Some(SortOrder::Asc),
            _ => {}
        }
    }
}
