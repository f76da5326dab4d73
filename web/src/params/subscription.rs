use sea_orm::{Order, Value};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::sort::SortOrder;
use super::WithSortDefaults;
use domain::{subscriptions, Id, IntoQueryFilterMap, QueryFilterMap, QuerySort};

/// Body of PUT `/users/{id}/subscription`.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct ChangePlanParams {
    /// One of `free`, `basic`, `premium`
    pub(crate) plan_id: String,
}

/// Sortable fields for a user's subscription history
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = "started_at")]
pub(crate) enum SortField {
    #[serde(rename = "started_at")]
    StartedAt,
    #[serde(rename = "created_at")]
    CreatedAt,
    #[serde(rename = "updated_at")]
    UpdatedAt,
}

/// Query parameters for GET `/users/{id}/subscriptions`.
/// The `user_id` is populated from the URL path parameter, not the query string.
#[derive(Debug, Deserialize, IntoParams)]
pub(crate) struct IndexParams {
    #[serde(skip)]
    pub(crate) user_id: Id,
    pub(crate) sort_by: Option<SortField>,
    pub(crate) sort_order: Option<SortOrder>,
}

impl IndexParams {
    pub fn with_user_id(mut self, user_id: Id) -> Self {
        self.user_id = user_id;
        self
    }
}

impl IntoQueryFilterMap for IndexParams {
    fn into_query_filter_map(self) -> QueryFilterMap {
        let mut query_filter_map = QueryFilterMap::new();
        query_filter_map.insert(
            "user_id".to_string(),
            Some(Value::Uuid(Some(Box::new(self.user_id)))),
        );
        query_filter_map
    }
}

impl QuerySort<subscriptions::Column> for IndexParams {
    fn get_sort_column(&self) -> Option<subscriptions::Column> {
        self.sort_by.as_ref().map(|field| match field {
            SortField::StartedAt => subscriptions::Column::StartedAt,
            SortField::CreatedAt => subscriptions::Column::CreatedAt,
            SortField::UpdatedAt => subscriptions::Column::UpdatedAt,
        })
    }

    fn get_sort_order(&self) -> Option<Order> {
        self.sort_order.as_ref().map(|order| match order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        })
    }
}

impl WithSortDefaults for IndexParams {
    type SortField = SortField;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_params() -> IndexParams {
        serde_json::from_value(serde_json::json!({})).unwrap()
    }

    #[test]
    fn history_defaults_to_newest_started_first() {
        let mut params = empty_params();
        IndexParams::apply_sort_defaults(
            &mut params.sort_by,
            &mut params.sort_order,
            SortField::StartedAt,
        );

        assert!(matches!(
            params.get_sort_column(),
            Some(subscriptions::Column::StartedAt)
        ));
        assert!(matches!(params.get_sort_order(), Some(Order::Desc)));
    }

    #[test]
    fn field_without_order_sorts_ascending() {
        let mut params: IndexParams =
            serde_json::from_value(serde_json::json!({"sort_by": "created_at"})).unwrap();
        IndexParams::apply_sort_defaults(
            &mut params.sort_by,
            &mut params.sort_order,
            SortField::StartedAt,
        );

        assert!(matches!(
            params.get_sort_column(),
            Some(subscriptions::Column::CreatedAt)
        ));
        assert!(matches!(params.get_sort_order(), Some(Order::Asc)));
    }

    #[test]
    fn user_id_from_the_path_becomes_a_filter() {
        let user_id = Id::new_v4();
        let filters = empty_params().with_user_id(user_id).into_query_filter_map();

        assert_eq!(
            filters.get("user_id"),
            Some(Value::Uuid(Some(Box::new(user_id))))
        );
    }
}
