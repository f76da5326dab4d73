//! Generic, column-checked filtering and sorting for any entity.
use crate::error::Error;
use sea_orm::strum::IntoEnumIterator;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, Order, QueryFilter, QueryOrder, Value,
};
use std::collections::HashMap;

/// `QueryFilterMap` is a data structure that serves as a bridge for translating filter parameters
/// between different layers of the application. It is essentially a wrapper around a `HashMap`
/// where the keys are filter parameter names (as `String`) and the values are optional `Value` types
/// from `sea_orm`.
///
/// # Example
///
/// ```
/// use sea_orm::Value;
/// use entity_api::QueryFilterMap;
///
/// let mut query_filter_map = QueryFilterMap::new();
/// query_filter_map.insert("student_id".to_string(), Some(Value::String(Some(Box::new("a_student_id".to_string())))));
/// let filter_value = query_filter_map.get("student_id");
/// ```
pub struct QueryFilterMap {
    map: HashMap<String, Option<Value>>,
}

impl QueryFilterMap {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        // HashMap.get returns an Option and so we need to "flatten" this to a single Option
        self.map
            .get(key)
            .and_then(|inner_option| inner_option.clone())
    }

    pub fn insert(&mut self, key: String, value: Option<Value>) {
        self.map.insert(key, value);
    }
}

impl Default for QueryFilterMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts a params struct into a `QueryFilterMap` so web request parameters can be
/// handed down to the query layer without `web` knowing about SeaORM columns.
pub trait IntoQueryFilterMap {
    fn into_query_filter_map(self) -> QueryFilterMap;
}

/// Optional sorting for a `find_by` query. Both the column and the order must be
/// present for an `ORDER BY` to be applied.
pub trait QuerySort<C: ColumnTrait> {
    fn get_sort_column(&self) -> Option<C>;
    fn get_sort_order(&self) -> Option<Order>;
}

/// Wraps a bare `QueryFilterMap` for callers that only need filtering.
pub struct FilterOnly(pub QueryFilterMap);

impl IntoQueryFilterMap for FilterOnly {
    fn into_query_filter_map(self) -> QueryFilterMap {
        self.0
    }
}

impl<C: ColumnTrait> QuerySort<C> for FilterOnly {
    fn get_sort_column(&self) -> Option<C> {
        None
    }

    fn get_sort_order(&self) -> Option<Order> {
        None
    }
}

/// Find all records of an entity by the given params' filters, sorted when requested.
pub async fn find_by<E, C, P>(db: &impl ConnectionTrait, params: P) -> Result<Vec<E::Model>, Error>
where
    E: EntityTrait<Column = C>,
    C: ColumnTrait + IntoEnumIterator,
    P: IntoQueryFilterMap + QuerySort<C>,
{
    let sort_column = params.get_sort_column();
    let sort_order = params.get_sort_order();
    let query_filter_map = params.into_query_filter_map();

    let mut query = E::find();

    // We iterate through the entity's defined columns so that we only attempt
    // to filter by columns that exist.
    for column in C::iter() {
        if let Some(value) = query_filter_map.get(&column.to_string()) {
            query = query.filter(column.eq(value));
        }
    }

    if let (Some(column), Some(order)) = (sort_column, sort_order) {
        query = query.order_by(column, order);
    }

    Ok(query.all(db).await?)
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use entity::{daily_workouts, Id};
    use sea_orm::{DatabaseBackend, MockDatabase, Transaction};

    struct ByStudent {
        student_id: Id,
        sort: bool,
    }

    impl IntoQueryFilterMap for ByStudent {
        fn into_query_filter_map(self) -> QueryFilterMap {
            let mut query_filter_map = QueryFilterMap::new();
            query_filter_map.insert(
                "student_id".to_string(),
                Some(Value::Uuid(Some(Box::new(self.student_id)))),
            );
            query_filter_map.insert(
                "not_a_column".to_string(),
                Some(Value::String(Some(Box::new("ignored".to_string())))),
            );
            query_filter_map
        }
    }

    impl QuerySort<daily_workouts::Column> for ByStudent {
        fn get_sort_column(&self) -> Option<daily_workouts::Column> {
            self.sort.then_some(daily_workouts::Column::Date)
        }

        fn get_sort_order(&self) -> Option<Order> {
            self.sort.then_some(Order::Desc)
        }
    }

    #[tokio::test]
    async fn find_by_filters_on_known_columns_and_sorts() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let student_id = Id::new_v4();

        let _ = find_by::<daily_workouts::Entity, daily_workouts::Column, _>(
            &db,
            ByStudent {
                student_id,
                sort: true,
            },
        )
        .await;

        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"SELECT "daily_workouts"."id", "daily_workouts"."student_id", "daily_workouts"."teacher_id", "daily_workouts"."date", "daily_workouts"."workout", "daily_workouts"."created_at", "daily_workouts"."updated_at" FROM "personal_pocket"."daily_workouts" WHERE "daily_workouts"."student_id" = $1 ORDER BY "daily_workouts"."date" DESC"#,
                [student_id.into()]
            )]
        );

        Ok(())
    }

    #[tokio::test]
    async fn filter_only_never_sorts() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let _ = find_by::<daily_workouts::Entity, daily_workouts::Column, _>(
            &db,
            FilterOnly(QueryFilterMap::new()),
        )
        .await;

        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"SELECT "daily_workouts"."id", "daily_workouts"."student_id", "daily_workouts"."teacher_id", "daily_workouts"."date", "daily_workouts"."workout", "daily_workouts"."created_at", "daily_workouts"."updated_at" FROM "personal_pocket"."daily_workouts""#,
                []
            )]
        );

        Ok(())
    }
}
