use crate::error::Error;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    IntoActiveModel, Value,
};
use std::collections::HashMap;

/// Updates an existing record using a map of column names to values.
///
/// Only the columns named in `update_map` are modified; unknown keys are ignored
/// because the entity's own columns drive the iteration. When the entity has an
/// `updated_at` column it is bumped to now, unless the map sets it explicitly.
///
/// # Type Parameters
///
/// * `A` - The ActiveModel type that implements ActiveModelTrait and ActiveModelBehavior
/// * `C` - The Column type that implements ColumnTrait
pub async fn update<A, C>(
    db: &impl ConnectionTrait,
    mut active_model: A,
    update_map: UpdateMap,
) -> Result<<A::Entity as EntityTrait>::Model, Error>
where
    A: ActiveModelTrait + ActiveModelBehavior + Send,
    C: ColumnTrait,
    A::Entity: EntityTrait<Column = C>,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
{
    for column in C::iter() {
        let name = column.to_string();
        if let Some(value) = update_map.get(&name) {
            active_model.set(column, value.clone());
        } else if name == "updated_at" {
            let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();
            active_model.set(column, now.into());
        }
    }
    Ok(active_model.update(db).await?)
}

/// Column names mapped to their new values, built by the web layer from a request body.
#[derive(Default)]
pub struct UpdateMap {
    map: HashMap<String, Option<Value>>,
}

impl UpdateMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for `key`, or None when the key is absent or explicitly unset.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key).and_then(|opt| opt.as_ref())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.map.remove(key).and_then(|opt| opt)
    }

    pub fn insert(&mut self, key: String, value: Option<Value>) {
        self.map.insert(key, value);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }
}

pub trait IntoUpdateMap {
    fn into_update_map(self) -> UpdateMap;
}

impl IntoUpdateMap for UpdateMap {
    fn into_update_map(self) -> UpdateMap {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_flattens_unset_values() {
        let mut update_map = UpdateMap::new();
        update_map.insert("goal".to_string(), None);
        update_map.insert(
            "full_name".to_string(),
            Some(Value::String(Some(Box::new("Ana".to_string())))),
        );

        assert!(update_map.get("goal").is_none());
        assert!(update_map.contains_key("goal"));
        assert!(update_map.get("full_name").is_some());
        assert!(update_map.remove("full_name").is_some());
        assert!(!update_map.contains_key("full_name"));
    }
}
