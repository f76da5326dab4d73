use chrono::{NaiveDate, Utc};
use sea_orm::Value;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use domain::{gender::Gender, users, users::Role, Id, IntoUpdateMap, UpdateMap};

/// Body of a registration, or of a trainer creating a student account.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateParams {
    pub email: String,
    pub full_name: String,
    pub password: String,
    /// Required for registration; ignored when a trainer creates a student
    pub role: Option<Role>,
    pub cpf: Option<String>,
    pub phone: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub goal: Option<String>,
    pub height_cm: Option<i32>,
    pub weight_kg: Option<f64>,
    pub body_fat_percent: Option<f64>,
    /// IANA timezone name, e.g. "America/Sao_Paulo". Defaults to UTC.
    pub timezone: Option<String>,
}

impl CreateParams {
    pub(crate) fn into_model(self, role: Role) -> users::Model {
        let now = Utc::now();
        users::Model {
            id: Id::nil(),
            email: self.email,
            full_name: self.full_name,
            password: self.password,
            role,
            cpf: self.cpf,
            phone: self.phone,
            birth_date: self.birth_date,
            gender: self.gender,
            goal: self.goal,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            body_fat_percent: self.body_fat_percent,
            timezone: self.timezone.unwrap_or_default(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct UpdateParams {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub cpf: Option<String>,
    pub phone: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub goal: Option<String>,
    pub height_cm: Option<i32>,
    pub weight_kg: Option<f64>,
    pub body_fat_percent: Option<f64>,
    pub timezone: Option<String>,
}

fn string_value(value: String) -> Option<Value> {
    Some(Value::String(Some(Box::new(value))))
}

impl IntoUpdateMap for UpdateParams {
    fn into_update_map(self) -> UpdateMap {
        let mut update_map = UpdateMap::new();
        let strings = [
            ("email", self.email),
            ("full_name", self.full_name),
            ("cpf", self.cpf),
            ("phone", self.phone),
            ("goal", self.goal),
            ("timezone", self.timezone),
            ("gender", self.gender.map(|gender| gender.to_string())),
        ];
        for (column, value) in strings {
            if let Some(value) = value {
                update_map.insert(column.to_string(), string_value(value));
            }
        }
        if let Some(birth_date) = self.birth_date {
            update_map.insert(
                "birth_date".to_string(),
                Some(Value::ChronoDate(Some(Box::new(birth_date)))),
            );
        }
        if let Some(height_cm) = self.height_cm {
            update_map.insert("height_cm".to_string(), Some(Value::Int(Some(height_cm))));
        }
        if let Some(weight_kg) = self.weight_kg {
            update_map.insert("weight_kg".to_string(), Some(Value::Double(Some(weight_kg))));
        }
        if let Some(body_fat_percent) = self.body_fat_percent {
            update_map.insert(
                "body_fat_percent".to_string(),
                Some(Value::Double(Some(body_fat_percent))),
            );
        }
        update_map
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePasswordParams {
    pub current_password: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_map_only_holds_the_fields_that_were_sent() {
        let params: UpdateParams =
            serde_json::from_value(serde_json::json!({"full_name": "Ana Lima", "height_cm": 170}))
                .unwrap();
        let update_map = params.into_update_map();

        assert!(update_map.contains_key("full_name"));
        assert!(update_map.contains_key("height_cm"));
        assert!(!update_map.contains_key("email"));
        assert!(!update_map.contains_key("timezone"));
    }

    #[test]
    fn gender_is_stored_by_its_database_name() {
        let params: UpdateParams =
            serde_json::from_value(serde_json::json!({"gender": "female"})).unwrap();
        let update_map = params.into_update_map();

        assert_eq!(
            update_map.get("gender"),
            Some(&Value::String(Some(Box::new("female".to_string()))))
        );
    }

    #[test]
    fn create_params_build_a_model_with_the_given_role() {
        let params: CreateParams = serde_json::from_value(serde_json::json!({
            "email": "ana@pocket.test",
            "full_name": "Ana Lima",
            "password": "secret1"
        }))
        .unwrap();
        let model = params.into_model(Role::Student);

        assert_eq!(model.role, Role::Student);
        assert_eq!(model.email, "ana@pocket.test");
        assert!(model.timezone.is_empty());
    }
}
