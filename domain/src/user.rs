use crate::error::Error;
use crate::{users, Id};
use entity_api::{mutate, user as user_api};
use log::*;
use sea_orm::{ConnectionTrait, IntoActiveModel, Value};
use serde::Serialize;
use utoipa::ToSchema;

pub use entity_api::user::{
    find_by_email, find_by_id, generate_hash, verify_password, AuthSession, Backend, Credentials,
    Role,
};

pub const TEACHER_DASHBOARD: &str = "/teacher-dashboard";
pub const STUDENT_DASHBOARD: &str = "/student-dashboard";
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// The part of a user's profile other users may see.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PublicProfile {
    #[schema(value_type = Uuid)]
    pub id: Id,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub phone: Option<String>,
    pub goal: Option<String>,
}

impl From<&users::Model> for PublicProfile {
    fn from(user: &users::Model) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            role: user.role,
            phone: user.phone.clone(),
            goal: user.goal.clone(),
        }
    }
}

/// Where the client should land after logging in.
pub fn dashboard_path(role: Role) -> &'static str {
    match role {
        Role::Teacher => TEACHER_DASHBOARD,
        Role::Student => STUDENT_DASHBOARD,
    }
}

pub fn validate_email(email: &str) -> Result<(), Error> {
    if email_address::EmailAddress::is_valid(email.trim()) {
        Ok(())
    } else {
        Err(Error::invalid_input(format!("invalid email address: {email}")))
    }
}

pub fn validate_timezone(timezone: &str) -> Result<(), Error> {
    timezone
        .parse::<chrono_tz::Tz>()
        .map(|_| ())
        .map_err(|_| Error::invalid_input(format!("invalid timezone: {timezone}")))
}

pub fn validate_password(password: &str) -> Result<(), Error> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Error::invalid_input(format!(
            "password must have at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

fn validate_new_user(user_model: &users::Model) -> Result<(), Error> {
    validate_email(&user_model.email)?;
    validate_password(&user_model.password)?;
    if user_model.full_name.trim().is_empty() {
        return Err(Error::invalid_input("full name is required"));
    }
    if !user_model.timezone.trim().is_empty() {
        validate_timezone(&user_model.timezone)?;
    }
    Ok(())
}

/// Registers a new account. Emails are unique regardless of case.
pub async fn create(
    db: &impl ConnectionTrait,
    user_model: users::Model,
) -> Result<users::Model, Error> {
    validate_new_user(&user_model)?;

    if find_by_email(db, &user_model.email).await?.is_some() {
        warn!("Attempt to register an already used email address");
        return Err(Error::conflict("email already registered"));
    }

    Ok(user_api::create(db, user_model).await?)
}

/// Applies a partial profile update. Identity, role and password are not editable here.
/// A new email is stored lowercased and must not belong to another account.
pub async fn update(
    db: &impl ConnectionTrait,
    user_id: Id,
    params: impl mutate::IntoUpdateMap,
) -> Result<users::Model, Error> {
    let mut update_map = params.into_update_map();
    for protected in ["id", "password", "role", "created_at"] {
        update_map.remove(protected);
    }

    let new_email = match update_map.get("email") {
        Some(Value::String(Some(email))) => Some(email.trim().to_lowercase()),
        _ => None,
    };
    if let Some(email) = new_email {
        validate_email(&email)?;
        if let Some(owner) = find_by_email(db, &email).await? {
            if owner.id != user_id {
                warn!("User {user_id} tried to take an email already registered");
                return Err(Error::conflict("email already registered"));
            }
        }
        update_map.insert("email".to_owned(), Some(Value::from(email)));
    }
    if let Some(Value::String(Some(timezone))) = update_map.get("timezone") {
        validate_timezone(timezone)?;
    }

    let existing_user = find_by_id(db, user_id).await?;
    let active_model = existing_user.into_active_model();
    Ok(
        mutate::update::<users::ActiveModel, users::Column>(db, active_model, update_map)
            .await?,
    )
}

pub async fn update_password(
    db: &impl ConnectionTrait,
    user_id: Id,
    current_password: &str,
    new_password: String,
) -> Result<users::Model, Error> {
    validate_password(&new_password)?;
    Ok(user_api::update_password(db, user_id, current_password, new_password).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BusinessErrorKind, DomainErrorKind};

    #[test]
    fn dashboard_path_depends_on_role() {
        assert_eq!(dashboard_path(Role::Teacher), "/teacher-dashboard");
        assert_eq!(dashboard_path(Role::Student), "/student-dashboard");
    }

    #[test]
    fn validate_email_rejects_malformed_addresses() {
        assert!(validate_email("aluno@pocket.com").is_ok());
        assert!(validate_email("aluno.pocket.com").is_err());
    }

    #[test]
    fn validate_timezone_accepts_iana_names_only() {
        assert!(validate_timezone("America/Sao_Paulo").is_ok());
        assert!(validate_timezone("UTC").is_ok());
        let err = validate_timezone("Brasilia").unwrap_err();
        assert!(matches!(
            err.error_kind,
            DomainErrorKind::Business(BusinessErrorKind::InvalidInput(_))
        ));
    }

    #[test]
    fn validate_password_requires_a_minimum_length() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
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
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn user(email: &str) -> users::Model {
        let now = chrono::Utc::now();
        users::Model {
            id: Id::new_v4(),
            email: email.to_owned(),
            full_name: "Ana Souza".to_owned(),
            password: String::new(),
            role: Role::Student,
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

    fn email_update(email: &str) -> mutate::UpdateMap {
        let mut update_map = mutate::UpdateMap::new();
        update_map.insert("email".to_owned(), Some(Value::from(email)));
        update_map
    }

    #[tokio::test]
    async fn update_stores_the_email_lowercased() -> Result<(), Error> {
        let existing = user("ana@old.com");
        let updated = users::Model {
            email: "ana@pocket.com".to_owned(),
            ..existing.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<users::Model>::new()])
            .append_query_results([[existing.clone()]])
            .append_query_results([[updated.clone()]])
            .into_connection();

        let result = update(&db, existing.id, email_update("  Ana@Pocket.com ")).await?;

        assert_eq!(result.email, "ana@pocket.com");
        let log = db.into_transaction_log();
        assert_eq!(log.len(), 3);
        let lookup = &log[0].statements()[0];
        let lookup_values = lookup.values.as_ref().map(|values| values.0.clone());
        assert!(lookup_values
            .unwrap_or_default()
            .contains(&Value::from("ana@pocket.com")));
        let update_statement = &log[2].statements()[0];
        assert!(update_statement.sql.starts_with("UPDATE"));
        let update_values = update_statement.values.as_ref().map(|values| values.0.clone());
        assert!(update_values
            .unwrap_or_default()
            .contains(&Value::from("ana@pocket.com")));
        Ok(())
    }

    #[tokio::test]
    async fn update_keeps_the_users_own_email() -> Result<(), Error> {
        let existing = user("ana@pocket.com");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[existing.clone()]])
            .append_query_results([[existing.clone()]])
            .append_query_results([[existing.clone()]])
            .into_connection();

        let result = update(&db, existing.id, email_update("ANA@pocket.com")).await?;

        assert_eq!(result.email, "ana@pocket.com");
        Ok(())
    }

    #[tokio::test]
    async fn update_rejects_an_email_owned_by_another_user() {
        let owner = user("ana@pocket.com");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[owner]])
            .into_connection();

        let err = update(&db, Id::new_v4(), email_update("Ana@Pocket.com"))
            .await
            .unwrap_err();

        assert!(matches!(
            err.error_kind,
            DomainErrorKind::Business(BusinessErrorKind::Conflict(_))
        ));
        assert_eq!(db.into_transaction_log().len(), 1);
    }
}
