use super::error::{EntityApiErrorKind, Error};
use async_trait::async_trait;
use axum_login::{AuthnBackend, UserId};
use chrono::Utc;

use entity::users::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use password_auth;
use sea_orm::{
    entity::prelude::*,
    sea_query::{Expr, Func},
    ActiveValue::{Set, Unchanged},
    Condition, ConnectionTrait, DatabaseConnection, QueryOrder, QuerySelect,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

pub use entity::users::Role;

pub const DEFAULT_TIMEZONE: &str = "UTC";

pub async fn create(db: &impl ConnectionTrait, user_model: Model) -> Result<Model, Error> {
    debug!(
        "New User Model to be inserted: {} ({})",
        user_model.email, user_model.role
    );

    let now = Utc::now();
    let timezone = if user_model.timezone.trim().is_empty() {
        DEFAULT_TIMEZONE.to_string()
    } else {
        user_model.timezone
    };

    let user_active_model: ActiveModel = ActiveModel {
        id: Set(Id::new_v4()),
        email: Set(user_model.email.trim().to_lowercase()),
        full_name: Set(user_model.full_name),
        password: Set(generate_hash(user_model.password)),
        role: Set(user_model.role),
        cpf: Set(user_model.cpf),
        phone: Set(user_model.phone),
        birth_date: Set(user_model.birth_date),
        gender: Set(user_model.gender),
        goal: Set(user_model.goal),
        height_cm: Set(user_model.height_cm),
        weight_kg: Set(user_model.weight_kg),
        body_fat_percent: Set(user_model.body_fat_percent),
        timezone: Set(timezone),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    Ok(user_active_model.insert(db).await?)
}

pub async fn find_by_email(db: &impl ConnectionTrait, email: &str) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::Email.eq(email.trim().to_lowercase()))
        .one(db)
        .await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

/// Loads the user with `SELECT ... FOR UPDATE`. Inside a transaction this holds the row
/// lock until commit or rollback, serializing writers that lock the same user first.
pub async fn lock_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .lock_exclusive()
        .one(db)
        .await?
        .ok_or_else(|| Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        })
}

/// Finds all users whose ids are in `ids`, ordered by full name.
pub async fn find_by_ids(db: &impl ConnectionTrait, ids: Vec<Id>) -> Result<Vec<Model>, Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    Ok(Entity::find()
        .filter(Column::Id.is_in(ids))
        .order_by_asc(Column::FullName)
        .all(db)
        .await?)
}

/// Finds every user with `role`, optionally narrowed by a case-insensitive match on
/// full name or email.
pub async fn find_by_role(
    db: &impl ConnectionTrait,
    role: Role,
    search: Option<&str>,
) -> Result<Vec<Model>, Error> {
    let mut query = Entity::find().filter(Column::Role.eq(role));

    if let Some(condition) = search_condition(search) {
        query = query.filter(condition);
    }

    Ok(query.order_by_asc(Column::FullName).all(db).await?)
}

/// Builds a case-insensitive `LIKE` over full name and email. Blank terms match everything.
pub fn search_condition(search: Option<&str>) -> Option<Condition> {
    let term = search.map(str::trim).filter(|term| !term.is_empty())?;
    let pattern = format!("%{}%", term.to_lowercase());

    Some(
        Condition::any()
            .add(Expr::expr(Func::lower(Expr::col((Entity, Column::FullName)))).like(&pattern))
            .add(Expr::expr(Func::lower(Expr::col((Entity, Column::Email)))).like(&pattern)),
    )
}

/// Replaces a user's password after checking the current one.
pub async fn update_password(
    db: &impl ConnectionTrait,
    user_id: Id,
    current_password: &str,
    new_password: String,
) -> Result<Model, Error> {
    let user = find_by_id(db, user_id).await?;
    verify_password(current_password, &user.password).await?;

    let active_model = ActiveModel {
        id: Unchanged(user.id),
        password: Set(generate_hash(new_password)),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?)
}

pub async fn delete(db: &impl ConnectionTrait, user_id: Id) -> Result<(), Error> {
    Entity::delete_by_id(user_id).exec(db).await?;
    Ok(())
}

pub async fn verify_password(password_to_verify: &str, password_hash: &str) -> Result<(), Error> {
    match password_auth::verify_password(password_to_verify, password_hash) {
        Ok(_) => Ok(()),
        Err(_) => Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordUnauthenticated,
        }),
    }
}

pub fn generate_hash(password: String) -> String {
    password_auth::generate_hash(password)
}

async fn authenticate_user(creds: Credentials, user: Model) -> Result<Option<Model>, Error> {
    match password_auth::verify_password(creds.password, &user.password) {
        Ok(_) => Ok(Some(user)),
        Err(_) => Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordUnauthenticated,
        }),
    }
}

#[derive(Debug, Clone)]
pub struct Backend {
    db: Arc<DatabaseConnection>,
}

#[derive(Debug, Clone, ToSchema, IntoParams, Deserialize)]
#[schema(as = domain::user::Credentials)] // OpenAPI schema
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

impl Backend {
    pub fn new(db: &Arc<DatabaseConnection>) -> Self {
        Self {
            // Arc is cloned, but the source DatabaseConnection refers to the same instance
            // as the one passed in to new() (see the Arc documentation for more info)
            db: Arc::clone(db),
        }
    }
}

#[async_trait]
impl AuthnBackend for Backend {
    type User = Model;
    type Credentials = Credentials;
    type Error = Error;

    async fn authenticate(
        &self,
        creds: Self::Credentials,
    ) -> Result<Option<Self::User>, Self::Error> {
        match find_by_email(self.db.as_ref(), &creds.email).await? {
            Some(user) => authenticate_user(creds, user).await,
            None => Err(Error {
                source: None,
                error_kind: EntityApiErrorKind::RecordUnauthenticated,
            }),
        }
    }

    async fn get_user(&self, user_id: &UserId<Self>) -> Result<Option<Self::User>, Self::Error> {
        Ok(Entity::find_by_id(*user_id).one(self.db.as_ref()).await?)
    }
}

pub type AuthSession = axum_login::AuthSession<Backend>;

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod test {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn user_model(role: Role) -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            email: "ana@pocket.com".to_owned(),
            full_name: "Ana Souza".to_owned(),
            password: generate_hash("password".to_owned()),
            role,
            cpf: None,
            phone: None,
            birth_date: None,
            gender: None,
            goal: Some("Hipertrofia".to_owned()),
            height_cm: Some(165),
            weight_kg: Some(61.5),
            body_fat_percent: None,
            timezone: "America/Sao_Paulo".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn create_returns_the_inserted_user() -> Result<(), Error> {
        let user = user_model(Role::Student);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user.clone()]])
            .into_connection();

        let created = create(&db, user.clone()).await?;

        assert_eq!(created.id, user.id);
        assert_eq!(created.role, Role::Student);
        Ok(())
    }

    #[tokio::test]
    async fn find_by_id_returns_record_not_found_when_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Model>::new()])
            .into_connection();

        let result = find_by_id(&db, Id::new_v4()).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
    }

    #[tokio::test]
    async fn lock_by_id_selects_the_row_for_update() -> Result<(), Error> {
        let user = user_model(Role::Teacher);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user.clone()]])
            .into_connection();

        let locked = lock_by_id(&db, user.id).await?;

        assert_eq!(locked.id, user.id);
        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1);
        assert!(log[0].statements()[0].sql.ends_with("FOR UPDATE"));
        Ok(())
    }

    #[tokio::test]
    async fn find_by_ids_skips_the_query_for_no_ids() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let users = find_by_ids(&db, vec![]).await?;

        assert!(users.is_empty());
        assert!(db.into_transaction_log().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn update_password_rejects_a_wrong_current_password() {
        let user = user_model(Role::Teacher);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user.clone()]])
            .into_connection();

        let result = update_password(&db, user.id, "not-the-password", "new".to_owned()).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordUnauthenticated
        );
    }

    #[tokio::test]
    async fn verify_password_accepts_the_matching_password() -> Result<(), Error> {
        let hash = generate_hash("s3cret".to_owned());
        verify_password("s3cret", &hash).await
    }

    #[test]
    fn search_condition_ignores_blank_terms() {
        assert!(search_condition(None).is_none());
        assert!(search_condition(Some("   ")).is_none());
        assert!(search_condition(Some("ana")).is_some());
    }
}
