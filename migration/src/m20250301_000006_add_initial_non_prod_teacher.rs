use chrono::Utc;
use entity::users::{ActiveModel, Column, Entity, Role};
use password_auth::generate_hash;
use sea_orm_migration::sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, Set};
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ModelTrait, QueryFilter};
use service::config::RustEnv;
use std::env;
use std::str::FromStr;

const INITIAL_TEACHER_EMAIL: &str = "trainer@pocket.local";

#[derive(DeriveMigrationName)]
pub struct Migration;

fn runtime_env() -> RustEnv {
    env::var("RUST_ENV")
        .ok()
        .and_then(|value| RustEnv::from_str(&value).ok())
        .unwrap_or(RustEnv::Development)
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        match runtime_env() {
            RustEnv::Development | RustEnv::Staging => insert_initial_teacher(manager).await,
            // Production accounts are created through registration
            RustEnv::Production => Ok(()),
        }
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        match runtime_env() {
            RustEnv::Development | RustEnv::Staging => delete_initial_teacher(manager).await,
            RustEnv::Production => Ok(()),
        }
    }
}

async fn insert_initial_teacher(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    let db = manager.get_connection();
    let now = Utc::now();

    ActiveModel {
        email: Set(INITIAL_TEACHER_EMAIL.to_owned()),
        full_name: Set("Pocket Trainer".to_owned()),
        password: Set(generate_hash("password")),
        role: Set(Role::Teacher),
        timezone: Set("America/Sao_Paulo".to_owned()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(())
}

async fn delete_initial_teacher(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    let db = manager.get_connection();

    if let Some(user) = Entity::find()
        .filter(Column::Email.eq(INITIAL_TEACHER_EMAIL))
        .one(db)
        .await?
    {
        user.delete(db).await?;
    }

    Ok(())
}
