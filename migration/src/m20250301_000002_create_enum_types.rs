use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Postgres enum types backing the entity `DeriveActiveEnum`s, as (name, values).
const ENUM_TYPES: &[(&str, &[&str])] = &[
    ("role", &["teacher", "student"]),
    ("gender", &["male", "female", "other"]),
    (
        "appointment_status",
        &["scheduled", "completed", "cancelled", "missed"],
    ),
    ("request_status", &["pending", "accepted", "rejected"]),
    ("requester_role", &["student", "trainer"]),
    ("subscription_status", &["active", "cancelled", "expired"]),
];

fn create_type_sql(name: &str, values: &[&str]) -> String {
    let values = values
        .iter()
        .map(|value| format!("'{value}'"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TYPE personal_pocket.{name} AS ENUM ({values})")
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        for (name, values) in ENUM_TYPES {
            db.execute_unprepared(&create_type_sql(name, values))
                .await?;
            db.execute_unprepared(&format!("ALTER TYPE personal_pocket.{name} OWNER TO pocket"))
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        for (name, _) in ENUM_TYPES.iter().rev() {
            db.execute_unprepared(&format!("DROP TYPE IF EXISTS personal_pocket.{name}"))
                .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_type_sql_quotes_every_value() {
        assert_eq!(
            create_type_sql("role", &["teacher", "student"]),
            "CREATE TYPE personal_pocket.role AS ENUM ('teacher', 'student')"
        );
    }
}
