use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("CREATE SCHEMA IF NOT EXISTS personal_pocket;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("SET search_path TO personal_pocket, public;")
            .await?;

        // gen_random_uuid() for primary key defaults
        manager
            .get_connection()
            .execute_unprepared("CREATE EXTENSION IF NOT EXISTS pgcrypto;")
            .await?;

        // The base DB user that executes all application queries
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    GRANT ALL PRIVILEGES ON DATABASE personal_pocket TO pocket;
                    GRANT ALL ON SCHEMA personal_pocket TO pocket;

                    ALTER DEFAULT PRIVILEGES IN SCHEMA personal_pocket GRANT ALL ON TABLES TO pocket;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA personal_pocket GRANT ALL ON SEQUENCES TO pocket;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA personal_pocket GRANT ALL ON FUNCTIONS TO pocket;
                END $$;
            "#)
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    ALTER DEFAULT PRIVILEGES IN SCHEMA personal_pocket REVOKE ALL ON FUNCTIONS FROM pocket;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA personal_pocket REVOKE ALL ON SEQUENCES FROM pocket;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA personal_pocket REVOKE ALL ON TABLES FROM pocket;
                    REVOKE ALL ON SCHEMA personal_pocket FROM pocket;
                    REVOKE ALL PRIVILEGES ON DATABASE personal_pocket FROM pocket;
                END $$;
            "#)
            .await?;

        // CASCADE removes every table and type in the schema
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS personal_pocket CASCADE;")
            .await?;

        Ok(())
    }
}
