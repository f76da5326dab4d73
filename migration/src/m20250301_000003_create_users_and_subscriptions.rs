use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let create_users_sql = r#"
            CREATE TABLE IF NOT EXISTS personal_pocket.users (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                email VARCHAR(255) NOT NULL,
                full_name VARCHAR(255) NOT NULL,
                password VARCHAR(255) NOT NULL,
                role personal_pocket.role NOT NULL DEFAULT 'student',
                cpf VARCHAR(14),
                phone VARCHAR(32),
                birth_date DATE,
                gender personal_pocket.gender,
                goal TEXT,
                height_cm INTEGER,
                weight_kg DOUBLE PRECISION,
                body_fat_percent DOUBLE PRECISION,
                timezone VARCHAR(50) NOT NULL DEFAULT 'UTC',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                CONSTRAINT users_email_unique UNIQUE(email)
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_users_sql)
            .await?;

        manager
            .get_connection()
            .execute_unprepared("ALTER TABLE personal_pocket.users OWNER TO pocket")
            .await?;

        // Student search filters by role before matching on name or email
        manager
            .create_index(
                Index::create()
                    .name("users_role")
                    .table((Alias::new("personal_pocket"), Alias::new("users")))
                    .col(Alias::new("role"))
                    .to_owned(),
            )
            .await?;

        // plan_type holds a plan catalog id ("free", "basic", "premium")
        let create_subscriptions_sql = r#"
            CREATE TABLE IF NOT EXISTS personal_pocket.subscriptions (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                user_id UUID NOT NULL
                    REFERENCES personal_pocket.users(id) ON DELETE CASCADE,
                plan_type VARCHAR(32) NOT NULL,
                status personal_pocket.subscription_status NOT NULL DEFAULT 'active',
                started_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                expires_at TIMESTAMPTZ,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_subscriptions_sql)
            .await?;

        manager
            .get_connection()
            .execute_unprepared("ALTER TABLE personal_pocket.subscriptions OWNER TO pocket")
            .await?;

        // At most one active subscription per user
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS subscriptions_one_active_per_user
                    ON personal_pocket.subscriptions (user_id)
                    WHERE status = 'active'",
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("subscriptions_user_id_started_at")
                    .table((Alias::new("personal_pocket"), Alias::new("subscriptions")))
                    .col(Alias::new("user_id"))
                    .col(Alias::new("started_at"))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table((Alias::new("personal_pocket"), Alias::new("subscriptions")))
                    .if_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(
                Table::drop()
                    .table((Alias::new("personal_pocket"), Alias::new("users")))
                    .if_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
