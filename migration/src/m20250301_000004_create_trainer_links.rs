use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let create_trainer_students_sql = r#"
            CREATE TABLE IF NOT EXISTS personal_pocket.trainer_students (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                trainer_id UUID NOT NULL
                    REFERENCES personal_pocket.users(id) ON DELETE CASCADE,
                student_id UUID NOT NULL
                    REFERENCES personal_pocket.users(id) ON DELETE CASCADE,
                created_by UUID NOT NULL
                    REFERENCES personal_pocket.users(id),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                CONSTRAINT trainer_students_pair_unique UNIQUE(trainer_id, student_id)
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_trainer_students_sql)
            .await?;

        manager
            .get_connection()
            .execute_unprepared("ALTER TABLE personal_pocket.trainer_students OWNER TO pocket")
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("trainer_students_student_id")
                    .table((Alias::new("personal_pocket"), Alias::new("trainer_students")))
                    .col(Alias::new("student_id"))
                    .to_owned(),
            )
            .await?;

        let create_requests_sql = r#"
            CREATE TABLE IF NOT EXISTS personal_pocket.student_trainer_requests (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                requester_id UUID NOT NULL
                    REFERENCES personal_pocket.users(id) ON DELETE CASCADE,
                target_id UUID NOT NULL
                    REFERENCES personal_pocket.users(id) ON DELETE CASCADE,
                requester_role personal_pocket.requester_role NOT NULL,
                status personal_pocket.request_status NOT NULL DEFAULT 'pending',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                CONSTRAINT student_trainer_requests_not_self CHECK (requester_id <> target_id)
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_requests_sql)
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "ALTER TABLE personal_pocket.student_trainer_requests OWNER TO pocket",
            )
            .await?;

        // One pending request per direction between two users
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS student_trainer_requests_one_pending
                    ON personal_pocket.student_trainer_requests (requester_id, target_id)
                    WHERE status = 'pending'",
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("student_trainer_requests_target_id_status")
                    .table((
                        Alias::new("personal_pocket"),
                        Alias::new("student_trainer_requests"),
                    ))
                    .col(Alias::new("target_id"))
                    .col(Alias::new("status"))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table((
                        Alias::new("personal_pocket"),
                        Alias::new("student_trainer_requests"),
                    ))
                    .if_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(
                Table::drop()
                    .table((Alias::new("personal_pocket"), Alias::new("trainer_students")))
                    .if_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
