use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let create_appointments_sql = r#"
            CREATE TABLE IF NOT EXISTS personal_pocket.appointments (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                teacher_id UUID NOT NULL
                    REFERENCES personal_pocket.users(id) ON DELETE CASCADE,
                student_id UUID NOT NULL
                    REFERENCES personal_pocket.users(id) ON DELETE CASCADE,
                date DATE NOT NULL,
                time TIME,
                status personal_pocket.appointment_status NOT NULL DEFAULT 'scheduled',
                notes TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_appointments_sql)
            .await?;

        manager
            .get_connection()
            .execute_unprepared("ALTER TABLE personal_pocket.appointments OWNER TO pocket")
            .await?;

        // Schedules, billing periods and monthly stats all scan by owner and date
        manager
            .create_index(
                Index::create()
                    .name("appointments_teacher_id_date")
                    .table((Alias::new("personal_pocket"), Alias::new("appointments")))
                    .col(Alias::new("teacher_id"))
                    .col(Alias::new("date"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("appointments_student_id_date")
                    .table((Alias::new("personal_pocket"), Alias::new("appointments")))
                    .col(Alias::new("student_id"))
                    .col(Alias::new("date"))
                    .to_owned(),
            )
            .await?;

        let create_daily_workouts_sql = r#"
            CREATE TABLE IF NOT EXISTS personal_pocket.daily_workouts (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                student_id UUID NOT NULL
                    REFERENCES personal_pocket.users(id) ON DELETE CASCADE,
                teacher_id UUID NOT NULL
                    REFERENCES personal_pocket.users(id) ON DELETE CASCADE,
                date DATE NOT NULL,
                workout JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_daily_workouts_sql)
            .await?;

        manager
            .get_connection()
            .execute_unprepared("ALTER TABLE personal_pocket.daily_workouts OWNER TO pocket")
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("daily_workouts_student_id_date")
                    .table((Alias::new("personal_pocket"), Alias::new("daily_workouts")))
                    .col(Alias::new("student_id"))
                    .col(Alias::new("date"))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table((Alias::new("personal_pocket"), Alias::new("daily_workouts")))
                    .if_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(
                Table::drop()
                    .table((Alias::new("personal_pocket"), Alias::new("appointments")))
                    .if_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
