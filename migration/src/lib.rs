pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_schema_and_base_db_setup;
mod m20250301_000002_create_enum_types;
mod m20250301_000003_create_users_and_subscriptions;
mod m20250301_000004_create_trainer_links;
mod m20250301_000005_create_appointments_and_daily_workouts;
mod m20250301_000006_add_initial_non_prod_teacher;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_schema_and_base_db_setup::Migration),
            Box::new(m20250301_000002_create_enum_types::Migration),
            Box::new(m20250301_000003_create_users_and_subscriptions::Migration),
            Box::new(m20250301_000004_create_trainer_links::Migration),
            Box::new(m20250301_000005_create_appointments_and_daily_workouts::Migration),
            Box::new(m20250301_000006_add_initial_non_prod_teacher::Migration),
        ]
    }
}
