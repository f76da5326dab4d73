use uuid::Uuid;

pub mod appointment_status;
pub mod appointments;
pub mod daily_workouts;
pub mod gender;
pub mod request_status;
pub mod requester_role;
pub mod roles;
pub mod student_trainer_requests;
pub mod subscription_status;
pub mod subscriptions;
pub mod trainer_students;
pub mod users;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;
