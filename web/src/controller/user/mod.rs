//! Endpoints nested under `/users/{id}`, all scoped to that user.
pub(crate) mod appointment_controller;
pub(crate) mod password_controller;
pub(crate) mod student_controller;
pub(crate) mod subscription_controller;
pub(crate) mod trainer_request_controller;
