//! This module re-exports various items from the `entity_api` crate.
//!
//! The purpose of this re-export is to ensure that consumers of the `domain` crate do not need to
//! directly depend on the `entity_api` crate. By re-exporting these items, we provide a clear and
//! consistent interface for working with query filters and update maps within the domain layer,
//! while the underlying implementation details remain in the `entity_api` crate.
pub use entity_api::{
    mutate::{IntoUpdateMap, UpdateMap},
    query::{FilterOnly, IntoQueryFilterMap, QueryFilterMap, QuerySort},
};

// Re-exports from `entity` crate via `entity_api`
pub use entity_api::{
    appointment_status, appointments, daily_workouts, gender, request_status, requester_role,
    roles, student_trainer_requests, subscription_status, subscriptions, trainer_students, users,
    Id,
};

pub mod appointment;
pub mod billing;
pub mod error;
pub mod plan;
pub mod roster;
pub mod student_stats;
pub mod subscription;
pub mod trainer_request;
pub mod user;
pub mod workout;
