use crate::{
    controller::health_check_controller, middleware::auth::require_auth, params, protect, AppState,
};
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::services::ServeDir;

use crate::controller::{
    appointment_controller, billing_controller, daily_workout_controller, plan_controller,
    student_controller, trainer_request_controller, user, user_controller,
    user_session_controller,
};

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Personal Pocket API"
        ),
        paths(
            appointment_controller::create,
            appointment_controller::index,
            appointment_controller::today,
            appointment_controller::read,
            appointment_controller::update,
            appointment_controller::update_status,
            appointment_controller::delete,
            billing_controller::preview,
            billing_controller::statement,
            daily_workout_controller::create,
            daily_workout_controller::index,
            daily_workout_controller::delete,
            plan_controller::index,
            student_controller::index,
            trainer_request_controller::create,
            trainer_request_controller::update,
            trainer_request_controller::delete,
            user_controller::create,
            user_controller::read,
            user_controller::update,
            user_session_controller::login,
            user_session_controller::delete,
            user::appointment_controller::index,
            user::password_controller::update_password,
            user::student_controller::index,
            user::student_controller::create,
            user::student_controller::delete,
            user::student_controller::available,
            user::student_controller::stats,
            user::student_controller::plan_usage,
            user::subscription_controller::read,
            user::subscription_controller::index,
            user::subscription_controller::update,
            user::subscription_controller::upgrade,
            user::subscription_controller::delete,
            user::trainer_request_controller::sent,
            user::trainer_request_controller::received,
            user::trainer_request_controller::pending,
        ),
        components(
            schemas(
                domain::appointments::Model,
                domain::daily_workouts::Model,
                domain::student_trainer_requests::Model,
                domain::subscriptions::Model,
                domain::users::Model,
                domain::appointment::AppointmentWithStudent,
                domain::appointment::DaySummary,
                domain::appointment::TodaySchedule,
                domain::billing::BillingPreview,
                domain::billing::BillingStatement,
                domain::plan::Plan,
                domain::roster::PlanUsage,
                domain::student_stats::StudentStatsEntry,
                domain::subscription::CurrentPlan,
                domain::trainer_request::RequestNotification,
                domain::user::Credentials,
                domain::user::PublicProfile,
                domain::workout::ParsedWorkout,
                params::billing::StatementParams,
                params::subscription::ChangePlanParams,
                params::trainer_request::CreateParams,
                params::user::CreateParams,
                params::user::UpdateParams,
                params::user::UpdatePasswordParams,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "personal_pocket", description = "Personal Pocket trainer and student API")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Defines our cookie session based authentication requirement for gaining access to our
// API endpoints for OpenAPI.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "id",
                    "Session id value returned from successful login via Set-Cookie header",
                ))),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(appointment_routes(app_state.clone()))
        .merge(billing_routes(app_state.clone()))
        .merge(daily_workout_routes(app_state.clone()))
        .merge(health_routes())
        .merge(plan_routes(app_state.clone()))
        .merge(student_routes(app_state.clone()))
        .merge(trainer_request_routes(app_state.clone()))
        .merge(registration_routes(app_state.clone()))
        .merge(user_routes(app_state.clone()))
        .merge(user_password_routes(app_state.clone()))
        .merge(user_appointment_routes(app_state.clone()))
        .merge(user_student_routes(app_state.clone()))
        .merge(user_subscription_routes(app_state.clone()))
        .merge(user_trainer_request_routes(app_state.clone()))
        .merge(user_session_routes(app_state.clone()))
        .merge(user_session_protected_routes(app_state.clone()))
        // **** FIXME: protect the OpenAPI web UI
        .merge(RapiDoc::with_openapi("/api-docs/openapi2.json", ApiDoc::openapi()).path("/rapidoc"))
        .fallback_service(static_files())
}

fn appointment_routes(app_state: AppState) -> Router {
    Router::new()
        // Teachers only: the domain layer rejects students and unlinked students
        .route("/appointments", post(appointment_controller::create))
        .merge(
            // GET /appointments and GET /appointments/today
            Router::new()
                .route("/appointments", get(appointment_controller::index))
                .route("/appointments/today", get(appointment_controller::today))
                .route_layer(from_fn_with_state(
                    app_state.clone(),
                    protect::users::is_teacher,
                )),
        )
        .merge(
            // GET /appointments/{id}
            Router::new()
                .route("/appointments/{id}", get(appointment_controller::read))
                .route_layer(from_fn_with_state(
                    app_state.clone(),
                    protect::appointments::read,
                )),
        )
        .merge(
            // PUT/DELETE /appointments/{id} and PUT /appointments/{id}/status
            Router::new()
                .route("/appointments/{id}", put(appointment_controller::update))
                .route("/appointments/{id}", delete(appointment_controller::delete))
                .route(
                    "/appointments/{id}/status",
                    put(appointment_controller::update_status),
                )
                .route_layer(from_fn_with_state(
                    app_state.clone(),
                    protect::appointments::owner,
                )),
        )
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn billing_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(
            // GET /billing/preview
            Router::new()
                .route("/billing/preview", get(billing_controller::preview))
                .route_layer(from_fn_with_state(
                    app_state.clone(),
                    protect::billing::preview,
                )),
        )
        .merge(
            // POST /billing/statements, the student link is checked against the body
            Router::new()
                .route("/billing/statements", post(billing_controller::statement))
                .route_layer(from_fn_with_state(
                    app_state.clone(),
                    protect::users::is_teacher,
                )),
        )
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn daily_workout_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/daily_workouts", post(daily_workout_controller::create))
        .merge(
            // GET /daily_workouts
            Router::new()
                .route("/daily_workouts", get(daily_workout_controller::index))
                .route_layer(from_fn_with_state(
                    app_state.clone(),
                    protect::daily_workouts::index,
                )),
        )
        .merge(
            // DELETE /daily_workouts/{id}
            Router::new()
                .route(
                    "/daily_workouts/{id}",
                    delete(daily_workout_controller::delete),
                )
                .route_layer(from_fn_with_state(
                    app_state.clone(),
                    protect::daily_workouts::delete,
                )),
        )
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn plan_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/plans", get(plan_controller::index))
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn student_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/students", get(student_controller::index))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            protect::users::is_teacher,
        ))
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn trainer_request_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/trainer_requests",
            post(trainer_request_controller::create),
        )
        .merge(
            // PUT /trainer_requests/{id}
            Router::new()
                .route(
                    "/trainer_requests/{id}",
                    put(trainer_request_controller::update),
                )
                .route_layer(from_fn_with_state(
                    app_state.clone(),
                    protect::trainer_requests::respond,
                )),
        )
        .merge(
            // DELETE /trainer_requests/{id}
            Router::new()
                .route(
                    "/trainer_requests/{id}",
                    delete(trainer_request_controller::delete),
                )
                .route_layer(from_fn_with_state(
                    app_state.clone(),
                    protect::trainer_requests::cancel,
                )),
        )
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

/// POST /users is how new accounts sign up, so it sits outside `require_auth`.
fn registration_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/users", post(user_controller::create))
        .with_state(app_state)
}

pub fn user_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(
            // GET /users/{id}
            Router::new()
                .route("/users/{id}", get(user_controller::read))
                .route_layer(from_fn_with_state(app_state.clone(), protect::users::read)),
        )
        .merge(
            // PUT /users/{id}
            Router::new()
                .route("/users/{id}", put(user_controller::update))
                .route_layer(from_fn_with_state(
                    app_state.clone(),
                    protect::users::is_self,
                )),
        )
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

pub fn user_password_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/users/{id}/password",
            put(user::password_controller::update_password),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            protect::users::is_self,
        ))
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn user_appointment_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/users/{id}/appointments",
            get(user::appointment_controller::index),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            protect::users::is_self,
        ))
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn user_student_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(
            Router::new()
                .route(
                    "/users/{id}/students",
                    get(user::student_controller::index).post(user::student_controller::create),
                )
                .route(
                    "/users/{id}/students/available",
                    get(user::student_controller::available),
                )
                .route(
                    "/users/{id}/students/stats",
                    get(user::student_controller::stats),
                )
                .route(
                    "/users/{id}/plan_usage",
                    get(user::student_controller::plan_usage),
                )
                .route_layer(from_fn_with_state(
                    app_state.clone(),
                    protect::users::is_self_teacher,
                )),
        )
        .merge(
            // DELETE /users/{id}/students/{student_id}
            Router::new()
                .route(
                    "/users/{id}/students/{student_id}",
                    delete(user::student_controller::delete),
                )
                .route_layer(from_fn_with_state(
                    app_state.clone(),
                    protect::users::is_self_teacher_with_student,
                )),
        )
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn user_subscription_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/users/{id}/subscription",
            get(user::subscription_controller::read)
                .put(user::subscription_controller::update)
                .delete(user::subscription_controller::delete),
        )
        .route(
            "/users/{id}/subscription/upgrade",
            post(user::subscription_controller::upgrade),
        )
        .route(
            "/users/{id}/subscriptions",
            get(user::subscription_controller::index),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            protect::users::is_self,
        ))
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn user_trainer_request_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/users/{id}/trainer_requests/sent",
            get(user::trainer_request_controller::sent),
        )
        .route(
            "/users/{id}/trainer_requests/received",
            get(user::trainer_request_controller::received),
        )
        .route(
            "/users/{id}/trainer_requests/pending",
            get(user::trainer_request_controller::pending),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            protect::users::is_self,
        ))
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

pub fn user_session_protected_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/delete", delete(user_session_controller::delete))
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

pub fn user_session_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/login", post(user_session_controller::login))
        .with_state(app_state)
}

// Serves static files for any path no route matched
fn static_files() -> ServeDir {
    ServeDir::new("./")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_the_scheduling_and_billing_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/appointments",
            "/appointments/today",
            "/appointments/{id}/status",
            "/billing/preview",
            "/billing/statements",
            "/users/{user_id}/plan_usage",
            "/users/{user_id}/subscription/upgrade",
            "/users/{user_id}/trainer_requests/pending",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn openapi_declares_cookie_auth() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components are generated");
        assert!(components.security_schemes.contains_key("cookie_auth"));
    }
}
