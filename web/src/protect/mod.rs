//! Authorization guards, run as route middleware after authentication.
//!
//! Each submodule guards one resource. Simple rules are expressed as [`Predicate`]s
//! evaluated by [`authorize`]; rules that need the resource itself load it first and
//! answer 404 when it does not exist.

pub(crate) mod appointments;
pub(crate) mod billing;
pub(crate) mod daily_workouts;
pub(crate) mod trainer_requests;
pub(crate) mod users;

use crate::AppState;
use async_trait::async_trait;
use axum::{extract::Request, http::StatusCode, middleware::Next, response::IntoResponse};
use domain::{roster, Id};
use log::*;

/// Trait representing a single authorization rule.
///
/// Implementors answer **"is the authenticated user allowed to proceed?"**.
/// The rule receives:
/// * shared application state (`AppState`)
/// * the authenticated [`domain::users::Model`]
/// * any additional [`Id`] parameters supplied by the caller.
#[async_trait]
pub trait Check: Send + Sync {
    async fn eval(&self, app: &AppState, user: &domain::users::Model, args: Vec<Id>) -> bool;
}

/// Pairs a [`Check`] implementation with the concrete arguments that the rule
/// should receive when evaluated.
/// ```rust,ignore
/// let checks = vec![
///     Predicate::new(UserIsSelf, vec![user_id]),
///     Predicate::new(UserIsTeacher, vec![]),
/// ];
/// ```
pub(crate) struct Predicate {
    predicate: Box<dyn Check>,
    args: Vec<Id>,
}

impl Predicate {
    pub(crate) fn new<C: Check + 'static>(predicate: C, args: Vec<Id>) -> Self {
        Self {
            predicate: Box::new(predicate),
            args,
        }
    }

    pub(crate) async fn check(&self, app_state: &AppState, user: &domain::users::Model) -> bool {
        self.predicate
            .eval(app_state, user, self.args.clone())
            .await
    }
}

/// Axum middleware body that enforces one or more [`Predicate`]s in order.
/// The first rule that fails aborts the request with **403 FORBIDDEN**.
pub(crate) async fn authorize(
    app_state: &AppState,
    authenticated_user: domain::users::Model,
    request: Request,
    next: Next,
    checks: Vec<Predicate>,
) -> impl IntoResponse {
    for check in checks {
        if !check.check(app_state, &authenticated_user).await {
            return (StatusCode::FORBIDDEN, "FORBIDDEN").into_response();
        }
    }
    next.run(request).await
}

/// The user addressed by `args[0]` is the authenticated user.
pub struct UserIsSelf;

#[async_trait]
impl Check for UserIsSelf {
    async fn eval(
        &self,
        _app_state: &AppState,
        authenticated_user: &domain::users::Model,
        args: Vec<Id>,
    ) -> bool {
        args.first() == Some(&authenticated_user.id)
    }
}

pub struct UserIsTeacher;

#[async_trait]
impl Check for UserIsTeacher {
    async fn eval(
        &self,
        _app_state: &AppState,
        authenticated_user: &domain::users::Model,
        _args: Vec<Id>,
    ) -> bool {
        authenticated_user.is_teacher()
    }
}

/// The authenticated user is linked as trainer to the student `args[0]`.
pub struct UserTrainsStudent;

#[async_trait]
impl Check for UserTrainsStudent {
    async fn eval(
        &self,
        app_state: &AppState,
        authenticated_user: &domain::users::Model,
        args: Vec<Id>,
    ) -> bool {
        let Some(&student_id) = args.first() else {
            return false;
        };
        match roster::is_linked(app_state.db_conn_ref(), authenticated_user.id, student_id).await {
            Ok(linked) => linked,
            Err(e) => {
                error!("Could not check link to student {student_id}: {e:?}");
                false
            }
        }
    }
}

/// Either the authenticated user is `args[0]`, or trains them.
pub struct UserIsSelfOrTrainer;

#[async_trait]
impl Check for UserIsSelfOrTrainer {
    async fn eval(
        &self,
        app_state: &AppState,
        authenticated_user: &domain::users::Model,
        args: Vec<Id>,
    ) -> bool {
        UserIsSelf
            .eval(app_state, authenticated_user, args.clone())
            .await
            || UserTrainsStudent
                .eval(app_state, authenticated_user, args)
                .await
    }
}
