use crate::protect::{
    authorize, Predicate, UserIsSelf, UserIsSelfOrTrainer, UserIsTeacher,
};
use crate::{extractors::authenticated_user::AuthenticatedUser, AppState};
use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::IntoResponse,
};
use domain::Id;

/// Users can read their own profile; trainers can also read their students' profiles.
pub(crate) async fn read(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(user_id): Path<Id>,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    let checks = vec![Predicate::new(UserIsSelfOrTrainer, vec![user_id])];
    authorize(&app_state, user, request, next, checks).await
}

/// Only the user addressed by `/users/{id}/...` may proceed.
pub(crate) async fn is_self(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(user_id): Path<Id>,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    let checks = vec![Predicate::new(UserIsSelf, vec![user_id])];
    authorize(&app_state, user, request, next, checks).await
}

/// The addressed user must be the authenticated user, and a teacher.
pub(crate) async fn is_self_teacher(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(user_id): Path<Id>,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    let checks = vec![
        Predicate::new(UserIsSelf, vec![user_id]),
        Predicate::new(UserIsTeacher, vec![]),
    ];
    authorize(&app_state, user, request, next, checks).await
}

/// Same as [`is_self_teacher`] for `/users/{id}/students/{student_id}` routes.
pub(crate) async fn is_self_teacher_with_student(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((user_id, _student_id)): Path<(Id, Id)>,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    let checks = vec![
        Predicate::new(UserIsSelf, vec![user_id]),
        Predicate::new(UserIsTeacher, vec![]),
    ];
    authorize(&app_state, user, request, next, checks).await
}

/// Routes without a user in the path that only teachers may use.
pub(crate) async fn is_teacher(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    let checks = vec![Predicate::new(UserIsTeacher, vec![])];
    authorize(&app_state, user, request, next, checks).await
}
