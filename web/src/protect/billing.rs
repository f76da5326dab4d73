use crate::params::billing::PreviewParams;
use crate::protect::{authorize, Predicate, UserIsTeacher, UserTrainsStudent};
use crate::{extractors::authenticated_user::AuthenticatedUser, AppState};
use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::IntoResponse,
};

/// Only a teacher linked to the student may preview their bill.
pub(crate) async fn preview(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(params): Query<PreviewParams>,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    let checks = vec![
        Predicate::new(UserIsTeacher, vec![]),
        Predicate::new(UserTrainsStudent, vec![params.student_id]),
    ];
    authorize(&app_state, user, request, next, checks).await
}
