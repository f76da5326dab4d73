use crate::params::daily_workout::IndexParams;
use crate::protect::{authorize, Predicate, UserIsSelfOrTrainer};
use crate::{extractors::authenticated_user::AuthenticatedUser, AppState};
use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::IntoResponse,
};
use domain::{workout, Id};
use log::*;

/// Students see their own workouts; trainers see the workouts of their students.
pub(crate) async fn index(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(params): Query<IndexParams>,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    let checks = vec![Predicate::new(UserIsSelfOrTrainer, vec![params.student_id])];
    authorize(&app_state, user, request, next, checks).await
}

/// Only the teacher who prescribed a workout may delete it.
pub(crate) async fn delete(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(daily_workout_id): Path<Id>,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    match workout::find_by_id(app_state.db_conn_ref(), daily_workout_id).await {
        Ok(daily_workout) if daily_workout.teacher_id == user.id => next.run(request).await,
        Ok(_) => (StatusCode::FORBIDDEN, "FORBIDDEN").into_response(),
        Err(e) => {
            debug!("Daily workout {daily_workout_id} not found: {e:?}");
            (StatusCode::NOT_FOUND, "NOT FOUND").into_response()
        }
    }
}
