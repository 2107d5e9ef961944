pub mod health;
pub mod participation;
pub mod report;

use crate::AppState;
use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

pub fn create_router(state: AppState) -> Router {
    let session_routes = Router::new()
        .route(
            "/api/participations/finalize",
            put(participation::finalize),
        )
        .route(
            "/api/participations/:id/answers",
            patch(participation::update_answers),
        )
        .layer(axum::middleware::from_fn(
            crate::middleware::auth::require_session,
        ));

    Router::new()
        .route("/health", get(health::health))
        .route(
            "/api/participations",
            post(participation::orchestrate).get(participation::list_all),
        )
        .route(
            "/api/participations/search",
            get(participation::search),
        )
        .route(
            "/api/participations/state/:state",
            get(participation::list_by_state),
        )
        .route(
            "/api/participations/group/:group_id",
            get(participation::list_by_group),
        )
        .route(
            "/api/participations/:id",
            get(participation::get_participation).delete(participation::delete_participation),
        )
        .route(
            "/api/participations/:id/result",
            get(participation::get_result),
        )
        .route(
            "/api/participations/:id/records",
            get(participation::list_answer_records),
        )
        .route("/api/reports/pending", get(report::pending_users))
        .route("/api/reports/finished", get(report::finished_users))
        .merge(session_routes)
        .with_state(state)
}
