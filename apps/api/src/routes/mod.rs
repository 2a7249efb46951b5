pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::flow::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_render).delete(handlers::handle_end_session),
        )
        .route(
            "/api/v1/sessions/:id/candidate",
            post(handlers::handle_submit_candidate),
        )
        .route(
            "/api/v1/sessions/:id/answers/draft",
            put(handlers::handle_save_drafts),
        )
        .route(
            "/api/v1/sessions/:id/answers",
            post(handlers::handle_submit_answers),
        )
        .with_state(state)
}
