pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::generation::handlers as generation;
use crate::session::handlers as sessions;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Generation API
        .route("/api/v1/tasks", get(generation::handle_list_tasks))
        .route(
            "/api/v1/generate/:task_id",
            post(generation::handle_generate),
        )
        // Session API (page view-model)
        .route("/api/v1/sessions", post(sessions::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(sessions::handle_get_session).delete(sessions::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/params",
            put(sessions::handle_update_params),
        )
        .route("/api/v1/sessions/:id/submit", post(sessions::handle_submit))
        .route(
            "/api/v1/sessions/:id/regenerate",
            post(sessions::handle_regenerate),
        )
        .route("/api/v1/sessions/:id/reset", post(sessions::handle_reset))
        .with_state(state)
}
