pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::dreams::handlers as dream_handlers;
use crate::polish::handlers as polish_handlers;
use crate::state::AppState;
use crate::versions::handlers as version_handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Dream CRUD
        .route(
            "/api/v1/dreams",
            post(dream_handlers::handle_create_dream).get(dream_handlers::handle_list_dreams),
        )
        .route(
            "/api/v1/dreams/:id",
            get(dream_handlers::handle_get_dream)
                .patch(dream_handlers::handle_update_dream)
                .delete(dream_handlers::handle_delete_dream),
        )
        // Version Store
        .route(
            "/api/v1/dreams/:id/versions",
            get(version_handlers::handle_list_versions),
        )
        .route(
            "/api/v1/dreams/:id/versions/:version_id/switch",
            post(version_handlers::handle_switch_version),
        )
        .route(
            "/api/v1/versions/:id",
            get(version_handlers::handle_version_detail),
        )
        // Polish
        .route(
            "/api/v1/polish/dream/:id",
            post(polish_handlers::handle_polish_dream),
        )
        .route(
            "/api/v1/polish/text",
            post(polish_handlers::handle_polish_text),
        )
        .route(
            "/api/v1/polish/quota",
            get(polish_handlers::handle_get_quota),
        )
        .with_state(state)
}
