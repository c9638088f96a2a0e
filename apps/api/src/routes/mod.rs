pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::import::MAX_PDF_BYTES;
use crate::state::AppState;
use crate::{editor, import, shell};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Catalog (list view)
        .route("/api/v1/resumes", get(shell::handlers::list_resumes))
        .route(
            "/api/v1/resumes/:id",
            delete(shell::handlers::delete_resume),
        )
        .route("/api/v1/templates", get(shell::handlers::list_templates))
        // Session lifecycle (editor view)
        .route(
            "/api/v1/session",
            post(shell::handlers::create_session)
                .get(shell::handlers::get_session)
                .put(editor::handlers::update_session)
                .delete(shell::handlers::close_session),
        )
        .route(
            "/api/v1/session/open/:id",
            post(shell::handlers::open_session),
        )
        .route("/api/v1/session/save", post(shell::handlers::save_session))
        // Editing and enrichment
        .route("/api/v1/session/import", post(import::handlers::import))
        .route("/api/v1/session/rewrite", post(editor::handlers::rewrite))
        .route(
            "/api/v1/session/skills/suggest",
            post(editor::handlers::suggest_skills),
        )
        // Rendering
        .route("/api/v1/session/preview", get(shell::handlers::preview))
        .route("/api/v1/session/export", get(shell::handlers::export))
        // Axum's default body cap is below the PDF limit; leave headroom for
        // multipart framing.
        .layer(DefaultBodyLimit::max(MAX_PDF_BYTES + 64 * 1024))
        .with_state(state)
}
