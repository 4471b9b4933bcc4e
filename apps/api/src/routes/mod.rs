pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::documents::handlers as documents;
use crate::generation::handlers as generate;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Generation API
        .route(
            "/api/v1/generate/resume",
            post(generate::handle_generate_resume),
        )
        .route(
            "/api/v1/generate/letter",
            post(generate::handle_generate_letter),
        )
        .route(
            "/api/v1/generate/presentation/outline",
            post(generate::handle_generate_outline),
        )
        .route(
            "/api/v1/generate/presentation",
            post(generate::handle_generate_presentation),
        )
        .route(
            "/api/v1/generate/ats-score",
            post(generate::handle_generate_ats_score),
        )
        .route(
            "/api/v1/generate/ats-score/upload",
            post(generate::handle_upload_ats_score)
                .layer(DefaultBodyLimit::max(generate::MAX_UPLOAD_BYTES)),
        )
        .route(
            "/api/v1/generate/diagram",
            post(generate::handle_generate_diagram),
        )
        // Documents API
        .route("/api/v1/documents", get(documents::handle_list_documents))
        .route("/api/v1/documents/:id", get(documents::handle_get_document))
        .with_state(state)
}
