use axum::{routing::get, Json, Router};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::openapi::ApiDoc;
use crate::startup::AppState;

pub mod movies;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

/// Build the application router: health, the movie catalog and API docs.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let catalog = Router::new()
        .route("/movies", get(movies::list_movies).post(movies::create_movie))
        .route("/movies/filter", get(movies::filter_movies))
        .route(
            "/movies/:id",
            get(movies::get_movie).put(movies::update_movie).delete(movies::delete_movie),
        )
        .route("/movies/:id/reviews", get(movies::list_reviews).post(movies::create_review));

    Router::new()
        .route("/health", get(health))
        .merge(catalog)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
