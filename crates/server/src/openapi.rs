use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String, pub version: String }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovieDoc {
    /// Ignored on create
    pub id: i32,
    pub title: String,
    pub year_of_release: i32,
    /// Optional: a create stamps the current time, an update keeps the stored date
    pub date_added: Option<DateTime<Utc>>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDoc { pub id: i32, pub content: String, pub movie_id: i32 }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovieWithReviewsDoc {
    pub id: i32,
    pub title: String,
    pub year_of_release: i32,
    pub date_added: DateTime<Utc>,
    pub reviews: Vec<ReviewDoc>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoviePageDoc {
    pub items: Vec<MovieDoc>,
    pub current_page: u64,
    /// Grand total of movies
    pub total_count: u64,
    pub page_size: u64,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovieWithReviewsPageDoc {
    pub items: Vec<MovieWithReviewsDoc>,
    pub current_page: u64,
    pub total_count: u64,
    pub page_size: u64,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntityErrorDoc {
    /// Empty for validation errors
    pub error_type: String,
    pub message: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::movies::list_movies,
        crate::routes::movies::get_movie,
        crate::routes::movies::list_reviews,
        crate::routes::movies::filter_movies,
        crate::routes::movies::create_movie,
        crate::routes::movies::create_review,
        crate::routes::movies::update_movie,
        crate::routes::movies::delete_movie,
    ),
    components(
        schemas(
            HealthResponse,
            MovieDoc,
            ReviewDoc,
            MovieWithReviewsDoc,
            MoviePageDoc,
            MovieWithReviewsPageDoc,
            EntityErrorDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "movies")
    )
)]
pub struct ApiDoc;
