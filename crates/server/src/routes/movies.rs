use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::IntoParams;

use common::utils::query::empty_as_none;

use service::catalog::domain::{MovieView, MovieWithReviewsView, ReviewView};
use service::pagination::{PaginatedResultSet, Pagination};
use service::response::{Lookup, ServiceResponse};

use crate::errors::{ErrorList, JsonApiError};
use crate::startup::AppState;

/// Date window plus paging. Empty values (`fromDate=`) count as missing so
/// the date check reports them instead of the extractor.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FilterQuery {
    /// RFC 3339, inclusive
    #[serde(default, deserialize_with = "empty_as_none")]
    pub from_date: Option<DateTime<Utc>>,
    /// RFC 3339, inclusive
    #[serde(default, deserialize_with = "empty_as_none")]
    pub to_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub per_page: Option<i64>,
}

/// Serve a mutation outcome: the value with `ok`, or the error list.
fn respond<T: Serialize>(outcome: ServiceResponse<T>, ok: StatusCode) -> Response {
    match outcome {
        ServiceResponse::ResponseOk(v) => (ok, Json(v)).into_response(),
        ServiceResponse::ResponseError(errors) => ErrorList(errors).into_response(),
    }
}

#[utoipa::path(
    get, path = "/movies", tag = "movies",
    params(
        ("page" = Option<i64>, Query, description = "1-based page, defaults to 1"),
        ("perPage" = Option<i64>, Query, description = "1..=100, defaults to 20")
    ),
    responses(
        (status = 200, description = "One page of movies ordered by title", body = crate::openapi::MoviePageDoc),
        (status = 500, description = "Store failure")
    )
)]
pub async fn list_movies(
    State(state): State<AppState>,
    Query(paging): Query<Pagination>,
) -> Result<Json<PaginatedResultSet<MovieView>>, JsonApiError> {
    let page = state.catalog.list_movies(paging).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get, path = "/movies/{id}", tag = "movies",
    params(("id" = i32, Path, description = "Movie id")),
    responses(
        (status = 200, description = "Found", body = crate::openapi::MovieDoc),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_movie(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<MovieView>, JsonApiError> {
    match state.catalog.get_movie(id).await? {
        Lookup::Found(m) => Ok(Json(m)),
        Lookup::NotFound => Err(JsonApiError::not_found(format!("movie {id} not found"))),
    }
}

#[utoipa::path(
    get, path = "/movies/{id}/reviews", tag = "movies",
    params(
        ("id" = i32, Path, description = "Movie id"),
        ("page" = Option<i64>, Query, description = "1-based page, defaults to 1"),
        ("perPage" = Option<i64>, Query, description = "1..=100, defaults to 20")
    ),
    responses(
        (status = 200, description = "The movie with all of its reviews", body = crate::openapi::MovieWithReviewsPageDoc),
        (status = 500, description = "Store failure")
    )
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(paging): Query<Pagination>,
) -> Result<Json<PaginatedResultSet<MovieWithReviewsView>>, JsonApiError> {
    let page = state.catalog.list_reviews_for_movie(id, paging).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get, path = "/movies/filter", tag = "movies",
    params(FilterQuery),
    responses(
        (status = 200, description = "Movies added in the range, newest release first", body = crate::openapi::MoviePageDoc),
        (status = 400, description = "Missing or unordered dates", body = [crate::openapi::EntityErrorDoc])
    )
)]
pub async fn filter_movies(State(state): State<AppState>, Query(q): Query<FilterQuery>) -> Result<Response, JsonApiError> {
    let paging = Pagination::new(q.page, q.per_page);
    let outcome = state.catalog.filter_movies_by_date_added(q.from_date, q.to_date, paging).await?;
    Ok(respond(outcome, StatusCode::OK))
}

#[utoipa::path(
    post, path = "/movies", tag = "movies",
    request_body = crate::openapi::MovieDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::MovieDoc),
        (status = 400, description = "Rejected by the store", body = [crate::openapi::EntityErrorDoc])
    )
)]
pub async fn create_movie(State(state): State<AppState>, Json(view): Json<MovieView>) -> Result<Response, JsonApiError> {
    let outcome = state.catalog.create_movie(&view).await?;
    Ok(respond(outcome, StatusCode::CREATED))
}

#[utoipa::path(
    post, path = "/movies/{id}/reviews", tag = "movies",
    params(("id" = i32, Path, description = "Movie id")),
    request_body = crate::openapi::ReviewDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::ReviewDoc),
        (status = 404, description = "Movie not found", body = [crate::openapi::EntityErrorDoc])
    )
)]
pub async fn create_review(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(view): Json<ReviewView>,
) -> Result<Response, JsonApiError> {
    let outcome = state.catalog.create_review(id, &view).await?;
    Ok(respond(outcome, StatusCode::CREATED))
}

#[utoipa::path(
    put, path = "/movies/{id}", tag = "movies",
    params(("id" = i32, Path, description = "Movie id")),
    request_body = crate::openapi::MovieDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::MovieDoc),
        (status = 404, description = "Movie not found", body = [crate::openapi::EntityErrorDoc])
    )
)]
pub async fn update_movie(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(view): Json<MovieView>,
) -> Result<Response, JsonApiError> {
    let outcome = state.catalog.update_movie(id, &view).await?;
    Ok(respond(outcome, StatusCode::OK))
}

#[utoipa::path(
    delete, path = "/movies/{id}", tag = "movies",
    params(("id" = i32, Path, description = "Movie id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Movie not found", body = [crate::openapi::EntityErrorDoc])
    )
)]
pub async fn delete_movie(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Response, JsonApiError> {
    match state.catalog.delete_movie(id).await? {
        ServiceResponse::ResponseOk(_) => {
            info!(movie_id = id, "delete served");
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        ServiceResponse::ResponseError(errors) => Ok(ErrorList(errors).into_response()),
    }
}
