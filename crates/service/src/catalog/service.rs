use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::errors::{EntityError, ServiceError};
use crate::pagination::{PaginatedResultSet, Pagination};
use crate::response::{Lookup, ServiceResponse};

use super::domain::{DateRange, Movie, MovieOrder, MovieQuery, MovieView, MovieWithReviewsView, Review, ReviewView};
use super::errors::StoreError;
use super::mapper::{FieldMapper, Mapper};
use super::repository::MovieStore;

/// Business operations on movies and their reviews.
///
/// Listings normalize their pagination parameters before querying and
/// report the grand total of movies as `total_count`, filters included.
/// Mutations commit once; a rejected commit comes back as a one-entry
/// error list, while an unreachable store is returned as `Err`.
pub struct MovieCatalogService<R: MovieStore + ?Sized, M: Mapper = FieldMapper> {
    store: Arc<R>,
    mapper: M,
}

impl<R: MovieStore + ?Sized> MovieCatalogService<R> {
    /// Service using the field-by-field mapper.
    pub fn with_store(store: Arc<R>) -> Self { Self::new(store, FieldMapper) }
}

impl<R: MovieStore + ?Sized, M: Mapper> MovieCatalogService<R, M> {
    pub fn new(store: Arc<R>, mapper: M) -> Self { Self { store, mapper } }

    pub fn mapper(&self) -> &M { &self.mapper }

    /// One page of movies ordered by title.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::catalog::{MovieCatalogService, repository::mock::MockMovieStore};
    /// use service::pagination::Pagination;
    /// let svc = MovieCatalogService::with_store(Arc::new(MockMovieStore::default()));
    /// let page = tokio_test::block_on(svc.list_movies(Pagination::new(None, Some(500)))).unwrap();
    /// assert_eq!(page.current_page, 1);
    /// assert_eq!(page.page_size, 20);
    /// assert!(page.items.is_empty());
    /// ```
    #[instrument(skip(self))]
    pub async fn list_movies(&self, paging: Pagination) -> Result<PaginatedResultSet<MovieView>, ServiceError> {
        let window = paging.normalize();
        debug!(page = window.page, per_page = window.per_page, "pagination normalized");
        let movies = self.store.find_movies(&MovieQuery::page(window, MovieOrder::TitleAsc)).await?;
        let total = self.store.count_movies().await?;
        let items = movies.iter().map(|m| self.mapper.movie_to_view(m)).collect();
        Ok(PaginatedResultSet::new(items, window, total))
    }

    #[instrument(skip(self))]
    pub async fn get_movie(&self, id: i32) -> Result<Lookup<MovieView>, ServiceError> {
        let found = self.store.find_movie(id, false).await?;
        Ok(Lookup::from(found).map(|m| self.mapper.movie_to_view(&m)))
    }

    /// The movie `id` with its full review list, wrapped as a page.
    ///
    /// The window applies to the single matching movie row; reviews are
    /// never paged.
    #[instrument(skip(self))]
    pub async fn list_reviews_for_movie(
        &self,
        id: i32,
        paging: Pagination,
    ) -> Result<PaginatedResultSet<MovieWithReviewsView>, ServiceError> {
        let window = paging.normalize();
        let query = MovieQuery::page(window, MovieOrder::TitleAsc).with_id(id).including_reviews();
        let movies = self.store.find_movies(&query).await?;
        let total = self.store.count_movies().await?;
        let items = movies.iter().map(|m| self.mapper.movie_with_reviews_to_view(m)).collect();
        Ok(PaginatedResultSet::new(items, window, total))
    }

    /// Movies added within `[from, to]`, newest release year first.
    ///
    /// Both bounds are checked before the store is touched.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::catalog::{MovieCatalogService, repository::mock::MockMovieStore};
    /// use service::pagination::Pagination;
    /// let store = Arc::new(MockMovieStore::default());
    /// let svc = MovieCatalogService::with_store(store.clone());
    /// let res = tokio_test::block_on(svc.filter_movies_by_date_added(None, Some(chrono::Utc::now()), Pagination::default())).unwrap();
    /// assert_eq!(res.error().unwrap()[0].message, "Both dates are required");
    /// assert_eq!(store.query_count(), 0);
    /// ```
    #[instrument(skip(self))]
    pub async fn filter_movies_by_date_added(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        paging: Pagination,
    ) -> Result<ServiceResponse<PaginatedResultSet<MovieView>>, ServiceError> {
        let range = match DateRange::validated(from, to) {
            Ok(range) => range,
            Err(e) => {
                debug!(reason = %e.message, "date filter rejected");
                return Ok(ServiceResponse::failure(e));
            }
        };
        let window = paging.normalize();
        let query = MovieQuery::page(window, MovieOrder::YearOfReleaseDesc).within(range);
        let movies = self.store.find_movies(&query).await?;
        let total = self.store.count_movies().await?;
        let items = movies.iter().map(|m| self.mapper.movie_to_view(m)).collect();
        Ok(ServiceResponse::ResponseOk(PaginatedResultSet::new(items, window, total)))
    }

    #[instrument(skip(self, view), fields(title = %view.title))]
    pub async fn create_movie(&self, view: &MovieView) -> Result<ServiceResponse<Movie>, ServiceError> {
        let entity = self.mapper.movie_to_entity(view);
        let outcome = committed(self.store.add_movie(entity).await)?;
        if let ServiceResponse::ResponseOk(m) = &outcome {
            info!(movie_id = m.id, "movie_created");
        }
        Ok(outcome)
    }

    #[instrument(skip(self, view))]
    pub async fn create_review(&self, movie_id: i32, view: &ReviewView) -> Result<ServiceResponse<Review>, ServiceError> {
        let Some(movie) = self.store.find_movie(movie_id, true).await? else {
            warn!("review target missing");
            return Ok(ServiceResponse::failure(EntityError::movie_not_found(movie_id)));
        };
        let review = Review { movie_id: movie.id, ..self.mapper.review_to_entity(view) };
        let outcome = committed(self.store.add_review(movie.id, review).await)?;
        if let ServiceResponse::ResponseOk(r) = &outcome {
            info!(review_id = r.id, review_count = movie.reviews.len() + 1, "review_added");
        }
        Ok(outcome)
    }

    /// Merge `view` onto the stored movie `id` and save it. A view without
    /// `date_added` leaves the stored date alone.
    #[instrument(skip(self, view))]
    pub async fn update_movie(&self, id: i32, view: &MovieView) -> Result<ServiceResponse<Movie>, ServiceError> {
        let Some(mut existing) = self.store.find_movie(id, true).await? else {
            warn!("update target missing");
            return Ok(ServiceResponse::failure(EntityError::movie_not_found(id)));
        };
        existing.apply(self.mapper.movie_to_entity(view), view.date_added.is_some());
        let outcome = committed(self.store.save_movie(&existing).await)?;
        if outcome.is_ok() {
            info!("movie_updated");
        }
        Ok(outcome)
    }

    #[instrument(skip(self))]
    pub async fn delete_movie(&self, id: i32) -> Result<ServiceResponse<bool>, ServiceError> {
        if !self.store.movie_exists(id).await? {
            warn!("delete target missing");
            return Ok(ServiceResponse::failure(EntityError::movie_not_found(id)));
        }
        match committed(self.store.remove_movie(id).await)? {
            // removed by someone else between the check and the commit
            ServiceResponse::ResponseOk(false) => Ok(ServiceResponse::failure(EntityError::movie_not_found(id))),
            outcome => {
                if outcome.is_ok() {
                    info!("movie_deleted");
                }
                Ok(outcome)
            }
        }
    }

    pub async fn movie_exists(&self, id: i32) -> Result<bool, ServiceError> {
        Ok(self.store.movie_exists(id).await?)
    }
}

/// Report a rejected commit to the caller; anything else is fatal.
fn committed<T>(result: Result<T, StoreError>) -> Result<ServiceResponse<T>, ServiceError> {
    match result {
        Ok(value) => Ok(ServiceResponse::ResponseOk(value)),
        Err(StoreError::Commit { kind, message }) => {
            warn!(%kind, %message, "commit_failed");
            Ok(ServiceResponse::failure(EntityError::new(kind, message)))
        }
        Err(other) => Err(other.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::domain::{DATES_OUT_OF_ORDER, DATES_REQUIRED};
    use crate::catalog::repository::mock::MockMovieStore;
    use chrono::{Duration, TimeZone};

    fn day(d: u32) -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 5, d, 9, 0, 0).unwrap() }

    fn movie(id: i32, title: &str, year: i32, added: u32) -> Movie {
        Movie { id, title: title.into(), year_of_release: year, date_added: day(added), reviews: vec![] }
    }

    fn review(id: i32, content: &str) -> Review {
        Review { id, content: content.into(), movie_id: 0 }
    }

    fn seeded() -> (Arc<MockMovieStore>, MovieCatalogService<MockMovieStore>) {
        let mut alien = movie(1, "Alien", 1979, 1);
        alien.reviews = vec![review(1, "tense"), review(2, "iconic")];
        let store = Arc::new(MockMovieStore::with_movies([
            alien,
            movie(2, "Heat", 1995, 3),
            movie(3, "Brazil", 1985, 5),
            movie(4, "Ran", 1985, 7),
            movie(5, "Clue", 1985, 9),
        ]));
        (store.clone(), MovieCatalogService::with_store(store))
    }

    fn many(n: i32) -> (Arc<MockMovieStore>, MovieCatalogService<MockMovieStore>) {
        let store = Arc::new(MockMovieStore::with_movies((1..=n).map(|i| movie(i, &format!("Movie {i:03}"), 2000, 1))));
        (store.clone(), MovieCatalogService::with_store(store))
    }

    #[tokio::test]
    async fn list_movies_orders_by_title() {
        let (_, svc) = seeded();
        let page = svc.list_movies(Pagination::default()).await.unwrap();
        let titles: Vec<_> = page.items.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, ["Alien", "Brazil", "Clue", "Heat", "Ran"]);
        assert_eq!(page.total_count, 5);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.page_size, 20);
    }

    #[tokio::test]
    async fn list_movies_window_sizes() {
        let (_, svc) = many(45);
        for (page, per_page, expected) in [(1, 20, 20), (2, 20, 20), (3, 20, 5), (4, 20, 0), (1, 100, 45), (45, 1, 1), (46, 1, 0)] {
            let set = svc.list_movies(Pagination::new(Some(page), Some(per_page))).await.unwrap();
            assert_eq!(set.items.len(), expected, "page {page} per_page {per_page}");
            assert!(set.items.len() as u64 <= set.page_size);
            assert_eq!(set.total_count, 45);
        }
        let third = svc.list_movies(Pagination::new(Some(3), Some(20))).await.unwrap();
        assert_eq!(third.items[0].title, "Movie 041");
        assert_eq!(third.total_pages(), 3);
    }

    #[tokio::test]
    async fn list_movies_substitutes_defaults() {
        let (_, svc) = many(30);
        let set = svc.list_movies(Pagination::new(Some(0), Some(101))).await.unwrap();
        assert_eq!((set.current_page, set.page_size, set.items.len()), (1, 20, 20));
        let set = svc.list_movies(Pagination::new(None, None)).await.unwrap();
        assert_eq!((set.current_page, set.page_size), (1, 20));
        assert_eq!(set.items[0].title, "Movie 001");
    }

    #[tokio::test]
    async fn list_movies_propagates_unreachable_store() {
        let (store, svc) = seeded();
        store.set_offline(true);
        let err = svc.list_movies(Pagination::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));
    }

    #[tokio::test]
    async fn get_movie_found_and_not_found() {
        let (_, svc) = seeded();
        let found = svc.get_movie(2).await.unwrap();
        assert_eq!(found.into_option().map(|m| m.title), Some("Heat".to_string()));
        assert_eq!(svc.get_movie(999).await.unwrap(), Lookup::NotFound);
    }

    #[tokio::test]
    async fn reviews_for_movie_include_every_review() {
        let (_, svc) = seeded();
        let set = svc.list_reviews_for_movie(1, Pagination::new(Some(1), Some(1))).await.unwrap();
        assert_eq!(set.items.len(), 1);
        let contents: Vec<_> = set.items[0].reviews.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, ["tense", "iconic"]);
        // grand total, not the single filtered row
        assert_eq!(set.total_count, 5);
    }

    #[tokio::test]
    async fn reviews_for_missing_movie_is_an_empty_page() {
        let (_, svc) = seeded();
        let set = svc.list_reviews_for_movie(42, Pagination::default()).await.unwrap();
        assert!(set.items.is_empty());
        let set = svc.list_reviews_for_movie(1, Pagination::new(Some(2), None)).await.unwrap();
        assert!(set.items.is_empty());
    }

    #[tokio::test]
    async fn filter_requires_both_dates_without_querying() {
        let (store, svc) = seeded();
        for (from, to) in [(None, Some(day(2))), (Some(day(2)), None), (None, None)] {
            let res = svc.filter_movies_by_date_added(from, to, Pagination::default()).await.unwrap();
            let errors = res.error().unwrap();
            assert_eq!(errors, vec![EntityError::new("", DATES_REQUIRED)]);
        }
        assert_eq!(store.query_count(), 0);
    }

    #[tokio::test]
    async fn filter_rejects_unordered_dates() {
        let (store, svc) = seeded();
        for (from, to) in [(day(5), day(5)), (day(6), day(5))] {
            let res = svc.filter_movies_by_date_added(Some(from), Some(to), Pagination::default()).await.unwrap();
            assert_eq!(res.error().unwrap()[0].message, DATES_OUT_OF_ORDER);
        }
        assert_eq!(store.query_count(), 0);
    }

    #[tokio::test]
    async fn filter_is_inclusive_and_ordered_by_year_desc() {
        let (_, svc) = seeded();
        let set = svc
            .filter_movies_by_date_added(Some(day(3)), Some(day(7)), Pagination::default())
            .await
            .unwrap()
            .ok()
            .unwrap();
        let got: Vec<_> = set.items.iter().map(|m| (m.title.as_str(), m.year_of_release)).collect();
        assert_eq!(got, [("Heat", 1995), ("Brazil", 1985), ("Ran", 1985)]);
        assert_eq!(set.total_count, 5);
        for m in &set.items {
            assert!(m.date_added.is_some_and(|d| d >= day(3) && d <= day(7)));
        }
    }

    #[tokio::test]
    async fn filter_applies_the_window_after_filtering() {
        let (_, svc) = seeded();
        let set = svc
            .filter_movies_by_date_added(Some(day(1) - Duration::hours(1)), Some(day(30)), Pagination::new(Some(2), Some(2)))
            .await
            .unwrap()
            .ok()
            .unwrap();
        assert_eq!(set.items.len(), 2);
        assert_eq!(set.current_page, 2);
    }

    #[tokio::test]
    async fn create_movie_assigns_identity() {
        let (store, svc) = seeded();
        let view = MovieView { id: 77, title: "Solaris".into(), year_of_release: 1972, date_added: Some(day(10)) };
        let created = svc.create_movie(&view).await.unwrap().ok().unwrap();
        assert_eq!(created.id, 6);
        assert_eq!(created.title, "Solaris");
        assert_eq!(created.date_added, day(10));
        assert_eq!(store.snapshot().len(), 6);
    }

    #[tokio::test]
    async fn create_movie_reports_commit_failure() {
        let (store, svc) = seeded();
        store.fail_commits("UniqueConstraintViolation", "duplicate key value");
        let view = MovieView { id: 0, title: "Alien".into(), year_of_release: 1979, date_added: Some(day(1)) };
        let errors = svc.create_movie(&view).await.unwrap().error().unwrap();
        assert_eq!(errors, vec![EntityError::new("UniqueConstraintViolation", "duplicate key value")]);
        assert_eq!(store.snapshot().len(), 5);
    }

    #[tokio::test]
    async fn create_review_appends_to_movie() {
        let (store, svc) = seeded();
        let view = ReviewView { id: 0, content: "still scary".into(), movie_id: 0 };
        let created = svc.create_review(1, &view).await.unwrap().ok().unwrap();
        assert_eq!(created.movie_id, 1);
        assert_eq!(created.id, 3);
        let alien = store.snapshot().into_iter().find(|m| m.id == 1).unwrap();
        assert_eq!(alien.reviews.len(), 3);
    }

    #[tokio::test]
    async fn create_review_for_missing_movie_is_not_found() {
        let (store, svc) = seeded();
        let before = store.snapshot();
        let view = ReviewView { id: 0, content: "lost".into(), movie_id: 404 };
        let errors = svc.create_review(404, &view).await.unwrap().error().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error_type, EntityError::MOVIE_NOT_FOUND);
        assert_eq!(store.snapshot(), before);
        assert_eq!(store.commit_count(), 0);
    }

    #[tokio::test]
    async fn update_movie_merges_onto_loaded_entity() {
        let (store, svc) = seeded();
        let view = MovieView { id: 0, title: "Alien (Director's Cut)".into(), year_of_release: 2003, date_added: Some(day(2)) };
        let updated = svc.update_movie(1, &view).await.unwrap().ok().unwrap();
        assert_eq!(updated.id, 1);
        assert_eq!(updated.title, "Alien (Director's Cut)");
        assert_eq!(updated.year_of_release, 2003);
        assert_eq!(updated.reviews.len(), 2);
        assert_eq!(updated.date_added, day(2));
        let stored = store.snapshot().into_iter().find(|m| m.id == 1).unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn update_without_date_added_keeps_stored_date() {
        let (store, svc) = seeded();
        let view = MovieView { id: 0, title: "Heat (1995)".into(), year_of_release: 1995, date_added: None };
        let updated = svc.update_movie(2, &view).await.unwrap().ok().unwrap();
        assert_eq!(updated.title, "Heat (1995)");
        assert_eq!(updated.date_added, day(3));
        let stored = store.snapshot().into_iter().find(|m| m.id == 2).unwrap();
        assert_eq!(stored.date_added, day(3));

        // still inside the same date window
        let set = svc
            .filter_movies_by_date_added(Some(day(3)), Some(day(4)), Pagination::default())
            .await
            .unwrap()
            .ok()
            .unwrap();
        assert_eq!(set.items.len(), 1);
        assert_eq!(set.items[0].id, 2);
    }

    #[tokio::test]
    async fn create_without_date_added_stamps_now() {
        let (_, svc) = seeded();
        let before = Utc::now();
        let view = MovieView { id: 0, title: "Paprika".into(), year_of_release: 2006, date_added: None };
        let created = svc.create_movie(&view).await.unwrap().ok().unwrap();
        assert!(created.date_added >= before);
    }

    #[tokio::test]
    async fn update_missing_movie_is_not_found() {
        let (store, svc) = seeded();
        let view = MovieView { id: 9, title: "Ghost".into(), year_of_release: 1990, date_added: Some(day(1)) };
        let errors = svc.update_movie(9, &view).await.unwrap().error().unwrap();
        assert!(errors[0].is_not_found());
        assert_eq!(store.snapshot().len(), 5);
    }

    #[tokio::test]
    async fn update_reports_commit_failure() {
        let (store, svc) = seeded();
        store.fail_commits("ExecError", "value too long");
        let view = MovieView { id: 0, title: "x".repeat(300), year_of_release: 1979, date_added: Some(day(1)) };
        let errors = svc.update_movie(1, &view).await.unwrap().error().unwrap();
        assert_eq!(errors[0].error_type, "ExecError");
        assert_eq!(store.snapshot()[0].title, "Alien");
    }

    #[tokio::test]
    async fn delete_movie_removes_it_and_its_reviews() {
        let (store, svc) = seeded();
        assert_eq!(svc.delete_movie(1).await.unwrap(), ServiceResponse::ResponseOk(true));
        assert!(!svc.movie_exists(1).await.unwrap());
        assert!(store.snapshot().iter().all(|m| m.id != 1));
    }

    #[tokio::test]
    async fn delete_missing_movie_leaves_store_unchanged() {
        let (store, svc) = seeded();
        let before = store.snapshot();
        let errors = svc.delete_movie(31337).await.unwrap().error().unwrap();
        assert!(errors[0].is_not_found());
        assert_eq!(store.snapshot(), before);
        assert_eq!(store.commit_count(), 0);
    }

    #[tokio::test]
    async fn delete_racing_another_delete_is_not_found() {
        let (store, svc) = seeded();
        let before = store.snapshot();
        // the row is gone by the time the delete commits
        store.lose_removals(true);
        let errors = svc.delete_movie(2).await.unwrap().error().unwrap();
        assert_eq!(errors, vec![EntityError::movie_not_found(2)]);
        assert_eq!(store.snapshot(), before);
        assert_eq!(store.commit_count(), 0);
    }

    #[tokio::test]
    async fn delete_reports_commit_failure() {
        let (store, svc) = seeded();
        store.fail_commits("ForeignKeyConstraintViolation", "still referenced");
        let errors = svc.delete_movie(2).await.unwrap().error().unwrap();
        assert_eq!(errors[0].error_type, "ForeignKeyConstraintViolation");
        assert!(svc.movie_exists(2).await.unwrap());
    }

    #[tokio::test]
    async fn mutations_propagate_unreachable_store() {
        let (store, svc) = seeded();
        store.set_offline(true);
        let view = MovieView { id: 0, title: "Offline".into(), year_of_release: 2000, date_added: Some(day(1)) };
        assert!(svc.create_movie(&view).await.is_err());
        assert!(svc.delete_movie(1).await.is_err());
        assert!(svc.movie_exists(1).await.is_err());
    }
}
