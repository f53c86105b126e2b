use async_trait::async_trait;

use super::domain::{Movie, MovieQuery, Review};
use super::errors::StoreError;

/// Persistence seam for movies and their reviews.
///
/// Every mutating method stages its change and commits it as one unit:
/// on `Err(StoreError::Commit { .. })` nothing was persisted.
#[async_trait]
pub trait MovieStore: Send + Sync {
    /// Grand total of movie rows, ignoring any filter.
    async fn count_movies(&self) -> Result<u64, StoreError>;
    async fn find_movies(&self, query: &MovieQuery) -> Result<Vec<Movie>, StoreError>;
    async fn find_movie(&self, id: i32, with_reviews: bool) -> Result<Option<Movie>, StoreError>;
    async fn movie_exists(&self, id: i32) -> Result<bool, StoreError>;

    /// Insert a movie; its `id` and `reviews` are ignored.
    async fn add_movie(&self, movie: Movie) -> Result<Movie, StoreError>;
    /// Append a review to an existing movie; the review `id` is ignored.
    async fn add_review(&self, movie_id: i32, review: Review) -> Result<Review, StoreError>;
    /// Write back the scalar fields of a loaded movie.
    async fn save_movie(&self, movie: &Movie) -> Result<Movie, StoreError>;
    /// Remove a movie and, with it, its reviews. `false` if no row matched.
    async fn remove_movie(&self, id: i32) -> Result<bool, StoreError>;
}

/// In-memory store for unit tests, doctests and benches.
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::{Mutex, MutexGuard};

    use crate::catalog::domain::MovieOrder;

    #[derive(Default)]
    struct State {
        movies: BTreeMap<i32, Movie>,
        last_movie_id: i32,
        last_review_id: i32,
        failing_commit: Option<(String, String)>,
        offline: bool,
        lose_removals: bool,
        queries: usize,
        commits: usize,
    }

    impl State {
        fn read(&mut self) -> Result<(), StoreError> {
            if self.offline {
                return Err(StoreError::Unavailable("mock store offline".into()));
            }
            self.queries += 1;
            Ok(())
        }

        /// Fail the way a rejected or unreachable commit would.
        fn check_commit(&self) -> Result<(), StoreError> {
            if self.offline {
                return Err(StoreError::Unavailable("mock store offline".into()));
            }
            if let Some((kind, message)) = &self.failing_commit {
                return Err(StoreError::commit(kind.clone(), message.clone()));
            }
            Ok(())
        }

        fn commit(&mut self) -> Result<(), StoreError> {
            self.check_commit()?;
            self.commits += 1;
            Ok(())
        }

        /// Reject writes against a missing parent the way a FK constraint would.
        fn require_movie(&self, id: i32, kind: &str, message: String) -> Result<(), StoreError> {
            if self.offline {
                return Err(StoreError::Unavailable("mock store offline".into()));
            }
            if self.movies.contains_key(&id) { Ok(()) } else { Err(StoreError::commit(kind, message)) }
        }
    }

    #[derive(Default)]
    pub struct MockMovieStore {
        state: Mutex<State>,
    }

    impl MockMovieStore {
        /// Seed with movies as given; review `movie_id`s are pointed at their owner.
        pub fn with_movies(movies: impl IntoIterator<Item = Movie>) -> Self {
            let mut state = State::default();
            for mut m in movies {
                for r in &mut m.reviews {
                    r.movie_id = m.id;
                    state.last_review_id = state.last_review_id.max(r.id);
                }
                state.last_movie_id = state.last_movie_id.max(m.id);
                state.movies.insert(m.id, m);
            }
            Self { state: Mutex::new(state) }
        }

        /// Make every following commit fail with the given classification.
        pub fn fail_commits(&self, kind: &str, message: &str) {
            self.lock().failing_commit = Some((kind.to_string(), message.to_string()));
        }

        pub fn set_offline(&self, offline: bool) { self.lock().offline = offline; }

        /// Make `remove_movie` match no row, as if another writer had deleted
        /// it after the caller's existence check. Contents stay untouched.
        pub fn lose_removals(&self, lose: bool) { self.lock().lose_removals = lose; }

        /// Reads served so far.
        pub fn query_count(&self) -> usize { self.lock().queries }

        /// Successful commits so far.
        pub fn commit_count(&self) -> usize { self.lock().commits }

        /// Current contents ordered by id.
        pub fn snapshot(&self) -> Vec<Movie> { self.lock().movies.values().cloned().collect() }

        fn lock(&self) -> MutexGuard<'_, State> {
            self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
        }
    }

    #[async_trait]
    impl MovieStore for MockMovieStore {
        async fn count_movies(&self) -> Result<u64, StoreError> {
            let mut s = self.lock();
            s.read()?;
            Ok(s.movies.len() as u64)
        }

        async fn find_movies(&self, query: &MovieQuery) -> Result<Vec<Movie>, StoreError> {
            let mut s = self.lock();
            s.read()?;
            let mut rows: Vec<Movie> = s.movies.values().filter(|m| query.matches(m)).cloned().collect();
            match query.order {
                MovieOrder::TitleAsc => rows.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id))),
                MovieOrder::YearOfReleaseDesc => {
                    rows.sort_by(|a, b| b.year_of_release.cmp(&a.year_of_release).then(a.id.cmp(&b.id)))
                }
            }
            Ok(rows
                .into_iter()
                .skip(usize::try_from(query.offset).unwrap_or(usize::MAX))
                .take(usize::try_from(query.limit).unwrap_or(usize::MAX))
                .map(|mut m| {
                    if !query.with_reviews { m.reviews.clear(); }
                    m
                })
                .collect())
        }

        async fn find_movie(&self, id: i32, with_reviews: bool) -> Result<Option<Movie>, StoreError> {
            let mut s = self.lock();
            s.read()?;
            Ok(s.movies.get(&id).cloned().map(|mut m| {
                if !with_reviews { m.reviews.clear(); }
                m
            }))
        }

        async fn movie_exists(&self, id: i32) -> Result<bool, StoreError> {
            let mut s = self.lock();
            s.read()?;
            Ok(s.movies.contains_key(&id))
        }

        async fn add_movie(&self, movie: Movie) -> Result<Movie, StoreError> {
            let mut s = self.lock();
            s.commit()?;
            s.last_movie_id += 1;
            let stored = Movie { id: s.last_movie_id, reviews: Vec::new(), ..movie };
            s.movies.insert(stored.id, stored.clone());
            Ok(stored)
        }

        async fn add_review(&self, movie_id: i32, review: Review) -> Result<Review, StoreError> {
            let mut s = self.lock();
            s.require_movie(movie_id, "ForeignKeyConstraintViolation", format!("movie {movie_id} does not exist"))?;
            s.commit()?;
            s.last_review_id += 1;
            let stored = Review { id: s.last_review_id, movie_id, ..review };
            if let Some(m) = s.movies.get_mut(&movie_id) {
                m.reviews.push(stored.clone());
            }
            Ok(stored)
        }

        async fn save_movie(&self, movie: &Movie) -> Result<Movie, StoreError> {
            let mut s = self.lock();
            s.require_movie(movie.id, "RecordNotUpdated", "none of the records are updated".into())?;
            s.commit()?;
            let Some(stored) = s.movies.get_mut(&movie.id) else {
                return Err(StoreError::commit("RecordNotUpdated", "none of the records are updated"));
            };
            stored.apply(movie.clone(), true);
            Ok(stored.clone())
        }

        async fn remove_movie(&self, id: i32) -> Result<bool, StoreError> {
            let mut s = self.lock();
            s.check_commit()?;
            if s.lose_removals || s.movies.remove(&id).is_none() {
                return Ok(false);
            }
            s.commits += 1;
            Ok(true)
        }
    }
}
