use chrono::Utc;

use super::domain::{Movie, MovieView, MovieWithReviewsView, Review, ReviewView};

/// Field projection between wire views and entities. Implementations must
/// be pure: no I/O, no hidden state.
pub trait Mapper: Send + Sync {
    fn movie_to_view(&self, movie: &Movie) -> MovieView;
    fn movie_to_entity(&self, view: &MovieView) -> Movie;
    fn review_to_view(&self, review: &Review) -> ReviewView;
    fn review_to_entity(&self, view: &ReviewView) -> Review;

    fn movie_with_reviews_to_view(&self, movie: &Movie) -> MovieWithReviewsView {
        MovieWithReviewsView {
            id: movie.id,
            title: movie.title.clone(),
            year_of_release: movie.year_of_release,
            date_added: movie.date_added,
            reviews: movie.reviews.iter().map(|r| self.review_to_view(r)).collect(),
        }
    }
}

/// Copies fields one to one.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldMapper;

impl Mapper for FieldMapper {
    fn movie_to_view(&self, movie: &Movie) -> MovieView {
        MovieView {
            id: movie.id,
            title: movie.title.clone(),
            year_of_release: movie.year_of_release,
            date_added: Some(movie.date_added),
        }
    }

    /// A view without `date_added` is stamped with the current time.
    fn movie_to_entity(&self, view: &MovieView) -> Movie {
        Movie {
            id: view.id,
            title: view.title.clone(),
            year_of_release: view.year_of_release,
            date_added: view.date_added.unwrap_or_else(Utc::now),
            reviews: Vec::new(),
        }
    }

    fn review_to_view(&self, review: &Review) -> ReviewView {
        ReviewView { id: review.id, content: review.content.clone(), movie_id: review.movie_id }
    }

    fn review_to_entity(&self, view: &ReviewView) -> Review {
        Review { id: view.id, content: view.content.clone(), movie_id: view.movie_id }
    }
}
