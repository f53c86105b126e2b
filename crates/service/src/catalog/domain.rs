use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::EntityError;
use crate::pagination::PageWindow;

pub const DATES_REQUIRED: &str = "Both dates are required";
pub const DATES_OUT_OF_ORDER: &str = "fromDate is not before toDate";

/// Persisted movie together with the reviews it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub year_of_release: i32,
    pub date_added: DateTime<Utc>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Movie {
    /// Merge the fields a client sent onto this movie. Identity and reviews
    /// stay as loaded, and so does `date_added` when `changes` leaves it out.
    pub fn apply(&mut self, changes: Movie, date_added_sent: bool) {
        self.title = changes.title;
        self.year_of_release = changes.year_of_release;
        if date_added_sent {
            self.date_added = changes.date_added;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i32,
    pub content: String,
    /// Parent movie, used for persistence routing only.
    pub movie_id: i32,
}

/// Wire form of a movie. `id` is ignored on create.
///
/// `date_added` may be omitted: a create then stamps the current time and
/// an update keeps the stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieView {
    #[serde(default)]
    pub id: i32,
    pub title: String,
    pub year_of_release: i32,
    #[serde(default)]
    pub date_added: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    #[serde(default)]
    pub id: i32,
    pub content: String,
    #[serde(default)]
    pub movie_id: i32,
}

/// A movie with its complete review list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieWithReviewsView {
    pub id: i32,
    pub title: String,
    pub year_of_release: i32,
    pub date_added: DateTime<Utc>,
    pub reviews: Vec<ReviewView>,
}

/// Inclusive `[from, to]` range with `from < to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    /// Check the raw bounds in order: both present, then strictly ordered.
    pub fn validated(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Result<Self, EntityError> {
        let (Some(from), Some(to)) = (from, to) else {
            return Err(EntityError::validation(DATES_REQUIRED));
        };
        if from >= to {
            return Err(EntityError::validation(DATES_OUT_OF_ORDER));
        }
        Ok(Self { from, to })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool { self.from <= at && at <= self.to }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovieOrder {
    #[default]
    TitleAsc,
    YearOfReleaseDesc,
}

/// Filter, order and window for a movie listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieQuery {
    pub id: Option<i32>,
    pub date_added: Option<DateRange>,
    pub order: MovieOrder,
    pub offset: u64,
    pub limit: u64,
    pub with_reviews: bool,
}

impl MovieQuery {
    pub fn page(window: PageWindow, order: MovieOrder) -> Self {
        Self { id: None, date_added: None, order, offset: window.offset(), limit: window.per_page, with_reviews: false }
    }

    pub fn with_id(mut self, id: i32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn within(mut self, range: DateRange) -> Self {
        self.date_added = Some(range);
        self
    }

    pub fn including_reviews(mut self) -> Self {
        self.with_reviews = true;
        self
    }

    /// Whether `movie` passes the filter part of the query.
    pub fn matches(&self, movie: &Movie) -> bool {
        self.id.map_or(true, |id| movie.id == id)
            && self.date_added.map_or(true, |r| r.contains(movie.date_added))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(day: u32) -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap() }

    #[test]
    fn date_range_requires_both_bounds() {
        assert_eq!(DateRange::validated(None, Some(at(2))).unwrap_err().message, DATES_REQUIRED);
        assert_eq!(DateRange::validated(Some(at(2)), None).unwrap_err().message, DATES_REQUIRED);
        assert_eq!(DateRange::validated(None, None).unwrap_err().message, DATES_REQUIRED);
    }

    #[test]
    fn date_range_requires_strict_order() {
        assert_eq!(DateRange::validated(Some(at(2)), Some(at(2))).unwrap_err().message, DATES_OUT_OF_ORDER);
        assert_eq!(DateRange::validated(Some(at(3)), Some(at(2))).unwrap_err().message, DATES_OUT_OF_ORDER);
        assert!(DateRange::validated(Some(at(2)), Some(at(2) + Duration::seconds(1))).is_ok());
    }

    #[test]
    fn date_range_is_inclusive() {
        let r = DateRange::validated(Some(at(1)), Some(at(5))).unwrap();
        assert!(r.contains(at(1)));
        assert!(r.contains(at(5)));
        assert!(!r.contains(at(6)));
    }

    #[test]
    fn apply_keeps_identity_and_reviews() {
        let mut loaded = Movie {
            id: 4,
            title: "Old".into(),
            year_of_release: 1990,
            date_added: at(1),
            reviews: vec![Review { id: 1, content: "kept".into(), movie_id: 4 }],
        };
        loaded.apply(Movie { id: 0, title: "New".into(), year_of_release: 1991, date_added: at(2), reviews: vec![] }, true);
        assert_eq!(loaded.id, 4);
        assert_eq!(loaded.title, "New");
        assert_eq!(loaded.year_of_release, 1991);
        assert_eq!(loaded.date_added, at(2));
        assert_eq!(loaded.reviews.len(), 1);
    }

    #[test]
    fn apply_keeps_date_added_when_not_sent() {
        let mut loaded = Movie { id: 4, title: "Old".into(), year_of_release: 1990, date_added: at(1), reviews: vec![] };
        loaded.apply(Movie { id: 0, title: "New".into(), year_of_release: 1990, date_added: at(9), reviews: vec![] }, false);
        assert_eq!(loaded.title, "New");
        assert_eq!(loaded.date_added, at(1));
    }

    #[test]
    fn views_use_camel_case_and_optional_date() {
        let v: MovieView = serde_json::from_str(r#"{"title":"Ran","yearOfRelease":1985}"#).unwrap();
        assert_eq!(v.date_added, None);
        assert_eq!(v.id, 0);
        let json = serde_json::to_value(ReviewView { id: 1, content: "epic".into(), movie_id: 2 }).unwrap();
        assert_eq!(json["movieId"], 2);
    }
}
