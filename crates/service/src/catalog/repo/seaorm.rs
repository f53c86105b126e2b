use async_trait::async_trait;
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, LoaderTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, SqlErr, TransactionTrait,
};
use tracing::debug;

use models::{movie, review};

use crate::catalog::domain::{Movie, MovieOrder, MovieQuery, Review};
use crate::catalog::errors::StoreError;
use crate::catalog::repository::MovieStore;

pub struct SeaOrmMovieStore {
    pub db: DatabaseConnection,
}

impl SeaOrmMovieStore {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn is_connection_error(e: &DbErr) -> bool {
    matches!(e, DbErr::Conn(_) | DbErr::ConnectionAcquire(_))
}

/// Classification tag reported to callers when a write is rejected.
pub fn classify(e: &DbErr) -> &'static str {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => return "UniqueConstraintViolation",
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => return "ForeignKeyConstraintViolation",
        _ => {}
    }
    match e {
        DbErr::RecordNotUpdated => "RecordNotUpdated",
        DbErr::RecordNotInserted => "RecordNotInserted",
        DbErr::RecordNotFound(_) => "RecordNotFound",
        DbErr::Exec(_) => "ExecError",
        DbErr::Query(_) => "QueryError",
        _ => "DbError",
    }
}

fn read_err(e: DbErr) -> StoreError {
    if is_connection_error(&e) { StoreError::Unavailable(e.to_string()) } else { StoreError::Query(e.to_string()) }
}

fn write_err(e: DbErr) -> StoreError {
    if is_connection_error(&e) {
        StoreError::Unavailable(e.to_string())
    } else {
        StoreError::commit(classify(&e), e.to_string())
    }
}

fn to_review(r: review::Model) -> Review {
    Review { id: r.id, content: r.content, movie_id: r.movie_id }
}

fn to_movie(m: movie::Model, mut reviews: Vec<review::Model>) -> Movie {
    reviews.sort_by_key(|r| r.id);
    Movie {
        id: m.id,
        title: m.title,
        year_of_release: m.year_of_release,
        date_added: m.date_added.with_timezone(&Utc),
        reviews: reviews.into_iter().map(to_review).collect(),
    }
}

/// Filter, order and window of a listing query; `id` breaks ordering ties.
fn movie_select(query: &MovieQuery) -> Select<movie::Entity> {
    let mut select = movie::Entity::find();
    if let Some(id) = query.id {
        select = select.filter(movie::Column::Id.eq(id));
    }
    if let Some(range) = query.date_added {
        let from: DateTimeWithTimeZone = range.from.into();
        let to: DateTimeWithTimeZone = range.to.into();
        select = select.filter(movie::Column::DateAdded.between(from, to));
    }
    select = match query.order {
        MovieOrder::TitleAsc => select.order_by_asc(movie::Column::Title),
        MovieOrder::YearOfReleaseDesc => select.order_by_desc(movie::Column::YearOfRelease),
    };
    select.order_by_asc(movie::Column::Id).offset(query.offset).limit(query.limit)
}

#[async_trait]
impl MovieStore for SeaOrmMovieStore {
    async fn count_movies(&self) -> Result<u64, StoreError> {
        movie::Entity::find().count(&self.db).await.map_err(read_err)
    }

    async fn find_movies(&self, query: &MovieQuery) -> Result<Vec<Movie>, StoreError> {
        let rows = movie_select(query)
            .all(&self.db)
            .await
            .map_err(read_err)?;
        debug!(rows = rows.len(), offset = query.offset, limit = query.limit, "movies fetched");

        if !query.with_reviews {
            return Ok(rows.into_iter().map(|m| to_movie(m, Vec::new())).collect());
        }
        let reviews = rows.load_many(review::Entity, &self.db).await.map_err(read_err)?;
        Ok(rows.into_iter().zip(reviews).map(|(m, r)| to_movie(m, r)).collect())
    }

    async fn find_movie(&self, id: i32, with_reviews: bool) -> Result<Option<Movie>, StoreError> {
        let Some(m) = movie::Entity::find_by_id(id).one(&self.db).await.map_err(read_err)? else {
            return Ok(None);
        };
        let reviews = if with_reviews {
            m.find_related(review::Entity).all(&self.db).await.map_err(read_err)?
        } else {
            Vec::new()
        };
        Ok(Some(to_movie(m, reviews)))
    }

    async fn movie_exists(&self, id: i32) -> Result<bool, StoreError> {
        let n = movie::Entity::find_by_id(id).count(&self.db).await.map_err(read_err)?;
        Ok(n > 0)
    }

    async fn add_movie(&self, movie: Movie) -> Result<Movie, StoreError> {
        let am = movie::ActiveModel {
            title: Set(movie.title),
            year_of_release: Set(movie.year_of_release),
            date_added: Set(movie.date_added.into()),
            ..Default::default()
        };
        let created = am.insert(&self.db).await.map_err(write_err)?;
        Ok(to_movie(created, Vec::new()))
    }

    async fn add_review(&self, movie_id: i32, review: Review) -> Result<Review, StoreError> {
        let txn = self.db.begin().await.map_err(write_err)?;
        let created = review::ActiveModel {
            content: Set(review.content),
            movie_id: Set(movie_id),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(write_err)?;
        txn.commit().await.map_err(write_err)?;
        Ok(to_review(created))
    }

    async fn save_movie(&self, movie: &Movie) -> Result<Movie, StoreError> {
        let am = movie::ActiveModel {
            id: Unchanged(movie.id),
            title: Set(movie.title.clone()),
            year_of_release: Set(movie.year_of_release),
            date_added: Set(movie.date_added.into()),
        };
        let updated = am.update(&self.db).await.map_err(write_err)?;
        Ok(Movie { reviews: movie.reviews.clone(), ..to_movie(updated, Vec::new()) })
    }

    async fn remove_movie(&self, id: i32) -> Result<bool, StoreError> {
        let res = movie::Entity::delete_by_id(id).exec(&self.db).await.map_err(write_err)?;
        Ok(res.rows_affected > 0)
    }
}
