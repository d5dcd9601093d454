#[macro_use]
extern crate diesel;

pub mod models;
pub mod schema;

use crate::models::books::{BookChanges, BookRow, NewBookRow};
use crate::models::profiles::ProfileRow;
use crate::models::reviews::{NewReviewRow, ReviewChanges, ReviewRow};
use crate::schema::{books, profiles, reviews};
use anyhow::Error;
use catalog::error::ErrorKind;
use catalog::{
    AuthoredReview, Book, BookFilter, BookId, BookPatch, Catalog, GenreFilter, NewBook, NewReview,
    Page, PageRequest, Profile, ProfileId, RatingSummary, Review, ReviewId, ReviewWithAuthor,
};
use config::Config;
use diesel::pg::{Pg, PgConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::{Array, BigInt, Double, Integer};
use diesel::{delete, insert_into, prelude::*, sql_query, update};
use num_traits::Zero;
use std::collections::HashMap;
use std::convert::TryFrom;

pub fn establish_connection(url: &str) -> Result<PgConnection, Error> {
    Ok(PgConnection::establish(&url)?)
}

pub struct PgCatalog {
    pg_conn: PgConnection,
}

impl PgCatalog {
    pub fn new() -> Result<Self, Error> {
        let cfg = Config::default();

        Self::from_config(&cfg, "catalog")
    }

    pub fn with_url(url: &str) -> Result<Self, Error> {
        let pg_conn = establish_connection(url)?;
        Ok(Self { pg_conn })
    }

    pub fn from_config(config: &Config, name: &str) -> Result<Self, Error> {
        let db = config
            .databases
            .get(name)
            .ok_or_else(|| ErrorKind::DbConfigError(name.into()))?;

        Self::with_url(&db.psql_url)
    }

    fn book_row(&self, id: BookId) -> Result<BookRow, Error> {
        let row = books::table
            .find(id)
            .first::<BookRow>(&self.pg_conn)
            .optional()?;

        row.ok_or_else(|| ErrorKind::NotFoundById(id.to_string()).into())
    }

    fn owned_book_row(&self, id: BookId, owner: ProfileId) -> Result<BookRow, Error> {
        let row = self.book_row(id)?;

        if row.added_by != owner {
            Err(ErrorKind::NotOwner(owner.to_string(), "book", id.to_string()).into())
        } else {
            Ok(row)
        }
    }

    fn owned_review_row(&self, id: ReviewId, owner: ProfileId) -> Result<ReviewRow, Error> {
        let row = reviews::table
            .find(id)
            .first::<ReviewRow>(&self.pg_conn)
            .optional()?
            .ok_or_else(|| ErrorKind::NotFoundById(id.to_string()))?;

        if row.user_id != owner {
            Err(ErrorKind::NotOwner(owner.to_string(), "review", id.to_string()).into())
        } else {
            Ok(row)
        }
    }
}

// Both the row count and the page query share the same dynamic filters, so
// the filter is built twice as a boxed query
fn filtered_books(filter: &BookFilter) -> books::BoxedQuery<'static, Pg> {
    let mut query = books::table.into_boxed();

    if let Some(term) = &filter.search_term {
        let pattern = format!("%{}%", escape_like(term));
        query = query.filter(
            books::title
                .ilike(pattern.clone())
                .or(books::author.ilike(pattern)),
        );
    }

    if let GenreFilter::Only(genre) = &filter.genre {
        query = query.filter(books::genre.eq(genre.clone()));
    }

    query
}

// The search term is user input, not a pattern
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[derive(Debug, QueryableByName)]
struct SummaryRow {
    #[sql_type = "Integer"]
    book_id: i32,
    #[sql_type = "Double"]
    average: f64,
    #[sql_type = "BigInt"]
    count: i64,
}

impl Catalog for PgCatalog {
    fn book(&self, id: BookId) -> Result<Book, Error> {
        Ok(self.book_row(id)?.into())
    }

    fn books_page(&self, filter: &BookFilter, page: PageRequest) -> Result<Page<Book>, Error> {
        let total: i64 = filtered_books(filter)
            .count()
            .get_result(&self.pg_conn)?;

        let rows = filtered_books(filter)
            .order(books::created_at.desc())
            .offset(page.offset() as i64)
            .limit(page.size as i64)
            .load::<BookRow>(&self.pg_conn)?;

        Ok(Page {
            items: rows.into_iter().map(Into::into).collect(),
            total: total as usize,
        })
    }

    fn genres(&self) -> Result<Vec<String>, Error> {
        let genres = books::table
            .select(books::genre)
            .distinct()
            .order(books::genre.asc())
            .load::<String>(&self.pg_conn)?;

        Ok(genres)
    }

    fn books_added_by(&self, user: ProfileId) -> Result<Vec<Book>, Error> {
        let rows = books::table
            .filter(books::added_by.eq(user))
            .order(books::created_at.desc())
            .load::<BookRow>(&self.pg_conn)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn add_book(&self, book: &NewBook) -> Result<Book, Error> {
        let row: BookRow = insert_into(books::table)
            .values(&NewBookRow::from(book))
            .get_result(&self.pg_conn)?;

        Ok(row.into())
    }

    fn update_book(&self, id: BookId, owner: ProfileId, patch: &BookPatch) -> Result<Book, Error> {
        patch.validate()?;
        let current = self.owned_book_row(id, owner)?;

        if patch.is_empty() {
            return Ok(current.into());
        }

        let row: BookRow = update(books::table.find(id))
            .set(&BookChanges::from(patch))
            .get_result(&self.pg_conn)?;

        Ok(row.into())
    }

    fn remove_book(&self, id: BookId, owner: ProfileId) -> Result<(), Error> {
        self.owned_book_row(id, owner)?;

        // Dependent reviews go away with the book (ON DELETE CASCADE)
        let deleted = delete(books::table.find(id)).execute(&self.pg_conn)?;
        if deleted.is_zero() {
            return Err(ErrorKind::NotFoundById(id.to_string()).into());
        }

        Ok(())
    }

    fn reviews_of(&self, book: BookId) -> Result<Vec<ReviewWithAuthor>, Error> {
        let rows = reviews::table
            .left_join(profiles::table)
            .filter(reviews::book_id.eq(book))
            .order(reviews::created_at.desc())
            .select((reviews::all_columns, profiles::name.nullable()))
            .load::<(ReviewRow, Option<String>)>(&self.pg_conn)?;

        rows.into_iter()
            .map(|(row, author)| {
                Ok(ReviewWithAuthor {
                    review: Review::try_from(row)?,
                    author,
                })
            })
            .collect()
    }

    fn review_by(&self, book: BookId, user: ProfileId) -> Result<Option<Review>, Error> {
        let row = reviews::table
            .filter(reviews::book_id.eq(book))
            .filter(reviews::user_id.eq(user))
            .first::<ReviewRow>(&self.pg_conn)
            .optional()?;

        match row {
            Some(row) => Ok(Some(Review::try_from(row)?)),
            None => Ok(None),
        }
    }

    fn reviews_written_by(&self, user: ProfileId) -> Result<Vec<AuthoredReview>, Error> {
        let rows = reviews::table
            .inner_join(books::table)
            .filter(reviews::user_id.eq(user))
            .order(reviews::created_at.desc())
            .select((reviews::all_columns, books::title, books::author))
            .load::<(ReviewRow, String, String)>(&self.pg_conn)?;

        rows.into_iter()
            .map(|(row, book_title, book_author)| {
                Ok(AuthoredReview {
                    review: Review::try_from(row)?,
                    book_title,
                    book_author,
                })
            })
            .collect()
    }

    fn add_review(&self, review: &NewReview) -> Result<Review, Error> {
        let result: Result<ReviewRow, DieselError> = insert_into(reviews::table)
            .values(&NewReviewRow::from(review))
            .get_result(&self.pg_conn);

        match result {
            Ok(row) => Ok(Review::try_from(row)?),
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Err(ErrorKind::DuplicateReview(
                    review.user_id.to_string(),
                    review.book_id.to_string(),
                )
                .into())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn update_review(
        &self,
        id: ReviewId,
        owner: ProfileId,
        rating: i16,
        text: &str,
    ) -> Result<Review, Error> {
        catalog::types::validate_review(rating, text)?;
        self.owned_review_row(id, owner)?;

        let row: ReviewRow = update(reviews::table.find(id))
            .set(&ReviewChanges {
                rating,
                review_text: text.trim(),
            })
            .get_result(&self.pg_conn)?;

        Ok(Review::try_from(row)?)
    }

    fn remove_review(&self, id: ReviewId, owner: ProfileId) -> Result<(), Error> {
        self.owned_review_row(id, owner)?;

        let deleted = delete(reviews::table.find(id)).execute(&self.pg_conn)?;
        if deleted.is_zero() {
            return Err(ErrorKind::NotFoundById(id.to_string()).into());
        }

        Ok(())
    }

    fn rating_summaries(
        &self,
        book_ids: &[BookId],
    ) -> Result<HashMap<BookId, RatingSummary>, Error> {
        if book_ids.is_empty() {
            return Ok(HashMap::new());
        }

        // One aggregate round-trip for the whole page instead of a query
        // per listed book
        let rows: Vec<SummaryRow> = sql_query(
            "SELECT book_id, AVG(rating)::FLOAT8 AS average, COUNT(*) AS count \
             FROM reviews WHERE book_id = ANY($1) GROUP BY book_id",
        )
        .bind::<Array<Integer>, _>(book_ids)
        .load(&self.pg_conn)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let summary = RatingSummary {
                    average: row.average,
                    count: row.count as usize,
                };

                (row.book_id, summary)
            })
            .collect())
    }

    fn profile(&self, user: ProfileId) -> Result<Profile, Error> {
        let row = profiles::table
            .find(user)
            .first::<ProfileRow>(&self.pg_conn)
            .optional()?;

        match row {
            Some(row) => Ok(row.into()),
            None => Err(ErrorKind::ProfileNotFound(user.to_string()).into()),
        }
    }
}

#[cfg(feature = "test-store")]
#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Error;

    #[test]
    fn query_book_by_id() -> Result<(), Error> {
        let store = PgCatalog::new()?;

        let book = store.book(1)?;
        assert_eq!(book.id, 1);

        Ok(())
    }

    #[test]
    fn missing_book_is_not_found() -> Result<(), Error> {
        let store = PgCatalog::new()?;

        assert!(store.book(-1).is_err());

        Ok(())
    }

    #[test]
    fn directory_page_counts() -> Result<(), Error> {
        let store = PgCatalog::new()?;

        let filter = BookFilter::new();
        let page = store.books_page(&filter, PageRequest::first(5))?;

        assert!(page.items.len() <= 5);
        assert!(page.total >= page.items.len());

        Ok(())
    }

    #[test]
    fn duplicate_review_is_rejected() -> Result<(), Error> {
        let store = PgCatalog::new()?;

        let review = NewReview::new(1, 1, 4, "already reviewed elsewhere")?;
        store.add_review(&review)?;

        let err = store.add_review(&review).unwrap_err();
        assert!(err.to_string().contains("already reviewed"));

        store.remove_review(store.review_by(1, 1)?.unwrap().id, 1)?;

        Ok(())
    }
}
