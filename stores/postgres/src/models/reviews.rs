use crate::schema::reviews;
use catalog::error::ErrorKind;
use catalog::types::{MAX_RATING, MIN_RATING};
use catalog::{NewReview, Review};
use chrono::NaiveDateTime;
use std::convert::TryFrom;

// To query data from the database
#[derive(Debug, Clone, Identifiable, Queryable)]
#[table_name = "reviews"]
pub struct ReviewRow {
    pub id: i32,
    pub book_id: i32,
    pub user_id: i32,
    pub rating: i16,
    pub review_text: String,
    pub created_at: NaiveDateTime,
}

// Rows with a rating outside 1..=5 are rejected instead of propagated
impl TryFrom<ReviewRow> for Review {
    type Error = ErrorKind;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        if !(MIN_RATING..=MAX_RATING).contains(&row.rating) {
            return Err(ErrorKind::InvalidRating(row.rating));
        }

        Ok(Self {
            id: row.id,
            book_id: row.book_id,
            user_id: row.user_id,
            rating: row.rating,
            review_text: row.review_text,
            created_at: row.created_at,
        })
    }
}

// To insert a new review into the database
#[derive(Debug, Clone, Insertable)]
#[table_name = "reviews"]
pub struct NewReviewRow<'a> {
    pub book_id: i32,
    pub user_id: i32,
    pub rating: i16,
    pub review_text: &'a str,
}

impl<'a> From<&'a NewReview> for NewReviewRow<'a> {
    fn from(review: &'a NewReview) -> Self {
        Self {
            book_id: review.book_id,
            user_id: review.user_id,
            rating: review.rating,
            review_text: &review.review_text,
        }
    }
}

// To update an existing review in place
#[derive(Debug, Clone, AsChangeset)]
#[table_name = "reviews"]
pub struct ReviewChanges<'a> {
    pub rating: i16,
    pub review_text: &'a str,
}
