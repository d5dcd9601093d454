// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::entity::Entity;
use crate::error::ErrorKind;
use chrono::{Datelike, NaiveDateTime, Utc};
use common_macros::hash_map;
use std::collections::HashMap;

pub type BookId = i32;
pub type ProfileId = i32;
pub type ReviewId = i32;

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

const MIN_PUBLISHED_YEAR: i16 = 1000;

/// Reject ratings outside 1..=5 and blank review text. Called before any
/// store round-trip; the storage constraints are the backstop.
pub fn validate_review(rating: i16, text: &str) -> Result<(), ErrorKind> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(ErrorKind::InvalidRating(rating));
    }

    if text.trim().is_empty() {
        return Err(ErrorKind::MissingField("review_text"));
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub published_year: i16,
    pub description: Option<String>,
    pub added_by: ProfileId,
    pub created_at: NaiveDateTime,
}

impl Entity for Book {
    type Id = BookId;

    fn get_id(&self) -> Self::Id {
        self.id
    }

    fn get_data(&self) -> HashMap<String, String> {
        let mut data = hash_map! {
            "title".into() => self.title.clone(),
            "author".into() => self.author.clone(),
            "genre".into() => self.genre.clone(),
            "published_year".into() => self.published_year.to_string(),
            "added_by".into() => self.added_by.to_string(),
        };

        if let Some(description) = &self.description {
            data.insert("description".into(), description.clone());
        }

        data
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub id: ReviewId,
    pub book_id: BookId,
    pub user_id: ProfileId,
    pub rating: i16,
    pub review_text: String,
    pub created_at: NaiveDateTime,
}

impl Entity for Review {
    type Id = ReviewId;

    fn get_id(&self) -> Self::Id {
        self.id
    }

    fn get_data(&self) -> HashMap<String, String> {
        hash_map! {
            "book_id".into() => self.book_id.to_string(),
            "user_id".into() => self.user_id.to_string(),
            "rating".into() => self.rating.to_string(),
            "review_text".into() => self.review_text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub user_id: ProfileId,
    pub name: String,
    pub email: String,
    pub created_at: NaiveDateTime,
}

impl Entity for Profile {
    type Id = ProfileId;

    fn get_id(&self) -> Self::Id {
        self.user_id
    }

    fn get_data(&self) -> HashMap<String, String> {
        hash_map! {
            "name".into() => self.name.clone(),
            "email".into() => self.email.clone(),
        }
    }
}

/// A review joined with its author's display name
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewWithAuthor {
    pub review: Review,
    pub author: Option<String>,
}

impl ReviewWithAuthor {
    /// Display name, falling back when the reviewer's profile is gone
    pub fn author_name(&self) -> &str {
        self.author.as_deref().unwrap_or("Anonymous")
    }
}

/// A review joined with the title and author of the reviewed book
#[derive(Debug, Clone, PartialEq)]
pub struct AuthoredReview {
    pub review: Review,
    pub book_title: String,
    pub book_author: String,
}

/// A validated prototype for a book insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub published_year: i16,
    pub description: Option<String>,
    pub added_by: ProfileId,
}

impl NewBook {
    pub fn new(
        title: &str,
        author: &str,
        genre: &str,
        published_year: i16,
        description: Option<&str>,
        added_by: ProfileId,
    ) -> Result<Self, ErrorKind> {
        let title = non_empty(title, "title")?;
        let author = non_empty(author, "author")?;
        let genre = non_empty(genre, "genre")?;

        let current_year = Utc::now().year() as i16;
        if !(MIN_PUBLISHED_YEAR..=current_year).contains(&published_year) {
            return Err(ErrorKind::InvalidYear(published_year));
        }

        let description = description
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_owned);

        Ok(Self {
            title,
            author,
            genre,
            published_year,
            description,
            added_by,
        })
    }
}

/// A validated prototype for a review insert, tied to one (book, user) pair
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub book_id: BookId,
    pub user_id: ProfileId,
    pub rating: i16,
    pub review_text: String,
}

impl NewReview {
    pub fn new(
        book_id: BookId,
        user_id: ProfileId,
        rating: i16,
        review_text: &str,
    ) -> Result<Self, ErrorKind> {
        validate_review(rating, review_text)?;

        Ok(Self {
            book_id,
            user_id,
            rating,
            review_text: review_text.trim().to_owned(),
        })
    }
}

/// Subset update for a book; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub published_year: Option<i16>,
    pub description: Option<String>,
}

impl BookPatch {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> Result<(), ErrorKind> {
        if let Some(title) = &self.title {
            non_empty(title, "title")?;
        }

        if let Some(author) = &self.author {
            non_empty(author, "author")?;
        }

        if let Some(genre) = &self.genre {
            non_empty(genre, "genre")?;
        }

        if let Some(year) = self.published_year {
            let current_year = Utc::now().year() as i16;
            if !(MIN_PUBLISHED_YEAR..=current_year).contains(&year) {
                return Err(ErrorKind::InvalidYear(year));
            }
        }

        Ok(())
    }
}

fn non_empty(value: &str, field: &'static str) -> Result<String, ErrorKind> {
    let value = value.trim();

    if value.is_empty() {
        Err(ErrorKind::MissingField(field))
    } else {
        Ok(value.to_owned())
    }
}
