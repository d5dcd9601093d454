// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::directory::BookCard;
use anyhow::Error;
use catalog::{AuthoredReview, BookId, Catalog, Profile, Session};
use chrono::Datelike;

/// The caller's dashboard: profile record, authored books with their
/// aggregates, authored reviews with the parent book
pub struct ProfilePage {
    profile: Profile,
    books: Vec<BookCard>,
    reviews: Vec<AuthoredReview>,
}

impl ProfilePage {
    /// Everything is fetched up front; this page doesn't paginate
    pub fn load<C: Catalog>(catalog: &C, session: &Session) -> Result<Self, Error> {
        let user = session.require_user()?;
        let profile = catalog.profile(user)?;

        let books = catalog.books_added_by(user)?;
        let ids: Vec<BookId> = books.iter().map(|book| book.id).collect();
        let summaries = catalog.rating_summaries(&ids)?;

        let books = books
            .into_iter()
            .map(|book| {
                let summary = summaries.get(&book.id).copied().unwrap_or_default();
                BookCard { book, summary }
            })
            .collect();

        let reviews = catalog.reviews_written_by(user)?;

        Ok(Self {
            profile,
            books,
            reviews,
        })
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn books(&self) -> &[BookCard] {
        &self.books
    }

    pub fn reviews(&self) -> &[AuthoredReview] {
        &self.reviews
    }

    pub fn books_added(&self) -> usize {
        self.books.len()
    }

    pub fn reviews_written(&self) -> usize {
        self.reviews.len()
    }

    /// The year the profile was created
    pub fn member_since(&self) -> i32 {
        self.profile.created_at.year()
    }
}
