// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

pub mod entity;
pub mod error;
pub mod filter;
pub mod session;
pub mod summary;
pub mod types;

use anyhow::Error;
use std::collections::HashMap;

pub use entity::{Entity, ToTable};
pub use filter::{BookFilter, GenreFilter, Page, PageRequest};
pub use session::Session;
pub use summary::RatingSummary;
pub use types::{
    AuthoredReview, Book, BookId, BookPatch, NewBook, NewReview, Profile, ProfileId, Review,
    ReviewId, ReviewWithAuthor,
};

pub type Result<T> = std::result::Result<T, Error>;

/// Table-scoped operations against the persistence service. Pages depend on
/// this seam only, never on a concrete store.
pub trait Catalog {
    /// Get a single book, failing with `NotFoundById` when the id doesn't resolve
    fn book(&self, id: BookId) -> Result<Book>;

    /// Get one directory page of books matching the filter, newest-created
    /// first, along with the total matching row count
    fn books_page(&self, filter: &BookFilter, page: PageRequest) -> Result<Page<Book>>;

    /// Distinct genre strings across all books
    fn genres(&self) -> Result<Vec<String>>;

    /// All books added by the given user, newest first
    fn books_added_by(&self, user: ProfileId) -> Result<Vec<Book>>;

    /// Insert a new book owned by `book.added_by`
    fn add_book(&self, book: &NewBook) -> Result<Book>;

    /// Update a subset of a book's fields; only the owner may do this
    fn update_book(&self, id: BookId, owner: ProfileId, patch: &BookPatch) -> Result<Book>;

    /// Delete a book and its dependent reviews; only the owner may do this
    fn remove_book(&self, id: BookId, owner: ProfileId) -> Result<()>;

    /// All reviews of a book joined with the reviewer's display name, newest first
    fn reviews_of(&self, book: BookId) -> Result<Vec<ReviewWithAuthor>>;

    /// The review a user wrote for a book, if any
    fn review_by(&self, book: BookId, user: ProfileId) -> Result<Option<Review>>;

    /// All reviews a user wrote, joined with the parent book, newest first
    fn reviews_written_by(&self, user: ProfileId) -> Result<Vec<AuthoredReview>>;

    /// Insert a new review; a second review by the same user for the same
    /// book is rejected with `DuplicateReview`
    fn add_review(&self, review: &NewReview) -> Result<Review>;

    /// Update a review's rating and text; only the owner may do this
    fn update_review(
        &self,
        id: ReviewId,
        owner: ProfileId,
        rating: i16,
        text: &str,
    ) -> Result<Review>;

    /// Delete a review; only the owner may do this
    fn remove_review(&self, id: ReviewId, owner: ProfileId) -> Result<()>;

    /// Mean rating and review count for each of the given books, computed in
    /// a single query; books without reviews are absent from the map
    fn rating_summaries(&self, books: &[BookId]) -> Result<HashMap<BookId, RatingSummary>>;

    /// Get a user's profile record
    fn profile(&self, user: ProfileId) -> Result<Profile>;
}
