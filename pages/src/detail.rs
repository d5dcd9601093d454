// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::view::Notice;
use anyhow::Error;
use catalog::types::validate_review;
use catalog::{
    Book, BookId, Catalog, NewReview, RatingSummary, Review, ReviewWithAuthor, Session,
};
use log::warn;

/// Review submission form; a rating of 0 means "not selected yet"
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ReviewForm {
    pub rating: i16,
    pub text: String,
}

impl ReviewForm {
    fn prefilled(review: &Review) -> Self {
        Self {
            rating: review.rating,
            text: review.review_text.clone(),
        }
    }
}

/// The caller's unit of work on their single review of a book
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewSession {
    /// Nobody signed in; everything is read-only
    Anonymous,
    /// No review yet, the submission form is showing
    Composing(ReviewForm),
    /// The stored review, read-only
    Viewing(Review),
    /// The stored review with the form pre-filled
    Editing { current: Review, form: ReviewForm },
}

/// The detail view of one book: the record, its reviews, and the caller's
/// review session
pub struct BookPage<'a, C: Catalog> {
    catalog: &'a C,
    session: &'a Session,
    book: Book,
    reviews: Vec<ReviewWithAuthor>,
    review_session: ReviewSession,
    notice: Option<Notice>,
}

impl<'a, C: Catalog> BookPage<'a, C> {
    /// Open the detail view. A book that doesn't resolve is fatal here; the
    /// caller goes back to the directory.
    pub fn open(catalog: &'a C, session: &'a Session, book_id: BookId) -> Result<Self, Error> {
        let book = catalog.book(book_id)?;
        let reviews = catalog.reviews_of(book_id)?;

        let review_session = match session.user() {
            None => ReviewSession::Anonymous,
            Some(user) => match catalog.review_by(book_id, user)? {
                Some(review) => ReviewSession::Viewing(review),
                None => ReviewSession::Composing(ReviewForm::default()),
            },
        };

        Ok(Self {
            catalog,
            session,
            book,
            reviews,
            review_session,
            notice: None,
        })
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn reviews(&self) -> &[ReviewWithAuthor] {
        &self.reviews
    }

    pub fn review_session(&self) -> &ReviewSession {
        &self.review_session
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Aggregate over the loaded reviews
    pub fn summary(&self) -> RatingSummary {
        let ratings: Vec<i16> = self
            .reviews
            .iter()
            .map(|entry| entry.review.rating)
            .collect();

        RatingSummary::of(&ratings)
    }

    /// Whether the edit/delete book controls should render
    pub fn is_book_owner(&self) -> bool {
        self.session.is(self.book.added_by)
    }

    /// Whether the edit/delete controls of a listed review should render
    pub fn owns_review(&self, review: &Review) -> bool {
        self.session.is(review.user_id)
    }

    pub fn set_rating(&mut self, rating: i16) {
        match &mut self.review_session {
            ReviewSession::Composing(form) | ReviewSession::Editing { form, .. } => {
                form.rating = rating;
            }
            _ => {}
        }
    }

    pub fn set_text(&mut self, text: &str) {
        match &mut self.review_session {
            ReviewSession::Composing(form) | ReviewSession::Editing { form, .. } => {
                form.text = text.to_owned();
            }
            _ => {}
        }
    }

    /// Switch the stored review into edit mode with the form pre-filled
    pub fn edit(&mut self) {
        if let ReviewSession::Viewing(review) = &self.review_session {
            self.review_session = ReviewSession::Editing {
                form: ReviewForm::prefilled(review),
                current: review.clone(),
            };
        }
    }

    /// Leave edit mode without persisting anything
    pub fn cancel_edit(&mut self) {
        if let ReviewSession::Editing { current, .. } = &self.review_session {
            self.review_session = ReviewSession::Viewing(current.clone());
        }
    }

    /// Create or update the caller's review. Validation runs before any
    /// store call; failures surface as a notice and change nothing.
    pub fn submit_review(&mut self) {
        let user = match self.session.user() {
            Some(user) => user,
            None => {
                self.notice = Some(Notice::new("Please sign in to submit a review"));
                return;
            }
        };

        match self.review_session.clone() {
            ReviewSession::Composing(form) => {
                let new_review = match NewReview::new(self.book.id, user, form.rating, &form.text)
                {
                    Ok(new_review) => new_review,
                    Err(e) => {
                        self.notice = Some(Notice::new(e.to_string()));
                        return;
                    }
                };

                match self.catalog.add_review(&new_review) {
                    Ok(review) => {
                        self.review_session = ReviewSession::Viewing(review);
                        self.reload_reviews();
                    }
                    Err(e) => {
                        warn!("review insert failed: {}", e);
                        self.notice = Some(Notice::new(e.to_string()));
                    }
                }
            }

            ReviewSession::Editing { current, form } => {
                if let Err(e) = validate_review(form.rating, &form.text) {
                    self.notice = Some(Notice::new(e.to_string()));
                    return;
                }

                match self
                    .catalog
                    .update_review(current.id, user, form.rating, &form.text)
                {
                    Ok(review) => {
                        self.review_session = ReviewSession::Viewing(review);
                        self.reload_reviews();
                    }
                    Err(e) => {
                        warn!("review update failed: {}", e);
                        self.notice = Some(Notice::new(e.to_string()));
                    }
                }
            }

            ReviewSession::Viewing(_) | ReviewSession::Anonymous => {}
        }
    }

    /// Delete the caller's review and fall back to the submission form
    pub fn delete_review(&mut self) {
        let user = match self.session.user() {
            Some(user) => user,
            None => {
                self.notice = Some(Notice::new("Please sign in first"));
                return;
            }
        };

        let review_id = match &self.review_session {
            ReviewSession::Viewing(review) | ReviewSession::Editing {
                current: review, ..
            } => review.id,
            _ => {
                self.notice = Some(Notice::new("There is no review to delete"));
                return;
            }
        };

        match self.catalog.remove_review(review_id, user) {
            Ok(()) => {
                self.review_session = ReviewSession::Composing(ReviewForm::default());
                self.reload_reviews();
            }
            Err(e) => {
                warn!("review delete failed: {}", e);
                self.notice = Some(Notice::new("Failed to delete review"));
            }
        }
    }

    /// Delete the book itself; only its owner may do this. Returns true when
    /// the book is gone and the caller should navigate back.
    pub fn delete_book(&mut self) -> bool {
        let user = match self.session.user() {
            Some(user) => user,
            None => {
                self.notice = Some(Notice::new("Please sign in first"));
                return false;
            }
        };

        match self.catalog.remove_book(self.book.id, user) {
            Ok(()) => true,
            Err(e) => {
                warn!("book delete failed: {}", e);
                self.notice = Some(Notice::new(e.to_string()));
                false
            }
        }
    }

    fn reload_reviews(&mut self) {
        match self.catalog.reviews_of(self.book.id) {
            Ok(reviews) => self.reviews = reviews,
            Err(e) => {
                warn!("review refetch failed: {}", e);
                self.notice = Some(Notice::new("Failed to fetch reviews"));
            }
        }
    }
}
