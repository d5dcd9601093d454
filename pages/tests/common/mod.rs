use anyhow::Error;
use catalog::error::ErrorKind;
use catalog::{
    AuthoredReview, Book, BookFilter, BookId, BookPatch, Catalog, GenreFilter, NewBook, NewReview,
    Page, PageRequest, Profile, ProfileId, RatingSummary, Review, ReviewId, ReviewWithAuthor,
};
use chrono::NaiveDateTime;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// In-memory stand-in for the persistence service, with the same contract
/// as the real store: newest-first ordering, storage-level review
/// uniqueness, owner checks and cascade deletes.
pub struct MemoryCatalog {
    books: RefCell<HashMap<BookId, Book>>,
    reviews: RefCell<HashMap<ReviewId, Review>>,
    profiles: RefCell<HashMap<ProfileId, Profile>>,
    next_book: Cell<i32>,
    next_review: Cell<i32>,
    next_profile: Cell<i32>,
    clock: Cell<i64>,
    fail_next: Cell<bool>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self {
            books: RefCell::new(HashMap::new()),
            reviews: RefCell::new(HashMap::new()),
            profiles: RefCell::new(HashMap::new()),
            next_book: Cell::new(1),
            next_review: Cell::new(1),
            next_profile: Cell::new(1),
            clock: Cell::new(0),
            fail_next: Cell::new(false),
        }
    }

    /// Make the next store call fail with an opaque service error
    pub fn fail_next(&self) {
        self.fail_next.set(true);
    }

    fn check_failure(&self) -> Result<(), Error> {
        if self.fail_next.take() {
            Err(anyhow::anyhow!("connection reset by peer"))
        } else {
            Ok(())
        }
    }

    fn tick(&self) -> NaiveDateTime {
        let now = self.clock.get() + 1;
        self.clock.set(now);
        NaiveDateTime::from_timestamp(now, 0)
    }

    pub fn add_profile(&self, name: &str, email: &str) -> ProfileId {
        let id = self.next_profile.get();
        self.next_profile.set(id + 1);

        let profile = Profile {
            user_id: id,
            name: name.to_owned(),
            email: email.to_owned(),
            created_at: self.tick(),
        };

        self.profiles.borrow_mut().insert(id, profile);
        id
    }

    pub fn seed_book(&self, title: &str, author: &str, genre: &str, owner: ProfileId) -> BookId {
        let book = NewBook::new(title, author, genre, 1990, None, owner).unwrap();
        Catalog::add_book(self, &book).unwrap().id
    }

    pub fn seed_review(&self, book: BookId, user: ProfileId, rating: i16) -> ReviewId {
        let review = NewReview::new(book, user, rating, "seeded review").unwrap();
        Catalog::add_review(self, &review).unwrap().id
    }

    fn matches(&self, book: &Book, filter: &BookFilter) -> bool {
        if let Some(term) = &filter.search_term {
            let term = term.to_lowercase();
            let matched = book.title.to_lowercase().contains(&term)
                || book.author.to_lowercase().contains(&term);

            if !matched {
                return false;
            }
        }

        if let GenreFilter::Only(genre) = &filter.genre {
            if &book.genre != genre {
                return false;
            }
        }

        true
    }
}

impl Catalog for MemoryCatalog {
    fn book(&self, id: BookId) -> Result<Book, Error> {
        self.check_failure()?;

        self.books
            .borrow()
            .get(&id)
            .cloned()
            .ok_or_else(|| ErrorKind::NotFoundById(id.to_string()).into())
    }

    fn books_page(&self, filter: &BookFilter, page: PageRequest) -> Result<Page<Book>, Error> {
        self.check_failure()?;

        let mut matching: Vec<Book> = self
            .books
            .borrow()
            .values()
            .filter(|book| self.matches(book, filter))
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len();
        let items = matching
            .into_iter()
            .skip(page.offset())
            .take(page.size)
            .collect();

        Ok(Page { items, total })
    }

    fn genres(&self) -> Result<Vec<String>, Error> {
        self.check_failure()?;

        let mut genres: Vec<String> = self
            .books
            .borrow()
            .values()
            .map(|book| book.genre.clone())
            .collect();

        genres.sort();
        genres.dedup();

        Ok(genres)
    }

    fn books_added_by(&self, user: ProfileId) -> Result<Vec<Book>, Error> {
        self.check_failure()?;

        let mut books: Vec<Book> = self
            .books
            .borrow()
            .values()
            .filter(|book| book.added_by == user)
            .cloned()
            .collect();

        books.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(books)
    }

    fn add_book(&self, book: &NewBook) -> Result<Book, Error> {
        self.check_failure()?;

        let id = self.next_book.get();
        self.next_book.set(id + 1);

        let book = Book {
            id,
            title: book.title.clone(),
            author: book.author.clone(),
            genre: book.genre.clone(),
            published_year: book.published_year,
            description: book.description.clone(),
            added_by: book.added_by,
            created_at: self.tick(),
        };

        self.books.borrow_mut().insert(id, book.clone());
        Ok(book)
    }

    fn update_book(&self, id: BookId, owner: ProfileId, patch: &BookPatch) -> Result<Book, Error> {
        self.check_failure()?;
        patch.validate()?;

        let mut books = self.books.borrow_mut();
        let book = books
            .get_mut(&id)
            .ok_or_else(|| ErrorKind::NotFoundById(id.to_string()))?;

        if book.added_by != owner {
            return Err(ErrorKind::NotOwner(owner.to_string(), "book", id.to_string()).into());
        }

        if let Some(title) = &patch.title {
            book.title = title.clone();
        }
        if let Some(author) = &patch.author {
            book.author = author.clone();
        }
        if let Some(genre) = &patch.genre {
            book.genre = genre.clone();
        }
        if let Some(year) = patch.published_year {
            book.published_year = year;
        }
        if let Some(description) = &patch.description {
            book.description = Some(description.clone());
        }

        Ok(book.clone())
    }

    fn remove_book(&self, id: BookId, owner: ProfileId) -> Result<(), Error> {
        self.check_failure()?;

        let mut books = self.books.borrow_mut();
        let book = books
            .get(&id)
            .ok_or_else(|| ErrorKind::NotFoundById(id.to_string()))?;

        if book.added_by != owner {
            return Err(ErrorKind::NotOwner(owner.to_string(), "book", id.to_string()).into());
        }

        books.remove(&id);

        // Cascade, like the foreign key does
        self.reviews
            .borrow_mut()
            .retain(|_, review| review.book_id != id);

        Ok(())
    }

    fn reviews_of(&self, book: BookId) -> Result<Vec<ReviewWithAuthor>, Error> {
        self.check_failure()?;

        let profiles = self.profiles.borrow();
        let mut reviews: Vec<ReviewWithAuthor> = self
            .reviews
            .borrow()
            .values()
            .filter(|review| review.book_id == book)
            .map(|review| ReviewWithAuthor {
                review: review.clone(),
                author: profiles.get(&review.user_id).map(|p| p.name.clone()),
            })
            .collect();

        reviews.sort_by(|a, b| b.review.created_at.cmp(&a.review.created_at));

        Ok(reviews)
    }

    fn review_by(&self, book: BookId, user: ProfileId) -> Result<Option<Review>, Error> {
        self.check_failure()?;

        Ok(self
            .reviews
            .borrow()
            .values()
            .find(|review| review.book_id == book && review.user_id == user)
            .cloned())
    }

    fn reviews_written_by(&self, user: ProfileId) -> Result<Vec<AuthoredReview>, Error> {
        self.check_failure()?;

        let books = self.books.borrow();
        let mut reviews: Vec<AuthoredReview> = self
            .reviews
            .borrow()
            .values()
            .filter(|review| review.user_id == user)
            .filter_map(|review| {
                let book = books.get(&review.book_id)?;

                Some(AuthoredReview {
                    review: review.clone(),
                    book_title: book.title.clone(),
                    book_author: book.author.clone(),
                })
            })
            .collect();

        reviews.sort_by(|a, b| b.review.created_at.cmp(&a.review.created_at));

        Ok(reviews)
    }

    fn add_review(&self, review: &NewReview) -> Result<Review, Error> {
        self.check_failure()?;

        if !self.books.borrow().contains_key(&review.book_id) {
            return Err(ErrorKind::NotFoundById(review.book_id.to_string()).into());
        }

        // The storage-level uniqueness constraint
        let duplicate = self
            .reviews
            .borrow()
            .values()
            .any(|existing| {
                existing.book_id == review.book_id && existing.user_id == review.user_id
            });

        if duplicate {
            return Err(ErrorKind::DuplicateReview(
                review.user_id.to_string(),
                review.book_id.to_string(),
            )
            .into());
        }

        let id = self.next_review.get();
        self.next_review.set(id + 1);

        let review = Review {
            id,
            book_id: review.book_id,
            user_id: review.user_id,
            rating: review.rating,
            review_text: review.review_text.clone(),
            created_at: self.tick(),
        };

        self.reviews.borrow_mut().insert(id, review.clone());
        Ok(review)
    }

    fn update_review(
        &self,
        id: ReviewId,
        owner: ProfileId,
        rating: i16,
        text: &str,
    ) -> Result<Review, Error> {
        self.check_failure()?;
        catalog::types::validate_review(rating, text)?;

        let mut reviews = self.reviews.borrow_mut();
        let review = reviews
            .get_mut(&id)
            .ok_or_else(|| ErrorKind::NotFoundById(id.to_string()))?;

        if review.user_id != owner {
            return Err(ErrorKind::NotOwner(owner.to_string(), "review", id.to_string()).into());
        }

        review.rating = rating;
        review.review_text = text.trim().to_owned();

        Ok(review.clone())
    }

    fn remove_review(&self, id: ReviewId, owner: ProfileId) -> Result<(), Error> {
        self.check_failure()?;

        let mut reviews = self.reviews.borrow_mut();
        let review = reviews
            .get(&id)
            .ok_or_else(|| ErrorKind::NotFoundById(id.to_string()))?;

        if review.user_id != owner {
            return Err(ErrorKind::NotOwner(owner.to_string(), "review", id.to_string()).into());
        }

        reviews.remove(&id);
        Ok(())
    }

    fn rating_summaries(
        &self,
        book_ids: &[BookId],
    ) -> Result<HashMap<BookId, RatingSummary>, Error> {
        self.check_failure()?;

        let reviews = self.reviews.borrow();
        let mut ratings_by_book: HashMap<BookId, Vec<i16>> = HashMap::new();

        for review in reviews.values() {
            if book_ids.contains(&review.book_id) {
                ratings_by_book
                    .entry(review.book_id)
                    .or_insert_with(Vec::new)
                    .push(review.rating);
            }
        }

        Ok(ratings_by_book
            .into_iter()
            .map(|(book_id, ratings)| (book_id, RatingSummary::of(&ratings)))
            .collect())
    }

    fn profile(&self, user: ProfileId) -> Result<Profile, Error> {
        self.check_failure()?;

        self.profiles
            .borrow()
            .get(&user)
            .cloned()
            .ok_or_else(|| ErrorKind::ProfileNotFound(user.to_string()).into())
    }
}
