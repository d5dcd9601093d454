// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::view::{Notice, ViewState};
use catalog::{Book, BookFilter, BookId, Catalog, GenreFilter, PageRequest, RatingSummary};
use log::{debug, warn};

/// A directory entry: the book plus its aggregate
#[derive(Debug, Clone, PartialEq)]
pub struct BookCard {
    pub book: Book,
    pub summary: RatingSummary,
}

impl BookCard {
    /// The "4.0 (3 reviews)" rating badge; books without reviews show none
    pub fn badge(&self) -> Option<String> {
        if self.summary.count == 0 {
            return None;
        }

        let noun = if self.summary.count == 1 {
            "review"
        } else {
            "reviews"
        };

        Some(format!(
            "{:.1} ({} {})",
            self.summary.average, self.summary.count, noun
        ))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryPage {
    pub cards: Vec<BookCard>,
    pub total_pages: usize,
}

/// Tag for an issued fetch; results carrying an outdated tag are discarded
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct FetchToken(u64);

/// The paginated, filterable book listing
pub struct Directory<'a, C: Catalog> {
    catalog: &'a C,
    page_size: usize,
    page: usize,
    search_term: String,
    genre: GenreFilter,
    generation: u64,
    state: ViewState<DirectoryPage>,
    notice: Option<Notice>,
}

impl<'a, C: Catalog> Directory<'a, C> {
    pub fn with_catalog(catalog: &'a C, page_size: usize) -> Self {
        Self {
            catalog,
            page_size,
            page: 1,
            search_term: String::new(),
            genre: GenreFilter::All,
            generation: 0,
            state: ViewState::Loading,
            notice: None,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn genre(&self) -> &GenreFilter {
        &self.genre
    }

    pub fn state(&self) -> &ViewState<DirectoryPage> {
        &self.state
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Distinct genres for the filter control
    pub fn genres(&self) -> catalog::Result<Vec<String>> {
        self.catalog.genres()
    }

    fn filter(&self) -> BookFilter {
        BookFilter::new()
            .with_search(&self.search_term)
            .with_genre(self.genre.clone())
    }

    fn total_pages(&self) -> Option<usize> {
        self.state.loaded().map(|page| page.total_pages)
    }

    /// Mark a new fetch as the latest one
    pub fn begin_fetch(&mut self) -> FetchToken {
        self.generation += 1;
        FetchToken(self.generation)
    }

    /// Query one directory page and its aggregates
    pub fn run_fetch(&self) -> catalog::Result<DirectoryPage> {
        let request = PageRequest {
            number: self.page,
            size: self.page_size,
        };

        let page = self.catalog.books_page(&self.filter(), request)?;
        let total_pages = page.total_pages(self.page_size);

        let ids: Vec<BookId> = page.items.iter().map(|book| book.id).collect();
        let summaries = self.catalog.rating_summaries(&ids)?;

        let cards = page
            .items
            .into_iter()
            .map(|book| {
                let summary = summaries.get(&book.id).copied().unwrap_or_default();
                BookCard { book, summary }
            })
            .collect();

        Ok(DirectoryPage { cards, total_pages })
    }

    /// Apply a finished fetch. Returns false when a newer fetch was issued
    /// in the meantime and this result was discarded.
    pub fn apply_fetch(
        &mut self,
        token: FetchToken,
        result: catalog::Result<DirectoryPage>,
    ) -> bool {
        if token.0 != self.generation {
            debug!(
                "discarding stale directory fetch ({} behind {})",
                token.0, self.generation
            );
            return false;
        }

        match result {
            Ok(page) => self.state = ViewState::Loaded(page),
            Err(e) => {
                warn!("directory fetch failed: {}", e);
                self.notice = Some(Notice::new("Failed to fetch books"));

                if !self.state.is_loaded() {
                    self.state = ViewState::Failed;
                }
            }
        }

        true
    }

    pub fn refresh(&mut self) {
        let token = self.begin_fetch();
        let result = self.run_fetch();
        self.apply_fetch(token, result);
    }

    /// Changing the search term always goes back to page 1
    pub fn set_search_term(&mut self, term: &str) {
        self.search_term = term.trim().to_owned();
        self.page = 1;
        self.refresh();
    }

    /// Changing the genre filter always goes back to page 1
    pub fn set_genre(&mut self, genre: GenreFilter) {
        self.genre = genre;
        self.page = 1;
        self.refresh();
    }

    pub fn go_to_page(&mut self, number: usize) {
        let mut number = number.max(1);

        if let Some(total_pages) = self.total_pages() {
            number = number.min(total_pages.max(1));
        }

        if number != self.page {
            self.page = number;
            self.refresh();
        }
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.page + 1);
    }

    pub fn prev_page(&mut self) {
        self.go_to_page(self.page.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn card(average: f64, count: usize) -> BookCard {
        BookCard {
            book: Book {
                id: 1,
                title: "Dune".into(),
                author: "Frank Herbert".into(),
                genre: "Science Fiction".into(),
                published_year: 1965,
                description: None,
                added_by: 1,
                created_at: NaiveDateTime::from_timestamp(0, 0),
            },
            summary: RatingSummary { average, count },
        }
    }

    #[test]
    fn badge_rounds_to_one_decimal() {
        assert_eq!(card(4.0, 3).badge().unwrap(), "4.0 (3 reviews)");
        assert_eq!(card(3.6666666, 3).badge().unwrap(), "3.7 (3 reviews)");
    }

    #[test]
    fn single_review_badge_is_singular() {
        assert_eq!(card(5.0, 1).badge().unwrap(), "5.0 (1 review)");
    }

    #[test]
    fn zero_reviews_have_no_badge() {
        assert_eq!(card(0.0, 0).badge(), None);
    }
}
