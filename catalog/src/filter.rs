// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use std::fmt::{self, Display};

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum GenreFilter {
    All,
    Only(String),
}

impl GenreFilter {
    /// Parse the filter-control sentinel, where "all" means no restriction
    pub fn from_sentinel(raw: &str) -> Self {
        let raw = raw.trim();

        if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Only(raw.to_owned())
        }
    }
}

impl Default for GenreFilter {
    fn default() -> Self {
        Self::All
    }
}

impl Display for GenreFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenreFilter::All => write!(f, "all"),
            GenreFilter::Only(genre) => write!(f, "{}", genre),
        }
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct BookFilter {
    pub search_term: Option<String>,
    pub genre: GenreFilter,
}

impl BookFilter {
    pub fn new() -> Self {
        Default::default()
    }

    /// Case-insensitive substring match against title or author; a blank
    /// term means no text restriction
    pub fn with_search(mut self, term: &str) -> Self {
        let term = term.trim();

        self.search_term = if term.is_empty() {
            None
        } else {
            Some(term.to_owned())
        };

        self
    }

    pub fn with_genre(mut self, genre: GenreFilter) -> Self {
        self.genre = genre;
        self
    }
}

/// A 1-indexed page request
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct PageRequest {
    pub number: usize,
    pub size: usize,
}

impl PageRequest {
    pub fn first(size: usize) -> Self {
        Self { number: 1, size }
    }

    pub fn offset(&self) -> usize {
        self.number.saturating_sub(1) * self.size
    }
}

/// One page of results plus the total matching row count
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> Page<T> {
    pub fn total_pages(&self, size: usize) -> usize {
        if size == 0 {
            0
        } else {
            (self.total + size - 1) / size
        }
    }
}
