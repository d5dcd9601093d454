// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use std::fmt::{self, Display};

/// What a page currently shows. A failed refresh with previously loaded data
/// keeps the `Loaded` state and surfaces a notice instead.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Loading,
    Loaded(T),
    Failed,
}

impl<T> ViewState<T> {
    pub fn is_loaded(&self) -> bool {
        match self {
            ViewState::Loaded(_) => true,
            _ => false,
        }
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            ViewState::Loaded(inner) => Some(inner),
            _ => None,
        }
    }
}

/// A one-shot, non-blocking user notification. Taking it clears it.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Notice(String);

impl Notice {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
