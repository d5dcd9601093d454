// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use thiserror::Error as DError;

#[derive(Debug, Clone, DError)]
pub enum ErrorKind {
    #[error("Couldn't found book with id({0})")]
    NotFoundById(String),

    #[error("Couldn't found a profile for user({0})")]
    ProfileNotFound(String),

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(i16),

    #[error("Missing required field ({0})")]
    MissingField(&'static str),

    #[error("Published year {0} is out of range")]
    InvalidYear(i16),

    #[error("User({0}) is not the owner of {1}({2})")]
    NotOwner(String, &'static str, String),

    #[error("User({0}) already reviewed book({1})")]
    DuplicateReview(String, String),

    #[error("Sign in to perform this action")]
    SignInRequired,

    #[error("Couldn't found a database config for {0}")]
    DbConfigError(String),
}
