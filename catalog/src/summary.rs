// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use num_traits::Zero;

/// Derived (mean rating, review count) pair for a book. Never persisted,
/// recomputed on every fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RatingSummary {
    pub average: f64,
    pub count: usize,
}

impl RatingSummary {
    /// Arithmetic mean over the ratings. The empty list yields an average
    /// of 0.0, not NaN. No rounding is applied here.
    pub fn of(ratings: &[i16]) -> Self {
        if ratings.len().is_zero() {
            return Self::default();
        }

        let sum: i64 = ratings.iter().map(|rating| i64::from(*rating)).sum();

        Self {
            average: sum as f64 / ratings.len() as f64,
            count: ratings.len(),
        }
    }
}
