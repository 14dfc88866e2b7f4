//! Rating aggregate maintenance.
//!
//! A place's rating is derived data: every review insert or delete rescans
//! the full review set and stores the result. Repositories are required to
//! run the mutation and this recomputation inside one critical section so
//! the stored summary always matches the committed review set.

use super::domain::{RatingSummary, Review};

/// Recompute a place's rating summary from its complete review set.
///
/// Floating-point division of the integer rating sum by the count, no
/// rounding. Zero reviews yields the zero/zero default, which callers treat
/// the same as an absent aggregate.
pub fn recompute(reviews: &[Review]) -> RatingSummary {
    if reviews.is_empty() {
        return RatingSummary::default();
    }

    let sum: u64 = reviews.iter().map(|review| u64::from(review.rating)).sum();
    RatingSummary {
        average: sum as f64 / reviews.len() as f64,
        reviews: reviews.len() as u32,
    }
}
