//! Visibility and authorization decisions.
//!
//! All functions here are pure; callers translate a negative visibility
//! answer into "not found" so unpublished listings never leak their
//! existence to the public.

use super::domain::{Place, Review, Viewer};
use super::validation::ValidationError;

/// Whether `viewer` may see `place` and, transitively, its reviews and
/// photos. Inactive places are staff-only.
pub fn place_visible(place: &Place, viewer: &Viewer) -> bool {
    place.active || viewer.is_staff()
}

/// Listing restriction on the `active` flag derived from the viewer and the
/// raw query token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveFilter {
    /// No restriction (staff browsing the full directory).
    Any,
    /// Restrict to the given published state.
    Only(bool),
}

/// Resolve the `active` listing filter.
///
/// Non-staff viewers are always pinned to published places; a token they
/// supply is ignored rather than rejected, matching the public search
/// surface. Staff default to the full listing and may narrow it with the
/// literal tokens `true` / `false` (empty string means "no filter"). Any
/// other token from a staff viewer is a client error.
pub fn active_filter(viewer: &Viewer, token: Option<&str>) -> Result<ActiveFilter, ValidationError> {
    if !viewer.is_staff() {
        return Ok(ActiveFilter::Only(true));
    }

    match token.map(str::trim) {
        None | Some("") => Ok(ActiveFilter::Any),
        Some("true") => Ok(ActiveFilter::Only(true)),
        Some("false") => Ok(ActiveFilter::Only(false)),
        Some(_) => Err(ValidationError::single("active", "Invalid value")),
    }
}

/// Only staff may update a place (including flipping `active`).
pub fn can_update_place(viewer: &Viewer) -> bool {
    viewer.is_staff()
}

/// Only the authoring user may delete a review; staff status grants no
/// moderation right over other users' reviews.
pub fn can_delete_review(review: &Review, viewer: &Viewer) -> bool {
    viewer
        .user()
        .map(|user| user.id == review.user.id)
        .unwrap_or(false)
}
