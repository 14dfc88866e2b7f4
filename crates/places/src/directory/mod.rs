//! The places directory: listings, reviews, ratings, and photo galleries.
//!
//! Layout follows the service's usual layering: `domain` holds the records
//! and inbound payloads, `validation` turns payloads into checked field
//! sets, `policy` answers visibility and authorization questions, `rating`
//! maintains the derived review aggregate, `repository`/`auth` are the
//! storage and identity seams, `service` ties it together, and `router`
//! exposes it over HTTP. `views` are the serialized shapes clients see.

pub mod auth;
pub mod domain;
pub mod policy;
pub mod rating;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;
pub mod views;

#[cfg(test)]
mod tests;

pub use auth::{AuthError, Authenticator, Credentials};
pub use domain::{
    Photo, PhotoId, PhotoSubmission, Place, PlaceId, PlaceSubmission, RatingSummary, Review,
    ReviewId, ReviewSubmission, UserId, UserRef, Viewer, MAX_RATING, MIN_RATING,
};
pub use repository::{DirectoryRepository, PlaceQuery, RepositoryError};
pub use router::{directory_router, ApiContext};
pub use service::{AppliedFilters, DirectoryService, ServiceError};
pub use validation::ValidationError;
pub use views::{Links, PhotoView, PlaceView, RatingView, ReviewView};
