use super::domain::{Photo, PhotoId, Place, PlaceId, RatingSummary, Review, ReviewId};

/// Listing restriction applied by [`DirectoryRepository::search_places`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceQuery {
    /// Restrict to the given published state; `None` means no restriction.
    pub active: Option<bool>,
    /// Case-insensitive substring match on the place name.
    pub name: Option<String>,
}

/// Storage abstraction so the service module can be exercised in isolation.
///
/// Reviews and the rating aggregate move together: `insert_review` and
/// `delete_review` must persist the mutation, rescan the owning place's full
/// review set with [`super::rating::recompute`], and store the summary, all
/// inside one critical section (a per-place lock or storage transaction).
/// Two concurrent mutations of the same place's reviews must serialize.
pub trait DirectoryRepository: Send + Sync {
    fn insert_place(&self, place: Place) -> Result<Place, RepositoryError>;
    fn update_place(&self, place: Place) -> Result<(), RepositoryError>;
    fn fetch_place(&self, id: PlaceId) -> Result<Option<Place>, RepositoryError>;
    fn search_places(&self, query: &PlaceQuery) -> Result<Vec<Place>, RepositoryError>;

    /// Current rating summary for a place; the zero/zero default when the
    /// place has no reviews (or no persisted aggregate).
    fn rating(&self, place: PlaceId) -> Result<RatingSummary, RepositoryError>;

    /// Persist a review and recompute the owner's rating atomically,
    /// returning the stored review and the fresh summary.
    fn insert_review(&self, review: Review) -> Result<(Review, RatingSummary), RepositoryError>;
    /// Remove a review and recompute the owner's rating atomically.
    fn delete_review(
        &self,
        place: PlaceId,
        id: ReviewId,
    ) -> Result<RatingSummary, RepositoryError>;
    fn fetch_review(
        &self,
        place: PlaceId,
        id: ReviewId,
    ) -> Result<Option<Review>, RepositoryError>;
    /// All reviews for a place, newest first.
    fn list_reviews(&self, place: PlaceId) -> Result<Vec<Review>, RepositoryError>;

    fn insert_photo(&self, photo: Photo) -> Result<Photo, RepositoryError>;
    fn fetch_photo(&self, place: PlaceId, id: PhotoId) -> Result<Option<Photo>, RepositoryError>;
    /// All photos for a place, in upload order.
    fn list_photos(&self, place: PlaceId) -> Result<Vec<Photo>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
