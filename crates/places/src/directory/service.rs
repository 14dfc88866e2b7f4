use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::domain::{
    Photo, PhotoId, PhotoSubmission, Place, PlaceId, PlaceSubmission, RatingSummary, Review,
    ReviewId, ReviewSubmission, Viewer,
};
use super::policy::{self, ActiveFilter};
use super::repository::{DirectoryRepository, PlaceQuery, RepositoryError};
use super::validation::{self, ValidationError};

/// Service facade composing validation, policy, and storage.
///
/// Handlers resolve the [`Viewer`] before calling in; every method enforces
/// the visibility and authorization rules itself so no route can bypass
/// them.
pub struct DirectoryService<R> {
    repository: Arc<R>,
}

static PLACE_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static REVIEW_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static PHOTO_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_place_id() -> PlaceId {
    PlaceId(PLACE_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

fn next_review_id() -> ReviewId {
    ReviewId(REVIEW_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

fn next_photo_id() -> PhotoId {
    PhotoId(PHOTO_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

/// Filters actually applied to a listing, echoed back in the response.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct AppliedFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl<R> DirectoryService<R>
where
    R: DirectoryRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Create a place. Any authenticated user may submit one; it starts
    /// inactive until staff publish it.
    pub fn create_place(
        &self,
        viewer: &Viewer,
        submission: PlaceSubmission,
    ) -> Result<Place, ServiceError> {
        let user = viewer.user().ok_or(ServiceError::AuthenticationRequired)?;
        let fields = validation::place_fields(submission)?;

        let place = Place {
            id: next_place_id(),
            name: fields.name,
            address: fields.address,
            postal_code: fields.postal_code,
            city: fields.city,
            state: fields.state,
            country: fields.country,
            latitude: fields.latitude,
            longitude: fields.longitude,
            email: fields.email,
            phone_number: fields.phone_number,
            website: fields.website,
            description: fields.description,
            created_at: Utc::now(),
            created_by: user.clone(),
            active: false,
        };

        let stored = self.repository.insert_place(place)?;
        info!(place = %stored.id, name = %stored.name, "place created, awaiting activation");
        Ok(stored)
    }

    /// Fetch one place with its rating, subject to the visibility policy.
    pub fn get_place(
        &self,
        viewer: &Viewer,
        id: PlaceId,
    ) -> Result<(Place, RatingSummary), ServiceError> {
        let place = self
            .repository
            .fetch_place(id)?
            .filter(|place| policy::place_visible(place, viewer))
            .ok_or(ServiceError::NotFound)?;
        let rating = self.repository.rating(id)?;
        Ok((place, rating))
    }

    /// Browse the directory. Non-staff only ever see published places; staff
    /// see everything and may narrow by `active` token and name substring.
    pub fn search_places(
        &self,
        viewer: &Viewer,
        active_token: Option<&str>,
        name: Option<&str>,
    ) -> Result<(Vec<(Place, RatingSummary)>, AppliedFilters), ServiceError> {
        let filter = policy::active_filter(viewer, active_token)?;
        let name = name
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        let query = PlaceQuery {
            active: match filter {
                ActiveFilter::Any => None,
                ActiveFilter::Only(value) => Some(value),
            },
            name: name.clone(),
        };

        // Only staff-requested restrictions are echoed; the forced
        // active-only view of public browsing is not a "filter".
        let token_supplied = active_token
            .map(str::trim)
            .is_some_and(|token| !token.is_empty());
        let applied = AppliedFilters {
            active: (viewer.is_staff() && token_supplied).then(|| match filter {
                ActiveFilter::Only(value) => value,
                ActiveFilter::Any => true,
            }),
            name,
        };

        let places = self.repository.search_places(&query)?;
        let mut results = Vec::with_capacity(places.len());
        for place in places {
            let rating = self.repository.rating(place.id)?;
            results.push((place, rating));
        }
        Ok((results, applied))
    }

    /// Update a place. Staff only; a staff update may flip `active`, which is
    /// how listings get published.
    pub fn update_place(
        &self,
        viewer: &Viewer,
        id: PlaceId,
        submission: PlaceSubmission,
    ) -> Result<(Place, RatingSummary), ServiceError> {
        if !viewer.authenticated() {
            return Err(ServiceError::AuthenticationRequired);
        }
        if !policy::can_update_place(viewer) {
            return Err(ServiceError::Forbidden);
        }

        let current = self
            .repository
            .fetch_place(id)?
            .ok_or(ServiceError::NotFound)?;
        let fields = validation::place_fields(submission)?;

        let updated = Place {
            id: current.id,
            name: fields.name,
            address: fields.address,
            postal_code: fields.postal_code,
            city: fields.city,
            state: fields.state,
            country: fields.country,
            latitude: fields.latitude,
            longitude: fields.longitude,
            email: fields.email,
            phone_number: fields.phone_number,
            website: fields.website,
            description: fields.description,
            created_at: current.created_at,
            created_by: current.created_by,
            active: fields.active.unwrap_or(current.active),
        };

        self.repository.update_place(updated.clone())?;
        if updated.active != current.active {
            info!(place = %updated.id, active = updated.active, "place publication state changed");
        }
        let rating = self.repository.rating(id)?;
        Ok((updated, rating))
    }

    /// Create a review against an active place and recompute its rating.
    pub fn create_review(
        &self,
        viewer: &Viewer,
        place_id: PlaceId,
        submission: ReviewSubmission,
    ) -> Result<(Review, RatingSummary), ServiceError> {
        let place = self.visible_place(viewer, place_id)?;
        let user = viewer.user().ok_or(ServiceError::AuthenticationRequired)?;
        let fields = validation::review_fields(submission)?;

        if !place.active {
            return Err(ValidationError::single("place", "Place is not active").into());
        }

        if let Some(photo_id) = fields.photo_id {
            if self.repository.fetch_photo(place_id, photo_id)?.is_none() {
                return Err(
                    ValidationError::single("photo_id", "No such photo for this place").into(),
                );
            }
        }

        let review = Review {
            id: next_review_id(),
            place_id,
            user: user.clone(),
            date: Utc::now(),
            rating: fields.rating,
            comment: fields.comment,
            photo: fields.photo_id,
        };

        let (stored, summary) = self.repository.insert_review(review)?;
        info!(
            place = %place_id,
            review = %stored.id,
            rating = stored.rating,
            average = summary.average,
            reviews = summary.reviews,
            "review created"
        );
        Ok((stored, summary))
    }

    /// All reviews of a visible place, newest first.
    pub fn list_reviews(
        &self,
        viewer: &Viewer,
        place_id: PlaceId,
    ) -> Result<Vec<Review>, ServiceError> {
        self.visible_place(viewer, place_id)?;
        Ok(self.repository.list_reviews(place_id)?)
    }

    pub fn get_review(
        &self,
        viewer: &Viewer,
        place_id: PlaceId,
        review_id: ReviewId,
    ) -> Result<Review, ServiceError> {
        self.visible_place(viewer, place_id)?;
        self.repository
            .fetch_review(place_id, review_id)?
            .ok_or(ServiceError::NotFound)
    }

    /// Delete a review (author only) and recompute the place's rating.
    pub fn delete_review(
        &self,
        viewer: &Viewer,
        place_id: PlaceId,
        review_id: ReviewId,
    ) -> Result<RatingSummary, ServiceError> {
        self.visible_place(viewer, place_id)?;
        let review = self
            .repository
            .fetch_review(place_id, review_id)?
            .ok_or(ServiceError::NotFound)?;

        if !viewer.authenticated() {
            return Err(ServiceError::AuthenticationRequired);
        }
        if !policy::can_delete_review(&review, viewer) {
            return Err(ServiceError::Forbidden);
        }

        let summary = self.repository.delete_review(place_id, review_id)?;
        info!(
            place = %place_id,
            review = %review_id,
            average = summary.average,
            reviews = summary.reviews,
            "review deleted"
        );
        Ok(summary)
    }

    /// Add a photo to an active place's gallery.
    pub fn create_photo(
        &self,
        viewer: &Viewer,
        place_id: PlaceId,
        submission: PhotoSubmission,
    ) -> Result<Photo, ServiceError> {
        let place = self.visible_place(viewer, place_id)?;
        let user = viewer.user().ok_or(ServiceError::AuthenticationRequired)?;
        let fields = validation::photo_fields(submission)?;

        if !place.active {
            return Err(ValidationError::single("place", "Place is not active").into());
        }

        let photo = Photo {
            id: next_photo_id(),
            place_id,
            file: fields.file,
            added_at: Utc::now(),
            added_by: user.clone(),
        };

        let stored = self.repository.insert_photo(photo)?;
        info!(place = %place_id, photo = %stored.id, "photo added");
        Ok(stored)
    }

    /// All photos of a visible place, in upload order.
    pub fn list_photos(
        &self,
        viewer: &Viewer,
        place_id: PlaceId,
    ) -> Result<Vec<Photo>, ServiceError> {
        self.visible_place(viewer, place_id)?;
        Ok(self.repository.list_photos(place_id)?)
    }

    pub fn get_photo(
        &self,
        viewer: &Viewer,
        place_id: PlaceId,
        photo_id: PhotoId,
    ) -> Result<Photo, ServiceError> {
        self.visible_place(viewer, place_id)?;
        self.repository
            .fetch_photo(place_id, photo_id)?
            .ok_or(ServiceError::NotFound)
    }

    /// Fetch a place, reporting hidden ones as absent.
    fn visible_place(&self, viewer: &Viewer, id: PlaceId) -> Result<Place, ServiceError> {
        self.repository
            .fetch_place(id)?
            .filter(|place| policy::place_visible(place, viewer))
            .ok_or(ServiceError::NotFound)
    }
}

/// Error raised by the directory service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Covers both genuinely missing records and records hidden by the
    /// visibility policy; the two are indistinguishable on purpose.
    #[error("not found")]
    NotFound,
    #[error("authentication required")]
    AuthenticationRequired,
    #[error("forbidden")]
    Forbidden,
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => ServiceError::NotFound,
            other => ServiceError::Repository(other),
        }
    }
}
