use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use axum::Router;
use serde_json::Value;

use crate::directory::auth::{AuthError, Authenticator, Credentials};
use crate::directory::domain::{
    Photo, PhotoId, PhotoSubmission, Place, PlaceId, PlaceSubmission, RatingSummary, Review,
    ReviewId, ReviewSubmission, UserId, UserRef, Viewer,
};
use crate::directory::rating;
use crate::directory::repository::{DirectoryRepository, PlaceQuery, RepositoryError};
use crate::directory::router::{directory_router, ApiContext};
use crate::directory::service::DirectoryService;
use crate::directory::views::Links;

pub(super) const BASE_URL: &str = "http://testserver";

#[derive(Default)]
struct StoreState {
    places: BTreeMap<PlaceId, Place>,
    reviews: BTreeMap<PlaceId, Vec<Review>>,
    photos: BTreeMap<PlaceId, Vec<Photo>>,
    ratings: BTreeMap<PlaceId, RatingSummary>,
}

/// Test store: one mutex over the whole state, so review mutation and rating
/// recomputation share a critical section the way the trait requires.
#[derive(Default)]
pub(super) struct MemoryRepository {
    state: Mutex<StoreState>,
}

impl MemoryRepository {
    pub(super) fn stored_rating(&self, place: PlaceId) -> Option<RatingSummary> {
        let state = self.state.lock().expect("store mutex poisoned");
        state.ratings.get(&place).copied()
    }
}

impl DirectoryRepository for MemoryRepository {
    fn insert_place(&self, place: Place) -> Result<Place, RepositoryError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        if state.places.contains_key(&place.id) {
            return Err(RepositoryError::Conflict);
        }
        state.places.insert(place.id, place.clone());
        Ok(place)
    }

    fn update_place(&self, place: Place) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        if !state.places.contains_key(&place.id) {
            return Err(RepositoryError::NotFound);
        }
        state.places.insert(place.id, place);
        Ok(())
    }

    fn fetch_place(&self, id: PlaceId) -> Result<Option<Place>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.places.get(&id).cloned())
    }

    fn search_places(&self, query: &PlaceQuery) -> Result<Vec<Place>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        let needle = query.name.as_deref().map(str::to_lowercase);
        Ok(state
            .places
            .values()
            .filter(|place| query.active.map_or(true, |active| place.active == active))
            .filter(|place| {
                needle
                    .as_deref()
                    .map_or(true, |needle| place.name.to_lowercase().contains(needle))
            })
            .cloned()
            .collect())
    }

    fn rating(&self, place: PlaceId) -> Result<RatingSummary, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.ratings.get(&place).copied().unwrap_or_default())
    }

    fn insert_review(&self, review: Review) -> Result<(Review, RatingSummary), RepositoryError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        if !state.places.contains_key(&review.place_id) {
            return Err(RepositoryError::NotFound);
        }
        let place_id = review.place_id;
        state.reviews.entry(place_id).or_default().push(review.clone());
        let summary = rating::recompute(&state.reviews[&place_id]);
        state.ratings.insert(place_id, summary);
        Ok((review, summary))
    }

    fn delete_review(
        &self,
        place: PlaceId,
        id: ReviewId,
    ) -> Result<RatingSummary, RepositoryError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        let reviews = state.reviews.get_mut(&place).ok_or(RepositoryError::NotFound)?;
        let index = reviews
            .iter()
            .position(|review| review.id == id)
            .ok_or(RepositoryError::NotFound)?;
        reviews.remove(index);
        let summary = rating::recompute(&state.reviews[&place]);
        state.ratings.insert(place, summary);
        Ok(summary)
    }

    fn fetch_review(
        &self,
        place: PlaceId,
        id: ReviewId,
    ) -> Result<Option<Review>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state
            .reviews
            .get(&place)
            .and_then(|reviews| reviews.iter().find(|review| review.id == id).cloned()))
    }

    fn list_reviews(&self, place: PlaceId) -> Result<Vec<Review>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        let mut reviews = state.reviews.get(&place).cloned().unwrap_or_default();
        reviews.reverse();
        Ok(reviews)
    }

    fn insert_photo(&self, photo: Photo) -> Result<Photo, RepositoryError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        if !state.places.contains_key(&photo.place_id) {
            return Err(RepositoryError::NotFound);
        }
        state.photos.entry(photo.place_id).or_default().push(photo.clone());
        Ok(photo)
    }

    fn fetch_photo(&self, place: PlaceId, id: PhotoId) -> Result<Option<Photo>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state
            .photos
            .get(&place)
            .and_then(|photos| photos.iter().find(|photo| photo.id == id).cloned()))
    }

    fn list_photos(&self, place: PlaceId) -> Result<Vec<Photo>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.photos.get(&place).cloned().unwrap_or_default())
    }
}

/// Repository that rejects every call, for exercising 5xx paths.
pub(super) struct UnavailableRepository;

impl DirectoryRepository for UnavailableRepository {
    fn insert_place(&self, _place: Place) -> Result<Place, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn update_place(&self, _place: Place) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn fetch_place(&self, _id: PlaceId) -> Result<Option<Place>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn search_places(&self, _query: &PlaceQuery) -> Result<Vec<Place>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn rating(&self, _place: PlaceId) -> Result<RatingSummary, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn insert_review(&self, _review: Review) -> Result<(Review, RatingSummary), RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn delete_review(
        &self,
        _place: PlaceId,
        _id: ReviewId,
    ) -> Result<RatingSummary, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn fetch_review(
        &self,
        _place: PlaceId,
        _id: ReviewId,
    ) -> Result<Option<Review>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn list_reviews(&self, _place: PlaceId) -> Result<Vec<Review>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn insert_photo(&self, _photo: Photo) -> Result<Photo, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn fetch_photo(
        &self,
        _place: PlaceId,
        _id: PhotoId,
    ) -> Result<Option<Photo>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn list_photos(&self, _place: PlaceId) -> Result<Vec<Photo>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct StaticAuthenticator {
    sessions: HashMap<String, UserRef>,
    api_keys: HashMap<String, UserRef>,
}

impl StaticAuthenticator {
    pub(super) fn with_session(mut self, token: &str, user: UserRef) -> Self {
        self.sessions.insert(token.to_string(), user);
        self
    }

    pub(super) fn with_api_key(mut self, key: &str, user: UserRef) -> Self {
        self.api_keys.insert(key.to_string(), user);
        self
    }
}

impl Authenticator for StaticAuthenticator {
    fn authenticate(&self, credentials: &Credentials) -> Result<Option<UserRef>, AuthError> {
        Ok(match credentials {
            Credentials::SessionToken(token) => self.sessions.get(token).cloned(),
            Credentials::ApiKey(key) => self.api_keys.get(key).cloned(),
        })
    }
}

pub(super) fn staff() -> UserRef {
    UserRef {
        id: UserId(1),
        name: "Dana Curator".to_string(),
        email: "dana@places.test".to_string(),
        photo_url: None,
        staff: true,
    }
}

pub(super) fn alice() -> UserRef {
    UserRef {
        id: UserId(2),
        name: "Alice Reviewer".to_string(),
        email: "alice@places.test".to_string(),
        photo_url: Some("http://cdn.places.test/avatars/alice.png".to_string()),
        staff: false,
    }
}

pub(super) fn bob() -> UserRef {
    UserRef {
        id: UserId(3),
        name: "Bob Reviewer".to_string(),
        email: "bob@places.test".to_string(),
        photo_url: None,
        staff: false,
    }
}

pub(super) fn viewer(user: UserRef) -> Viewer {
    Viewer::Known(user)
}

pub(super) fn place_submission() -> PlaceSubmission {
    PlaceSubmission {
        name: "Cafe Paradiso".to_string(),
        address: "Rua das Flores 12".to_string(),
        postal_code: "4000-123".to_string(),
        city: "Porto".to_string(),
        state: "Porto".to_string(),
        country: "Portugal".to_string(),
        latitude: Some(41.1496),
        longitude: Some(-8.6110),
        email: Some("hello@paradiso.test".to_string()),
        phone_number: Some("+351 222 000 000".to_string()),
        website: Some("https://paradiso.test".to_string()),
        description: Some("Espresso and pastries by the river.".to_string()),
        active: None,
    }
}

pub(super) fn review_submission(rating: i64) -> ReviewSubmission {
    ReviewSubmission {
        rating: Some(rating),
        comment: "Great coffee, friendly staff.".to_string(),
        photo_id: None,
    }
}

pub(super) fn photo_submission() -> PhotoSubmission {
    PhotoSubmission {
        file: "places/photos/terrace.jpg".to_string(),
    }
}

pub(super) fn build_service() -> (Arc<MemoryRepository>, DirectoryService<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = DirectoryService::new(repository.clone());
    (repository, service)
}

/// Create a place through the service and publish it via a staff update.
pub(super) fn seeded_active_place(
    service: &DirectoryService<MemoryRepository>,
) -> crate::directory::domain::Place {
    let created = service
        .create_place(&viewer(alice()), place_submission())
        .expect("place creates");
    let mut submission = place_submission();
    submission.active = Some(true);
    let (updated, _) = service
        .update_place(&viewer(staff()), created.id, submission)
        .expect("staff can publish");
    updated
}

pub(super) fn build_router() -> (Router, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let authenticator = Arc::new(
        StaticAuthenticator::default()
            .with_session("staff-token", staff())
            .with_session("alice-token", alice())
            .with_session("bob-token", bob())
            .with_api_key("alice-key", alice()),
    );
    let context = Arc::new(ApiContext {
        service: DirectoryService::new(repository.clone()),
        authenticator,
        links: Links::new(BASE_URL),
    });
    (directory_router(context), repository)
}

pub(super) async fn read_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("response body reads");
    serde_json::from_slice(&body).expect("response body is JSON")
}
