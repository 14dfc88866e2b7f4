use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use metrics_exporter_prometheus::PrometheusHandle;
use places::directory::auth::{AuthError, Authenticator, Credentials};
use places::directory::domain::{
    Photo, PhotoId, Place, PlaceId, RatingSummary, Review, ReviewId, UserId, UserRef,
};
use places::directory::rating;
use places::directory::repository::{DirectoryRepository, PlaceQuery, RepositoryError};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct DirectoryState {
    places: BTreeMap<PlaceId, Place>,
    reviews: BTreeMap<PlaceId, Vec<Review>>,
    photos: BTreeMap<PlaceId, Vec<Photo>>,
    ratings: BTreeMap<PlaceId, RatingSummary>,
}

/// In-memory store backing the service until a relational backend lands.
///
/// One mutex guards the whole directory, so a review mutation and the rating
/// rescan it triggers always commit in the same critical section.
#[derive(Default)]
pub(crate) struct InMemoryDirectory {
    state: Mutex<DirectoryState>,
}

impl DirectoryRepository for InMemoryDirectory {
    fn insert_place(&self, place: Place) -> Result<Place, RepositoryError> {
        let mut state = self.state.lock().expect("directory mutex poisoned");
        if state.places.contains_key(&place.id) {
            return Err(RepositoryError::Conflict);
        }
        state.places.insert(place.id, place.clone());
        Ok(place)
    }

    fn update_place(&self, place: Place) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("directory mutex poisoned");
        if !state.places.contains_key(&place.id) {
            return Err(RepositoryError::NotFound);
        }
        state.places.insert(place.id, place);
        Ok(())
    }

    fn fetch_place(&self, id: PlaceId) -> Result<Option<Place>, RepositoryError> {
        let state = self.state.lock().expect("directory mutex poisoned");
        Ok(state.places.get(&id).cloned())
    }

    fn search_places(&self, query: &PlaceQuery) -> Result<Vec<Place>, RepositoryError> {
        let state = self.state.lock().expect("directory mutex poisoned");
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
        let state = self.state.lock().expect("directory mutex poisoned");
        Ok(state.ratings.get(&place).copied().unwrap_or_default())
    }

    fn insert_review(&self, review: Review) -> Result<(Review, RatingSummary), RepositoryError> {
        let mut state = self.state.lock().expect("directory mutex poisoned");
        if !state.places.contains_key(&review.place_id) {
            return Err(RepositoryError::NotFound);
        }
        let place_id = review.place_id;
        state
            .reviews
            .entry(place_id)
            .or_default()
            .push(review.clone());
        let summary = rating::recompute(&state.reviews[&place_id]);
        state.ratings.insert(place_id, summary);
        Ok((review, summary))
    }

    fn delete_review(
        &self,
        place: PlaceId,
        id: ReviewId,
    ) -> Result<RatingSummary, RepositoryError> {
        let mut state = self.state.lock().expect("directory mutex poisoned");
        let reviews = state
            .reviews
            .get_mut(&place)
            .ok_or(RepositoryError::NotFound)?;
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
        let state = self.state.lock().expect("directory mutex poisoned");
        Ok(state
            .reviews
            .get(&place)
            .and_then(|reviews| reviews.iter().find(|review| review.id == id).cloned()))
    }

    fn list_reviews(&self, place: PlaceId) -> Result<Vec<Review>, RepositoryError> {
        let state = self.state.lock().expect("directory mutex poisoned");
        let mut reviews = state.reviews.get(&place).cloned().unwrap_or_default();
        reviews.reverse();
        Ok(reviews)
    }

    fn insert_photo(&self, photo: Photo) -> Result<Photo, RepositoryError> {
        let mut state = self.state.lock().expect("directory mutex poisoned");
        if !state.places.contains_key(&photo.place_id) {
            return Err(RepositoryError::NotFound);
        }
        state
            .photos
            .entry(photo.place_id)
            .or_default()
            .push(photo.clone());
        Ok(photo)
    }

    fn fetch_photo(&self, place: PlaceId, id: PhotoId) -> Result<Option<Photo>, RepositoryError> {
        let state = self.state.lock().expect("directory mutex poisoned");
        Ok(state
            .photos
            .get(&place)
            .and_then(|photos| photos.iter().find(|photo| photo.id == id).cloned()))
    }

    fn list_photos(&self, place: PlaceId) -> Result<Vec<Photo>, RepositoryError> {
        let state = self.state.lock().expect("directory mutex poisoned");
        Ok(state.photos.get(&place).cloned().unwrap_or_default())
    }
}

/// Token-backed account lookup; stands in for the session/API-key stores of
/// the surrounding platform.
#[derive(Default)]
pub(crate) struct TokenAuthenticator {
    sessions: HashMap<String, UserRef>,
    api_keys: HashMap<String, UserRef>,
}

impl TokenAuthenticator {
    pub(crate) fn register_session(&mut self, token: &str, user: UserRef) {
        self.sessions.insert(token.to_string(), user);
    }

    pub(crate) fn register_api_key(&mut self, key: &str, user: UserRef) {
        self.api_keys.insert(key.to_string(), user);
    }
}

impl Authenticator for TokenAuthenticator {
    fn authenticate(&self, credentials: &Credentials) -> Result<Option<UserRef>, AuthError> {
        Ok(match credentials {
            Credentials::SessionToken(token) => self.sessions.get(token).cloned(),
            Credentials::ApiKey(key) => self.api_keys.get(key).cloned(),
        })
    }
}

pub(crate) const STAFF_DEMO_TOKEN: &str = "staff-dev-token";
pub(crate) const MEMBER_DEMO_TOKEN: &str = "member-dev-token";
pub(crate) const MEMBER_DEMO_API_KEY: &str = "member-dev-key";

pub(crate) fn staff_account() -> UserRef {
    UserRef {
        id: UserId(1),
        name: "Directory Curator".to_string(),
        email: "curator@places.local".to_string(),
        photo_url: None,
        staff: true,
    }
}

pub(crate) fn member_account() -> UserRef {
    UserRef {
        id: UserId(2),
        name: "Demo Member".to_string(),
        email: "member@places.local".to_string(),
        photo_url: None,
        staff: false,
    }
}

/// Fixed development accounts; the real deployment swaps this for the
/// platform's account service.
pub(crate) fn demo_authenticator() -> TokenAuthenticator {
    let mut authenticator = TokenAuthenticator::default();
    authenticator.register_session(STAFF_DEMO_TOKEN, staff_account());
    authenticator.register_session(MEMBER_DEMO_TOKEN, member_account());
    authenticator.register_api_key(MEMBER_DEMO_API_KEY, member_account());
    authenticator
}
