//! Serialized representations returned by the API.
//!
//! Views carry absolute URLs so clients can follow a listing straight into
//! its nested collections. Staff viewers additionally see curation metadata
//! (`created_at`, `created_by`, `active`) on places.

use serde::Serialize;

use super::domain::{Photo, PhotoId, Place, PlaceId, RatingSummary, Review, ReviewId, Viewer};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Builds absolute resource URLs from the configured external base URL.
#[derive(Debug, Clone)]
pub struct Links {
    base_url: String,
}

impl Links {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    pub fn places(&self) -> String {
        format!("{}/places", self.base_url)
    }

    pub fn place(&self, id: PlaceId) -> String {
        format!("{}/places/{}", self.base_url, id)
    }

    pub fn reviews(&self, place: PlaceId) -> String {
        format!("{}/reviews", self.place(place))
    }

    pub fn review(&self, place: PlaceId, id: ReviewId) -> String {
        format!("{}/reviews/{}", self.place(place), id)
    }

    pub fn photos(&self, place: PlaceId) -> String {
        format!("{}/photos", self.place(place))
    }

    pub fn photo(&self, place: PlaceId, id: PhotoId) -> String {
        format!("{}/photos/{}", self.place(place), id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingView {
    pub average: f64,
    pub reviews: u32,
}

impl From<RatingSummary> for RatingView {
    fn from(summary: RatingSummary) -> Self {
        Self {
            average: summary.average,
            reviews: summary.reviews,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionLinkView {
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatorView {
    pub email: String,
}

/// Serialized place. The trailing staff-only fields are omitted entirely for
/// public viewers rather than serialized as null.
#[derive(Debug, Clone, Serialize)]
pub struct PlaceView {
    pub id: PlaceId,
    pub url: String,
    pub name: String,
    pub address: String,
    pub postal_code: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub rating: RatingView,
    pub reviews: CollectionLinkView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<CreatorView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl PlaceView {
    pub fn build(place: &Place, rating: RatingSummary, viewer: &Viewer, links: &Links) -> Self {
        let staff = viewer.is_staff();
        Self {
            id: place.id,
            url: links.place(place.id),
            name: place.name.clone(),
            address: place.address.clone(),
            postal_code: place.postal_code.clone(),
            city: place.city.clone(),
            state: place.state.clone(),
            country: place.country.clone(),
            latitude: place.latitude,
            longitude: place.longitude,
            email: place.email.clone(),
            phone_number: place.phone_number.clone(),
            website: place.website.clone(),
            description: place.description.clone(),
            rating: rating.into(),
            reviews: CollectionLinkView {
                url: links.reviews(place.id),
            },
            created_at: staff.then(|| place.created_at.format(DATE_FORMAT).to_string()),
            created_by: staff.then(|| CreatorView {
                email: place.created_by.email.clone(),
            }),
            active: staff.then_some(place.active),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewUserView {
    pub name: String,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhotoLinkView {
    pub id: PhotoId,
    pub url: String,
}

/// Serialized review; `photo` is null unless the review carries one.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewView {
    pub id: ReviewId,
    pub url: String,
    pub user: ReviewUserView,
    pub date: String,
    pub rating: u8,
    pub comment: String,
    pub photo: Option<PhotoLinkView>,
}

impl ReviewView {
    pub fn build(review: &Review, links: &Links) -> Self {
        Self {
            id: review.id,
            url: links.review(review.place_id, review.id),
            user: ReviewUserView {
                name: review.user.name.clone(),
                photo_url: review.user.photo_url.clone(),
            },
            date: review.date.format(DATE_FORMAT).to_string(),
            rating: review.rating,
            comment: review.comment.clone(),
            photo: review.photo.map(|id| PhotoLinkView {
                id,
                url: links.photo(review.place_id, id),
            }),
        }
    }
}

/// Serialized photo; content type is guessed from the stored file name.
#[derive(Debug, Clone, Serialize)]
pub struct PhotoView {
    pub id: PhotoId,
    pub url: String,
    pub file: String,
    pub content_type: String,
    pub added_at: String,
    pub added_by: ReviewUserView,
}

impl PhotoView {
    pub fn build(photo: &Photo, links: &Links) -> Self {
        let content_type = mime_guess::from_path(&photo.file)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Self {
            id: photo.id,
            url: links.photo(photo.place_id, photo.id),
            file: photo.file.clone(),
            content_type,
            added_at: photo.added_at.format(DATE_FORMAT).to_string(),
            added_by: ReviewUserView {
                name: photo.added_by.name.clone(),
                photo_url: photo.added_by.photo_url.clone(),
            },
        }
    }
}
