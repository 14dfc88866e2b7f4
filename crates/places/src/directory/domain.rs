use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for places, the root entity of the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlaceId(pub u64);

/// Identifier wrapper for reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReviewId(pub u64);

/// Identifier wrapper for photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PhotoId(pub u64);

/// Identifier wrapper for user accounts (owned by the auth collaborator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Snapshot of the acting/owning user as the directory needs it.
///
/// Account management lives elsewhere; the directory only ever reads the
/// fields it serializes plus the staff flag driving policy decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub photo_url: Option<String>,
    pub staff: bool,
}

/// The identity attached to an incoming request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    Known(UserRef),
}

impl Viewer {
    pub fn authenticated(&self) -> bool {
        matches!(self, Viewer::Known(_))
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Viewer::Known(user) if user.staff)
    }

    pub fn user(&self) -> Option<&UserRef> {
        match self {
            Viewer::Known(user) => Some(user),
            Viewer::Anonymous => None,
        }
    }
}

/// A venue listing. Created inactive; staff flip `active` to publish it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: PlaceId,
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
    pub created_at: DateTime<Utc>,
    pub created_by: UserRef,
    pub active: bool,
}

/// Derived average/count summary of a place's reviews.
///
/// Maintained exclusively by the rating recomputation step; an absent summary
/// and the zero/zero default are interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RatingSummary {
    pub average: f64,
    pub reviews: u32,
}

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// A user's review of a place. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub place_id: PlaceId,
    pub user: UserRef,
    pub date: DateTime<Utc>,
    pub rating: u8,
    pub comment: String,
    pub photo: Option<PhotoId>,
}

/// A photo in a place's gallery. The `file` field is an opaque storage
/// reference; upload transport is the caller's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: PhotoId,
    pub place_id: PlaceId,
    pub file: String,
    pub added_at: DateTime<Utc>,
    pub added_by: UserRef,
}

/// Inbound payload for creating or updating a place.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    /// Honored only on staff updates; creation always starts inactive.
    pub active: Option<bool>,
}

/// Inbound payload for creating a review.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewSubmission {
    pub rating: Option<i64>,
    #[serde(default)]
    pub comment: String,
    pub photo_id: Option<u64>,
}

/// Inbound payload for adding a photo to a place's gallery.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhotoSubmission {
    #[serde(default)]
    pub file: String,
}
