use std::collections::BTreeMap;

use super::domain::{
    PhotoId, PhotoSubmission, PlaceSubmission, ReviewSubmission, MAX_RATING, MIN_RATING,
};

/// Field-keyed validation failure, surfaced to clients as a 400 with a
/// per-field message map.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid parameters: {}", self.fields())]
pub struct ValidationError {
    pub parameters: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
    pub fn single(field: &str, message: &str) -> Self {
        let mut parameters = BTreeMap::new();
        parameters.insert(field.to_string(), vec![message.to_string()]);
        Self { parameters }
    }

    fn fields(&self) -> String {
        self.parameters
            .keys()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Default)]
struct FieldErrors {
    parameters: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    fn push(&mut self, field: &str, message: &str) {
        self.parameters
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.parameters.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                parameters: self.parameters,
            })
        }
    }
}

/// Validated place fields, ready to back a create or update.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceFields {
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
    pub active: Option<bool>,
}

/// Validated review fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewFields {
    pub rating: u8,
    pub comment: String,
    pub photo_id: Option<PhotoId>,
}

/// Validated photo fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoFields {
    pub file: String,
}

const REQUIRED: &str = "This field is required";

fn required(errors: &mut FieldErrors, field: &str, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(field, REQUIRED);
    }
    trimmed.to_string()
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

/// Check an inbound place payload and produce the validated field set.
pub fn place_fields(submission: PlaceSubmission) -> Result<PlaceFields, ValidationError> {
    let mut errors = FieldErrors::default();

    let name = required(&mut errors, "name", &submission.name);
    let address = required(&mut errors, "address", &submission.address);
    let postal_code = required(&mut errors, "postal_code", &submission.postal_code);
    let city = required(&mut errors, "city", &submission.city);
    let state = required(&mut errors, "state", &submission.state);
    let country = required(&mut errors, "country", &submission.country);

    let latitude = match submission.latitude {
        Some(value) if value.is_finite() && (-90.0..=90.0).contains(&value) => value,
        Some(_) => {
            errors.push("latitude", "Must be between -90 and 90");
            0.0
        }
        None => {
            errors.push("latitude", REQUIRED);
            0.0
        }
    };
    let longitude = match submission.longitude {
        Some(value) if value.is_finite() && (-180.0..=180.0).contains(&value) => value,
        Some(_) => {
            errors.push("longitude", "Must be between -180 and 180");
            0.0
        }
        None => {
            errors.push("longitude", REQUIRED);
            0.0
        }
    };

    let email = optional(submission.email);
    if let Some(value) = &email {
        if !value.contains('@') {
            errors.push("email", "Enter a valid email address");
        }
    }

    errors.finish()?;

    Ok(PlaceFields {
        name,
        address,
        postal_code,
        city,
        state,
        country,
        latitude,
        longitude,
        email,
        phone_number: optional(submission.phone_number),
        website: optional(submission.website),
        description: optional(submission.description),
        active: submission.active,
    })
}

/// Check an inbound review payload. The owning place's active state is the
/// service's concern; only the payload itself is judged here.
pub fn review_fields(submission: ReviewSubmission) -> Result<ReviewFields, ValidationError> {
    let mut errors = FieldErrors::default();

    let rating = match submission.rating {
        Some(value) if (i64::from(MIN_RATING)..=i64::from(MAX_RATING)).contains(&value) => {
            value as u8
        }
        Some(_) => {
            errors.push("rating", "Must be between 1 and 5");
            MIN_RATING
        }
        None => {
            errors.push("rating", REQUIRED);
            MIN_RATING
        }
    };

    let comment = required(&mut errors, "comment", &submission.comment);

    errors.finish()?;

    Ok(ReviewFields {
        rating,
        comment,
        photo_id: submission.photo_id.map(PhotoId),
    })
}

/// Check an inbound photo payload.
pub fn photo_fields(submission: PhotoSubmission) -> Result<PhotoFields, ValidationError> {
    let mut errors = FieldErrors::default();
    let file = required(&mut errors, "file", &submission.file);
    errors.finish()?;
    Ok(PhotoFields { file })
}
