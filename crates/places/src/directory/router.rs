use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::auth::{Authenticator, Credentials};
use super::domain::{
    PhotoId, PhotoSubmission, PlaceId, PlaceSubmission, RatingSummary, ReviewId, ReviewSubmission,
    Viewer,
};
use super::repository::DirectoryRepository;
use super::service::{DirectoryService, ServiceError};
use super::validation::ValidationError;
use super::views::{Links, PhotoView, PlaceView, ReviewView};

/// Shared state behind every directory route.
pub struct ApiContext<R, A> {
    pub service: DirectoryService<R>,
    pub authenticator: Arc<A>,
    pub links: Links,
}

/// Router builder exposing the places/reviews/photos endpoints.
pub fn directory_router<R, A>(context: Arc<ApiContext<R, A>>) -> Router
where
    R: DirectoryRepository + 'static,
    A: Authenticator + 'static,
{
    Router::new()
        .route(
            "/places",
            get(search_places_handler::<R, A>).post(create_place_handler::<R, A>),
        )
        .route(
            "/places/:place_id",
            get(get_place_handler::<R, A>).put(update_place_handler::<R, A>),
        )
        .route(
            "/places/:place_id/reviews",
            get(list_reviews_handler::<R, A>).post(create_review_handler::<R, A>),
        )
        .route(
            "/places/:place_id/reviews/:review_id",
            get(get_review_handler::<R, A>).delete(delete_review_handler::<R, A>),
        )
        .route(
            "/places/:place_id/photos",
            get(list_photos_handler::<R, A>).post(create_photo_handler::<R, A>),
        )
        .route("/places/:place_id/photos/:photo_id", get(get_photo_handler::<R, A>))
        .with_state(context)
}

fn credentials_from_headers(headers: &HeaderMap) -> Option<Credentials> {
    if let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    {
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Some(Credentials::SessionToken(token.trim().to_string()));
        }
    }

    headers
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .map(|key| Credentials::ApiKey(key.trim().to_string()))
}

/// Resolve the acting viewer. Absent credentials mean anonymous; presented
/// credentials that match no account are rejected outright.
fn resolve_viewer<A>(authenticator: &A, headers: &HeaderMap) -> Result<Viewer, Response>
where
    A: Authenticator,
{
    match credentials_from_headers(headers) {
        None => Ok(Viewer::Anonymous),
        Some(credentials) => match authenticator.authenticate(&credentials) {
            Ok(Some(user)) => Ok(Viewer::Known(user)),
            Ok(None) => Err(StatusCode::UNAUTHORIZED.into_response()),
            Err(error) => Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response()),
        },
    }
}

/// Undeserializable bodies get the same 400 shape as field-level failures
/// instead of the extractor's plain-text rejection.
fn decode_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ServiceError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(_) => Err(ValidationError::single("body", "Invalid JSON body").into()),
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match self {
            ServiceError::Validation(error) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "message": "Invalid parameters",
                    "parameters": error.parameters,
                })),
            )
                .into_response(),
            ServiceError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ServiceError::AuthenticationRequired => StatusCode::UNAUTHORIZED.into_response(),
            ServiceError::Forbidden => StatusCode::FORBIDDEN.into_response(),
            ServiceError::Repository(error) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchQuery {
    pub(crate) active: Option<String>,
    pub(crate) name: Option<String>,
}

pub(crate) async fn create_place_handler<R, A>(
    State(context): State<Arc<ApiContext<R, A>>>,
    headers: HeaderMap,
    payload: Result<Json<PlaceSubmission>, JsonRejection>,
) -> Response
where
    R: DirectoryRepository + 'static,
    A: Authenticator + 'static,
{
    let viewer = match resolve_viewer(context.authenticator.as_ref(), &headers) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };
    let submission = match decode_body(payload) {
        Ok(submission) => submission,
        Err(error) => return error.into_response(),
    };

    match context.service.create_place(&viewer, submission) {
        Ok(place) => {
            let view = PlaceView::build(&place, RatingSummary::default(), &viewer, &context.links);
            (StatusCode::CREATED, Json(view)).into_response()
        }
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn search_places_handler<R, A>(
    State(context): State<Arc<ApiContext<R, A>>>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Response
where
    R: DirectoryRepository + 'static,
    A: Authenticator + 'static,
{
    let viewer = match resolve_viewer(context.authenticator.as_ref(), &headers) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match context
        .service
        .search_places(&viewer, query.active.as_deref(), query.name.as_deref())
    {
        Ok((results, filters)) => {
            let views: Vec<PlaceView> = results
                .iter()
                .map(|(place, rating)| PlaceView::build(place, *rating, &viewer, &context.links))
                .collect();
            Json(json!({ "filters": filters, "results": views })).into_response()
        }
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn get_place_handler<R, A>(
    State(context): State<Arc<ApiContext<R, A>>>,
    headers: HeaderMap,
    Path(place_id): Path<u64>,
) -> Response
where
    R: DirectoryRepository + 'static,
    A: Authenticator + 'static,
{
    let viewer = match resolve_viewer(context.authenticator.as_ref(), &headers) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match context.service.get_place(&viewer, PlaceId(place_id)) {
        Ok((place, rating)) => {
            Json(PlaceView::build(&place, rating, &viewer, &context.links)).into_response()
        }
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn update_place_handler<R, A>(
    State(context): State<Arc<ApiContext<R, A>>>,
    headers: HeaderMap,
    Path(place_id): Path<u64>,
    payload: Result<Json<PlaceSubmission>, JsonRejection>,
) -> Response
where
    R: DirectoryRepository + 'static,
    A: Authenticator + 'static,
{
    let viewer = match resolve_viewer(context.authenticator.as_ref(), &headers) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };
    let submission = match decode_body(payload) {
        Ok(submission) => submission,
        Err(error) => return error.into_response(),
    };

    match context
        .service
        .update_place(&viewer, PlaceId(place_id), submission)
    {
        Ok((place, rating)) => {
            Json(PlaceView::build(&place, rating, &viewer, &context.links)).into_response()
        }
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn create_review_handler<R, A>(
    State(context): State<Arc<ApiContext<R, A>>>,
    headers: HeaderMap,
    Path(place_id): Path<u64>,
    payload: Result<Json<ReviewSubmission>, JsonRejection>,
) -> Response
where
    R: DirectoryRepository + 'static,
    A: Authenticator + 'static,
{
    let viewer = match resolve_viewer(context.authenticator.as_ref(), &headers) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };
    let submission = match decode_body(payload) {
        Ok(submission) => submission,
        Err(error) => return error.into_response(),
    };

    match context
        .service
        .create_review(&viewer, PlaceId(place_id), submission)
    {
        Ok((review, _summary)) => (
            StatusCode::CREATED,
            Json(ReviewView::build(&review, &context.links)),
        )
            .into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn list_reviews_handler<R, A>(
    State(context): State<Arc<ApiContext<R, A>>>,
    headers: HeaderMap,
    Path(place_id): Path<u64>,
) -> Response
where
    R: DirectoryRepository + 'static,
    A: Authenticator + 'static,
{
    let viewer = match resolve_viewer(context.authenticator.as_ref(), &headers) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match context.service.list_reviews(&viewer, PlaceId(place_id)) {
        Ok(reviews) => {
            let views: Vec<ReviewView> = reviews
                .iter()
                .map(|review| ReviewView::build(review, &context.links))
                .collect();
            Json(views).into_response()
        }
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn get_review_handler<R, A>(
    State(context): State<Arc<ApiContext<R, A>>>,
    headers: HeaderMap,
    Path((place_id, review_id)): Path<(u64, u64)>,
) -> Response
where
    R: DirectoryRepository + 'static,
    A: Authenticator + 'static,
{
    let viewer = match resolve_viewer(context.authenticator.as_ref(), &headers) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match context
        .service
        .get_review(&viewer, PlaceId(place_id), ReviewId(review_id))
    {
        Ok(review) => Json(ReviewView::build(&review, &context.links)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn delete_review_handler<R, A>(
    State(context): State<Arc<ApiContext<R, A>>>,
    headers: HeaderMap,
    Path((place_id, review_id)): Path<(u64, u64)>,
) -> Response
where
    R: DirectoryRepository + 'static,
    A: Authenticator + 'static,
{
    let viewer = match resolve_viewer(context.authenticator.as_ref(), &headers) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match context
        .service
        .delete_review(&viewer, PlaceId(place_id), ReviewId(review_id))
    {
        Ok(_summary) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn create_photo_handler<R, A>(
    State(context): State<Arc<ApiContext<R, A>>>,
    headers: HeaderMap,
    Path(place_id): Path<u64>,
    payload: Result<Json<PhotoSubmission>, JsonRejection>,
) -> Response
where
    R: DirectoryRepository + 'static,
    A: Authenticator + 'static,
{
    let viewer = match resolve_viewer(context.authenticator.as_ref(), &headers) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };
    let submission = match decode_body(payload) {
        Ok(submission) => submission,
        Err(error) => return error.into_response(),
    };

    match context
        .service
        .create_photo(&viewer, PlaceId(place_id), submission)
    {
        Ok(photo) => (
            StatusCode::CREATED,
            Json(PhotoView::build(&photo, &context.links)),
        )
            .into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn list_photos_handler<R, A>(
    State(context): State<Arc<ApiContext<R, A>>>,
    headers: HeaderMap,
    Path(place_id): Path<u64>,
) -> Response
where
    R: DirectoryRepository + 'static,
    A: Authenticator + 'static,
{
    let viewer = match resolve_viewer(context.authenticator.as_ref(), &headers) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match context.service.list_photos(&viewer, PlaceId(place_id)) {
        Ok(photos) => {
            let views: Vec<PhotoView> = photos
                .iter()
                .map(|photo| PhotoView::build(photo, &context.links))
                .collect();
            Json(views).into_response()
        }
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn get_photo_handler<R, A>(
    State(context): State<Arc<ApiContext<R, A>>>,
    headers: HeaderMap,
    Path((place_id, photo_id)): Path<(u64, u64)>,
) -> Response
where
    R: DirectoryRepository + 'static,
    A: Authenticator + 'static,
{
    let viewer = match resolve_viewer(context.authenticator.as_ref(), &headers) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match context
        .service
        .get_photo(&viewer, PlaceId(place_id), PhotoId(photo_id))
    {
        Ok(photo) => Json(PhotoView::build(&photo, &context.links)).into_response(),
        Err(error) => error.into_response(),
    }
}
