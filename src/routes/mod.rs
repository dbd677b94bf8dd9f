pub mod calendar;

use axum::{
    Router,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use unical_core::{ErrorKind, UnicalError};

use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .merge(calendar::router())
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Convert core errors to plain-text HTTP responses.
///
/// Only a short generic reason reaches the client; details are logged where
/// the error happened.
pub struct AppError(UnicalError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match (&self.0, self.0.kind()) {
            (UnicalError::InvalidCourseId(_), _) => (StatusCode::BAD_REQUEST, "Invalid course id"),
            (_, ErrorKind::InvalidInput) => (StatusCode::BAD_REQUEST, "Invalid year"),
            (_, ErrorKind::NotFound) => (StatusCode::NOT_FOUND, "Course not found"),
            (UnicalError::Serialization(_), _) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Unable to serialize calendar")
            }
            (UnicalError::TimetableUnavailable(_), _) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Unable to retrieve timetable")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };
        (status, message).into_response()
    }
}

impl From<UnicalError> for AppError {
    fn from(err: UnicalError) -> Self {
        Self(err)
    }
}
