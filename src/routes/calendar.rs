//! Calendar download endpoint

use axum::{
    Router,
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use unical_core::CalendarArtifact;

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/cal/{course_id}/{year}", get(course_calendar))
}

/// GET /cal/:course_id/:year?curriculum= - Lecture calendar for one course year
///
/// A repeated `curriculum` parameter resolves to its first value.
async fn course_calendar(
    State(state): State<AppState>,
    Path((course_id, year)): Path<(String, String)>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let curriculum = params
        .iter()
        .find(|(name, _)| name == "curriculum")
        .map(|(_, value)| value.as_str());

    let artifact = state
        .calendars()
        .calendar(&course_id, &year, curriculum)
        .await?;

    Ok(calendar_response(artifact))
}

fn calendar_response(artifact: CalendarArtifact) -> Response {
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename={}",
        artifact.filename
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=lectures.ics"));

    // Calendar clients running in a browser fetch these cross-origin
    let headers: [(HeaderName, HeaderValue); 5] = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/calendar; charset=utf-8"),
        ),
        (header::CONTENT_DISPOSITION, disposition),
        (
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type, Content-Length, Accept-Encoding, Authorization"),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, HEAD, OPTIONS"),
        ),
    ];

    (StatusCode::OK, headers, Body::from(artifact.body.to_vec())).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::app;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::http::{Method, Request};
    use chrono::{TimeZone, Utc};
    use tower::ServiceExt;

    use unical_core::cache::ArtifactCache;
    use unical_core::clock::ManualClock;
    use unical_core::open_data::CourseCatalog;
    use unical_core::{
        CalendarService, Course, CurriculumFilter, Lecture, TimetableSlice, TimetableSource,
        UnicalError, UnicalResult,
    };

    struct CountingTimetables {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl TimetableSource for CountingTimetables {
        async fn timetable(
            &self,
            _course: &Course,
            _year: u32,
            _curriculum: &CurriculumFilter,
        ) -> UnicalResult<TimetableSlice> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(UnicalError::TimetableUnavailable(
                    "upstream returned 502 for https://internal.example".into(),
                ));
            }
            Ok(vec![
                Lecture::new(
                    "Analisi",
                    Utc.with_ymd_and_hms(2025, 3, 20, 8, 0, 0).unwrap(),
                    Utc.with_ymd_and_hms(2025, 3, 20, 10, 0, 0).unwrap(),
                ),
                Lecture::new(
                    "Fisica",
                    Utc.with_ymd_and_hms(2025, 3, 21, 8, 0, 0).unwrap(),
                    Utc.with_ymd_and_hms(2025, 3, 21, 10, 0, 0).unwrap(),
                ),
            ])
        }
    }

    fn setup(fail: bool) -> (Arc<CountingTimetables>, Router) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap(),
        ));
        let timetables = Arc::new(CountingTimetables {
            calls: AtomicUsize::new(0),
            fail,
        });
        let cache = Arc::new(ArtifactCache::new(
            Duration::from_secs(600),
            Duration::from_secs(1800),
            clock.clone(),
        ));
        let courses = CourseCatalog::from_courses([Course::new(42, "Informatica", 3)]);
        let service = CalendarService::new(Arc::new(courses), timetables.clone(), cache, clock);

        (timetables, app(AppState::new(service)))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_unknown_course_is_404() {
        let (timetables, app) = setup(false);

        let (status, _, body) = get(app, "/cal/9999/1").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.to_lowercase().contains("not found"), "body: {body}");
        assert_eq!(timetables.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_out_of_range_course_id_is_404() {
        let (timetables, app) = setup(false);

        for uri in ["/cal/-1/1", "/cal/4294967296/1"] {
            let (status, _, body) = get(app.clone(), uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body, "Course not found");
        }
        assert_eq!(timetables.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let (timetables, app) = setup(false);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/cal/42/1")
                    .header(header::ORIGIN, "https://calendar.example.com")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(timetables.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_repeated_curriculum_uses_first_value() {
        let (timetables, app) = setup(false);

        let (status, _, first) = get(app.clone(), "/cal/42/2?curriculum=A&curriculum=B").await;
        assert_eq!(status, StatusCode::OK);

        let (_, _, only_a) = get(app, "/cal/42/2?curriculum=A").await;
        assert_eq!(first, only_a);
        assert_eq!(timetables.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_year_beyond_duration_is_400() {
        let (_, app) = setup(false);

        let (status, _, body) = get(app, "/cal/42/5").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Invalid year");
    }

    #[tokio::test]
    async fn test_non_numeric_identifiers_are_400() {
        let (_, app) = setup(false);

        let (status, _, body) = get(app.clone(), "/cal/abc/1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Invalid course id");

        let (status, _, body) = get(app.clone(), "/cal/42/0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Invalid year");

        let (status, _, _) = get(app, "/cal/42/one").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_calendar_download() {
        let (_, app) = setup(false);

        let (status, headers, body) = get(app, "/cal/42/1").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            headers[header::CONTENT_TYPE],
            "text/calendar; charset=utf-8"
        );
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=informatica-1.ics"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_METHODS],
            "GET, HEAD, OPTIONS"
        );

        assert_eq!(body.matches("BEGIN:VEVENT").count(), 2);
        assert!(body.contains("X-WR-CALNAME:Informatica - 1 year"));
    }

    #[tokio::test]
    async fn test_repeated_download_is_identical_and_cached() {
        let (timetables, app) = setup(false);

        let (_, _, first) = get(app.clone(), "/cal/42/2?curriculum=A58").await;
        let (_, _, second) = get(app.clone(), "/cal/42/2?curriculum=A58").await;
        assert_eq!(first, second);
        assert_eq!(timetables.calls.load(Ordering::SeqCst), 1);

        get(app, "/cal/42/2?curriculum=a58").await;
        assert_eq!(timetables.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_500_without_details() {
        let (timetables, app) = setup(true);

        let (status, _, body) = get(app.clone(), "/cal/42/1").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Unable to retrieve timetable");

        // Not cached: the retry goes upstream again
        get(app, "/cal/42/1").await;
        assert_eq!(timetables.calls.load(Ordering::SeqCst), 2);
    }
}
