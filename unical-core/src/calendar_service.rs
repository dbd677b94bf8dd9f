//! Serving calendar requests: validate, look up the cache, synthesize on miss.

use std::sync::Arc;

use tracing::{debug, error};

use crate::cache::ArtifactCache;
use crate::clock::Clock;
use crate::course::{Course, CourseDirectory};
use crate::error::UnicalResult;
use crate::ics::synthesize;
use crate::request::{CalendarRequest, validate};
use crate::timetable::TimetableSource;

const FALLBACK_FILENAME: &str = "lectures.ics";

/// A serialized calendar and the name it should be downloaded as.
#[derive(Debug, Clone)]
pub struct CalendarArtifact {
    pub filename: String,
    pub body: Arc<[u8]>,
}

pub struct CalendarService {
    courses: Arc<dyn CourseDirectory>,
    timetables: Arc<dyn TimetableSource>,
    cache: Arc<ArtifactCache>,
    clock: Arc<dyn Clock>,
    timezone: Option<String>,
}

impl CalendarService {
    pub fn new(
        courses: Arc<dyn CourseDirectory>,
        timetables: Arc<dyn TimetableSource>,
        cache: Arc<ArtifactCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        CalendarService {
            courses,
            timetables,
            cache,
            clock,
            timezone: None,
        }
    }

    /// Advertise `tz` as the calendar's timezone (X-WR-TIMEZONE).
    pub fn with_timezone(mut self, tz: impl Into<String>) -> Self {
        self.timezone = Some(tz.into());
        self
    }

    /// Produce the calendar for raw request parameters.
    ///
    /// Validation errors are returned as is. Failures fetching or
    /// serializing the timetable are logged and never cached.
    pub async fn calendar(
        &self,
        course_id: &str,
        year: &str,
        curriculum: Option<&str>,
    ) -> UnicalResult<CalendarArtifact> {
        let request = validate(&*self.courses, course_id, year, curriculum)?;
        let key = request.cache_key();
        let filename = download_filename(request.course, request.year);

        if let Some(body) = self.cache.get(&key) {
            debug!(key = %key, "Calendar cache hit");
            return Ok(CalendarArtifact { filename, body });
        }
        debug!(key = %key, "Calendar cache miss");

        let body: Arc<[u8]> = self
            .build(&request)
            .await
            .inspect_err(|e| {
                error!(
                    course_id = request.course.id,
                    year = request.year,
                    curriculum = request.curriculum.token(),
                    error = %e,
                    "Could not build calendar"
                );
            })?
            .into();

        self.cache.put(key, Arc::clone(&body));

        Ok(CalendarArtifact { filename, body })
    }

    async fn build(&self, request: &CalendarRequest<'_>) -> UnicalResult<Vec<u8>> {
        let lectures = self
            .timetables
            .timetable(request.course, request.year, &request.curriculum)
            .await?;

        let mut document = synthesize(
            request.course,
            request.year,
            &request.curriculum,
            lectures,
            self.clock.now(),
        );
        if let Some(ref tz) = self.timezone {
            document = document.with_timezone(tz);
        }

        document.to_ics()
    }
}

fn download_filename(course: &Course, year: u32) -> String {
    let slug = slug::slugify(&course.name);
    if slug.is_empty() {
        return FALLBACK_FILENAME.to_string();
    }
    format!("{slug}-{year}.ics")
}
