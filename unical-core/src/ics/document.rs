//! Calendar documents built from course timetables.

use chrono::{DateTime, Utc};

use crate::course::Course;
use crate::timetable::{CurriculumFilter, Lecture};

/// A calendar ready to be serialized: metadata plus its events.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDocument {
    pub name: String,
    pub description: String,
    /// IANA zone advertised to clients (X-WR-TIMEZONE)
    pub timezone: Option<String>,
    /// DTSTAMP written on every event
    pub stamp: DateTime<Utc>,
    /// Identifies the timetable the events come from; event UIDs derive from it
    pub source: String,
    pub events: Vec<Lecture>,
}

/// Build the calendar for one course year.
///
/// Lectures are kept in the order the source returned them.
pub fn synthesize(
    course: &Course,
    year: u32,
    curriculum: &CurriculumFilter,
    lectures: Vec<Lecture>,
    stamp: DateTime<Utc>,
) -> CalendarDocument {
    CalendarDocument {
        name: format!("{} - {} year", course.name, year),
        description: format!(
            "Lecture schedule for year {} of the course {}",
            year, course.name
        ),
        timezone: None,
        stamp,
        source: format!(
            "{}/{}/{}",
            course.id,
            year,
            curriculum.token().unwrap_or_default()
        ),
        events: lectures,
    }
}

impl CalendarDocument {
    pub fn with_timezone(mut self, tz: impl Into<String>) -> Self {
        self.timezone = Some(tz.into());
        self
    }
}
