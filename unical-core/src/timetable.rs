//! Lecture events and the source that produces them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::course::Course;
use crate::error::UnicalResult;

/// A single lecture in a course timetable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lecture {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub location: Option<String>,
    pub lecturer: Option<String>,
    /// Link for attending online
    pub url: Option<String>,
}

impl Lecture {
    pub fn new(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Lecture {
            title: title.into(),
            start,
            end,
            location: None,
            lecturer: None,
            url: None,
        }
    }
}

/// Lectures for one (course, year, curriculum), in source order.
pub type TimetableSlice = Vec<Lecture>;

/// Optional curriculum selector.
///
/// The token is kept verbatim: no trimming or case folding, so two spellings
/// of the same curriculum are distinct filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CurriculumFilter(Option<String>);

impl CurriculumFilter {
    pub fn none() -> Self {
        CurriculumFilter(None)
    }

    /// Empty and absent tokens both mean "no filter".
    pub fn from_query(token: Option<&str>) -> Self {
        match token {
            Some(t) if !t.is_empty() => CurriculumFilter(Some(t.to_string())),
            _ => CurriculumFilter(None),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }
}

/// Produces the timetable of a course year.
#[async_trait]
pub trait TimetableSource: Send + Sync {
    async fn timetable(
        &self,
        course: &Course,
        year: u32,
        curriculum: &CurriculumFilter,
    ) -> UnicalResult<TimetableSlice>;
}
