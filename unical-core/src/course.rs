//! Course metadata and the directory that resolves course ids.

use serde::{Deserialize, Serialize};

/// A degree course as published in the open-data catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: u32,
    /// Display name (e.g. "Ingegneria informatica")
    pub name: String,
    /// Number of academic years the course lasts
    pub duration_years: u32,
    /// Course website, root of the published timetable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Course {
    pub fn new(id: u32, name: impl Into<String>, duration_years: u32) -> Self {
        Course {
            id,
            name: name.into(),
            duration_years,
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Whether `year` is one of this course's academic years.
    pub fn has_year(&self, year: i64) -> bool {
        year >= 1 && year <= i64::from(self.duration_years)
    }
}

/// Read-only lookup of courses by id.
pub trait CourseDirectory: Send + Sync {
    fn find_by_id(&self, id: u32) -> Option<&Course>;
}
