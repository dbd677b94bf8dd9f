//! Validation of raw calendar requests.

use crate::course::{Course, CourseDirectory};
use crate::error::{UnicalError, UnicalResult};
use crate::timetable::CurriculumFilter;

/// A calendar request whose identifiers have been checked against the catalog.
#[derive(Debug, Clone)]
pub struct CalendarRequest<'a> {
    pub course: &'a Course,
    pub year: u32,
    pub curriculum: CurriculumFilter,
}

impl CalendarRequest<'_> {
    /// Cache fingerprint: `{course_id}-{year}-{curriculum}`.
    ///
    /// Id and year are numeric and come first, so a curriculum containing
    /// `-` cannot collide with another request.
    pub fn cache_key(&self) -> String {
        format!(
            "{}-{}-{}",
            self.course.id,
            self.year,
            self.curriculum.token().unwrap_or_default()
        )
    }
}

/// Parse and check the three request dimensions.
///
/// The course is resolved before the year range is checked, so an unknown
/// course is reported as not found whatever year was asked for.
pub fn validate<'a, D>(
    directory: &'a D,
    course_id: &str,
    year: &str,
    curriculum: Option<&str>,
) -> UnicalResult<CalendarRequest<'a>>
where
    D: CourseDirectory + ?Sized,
{
    let course_id: i64 = course_id
        .parse()
        .map_err(|_| UnicalError::InvalidCourseId(course_id.to_string()))?;

    let year_num: i64 = year
        .parse()
        .map_err(|_| UnicalError::InvalidYear(year.to_string()))?;

    // Numeric ids outside the catalog's range simply name no course
    let course = u32::try_from(course_id)
        .ok()
        .and_then(|id| directory.find_by_id(id))
        .ok_or(UnicalError::CourseNotFound(course_id))?;

    if !course.has_year(year_num) {
        return Err(UnicalError::InvalidYear(format!(
            "{} (course lasts {} years)",
            year_num, course.duration_years
        )));
    }

    Ok(CalendarRequest {
        course,
        // has_year bounds it to 1..=duration_years
        year: year_num as u32,
        curriculum: CurriculumFilter::from_query(curriculum),
    })
}
