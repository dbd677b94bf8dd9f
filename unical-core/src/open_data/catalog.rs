//! Course catalog loaded from the open-data snapshot.

use std::collections::HashMap;
use std::path::Path;

use crate::course::{Course, CourseDirectory};
use crate::error::{UnicalError, UnicalResult};

/// In-memory course directory keyed by course id.
#[derive(Debug, Clone, Default)]
pub struct CourseCatalog {
    courses: HashMap<u32, Course>,
}

impl CourseCatalog {
    /// Build from a list of courses. A repeated id replaces the earlier course.
    pub fn from_courses(courses: impl IntoIterator<Item = Course>) -> Self {
        CourseCatalog {
            courses: courses.into_iter().map(|c| (c.id, c)).collect(),
        }
    }

    /// Load a JSON array of courses.
    pub fn load(path: &Path) -> UnicalResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let courses: Vec<Course> = serde_json::from_str(&content).map_err(|e| {
            UnicalError::Config(format!("Invalid course snapshot {}: {}", path.display(), e))
        })?;

        if let Some(course) = courses.iter().find(|c| c.duration_years == 0) {
            return Err(UnicalError::Config(format!(
                "Course {} ({}) has no academic years",
                course.id, course.name
            )));
        }

        Ok(Self::from_courses(courses))
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

impl CourseDirectory for CourseCatalog {
    fn find_by_id(&self, id: u32) -> Option<&Course> {
        self.courses.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_snapshot(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_snapshot() {
        let file = write_snapshot(
            r#"[
                {"id": 9254, "name": "Ingegneria informatica", "duration_years": 3,
                 "url": "https://corsi.example.edu/laurea/IngegneriaInformatica"},
                {"id": 8615, "name": "Medicina e chirurgia", "duration_years": 6}
            ]"#,
        );

        let catalog = CourseCatalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);

        let course = catalog.find_by_id(9254).unwrap();
        assert_eq!(course.name, "Ingegneria informatica");
        assert_eq!(course.duration_years, 3);
        assert!(course.url.is_some());

        assert!(catalog.find_by_id(8615).unwrap().url.is_none());
        assert!(catalog.find_by_id(1).is_none());
    }

    #[test]
    fn test_load_rejects_zero_duration() {
        let file = write_snapshot(r#"[{"id": 1, "name": "Broken", "duration_years": 0}]"#);
        let err = CourseCatalog::load(file.path()).unwrap_err();
        assert!(matches!(err, UnicalError::Config(_)));
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let file = write_snapshot("{not json");
        assert!(matches!(
            CourseCatalog::load(file.path()),
            Err(UnicalError::Config(_))
        ));
    }

    #[test]
    fn test_later_duplicate_wins() {
        let catalog = CourseCatalog::from_courses([
            Course::new(1, "Old", 3),
            Course::new(1, "New", 2),
        ]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.find_by_id(1).unwrap().name, "New");
    }
}
