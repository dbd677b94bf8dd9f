//! Adapters over the university's published data: the course catalog
//! snapshot and the per-course timetable endpoints.

mod catalog;
mod http;

pub use catalog::CourseCatalog;
pub use http::HttpTimetableSource;
